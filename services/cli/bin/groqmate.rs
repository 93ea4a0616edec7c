//! Main Entrypoint for the Groqmate terminal coach
//!
//! This binary is responsible for:
//! 1. Parsing command-line flags and loading `.env`.
//! 2. Initializing logging to stderr.
//! 3. Loading persisted settings, or saving them for `configure`.
//! 4. Constructing the tutor for the chosen provider.
//! 5. Running the interaction loop on stdin/stdout until the learner quits.

use anyhow::Context;
use clap::{Parser, Subcommand};
use groqmate_cli::{
    app::App,
    config::Config,
    repl::{self, InputGate},
};
use groqmate_core::{Provider, ProviderConfig, Tutor};
use std::{io::BufReader, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

/// Learn any topic step by step in the terminal.
#[derive(Debug, Parser)]
#[command(name = "groqmate", version, about)]
struct Args {
    /// Provider to use for this run, overriding the settings file.
    #[arg(short, long)]
    provider: Option<Provider>,

    /// Model to use for this run, overriding the settings file.
    #[arg(short, long)]
    model: Option<String>,

    /// List the supported providers and exit.
    #[arg(short, long)]
    list_providers: bool,

    /// Directory where lesson notes are saved.
    #[arg(long, default_value = ".")]
    notes_dir: PathBuf,

    /// Log debug output to stderr.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Save the default provider, model and API key.
    Configure {
        #[arg(short, long)]
        provider: Provider,

        #[arg(short, long)]
        model: Option<String>,

        /// API key for the provider. An empty value removes the stored key.
        #[arg(short = 'k', long)]
        api_key: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();
}

fn list_providers() {
    println!("{:<12} {:<28} {}", "PROVIDER", "DEFAULT MODEL", "API KEY");
    for provider in Provider::ALL {
        let key = if provider.is_local() {
            "(local)"
        } else {
            provider.env_key().unwrap_or_default()
        };
        println!(
            "{:<12} {:<28} {}",
            provider.as_str(),
            provider.default_model(),
            key
        );
    }
}

fn configure(
    provider: Provider,
    model: Option<String>,
    api_key: Option<String>,
) -> anyhow::Result<()> {
    let path = Config::default_path()?;
    let mut config = Config::load_from(&path)?;

    config.apply(provider, model, api_key.as_deref());
    config
        .save_to(&path)
        .context("Failed to save settings")?;

    info!(path = %path.display(), %provider, "Settings saved");
    println!("Saved settings to {}", path.display());
    Ok(())
}

fn load_config() -> Config {
    let loaded = Config::default_path().and_then(|path| Config::load_from(&path));
    match loaded {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Could not load settings, using defaults");
            Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Parse Flags ---
    let args = Args::parse();
    dotenvy::dotenv().ok();

    // --- 2. Initialize Logging ---
    init_tracing(args.verbose);

    if args.list_providers {
        list_providers();
        return Ok(());
    }

    // --- 3. Load Settings ---
    if let Some(Cmd::Configure {
        provider,
        model,
        api_key,
    }) = args.command
    {
        return configure(provider, model, api_key);
    }
    let config = load_config();

    // --- 4. Initialize the Tutor ---
    let provider_config = ProviderConfig::new(
        args.provider.unwrap_or(config.settings.provider),
        args.model,
    );
    let tutor = Tutor::new(&provider_config, &config);
    if let Err(e) = &tutor {
        warn!(error = %e, "Tutor unavailable until a provider is configured");
    }

    // --- 5. Run the Loop ---
    let gate = InputGate::default();
    let mut lines = repl::spawn_line_reader(BufReader::new(std::io::stdin()), gate.clone());
    let mut app = App::new(provider_config, tutor, tokio::io::stdout(), args.notes_dir);

    info!("Starting interaction loop");
    repl::run(&mut app, &gate, &mut lines)
        .await
        .context("Interaction loop failed")?;
    info!("Session ended");
    Ok(())
}
