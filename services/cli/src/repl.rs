//! The terminal read loop.
//!
//! Lines are read on a dedicated thread and handed to the async loop over a
//! channel. While a command is being handled (plan generation, streaming),
//! the [`InputGate`] is held and anything the learner types is discarded.
//! `Ctrl+C` ends the loop at any point, including mid-stream.

use crate::app::{App, Flow};
use anyhow::Result;
use std::{
    io::BufRead,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use tokio::{io::AsyncWrite, sync::mpsc};
use tracing::{debug, info, warn};

const LINE_BUFFER: usize = 16;

/// Shared flag telling the reader thread whether input is currently accepted.
#[derive(Debug, Clone, Default)]
pub struct InputGate {
    busy: Arc<AtomicBool>,
}

/// Keeps the gate closed until dropped.
#[derive(Debug)]
pub struct GateGuard {
    busy: Arc<AtomicBool>,
}

impl InputGate {
    pub fn hold(&self) -> GateGuard {
        self.busy.store(true, Ordering::SeqCst);
        GateGuard {
            busy: Arc::clone(&self.busy),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

/// Reads `reader` line by line on its own thread.
///
/// The returned channel closes when the reader hits end of input or an I/O
/// error. Lines read while `gate` is held are dropped.
pub fn spawn_line_reader<R>(reader: R, gate: InputGate) -> mpsc::Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(LINE_BUFFER);
    std::thread::spawn(move || {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "Failed to read input");
                    break;
                }
            };
            if gate.is_busy() {
                debug!("Dropping input typed during generation");
                continue;
            }
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
        debug!("Input reader finished");
    });
    rx
}

/// Runs the loop until `quit`, end of input or `Ctrl+C`.
pub async fn run<W>(
    app: &mut App<W>,
    gate: &InputGate,
    lines: &mut mpsc::Receiver<String>,
) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    app.welcome().await?;
    loop {
        app.prompt().await?;

        let line = tokio::select! {
            line = lines.recv() => line,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, exiting");
                break;
            }
        };
        let Some(line) = line else {
            info!("End of input, exiting");
            break;
        };

        let _busy = gate.hold();
        let flow = tokio::select! {
            flow = app.handle_line(&line) => flow?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted during generation, exiting");
                break;
            }
        };
        if flow == Flow::Quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use groqmate_core::{Provider, ProviderConfig, TutorError};
    use std::{io::Cursor, path::PathBuf};

    async fn drain(mut rx: mpsc::Receiver<String>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = rx.recv().await {
            lines.push(line);
        }
        lines
    }

    fn offline_app() -> App<Vec<u8>> {
        App::new(
            ProviderConfig::new(Provider::Groq, None),
            Err(TutorError::MissingApiKey {
                provider: Provider::Groq,
                env_var: "GROQ_API_KEY",
            }),
            Vec::new(),
            PathBuf::from("."),
        )
    }

    #[test]
    fn test_gate_guard_reopens_on_drop() {
        let gate = InputGate::default();
        assert!(!gate.is_busy());
        {
            let _guard = gate.clone().hold();
            assert!(gate.is_busy());
        }
        assert!(!gate.is_busy());
    }

    #[tokio::test]
    async fn test_reader_forwards_lines_when_idle() {
        let rx = spawn_line_reader(Cursor::new("teach me rust\nnext\n"), InputGate::default());
        assert_eq!(drain(rx).await, vec!["teach me rust", "next"]);
    }

    #[tokio::test]
    async fn test_reader_drops_lines_while_busy() {
        let gate = InputGate::default();
        let guard = gate.hold();
        let rx = spawn_line_reader(Cursor::new("typed ahead\nmore\n"), gate.clone());

        assert!(drain(rx).await.is_empty());
        drop(guard);
    }

    #[tokio::test]
    async fn test_run_stops_on_quit() {
        let (tx, mut rx) = mpsc::channel(4);
        tx.send("help".to_string()).await.unwrap();
        tx.send("quit".to_string()).await.unwrap();
        tx.send("never handled".to_string()).await.unwrap();

        let gate = InputGate::default();
        let mut app = offline_app();
        run(&mut app, &gate, &mut rx).await.unwrap();

        let out = String::from_utf8_lossy(app.output()).into_owned();
        assert!(out.starts_with("* Welcome to Groqmate!"));
        assert!(out.contains("teach me <topic>  - Start a new lesson"));
        assert!(out.ends_with("* Bye!\n"));
        assert!(!gate.is_busy());
    }

    #[tokio::test]
    async fn test_run_stops_at_end_of_input() {
        let (tx, mut rx) = mpsc::channel(4);
        tx.send("hello".to_string()).await.unwrap();
        drop(tx);

        let mut app = offline_app();
        run(&mut app, &InputGate::default(), &mut rx).await.unwrap();

        let out = String::from_utf8_lossy(app.output()).into_owned();
        assert!(out.contains("Unknown command"));
        assert!(out.ends_with("> "));
    }
}
