use crate::provider::Provider;

/// Source of per-provider model choices and credentials.
///
/// Implementations decide where values come from (a settings file, the
/// environment, a test fixture); the tutor only asks.
pub trait SettingsStore: Send + Sync {
    /// The model configured for `provider`, if any.
    fn model(&self, provider: Provider) -> Option<String>;

    /// The API key for `provider`, if one can be found.
    fn api_key(&self, provider: Provider) -> Option<String>;
}
