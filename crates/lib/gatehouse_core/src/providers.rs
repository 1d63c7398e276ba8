//! External authentication providers.
//!
//! A provider is described by its name and the path of its external id
//! inside the user's `external_auth` document. Stores resolve lookups
//! through [`ExternalAuthProvider::field_path`], so registering a new
//! provider needs no change to lookup code.

use std::sync::Arc;

use crate::auth::AuthError;

pub const PROVIDER_GITHUB: &str = "github";
pub const PROVIDER_YANDEX: &str = "yandex";
/// `external_auth` key of a linked remote-device chat.
pub const CHANNEL_TELEGRAM: &str = "telegram";

/// Capability interface of an external identity provider.
pub trait ExternalAuthProvider: Send + Sync {
    /// Stable provider name, also the key in `external_auth`.
    fn name(&self) -> &str;

    /// Path of the external id inside the `external_auth` document.
    fn field_path(&self) -> Vec<String> {
        vec![self.name().to_string(), "id".to_string()]
    }
}

/// A provider whose external id lives at `external_auth.<name>.id`.
#[derive(Debug, Clone)]
pub struct NamedProvider {
    name: String,
}

impl NamedProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl ExternalAuthProvider for NamedProvider {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Follow `path` through an `external_auth` document.
pub fn external_id_at<'a>(doc: &'a serde_json::Value, path: &[String]) -> Option<&'a str> {
    path.iter()
        .try_fold(doc, |node, key| node.get(key.as_str()))
        .and_then(|v| v.as_str())
}

/// The set of providers the service accepts.
#[derive(Clone)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn ExternalAuthProvider>>,
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Register a provider, replacing one with the same name.
    pub fn register(&mut self, provider: Arc<dyn ExternalAuthProvider>) {
        self.providers.retain(|p| p.name() != provider.name());
        self.providers.push(provider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ExternalAuthProvider>> {
        self.providers.iter().find(|p| p.name() == name).cloned()
    }

    /// Like [`get`](Self::get), failing with `ValidationError` for unknown names.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn ExternalAuthProvider>, AuthError> {
        self.get(name)
            .ok_or_else(|| AuthError::ValidationError(format!("unknown provider: {name}")))
    }

    pub fn names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }
}

impl Default for ProviderRegistry {
    /// GitHub and Yandex.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(NamedProvider::new(PROVIDER_GITHUB)));
        registry.register(Arc::new(NamedProvider::new(PROVIDER_YANDEX)));
        registry
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}
