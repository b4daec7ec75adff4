//! Bearer-token credentials.
//!
//! Both engines receive a `CredentialProvider` at construction. A provider
//! that yields no token is a precondition failure for every wallet, bet
//! and result operation.

use secrecy::{ExposeSecret, SecretString};
use std::sync::RwLock;
use tracing::debug;

/// Source of the bearer token for backend calls.
pub trait CredentialProvider: Send + Sync {
    /// The current token, or `None` if the user is logged out.
    fn bearer_token(&self) -> Option<SecretString>;
}

/// A token held in memory. Can be swapped or cleared at runtime.
#[derive(Debug, Default)]
pub struct StaticCredentials {
    token: RwLock<Option<SecretString>>,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(SecretString::new(token.into()))),
        }
    }

    /// A provider with no token.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn set(&self, token: impl Into<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(SecretString::new(token.into()));
        }
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn bearer_token(&self) -> Option<SecretString> {
        self.token
            .read()
            .ok()
            .and_then(|t| t.as_ref().map(|s| SecretString::new(s.expose_secret().clone())))
    }
}

/// Reads the token from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvCredentials {
    fn bearer_token(&self) -> Option<SecretString> {
        match std::env::var(&self.var) {
            Ok(v) if !v.trim().is_empty() => Some(SecretString::new(v.trim().to_string())),
            _ => {
                debug!(var = %self.var, "No bearer token in environment");
                None
            }
        }
    }
}
