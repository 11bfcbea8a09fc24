use std::{
    fmt,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use thiserror::Error;

/// API credentials plus the session state gathered during authentication.
///
/// `api_key` and `shared_secret` are fixed at construction. `frob` and
/// `auth_token` change during the auth flow and are cleared together.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    shared_secret: String,
    frob: Option<String>,
    auth_token: Option<String>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, shared_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            shared_secret: shared_secret.into(),
            frob: None,
            auth_token: None,
        }
    }

    pub fn with_session(mut self, frob: Option<String>, auth_token: Option<String>) -> Self {
        self.frob = frob;
        self.auth_token = auth_token;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn shared_secret(&self) -> &str {
        &self.shared_secret
    }

    pub fn frob(&self) -> Option<&str> {
        self.frob.as_deref()
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn set_frob(&mut self, frob: impl Into<String>) {
        self.frob = Some(frob.into());
    }

    pub fn set_auth_token(&mut self, token: impl Into<String>) {
        self.auth_token = Some(token.into());
    }

    /// Drop both frob and token, e.g. after the token was rejected.
    pub fn reset_session(&mut self) {
        self.frob = None;
        self.auth_token = None;
    }
}

// Secrets stay out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("shared_secret", &"<redacted>")
            .field("frob", &self.frob)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Errors produced by credential storage implementations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialStoreError {
    /// The configuration file does not exist.
    #[error("configuration file {path} not found")]
    NotFound { path: String },
    /// Underlying read, parse or write failure.
    #[error("storage failure: {reason}")]
    Storage { reason: String },
}

/// Loads and persists [`Credentials`] (a config file in production).
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<Credentials, CredentialStoreError>;

    /// Overwrite the stored credentials.
    async fn save(&self, credentials: &Credentials) -> Result<(), CredentialStoreError>;
}

/// Credential store kept in memory, for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCredentialStore {
    inner: Arc<Mutex<Option<Credentials>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(credentials))),
        }
    }

    /// Last saved value, if any.
    pub fn snapshot(&self) -> Option<Credentials> {
        self.inner.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load(&self) -> Result<Credentials, CredentialStoreError> {
        let guard = self.inner.lock().map_err(|err| CredentialStoreError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        guard.clone().ok_or_else(|| CredentialStoreError::NotFound {
            path: "<memory>".to_string(),
        })
    }

    async fn save(&self, credentials: &Credentials) -> Result<(), CredentialStoreError> {
        let mut guard = self.inner.lock().map_err(|err| CredentialStoreError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        *guard = Some(credentials.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_session_clears_frob_and_token_together() {
        let mut creds = Credentials::new("key", "secret")
            .with_session(Some("frob-1".into()), Some("token-1".into()));
        creds.reset_session();
        assert_eq!(creds.frob(), None);
        assert_eq!(creds.auth_token(), None);
        assert_eq!(creds.api_key(), "key");
        assert_eq!(creds.shared_secret(), "secret");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let creds = Credentials::new("key", "s3cr3t").with_session(None, Some("tok-42".into()));
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("s3cr3t"));
        assert!(!rendered.contains("tok-42"));
        assert!(rendered.contains("key"));
    }

    #[tokio::test]
    async fn in_memory_store_round_trips() {
        let store = InMemoryCredentialStore::new();
        let err = store.load().await.expect_err("empty store");
        assert!(matches!(err, CredentialStoreError::NotFound { .. }));

        let creds = Credentials::new("67keykey", "99secret")
            .with_session(Some("998877".into()), Some("token577".into()));
        store.save(&creds).await.expect("save should succeed");
        assert_eq!(store.load().await.expect("load"), creds);
    }
}
