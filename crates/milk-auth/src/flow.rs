use std::io;

use async_trait::async_trait;
use milk_api::{ApiClient, Perms};
use milk_core::{CredentialStore, CredentialStoreError, RtmError, Transport};
use thiserror::Error;
use tracing::{debug, info, instrument};
use url::Url;

/// Errors that abort the handshake.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] RtmError),
    #[error("could not persist credentials: {0}")]
    Store(#[from] CredentialStoreError),
    /// The operator never confirmed the grant (e.g. stdin closed).
    #[error("permission grant was not acknowledged: {0}")]
    Acknowledge(#[source] io::Error),
}

/// Out-of-band step where the operator opens the permission URL and grants
/// access. Implementations block until the operator confirms.
#[async_trait]
pub trait Acknowledge: Send + Sync {
    async fn acknowledge(&self, frob: &str, permission_url: &Url) -> io::Result<()>;
}

/// Handshake states. `TokenIssued` is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// A token was loaded from storage and still needs validating.
    StoredToken,
    TokenInvalid,
    NoToken,
    FrobIssued { frob: String, permission_url: Url },
    TokenIssued { frob: String, token: String },
}

impl AuthState {
    fn name(&self) -> &'static str {
        match self {
            AuthState::StoredToken => "stored_token",
            AuthState::TokenInvalid => "token_invalid",
            AuthState::NoToken => "no_token",
            AuthState::FrobIssued { .. } => "frob_issued",
            AuthState::TokenIssued { .. } => "token_issued",
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The stored token was accepted; nothing was written.
    AlreadyValid,
    /// A new token was obtained and saved.
    Issued { frob: String, token: String },
}

/// Drives the handshake for an [`ApiClient`] and saves the result.
pub struct AuthFlow<S, A> {
    store: S,
    acknowledger: A,
    perms: Perms,
}

impl<S: CredentialStore, A: Acknowledge> AuthFlow<S, A> {
    pub fn new(store: S, acknowledger: A) -> Self {
        Self {
            store,
            acknowledger,
            perms: Perms::Read,
        }
    }

    pub fn with_perms(mut self, perms: Perms) -> Self {
        self.perms = perms;
        self
    }

    /// Validate the stored token, or obtain and persist a new one.
    #[instrument(skip_all, fields(perms = %self.perms))]
    pub async fn run<T: Transport>(
        &self,
        client: &mut ApiClient<T>,
    ) -> Result<AuthOutcome, AuthError> {
        let mut state = if client.credentials().auth_token().is_some() {
            AuthState::StoredToken
        } else {
            AuthState::NoToken
        };

        loop {
            debug!(state = state.name(), "auth state");
            state = match state {
                AuthState::StoredToken => {
                    if client.check_token_valid().await {
                        info!("stored token is valid");
                        return Ok(AuthOutcome::AlreadyValid);
                    }
                    info!("stored token rejected, applying for a new one");
                    AuthState::TokenInvalid
                }
                AuthState::TokenInvalid => {
                    client.credentials_mut().reset_session();
                    AuthState::NoToken
                }
                AuthState::NoToken => {
                    let frob = client.get_frob().await?;
                    client.credentials_mut().set_frob(frob.clone());
                    let permission_url = client.permission_url(self.perms, &frob)?;
                    AuthState::FrobIssued {
                        frob,
                        permission_url,
                    }
                }
                AuthState::FrobIssued {
                    frob,
                    permission_url,
                } => {
                    self.acknowledger
                        .acknowledge(&frob, &permission_url)
                        .await
                        .map_err(AuthError::Acknowledge)?;
                    let token = client.get_token(&frob).await?;
                    client.credentials_mut().set_auth_token(token.clone());
                    AuthState::TokenIssued { frob, token }
                }
                AuthState::TokenIssued { frob, token } => {
                    self.store.save(client.credentials()).await?;
                    info!("credentials saved");
                    return Ok(AuthOutcome::Issued { frob, token });
                }
            };
        }
    }
}
