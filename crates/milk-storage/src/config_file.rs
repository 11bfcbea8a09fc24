use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use milk_core::{CredentialStore, CredentialStoreError, Credentials};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::instrument;

/// Config file holding API credentials and the auth session.
///
/// ```toml
/// [settings]
/// api_key = "..."
/// shared_secret = "..."
/// frob = "..."    # optional
/// token = "..."   # optional
/// ```
#[derive(Debug, Clone)]
pub struct ConfigFileStore {
    path: PathBuf,
}

impl ConfigFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct ConfigFile {
    settings: Settings,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct Settings {
    api_key: String,
    shared_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    frob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

impl From<&Credentials> for ConfigFile {
    fn from(creds: &Credentials) -> Self {
        ConfigFile {
            settings: Settings {
                api_key: creds.api_key().to_string(),
                shared_secret: creds.shared_secret().to_string(),
                frob: creds.frob().map(str::to_string),
                token: creds.auth_token().map(str::to_string),
            },
        }
    }
}

impl From<ConfigFile> for Credentials {
    fn from(file: ConfigFile) -> Self {
        let s = file.settings;
        Credentials::new(s.api_key, s.shared_secret).with_session(s.frob, s.token)
    }
}

#[async_trait]
impl CredentialStore for ConfigFileStore {
    #[instrument(skip_all, fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Credentials, CredentialStoreError> {
        let contents = fs::read_to_string(&self.path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                CredentialStoreError::NotFound {
                    path: self.path.display().to_string(),
                }
            } else {
                storage_err(err)
            }
        })?;
        let file: ConfigFile = toml::from_str(&contents).map_err(storage_err)?;
        Ok(file.into())
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    async fn save(&self, credentials: &Credentials) -> Result<(), CredentialStoreError> {
        let body = toml::to_string_pretty(&ConfigFile::from(credentials)).map_err(storage_err)?;
        write_atomic(&self.path, body.as_bytes())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CredentialStoreError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(storage_err)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(storage_err)?;
    tmp.write_all(bytes).map_err(storage_err)?;
    tmp.flush().map_err(storage_err)?;
    tmp.persist(path).map_err(|e| storage_err(e.error))?;
    Ok(())
}

fn storage_err<E: ToString>(err: E) -> CredentialStoreError {
    CredentialStoreError::Storage {
        reason: err.to_string(),
    }
}
