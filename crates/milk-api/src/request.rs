use std::fmt;

use indexmap::IndexMap;
use milk_core::RtmError;
use url::Url;

use crate::signer::sign;

/// Default API authority.
pub const DEFAULT_API_BASE: &str = "https://api.rememberthemilk.com/";

const AUTH_PATH: &str = "services/auth/";
const REST_PATH: &str = "services/rest/";

/// Query parameters in insertion order. Re-inserting a key keeps its position.
pub type Params = IndexMap<String, String>;

/// Permission level requested during authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Perms {
    #[default]
    Read,
    Write,
    Delete,
}

impl Perms {
    pub fn as_str(&self) -> &'static str {
        match self {
            Perms::Read => "read",
            Perms::Write => "write",
            Perms::Delete => "delete",
        }
    }
}

impl fmt::Display for Perms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single REST call, built fresh for each operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub path: &'static str,
    pub method_name: Option<&'static str>,
    pub parameters: Params,
    pub requires_auth: bool,
}

impl ApiRequest {
    /// Unauthenticated call to `method` on the REST endpoint.
    pub fn service(method: &'static str) -> Self {
        Self {
            path: REST_PATH,
            method_name: Some(method),
            parameters: Params::new(),
            requires_auth: false,
        }
    }

    pub fn authenticated(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Name used in logs and failure reports.
    pub fn operation(&self) -> &'static str {
        self.method_name.unwrap_or(self.path)
    }
}

/// Composes signed URLs for the auth page and the REST API.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base: Url,
    api_key: String,
    shared_secret: String,
}

impl UrlBuilder {
    pub fn new(
        api_key: impl Into<String>,
        shared_secret: impl Into<String>,
    ) -> Result<Self, RtmError> {
        Ok(Self {
            base: parse_base(DEFAULT_API_BASE)?,
            api_key: api_key.into(),
            shared_secret: shared_secret.into(),
        })
    }

    /// Point the builder at another authority (a mock server in tests).
    pub fn with_base(mut self, base: &str) -> Result<Self, RtmError> {
        self.base = parse_base(base)?;
        Ok(self)
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Add `api_key` and `api_sig` to `params` and encode them under `path`.
    /// The signature covers every parameter, `api_key` included.
    pub fn api_url(&self, path: &str, mut params: Params) -> Result<Url, RtmError> {
        params.shift_remove("api_sig");
        params.insert("api_key".to_string(), self.api_key.clone());
        let sig = sign(&self.shared_secret, &params);
        params.insert("api_sig".to_string(), sig);

        let mut url = self.base.join(path).map_err(|e| RtmError::InvalidUrl {
            reason: format!("{path}: {e}"),
        })?;
        url.query_pairs_mut().clear().extend_pairs(params.iter());
        Ok(url)
    }

    /// URL the user visits to grant `perms` for `frob`.
    pub fn auth_url(&self, perms: Perms, frob: &str) -> Result<Url, RtmError> {
        let mut params = Params::new();
        params.insert("perms".to_string(), perms.to_string());
        params.insert("frob".to_string(), frob.to_string());
        self.api_url(AUTH_PATH, params)
    }

    /// REST URL for `method`: caller parameters first, then `method`,
    /// `format=json` and the token when given.
    pub fn service_url(
        &self,
        method: &str,
        method_params: &Params,
        auth_token: Option<&str>,
    ) -> Result<Url, RtmError> {
        let mut params = method_params.clone();
        params.insert("method".to_string(), method.to_string());
        params.insert("format".to_string(), "json".to_string());
        if let Some(token) = auth_token {
            params.insert("auth_token".to_string(), token.to_string());
        }
        self.api_url(REST_PATH, params)
    }

    /// Resolve a request into its final URL. Authenticated requests fail fast
    /// when no token is available.
    pub fn build(&self, request: &ApiRequest, auth_token: Option<&str>) -> Result<Url, RtmError> {
        let token = if request.requires_auth {
            Some(auth_token.ok_or_else(|| RtmError::NotAuthenticated {
                operation: request.operation().to_string(),
            })?)
        } else {
            None
        };
        match request.method_name {
            Some(method) => self.service_url(method, &request.parameters, token),
            None => self.api_url(request.path, request.parameters.clone()),
        }
    }
}

fn parse_base(raw: &str) -> Result<Url, RtmError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|e| RtmError::InvalidUrl {
        reason: format!("{raw}: {e}"),
    })
}
