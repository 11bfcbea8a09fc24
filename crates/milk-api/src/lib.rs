//! Client for the Remember The Milk REST API: request signing, URL
//! composition, the HTTP transport and the typed API operations.

pub mod client;
mod envelope;
pub mod http;
pub mod request;
pub mod signer;

pub use client::ApiClient;
pub use http::ReqwestTransport;
pub use request::{ApiRequest, Params, Perms, UrlBuilder, DEFAULT_API_BASE};
pub use signer::sign;
