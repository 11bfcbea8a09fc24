//! Core abstractions for Milk: credentials, API records, error taxonomy and
//! the collaborator contracts (transport, credential storage).
//! This crate is intentionally small to keep dependency surface minimal.

pub mod credentials;
pub mod error;
pub mod records;
pub mod transport;

pub use credentials::{
    CredentialStore, CredentialStoreError, Credentials, InMemoryCredentialStore,
};
pub use error::RtmError;
pub use records::{ListSummary, TaskSummary};
pub use transport::{HttpResponse, Transport};
