//! Desktop authentication handshake: frob, user grant, token, persist.

pub mod flow;

pub use flow::{Acknowledge, AuthError, AuthFlow, AuthOutcome, AuthState};
