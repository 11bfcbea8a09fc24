use thiserror::Error;

/// Errors raised by API operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RtmError {
    /// HTTP non-success status, or an envelope whose `stat` is not `ok`.
    #[error("Request {operation} failed. Status: {code}, reason: {message}.")]
    RequestFailed {
        operation: String,
        code: String,
        message: String,
    },
    /// An authenticated operation was invoked before a token was obtained.
    #[error("{operation} requires an auth token; authenticate first")]
    NotAuthenticated { operation: String },
    /// Connection-level failure (DNS, TLS, IO).
    #[error("transport failure: {reason}")]
    Transport { reason: String },
    /// Base URL or endpoint path could not be composed into a URL.
    #[error("invalid URL: {reason}")]
    InvalidUrl { reason: String },
    /// Response body did not have the expected shape.
    #[error("unexpected response for {operation}: {reason}")]
    Decode { operation: String, reason: String },
}

impl RtmError {
    pub fn request_failed(
        operation: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RtmError::RequestFailed {
            operation: operation.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn decode(operation: impl Into<String>, reason: impl ToString) -> Self {
        RtmError::Decode {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_failed_display_carries_code_and_message() {
        let err = RtmError::request_failed("rtm.auth.getToken", "101", "Invalid frob - check frob");
        assert_eq!(
            err.to_string(),
            "Request rtm.auth.getToken failed. Status: 101, reason: Invalid frob - check frob."
        );
    }
}
