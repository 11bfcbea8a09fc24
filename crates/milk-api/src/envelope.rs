use milk_core::RtmError;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Envelope {
    rsp: Value,
}

#[derive(Debug, Deserialize)]
struct Failure {
    err: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    code: Value,
    #[serde(default)]
    msg: String,
}

/// Unwrap `{"rsp": {...}}`, turning `stat != "ok"` into `RequestFailed` and
/// deserializing the payload otherwise.
pub(crate) fn decode<P: DeserializeOwned>(operation: &str, body: &str) -> Result<P, RtmError> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| RtmError::decode(operation, e))?;
    let stat = envelope
        .rsp
        .get("stat")
        .and_then(Value::as_str)
        .ok_or_else(|| RtmError::decode(operation, "missing rsp.stat"))?;

    if stat != "ok" {
        let failure: Failure =
            serde_json::from_value(envelope.rsp).map_err(|e| RtmError::decode(operation, e))?;
        return Err(RtmError::request_failed(
            operation,
            code_text(failure.err.code),
            failure.err.msg,
        ));
    }

    serde_json::from_value(envelope.rsp).map_err(|e| RtmError::decode(operation, e))
}

// The provider sends codes as strings; tolerate bare numbers too.
fn code_text(code: Value) -> String {
    match code {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde::de::IgnoredAny;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct FrobOnly {
        frob: String,
    }

    #[test]
    fn ok_payload_is_deserialized() {
        let body = r#"{"rsp":{"stat":"ok","frob":"0a56717c3561e53584f292bb7081a533c197270c"}}"#;
        let payload: FrobOnly = decode("rtm.auth.getFrob", body).expect("decode");
        assert_eq!(payload.frob, "0a56717c3561e53584f292bb7081a533c197270c");
    }

    #[test]
    fn failure_carries_code_and_message_verbatim() {
        let body = r#"{"rsp":{"stat":"fail","err":{"code":"98","msg":"Login failed / Invalid auth token"}}}"#;
        let err = decode::<IgnoredAny>("rtm.auth.checkToken", body).expect_err("should fail");
        assert_eq!(
            err,
            RtmError::request_failed(
                "rtm.auth.checkToken",
                "98",
                "Login failed / Invalid auth token"
            )
        );
    }

    #[test]
    fn numeric_codes_are_rendered_as_text() {
        let body = r#"{"rsp":{"stat":"fail","err":{"code":101,"msg":"Invalid frob"}}}"#;
        let err = decode::<IgnoredAny>("rtm.auth.getToken", body).expect_err("should fail");
        assert!(matches!(err, RtmError::RequestFailed { ref code, .. } if code == "101"));
    }

    #[test]
    fn non_json_body_is_a_decode_error() {
        let err = decode::<IgnoredAny>("rtm.lists.getList", "<html>").expect_err("should fail");
        assert!(matches!(err, RtmError::Decode { .. }));
    }

    #[test]
    fn missing_stat_is_a_decode_error() {
        let err = decode::<IgnoredAny>("rtm.lists.getList", r#"{"rsp":{}}"#).expect_err("fail");
        assert!(matches!(err, RtmError::Decode { .. }));
    }
}
