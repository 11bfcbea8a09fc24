use milk_api::{ApiClient, Perms};
use milk_core::{Credentials, RtmError};
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials(token: Option<&str>) -> Credentials {
    Credentials::new("abc123", "BANANAS").with_session(None, token.map(str::to_string))
}

#[tokio::test]
async fn lists_round_trip_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/rest/"))
        .and(query_param("method", "rtm.lists.getList"))
        .and(query_param("format", "json"))
        .and(query_param("auth_token", "tok-1"))
        .and(query_param("api_key", "abc123"))
        .and(header("accept", "application/json"))
        .and(header_exists("cache-control"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "rsp": {
                "stat": "ok",
                "lists": { "list": [ { "id": "100", "name": "Inbox" } ] }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::from_credentials(credentials(Some("tok-1")))
        .expect("client")
        .with_base_url(&server.uri())
        .expect("base url");
    let lists = api.get_all_lists().await.expect("lists");
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].name, "Inbox");
}

#[tokio::test]
async fn provider_failure_is_reported_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/rest/"))
        .and(query_param("method", "rtm.auth.getToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "rsp": { "stat": "fail", "err": { "code": "101", "msg": "Invalid frob - check frob" } }
        })))
        .mount(&server)
        .await;

    let api = ApiClient::from_credentials(credentials(None))
        .expect("client")
        .with_base_url(&server.uri())
        .expect("base url");
    let err = api.get_token("frob-1").await.expect_err("should fail");
    assert_eq!(
        err,
        RtmError::RequestFailed {
            operation: "rtm.auth.getToken".into(),
            code: "101".into(),
            message: "Invalid frob - check frob".into(),
        }
    );
}

#[tokio::test]
async fn http_status_error_and_token_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/rest/"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let api = ApiClient::from_credentials(credentials(Some("tok-1")))
        .expect("client")
        .with_base_url(&server.uri())
        .expect("base url");

    assert!(!api.check_token_valid().await);
    let err = api.get_frob().await.expect_err("should fail");
    assert!(matches!(err, RtmError::RequestFailed { ref code, .. } if code == "502"));
}

#[tokio::test]
async fn permission_url_uses_configured_base() {
    let api = ApiClient::from_credentials(credentials(None))
        .expect("client")
        .with_base_url("http://localhost:9999")
        .expect("base url");
    let url = api.permission_url(Perms::Read, "frob-1").expect("url");
    assert!(url.as_str().starts_with("http://localhost:9999/services/auth/?perms=read&frob=frob-1&api_key=abc123&api_sig="));
}
