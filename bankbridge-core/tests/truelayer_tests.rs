//! Integration tests for the TrueLayer adapter
//!
//! Auth server and Data API are both served by one wiremock instance. The
//! refresh-and-retry policy is checked through call counts (`expect`), which
//! wiremock verifies when the server is dropped.
//!
//! Run with: cargo test --test truelayer_tests -- --nocapture

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Utc};
use serde_json::{json, Value};
use wiremock::matchers::{basic_auth, bearer_token, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bankbridge_core::config::{Config, TRUELAYER_API_URL_ENV, TRUELAYER_AUTH_URL_ENV};
use bankbridge_core::{BearerTokens, BridgeContext, Error};

// ============================================================================
// Test Helpers
// ============================================================================

const CLIENT_ID: &str = "tl-client";
const CLIENT_SECRET: &str = "tl-secret";

fn context(server: &MockServer) -> BridgeContext {
    let vars: HashMap<String, String> = [
        ("PLAID_CLIENT_ID", "plaid-client"),
        ("PLAID_SECRET", "plaid-secret"),
        ("PLAID_ENV", "sandbox"),
        ("PLAID_PRODUCTS", "transactions"),
        ("PLAID_COUNTRY_CODES", "GB"),
        ("PLAID_WEBHOOK_URL", "https://example.com/webhook"),
        ("TRUELAYER_CLIENT_ID", CLIENT_ID),
        ("TRUELAYER_CLIENT_SECRET", CLIENT_SECRET),
        ("TRUELAYER_REDIRECT_URI", "https://example.com/callback"),
        ("TRUELAYER_ENV", "sandbox"),
        (TRUELAYER_AUTH_URL_ENV, server.uri().as_str()),
        (TRUELAYER_API_URL_ENV, server.uri().as_str()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    BridgeContext::new(Config::from_map(&vars).unwrap()).unwrap()
}

fn accounts_payload() -> Value {
    json!({
        "results": [{"account_id": "acc-1", "display_name": "Current"}],
        "status": "Succeeded",
    })
}

async fn mount_accounts(server: &MockServer, token: &str, status: u16, times: u64) {
    let template = if status == 200 {
        ResponseTemplate::new(200).set_body_json(accounts_payload())
    } else {
        ResponseTemplate::new(status).set_body_json(json!({"error": "invalid_token"}))
    };
    Mock::given(method("GET"))
        .and(path("/data/v1/accounts"))
        .and(bearer_token(token))
        .respond_with(template)
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_refresh(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .and(basic_auth(CLIENT_ID, CLIENT_SECRET))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=old-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access",
            "refresh_token": "new-refresh",
            "expires_in": 3600,
            "token_type": "Bearer",
        })))
        .expect(times)
        .mount(server)
        .await;
}

// ============================================================================
// Code exchange and refresh
// ============================================================================

#[tokio::test]
async fn test_exchange_code_returns_payload_verbatim() {
    let server = MockServer::start().await;
    let payload = json!({
        "access_token": "X",
        "refresh_token": "Y",
        "expires_in": 3600,
        "token_type": "Bearer",
        "scope": "info accounts",
    });
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .and(basic_auth(CLIENT_ID, CLIENT_SECRET))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let result = ctx.truelayer.exchange_code("abc", None).await.unwrap();

    assert_eq!(result, payload);
}

#[tokio::test]
async fn test_exchange_code_accepts_issued_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "X"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let link = ctx.truelayer.create_auth_link().unwrap();
    assert!(ctx
        .truelayer
        .exchange_code("abc", Some(&link.state))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_exchange_code_rejects_foreign_state_without_upstream_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let link = ctx.truelayer.create_auth_link().unwrap();
    let forged = format!("{}x", link.state);

    let err = ctx
        .truelayer
        .exchange_code("abc", Some(&forged))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn test_exchange_code_passes_through_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})),
        )
        .mount(&server)
        .await;

    let ctx = context(&server);
    match ctx
        .truelayer
        .exchange_code("expired", None)
        .await
        .unwrap_err()
    {
        Error::Upstream { status, body, .. } => {
            assert_eq!(status, 400);
            assert_eq!(body["error"], "invalid_grant");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_refresh_token_returns_new_pair() {
    let server = MockServer::start().await;
    mount_refresh(&server, 1).await;

    let ctx = context(&server);
    let pair = ctx.truelayer.refresh_token("old-refresh").await.unwrap();

    assert_eq!(pair.access_token, "new-access");
    assert_eq!(pair.refresh_token, "new-refresh");
}

#[tokio::test]
async fn test_refresh_keeps_old_refresh_token_when_not_rotated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "A2"})),
        )
        .mount(&server)
        .await;

    let ctx = context(&server);
    let pair = ctx.truelayer.refresh_token("keep-me").await.unwrap();
    assert_eq!(pair.access_token, "A2");
    assert_eq!(pair.refresh_token, "keep-me");
}

// ============================================================================
// Accounts: refresh-and-retry policy
// ============================================================================

#[tokio::test]
async fn test_accounts_success_without_refresh() {
    let server = MockServer::start().await;
    mount_accounts(&server, "good-access", 200, 1).await;
    mount_refresh(&server, 0).await;

    let ctx = context(&server);
    let tokens = BearerTokens::new("good-access", Some("old-refresh".to_string()));
    let result = ctx.truelayer.get_accounts(&tokens).await.unwrap();

    assert_eq!(result.data, accounts_payload());
    assert!(result.new_tokens.is_none());
}

#[tokio::test]
async fn test_accounts_401_refreshes_once_and_retries_once() {
    let server = MockServer::start().await;
    mount_accounts(&server, "old-access", 401, 1).await;
    mount_accounts(&server, "new-access", 200, 1).await;
    mount_refresh(&server, 1).await;

    let ctx = context(&server);
    let tokens = BearerTokens::new("old-access", Some("old-refresh".to_string()));
    let result = ctx.truelayer.get_accounts(&tokens).await.unwrap();

    assert_eq!(result.data, accounts_payload());
    let pair = result.new_tokens.expect("tokens were refreshed");
    assert_eq!(pair.access_token, "new-access");
    assert_eq!(pair.refresh_token, "new-refresh");
}

#[tokio::test]
async fn test_accounts_401_without_refresh_token_propagates() {
    let server = MockServer::start().await;
    mount_accounts(&server, "old-access", 401, 1).await;
    mount_refresh(&server, 0).await;

    let ctx = context(&server);
    let tokens = BearerTokens::new("old-access", None);
    let err = ctx.truelayer.get_accounts(&tokens).await.unwrap_err();

    assert_eq!(err.upstream_status(), Some(401));
}

#[tokio::test]
async fn test_accounts_non_401_error_does_not_refresh() {
    let server = MockServer::start().await;
    mount_accounts(&server, "old-access", 503, 1).await;
    mount_refresh(&server, 0).await;

    let ctx = context(&server);
    let tokens = BearerTokens::new("old-access", Some("old-refresh".to_string()));
    let err = ctx.truelayer.get_accounts(&tokens).await.unwrap_err();

    assert_eq!(err.upstream_status(), Some(503));
}

#[tokio::test]
async fn test_accounts_retry_failure_is_returned() {
    let server = MockServer::start().await;
    mount_accounts(&server, "old-access", 401, 1).await;
    mount_accounts(&server, "new-access", 500, 1).await;
    mount_refresh(&server, 1).await;

    let ctx = context(&server);
    let tokens = BearerTokens::new("old-access", Some("old-refresh".to_string()));
    let err = ctx.truelayer.get_accounts(&tokens).await.unwrap_err();

    assert_eq!(err.upstream_status(), Some(500));
}

// ============================================================================
// Transactions
// ============================================================================

#[tokio::test]
async fn test_transactions_use_month_to_date_window() {
    let server = MockServer::start().await;
    let today = Utc::now().date_naive();
    let first = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap();

    Mock::given(method("GET"))
        .and(path("/data/v1/accounts/acc-1/transactions"))
        .and(bearer_token("good-access"))
        .and(query_param("from", first.format("%Y-%m-%d").to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"transaction_id": "t1", "amount": -4.2}],
            "status": "Succeeded",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let tokens = BearerTokens::new("good-access", None);
    let result = ctx
        .truelayer
        .get_transactions(&tokens, "acc-1")
        .await
        .unwrap();

    assert_eq!(result.data["results"][0]["transaction_id"], "t1");

    let requests = server.received_requests().await.unwrap();
    let to = requests[0]
        .url
        .query_pairs()
        .find(|(k, _)| k == "to")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    let to = NaiveDate::parse_from_str(&to, "%Y-%m-%d").unwrap();
    assert!(to >= first);
}

#[tokio::test]
async fn test_transactions_401_refreshes_and_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/v1/accounts/acc-1/transactions"))
        .and(bearer_token("old-access"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/v1/accounts/acc-1/transactions"))
        .and(bearer_token("new-access"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"results": []})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, 1).await;

    let ctx = context(&server);
    let tokens = BearerTokens::new("old-access", Some("old-refresh".to_string()));
    let result = ctx
        .truelayer
        .get_transactions(&tokens, "acc-1")
        .await
        .unwrap();

    assert!(result.was_refreshed());
    let body = result.into_json();
    assert_eq!(body["new_tokens"]["access_token"], "new-access");
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn test_transactions_non_401_error_does_not_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/v1/accounts/acc-1/transactions"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "account_not_found"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, 0).await;

    let ctx = context(&server);
    let tokens = BearerTokens::new("old-access", Some("old-refresh".to_string()));
    let err = ctx
        .truelayer
        .get_transactions(&tokens, "acc-1")
        .await
        .unwrap_err();

    assert_eq!(err.upstream_status(), Some(404));
}
