use std::sync::Arc;

use spotlink::{
    clock::{Clock, ManualClock},
    config::Config,
    error::AuthError,
    spotify::token::{SpotifyTokenClient, TokenExchange},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path},
};

mod support;

fn client_for(config: Config) -> SpotifyTokenClient {
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(support::start_time()));
    SpotifyTokenClient::new(reqwest::Client::new(), Arc::new(config), clock)
}

fn client(server: &MockServer) -> SpotifyTokenClient {
    client_for(support::test_config().with_accounts_url(&server.uri()))
}

fn token_body(access: &str, refresh: Option<&str>) -> serde_json::Value {
    let mut body = serde_json::json!({
        "access_token": access,
        "token_type": "Bearer",
        "scope": "user-read-playback-state",
        "expires_in": 3600
    });
    if let Some(refresh) = refresh {
        body["refresh_token"] = refresh.into();
    }
    body
}

#[tokio::test]
async fn test_exchange_code_sends_form_and_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(header("authorization", support::BASIC_AUTH))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=code-1"))
        .and(body_string_contains(
            "redirect_uri=http%3A%2F%2F127.0.0.1%3A6100%2Fauthenticate-spotify%2Fcallback",
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_body("access-1", Some("refresh-1"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server).exchange_code("code-1").await.unwrap();
    assert_eq!(response.access_token, "access-1");
    assert_eq!(response.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(response.expires_in, 3600);
}

#[tokio::test]
async fn test_refresh_sends_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(header("authorization", support::BASIC_AUTH))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("access-2", None)))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server).refresh("refresh-1").await.unwrap();
    assert_eq!(response.access_token, "access-2");
    assert_eq!(response.refresh_token, None);
}

#[tokio::test]
async fn test_rejection_surfaces_error_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Invalid authorization code"
        })))
        .mount(&server)
        .await;

    assert_eq!(
        client(&server).exchange_code("stale").await,
        Err(AuthError::ExchangeFailed(
            "Invalid authorization code".to_string()
        ))
    );
}

#[tokio::test]
async fn test_rejection_without_description_uses_error_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({ "error": "invalid_client" })),
        )
        .mount(&server)
        .await;

    assert_eq!(
        client(&server).refresh("refresh-1").await,
        Err(AuthError::ExchangeFailed("invalid_client".to_string()))
    );
}

#[tokio::test]
async fn test_rejection_with_plain_body_names_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    match client(&server).refresh("refresh-1").await {
        Err(AuthError::ExchangeFailed(reason)) => assert!(reason.contains("503")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_success_body_is_exchange_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    assert!(matches!(
        client(&server).exchange_code("code-1").await,
        Err(AuthError::ExchangeFailed(_))
    ));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let client = client_for(support::test_config().with_accounts_url("http://127.0.0.1:1"));

    assert!(matches!(
        client.refresh("refresh-1").await,
        Err(AuthError::Network(_))
    ));
}

#[tokio::test]
async fn test_unconfigured_client_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("access-1", None)))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(Config::new("", "", "").with_accounts_url(&server.uri()));
    assert_eq!(
        client.exchange_code("code-1").await,
        Err(AuthError::NotConfigured)
    );
    assert_eq!(
        client.refresh("refresh-1").await,
        Err(AuthError::NotConfigured)
    );
    assert_eq!(
        client.client_credentials().await,
        Err(AuthError::NotConfigured)
    );
}

#[tokio::test]
async fn test_client_credentials_token_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(header("authorization", support::BASIC_AUTH))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("app-token", None)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    assert_eq!(client.client_credentials().await.unwrap(), "app-token");
    assert_eq!(client.client_credentials().await.unwrap(), "app-token");
}

#[tokio::test]
async fn test_client_credentials_renewed_near_expiry_and_after_invalidate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("app-token", None)))
        .expect(3)
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::new(support::start_time()));
    let client = SpotifyTokenClient::new(
        reqwest::Client::new(),
        Arc::new(support::test_config().with_accounts_url(&server.uri())),
        clock.clone(),
    );

    client.client_credentials().await.unwrap();
    clock.advance(chrono::Duration::seconds(3600 - 60));
    client.client_credentials().await.unwrap();
    client.invalidate_client_credentials().await;
    client.client_credentials().await.unwrap();
}
