#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use spotlink::{
    app::App,
    clock::{Clock, ManualClock},
    config::Config,
    error::AuthError,
    management::{MemoryStateStore, MemoryTokenStore},
    spotify::{auth::TokenLifecycleManager, token::TokenExchange},
    types::{TokenRecord, TokenResponse},
};

pub const REDIRECT_URI: &str = "http://127.0.0.1:6100/authenticate-spotify/callback";

/// Base64 of `client-id:client-secret`.
pub const BASIC_AUTH: &str = "Basic Y2xpZW50LWlkOmNsaWVudC1zZWNyZXQ=";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn test_config() -> Config {
    Config::new("client-id", "client-secret", REDIRECT_URI)
}

pub fn token_response(access: &str, refresh: Option<&str>, expires_in: u64) -> TokenResponse {
    TokenResponse {
        access_token: access.to_string(),
        token_type: Some("Bearer".to_string()),
        scope: Some("user-read-playback-state".to_string()),
        expires_in,
        refresh_token: refresh.map(str::to_string),
    }
}

pub fn token_record(user_id: &str, access: &str, expires_at: DateTime<Utc>) -> TokenRecord {
    TokenRecord {
        user_id: user_id.to_string(),
        access_token: access.to_string(),
        refresh_token: "refresh-1".to_string(),
        scope: String::new(),
        expires_at,
    }
}

/// Token endpoint stand-in that counts calls and replays canned results.
pub struct FakeExchange {
    pub code_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub refreshed_with: Mutex<Vec<String>>,
    pub code_result: Mutex<Result<TokenResponse, AuthError>>,
    pub refresh_result: Mutex<Result<TokenResponse, AuthError>>,
}

impl FakeExchange {
    pub fn new() -> Self {
        Self {
            code_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            refreshed_with: Mutex::new(Vec::new()),
            code_result: Mutex::new(Ok(token_response("access-1", Some("refresh-1"), 3600))),
            refresh_result: Mutex::new(Ok(token_response("access-2", None, 3600))),
        }
    }

    pub fn set_code_result(&self, result: Result<TokenResponse, AuthError>) {
        *self.code_result.lock().unwrap() = result;
    }

    pub fn set_refresh_result(&self, result: Result<TokenResponse, AuthError>) {
        *self.refresh_result.lock().unwrap() = result;
    }

    pub fn code_calls(&self) -> usize {
        self.code_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenExchange for FakeExchange {
    async fn exchange_code(&self, _code: &str) -> Result<TokenResponse, AuthError> {
        self.code_calls.fetch_add(1, Ordering::SeqCst);
        self.code_result.lock().unwrap().clone()
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refreshed_with
            .lock()
            .unwrap()
            .push(refresh_token.to_string());
        self.refresh_result.lock().unwrap().clone()
    }

    async fn client_credentials(&self) -> Result<String, AuthError> {
        Ok("app-token".to_string())
    }
}

/// Lifecycle manager over in-memory stores, a manual clock and [`FakeExchange`].
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub states: Arc<MemoryStateStore>,
    pub tokens: Arc<MemoryTokenStore>,
    pub exchange: Arc<FakeExchange>,
    pub auth: Arc<TokenLifecycleManager>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let clock = Arc::new(ManualClock::new(start_time()));
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let states = Arc::new(MemoryStateStore::new(Arc::clone(&dyn_clock)));
        let tokens = Arc::new(MemoryTokenStore::new(Arc::clone(&dyn_clock)));
        let exchange = Arc::new(FakeExchange::new());

        let auth = Arc::new(TokenLifecycleManager::new(
            Arc::new(config),
            states.clone(),
            tokens.clone(),
            exchange.clone(),
            dyn_clock,
        ));

        Self {
            clock,
            states,
            tokens,
            exchange,
            auth,
        }
    }

    pub fn advance(&self, secs: i64) {
        self.clock.advance(Duration::seconds(secs));
    }

    /// Extracts the `state` parameter from an authorization URL.
    pub fn state_of(url: &str) -> String {
        url::Url::parse(url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }
}

/// Full app whose accounts and Web API endpoints point at `server_uri`.
pub struct MockApp {
    pub app: App,
    pub clock: Arc<ManualClock>,
    pub tokens: Arc<MemoryTokenStore>,
}

impl MockApp {
    pub fn new(server_uri: &str) -> Self {
        let config = test_config()
            .with_accounts_url(server_uri)
            .with_api_url(&format!("{server_uri}/v1"));

        let clock = Arc::new(ManualClock::new(start_time()));
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let states = Arc::new(MemoryStateStore::new(Arc::clone(&dyn_clock)));
        let tokens = Arc::new(MemoryTokenStore::new(Arc::clone(&dyn_clock)));

        let app = App::with_stores(config, states, tokens.clone(), dyn_clock).unwrap();
        Self { app, clock, tokens }
    }

    /// Stores a token for `user_id` valid for another hour.
    pub async fn authorize(&self, user_id: &str, access: &str) {
        self.tokens
            .insert(token_record(
                user_id,
                access,
                self.clock.now() + Duration::hours(1),
            ))
            .await;
    }
}
