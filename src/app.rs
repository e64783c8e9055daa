use std::sync::Arc;

use crate::{
    Res,
    clock::{Clock, SystemClock},
    config::Config,
    management::{FileStateStore, FileTokenStore, StateStore, TokenStore},
    spotify::{self, SpotifyApi, auth::TokenLifecycleManager, token::SpotifyTokenClient},
};

/// Every long-lived service, wired once at process start.
///
/// Cloning is cheap; all members are shared behind `Arc`s.
#[derive(Clone)]
pub struct App {
    pub config: Arc<Config>,
    pub auth: Arc<TokenLifecycleManager>,
    pub spotify: Arc<SpotifyApi>,
}

impl App {
    /// Reads [`Config`] from the environment and builds the file-backed app.
    pub fn from_env() -> Res<Self> {
        Self::new(Config::from_env())
    }

    /// States and tokens live in JSON files under `config.data_dir`.
    pub fn new(config: Config) -> Res<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let states = Arc::new(FileStateStore::new(&config.data_dir, Arc::clone(&clock)));
        let tokens = Arc::new(FileTokenStore::new(&config.data_dir, Arc::clone(&clock)));
        Self::with_stores(config, states, tokens, clock)
    }

    /// Builds the app on top of caller-provided stores and clock.
    pub fn with_stores(
        config: Config,
        states: Arc<dyn StateStore>,
        tokens: Arc<dyn TokenStore>,
        clock: Arc<dyn Clock>,
    ) -> Res<Self> {
        let config = Arc::new(config);
        let http = spotify::http_client(&config)?;

        let exchange = Arc::new(SpotifyTokenClient::new(
            http.clone(),
            Arc::clone(&config),
            Arc::clone(&clock),
        ));
        let auth = Arc::new(TokenLifecycleManager::new(
            Arc::clone(&config),
            states,
            tokens,
            exchange,
            clock,
        ));
        let spotify = Arc::new(SpotifyApi::new(http, &config, Arc::clone(&auth)));

        Ok(Self {
            config,
            auth,
            spotify,
        })
    }
}
