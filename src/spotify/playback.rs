use reqwest::{Method, StatusCode};
use tracing::{debug, warn};

use super::SpotifyApi;
use crate::{
    error::ActionError,
    types::{PlaybackState, RepeatState},
};

impl SpotifyApi {
    /// Current playback of `user_id`; `None` when nothing is playing or the
    /// state could not be fetched.
    pub async fn get_current_playback(&self, user_id: &str) -> Option<PlaybackState> {
        match self.fetch_playback(user_id).await {
            Ok(state) => state,
            Err(e) => {
                log_failure(user_id, "get playback state", &e);
                None
            }
        }
    }

    pub async fn playback_previous(&self, user_id: &str) -> bool {
        self.control(user_id, Method::POST, "/me/player/previous", &[])
            .await
    }

    pub async fn playback_next(&self, user_id: &str) -> bool {
        self.control(user_id, Method::POST, "/me/player/next", &[])
            .await
    }

    pub async fn playback_pause(&self, user_id: &str) -> bool {
        self.control(user_id, Method::PUT, "/me/player/pause", &[])
            .await
    }

    pub async fn playback_resume(&self, user_id: &str) -> bool {
        self.control(user_id, Method::PUT, "/me/player/play", &[])
            .await
    }

    pub async fn set_shuffle(&self, user_id: &str, state: bool) -> bool {
        self.control(
            user_id,
            Method::PUT,
            "/me/player/shuffle",
            &[("state", state.to_string())],
        )
        .await
    }

    pub async fn set_repeat(&self, user_id: &str, state: RepeatState) -> bool {
        self.control(
            user_id,
            Method::PUT,
            "/me/player/repeat",
            &[("state", state.as_str().to_string())],
        )
        .await
    }

    /// Flips the shuffle flag. Fails without guessing when the current
    /// playback state is unknown.
    pub async fn toggle_shuffle(&self, user_id: &str) -> bool {
        match self.current_state_for_toggle(user_id, "toggle shuffle").await {
            Some(state) => self.set_shuffle(user_id, !state.shuffle_state).await,
            None => false,
        }
    }

    /// Advances repeat mode `off -> context -> track -> off`.
    pub async fn toggle_repeat(&self, user_id: &str) -> bool {
        match self.current_state_for_toggle(user_id, "toggle repeat").await {
            Some(state) => self.set_repeat(user_id, state.repeat_state.next()).await,
            None => false,
        }
    }

    async fn current_state_for_toggle(
        &self,
        user_id: &str,
        action: &str,
    ) -> Option<PlaybackState> {
        match self.fetch_playback(user_id).await {
            Ok(Some(state)) => Some(state),
            Ok(None) => {
                warn!(user_id, action, "no active playback, nothing to toggle");
                None
            }
            Err(e) => {
                log_failure(user_id, action, &e);
                None
            }
        }
    }

    async fn fetch_playback(&self, user_id: &str) -> Result<Option<PlaybackState>, ActionError> {
        let res = self
            .user_request(user_id, Method::GET, "/me/player", &[])
            .await?;
        if res.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Ok(Some(res.json::<PlaybackState>().await?))
    }

    async fn control(
        &self,
        user_id: &str,
        method: Method,
        path: &str,
        query: &[(&str, String)],
    ) -> bool {
        match self.user_request(user_id, method, path, query).await {
            Ok(_) => true,
            Err(e) => {
                log_failure(user_id, path, &e);
                false
            }
        }
    }
}

fn log_failure(user_id: &str, action: &str, err: &ActionError) {
    match err {
        ActionError::NotAuthorized => debug!(user_id, action, "user has not authorized Spotify"),
        _ => warn!(user_id, action, "playback request failed: {}", err),
    }
}
