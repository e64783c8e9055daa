use thiserror::Error;
use tracing::{debug, info, warn};

use super::{SpotifyApi, is_spotify_id};
use crate::{
    error::ActionError,
    types::{Track, TrackListResponse},
    utils,
};

/// Number of tracks asked for by the full-parameter recommendation call.
pub const RECOMMENDATION_LIMIT: u32 = 8;

/// Number of tracks asked for by seed-based searches unless told otherwise.
pub const SEED_SEARCH_LIMIT: u32 = 10;

/// Market used for recommendations and artist top tracks.
pub const RECOMMENDATION_MARKET: &str = "US";

/// Spotify accepts at most five seeds across tracks, artists and genres.
pub const MAX_SEEDS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("at least one seed track, artist or genre is required")]
    NoSeeds,

    #[error("{0} seeds given, at most 5 are allowed")]
    TooManySeeds(usize),

    #[error("limit must be between 1 and 100, got {0}")]
    InvalidLimit(u32),
}

/// Parameters of a `/recommendations` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationRequest {
    pub seed_tracks: Vec<String>,
    pub seed_artists: Vec<String>,
    pub seed_genres: Vec<String>,
    pub limit: Option<u32>,
    pub market: Option<String>,
    pub target_popularity: Option<u32>,
}

impl RecommendationRequest {
    /// Seed track only, nothing else.
    pub fn for_track(track_id: &str) -> Self {
        Self {
            seed_tracks: vec![track_id.to_string()],
            ..Self::default()
        }
    }

    /// Builds a request from comma-separated seed lists, limited to
    /// [`SEED_SEARCH_LIMIT`] tracks.
    pub fn from_seed_lists(
        tracks: Option<&str>,
        artists: Option<&str>,
        genres: Option<&str>,
    ) -> Self {
        Self {
            seed_tracks: utils::parse_seed_list(tracks),
            seed_artists: utils::parse_seed_list(artists),
            seed_genres: utils::parse_seed_list(genres),
            limit: Some(SEED_SEARCH_LIMIT),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_market(mut self, market: &str) -> Self {
        self.market = Some(market.to_string());
        self
    }

    pub fn seed_count(&self) -> usize {
        self.seed_tracks.len() + self.seed_artists.len() + self.seed_genres.len()
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        match self.seed_count() {
            0 => return Err(RequestError::NoSeeds),
            n if n > MAX_SEEDS => return Err(RequestError::TooManySeeds(n)),
            _ => {}
        }
        match self.limit {
            Some(limit) if !(1..=100).contains(&limit) => Err(RequestError::InvalidLimit(limit)),
            _ => Ok(()),
        }
    }

    /// Query parameters in the form Spotify expects; empty seed lists are omitted.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        for (key, seeds) in [
            ("seed_tracks", &self.seed_tracks),
            ("seed_artists", &self.seed_artists),
            ("seed_genres", &self.seed_genres),
        ] {
            if !seeds.is_empty() {
                query.push((key, seeds.join(",")));
            }
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(market) = &self.market {
            query.push(("market", market.clone()));
        }
        if let Some(popularity) = self.target_popularity {
            query.push(("target_popularity", popularity.to_string()));
        }
        query
    }
}

impl SpotifyApi {
    /// Tracks similar to `track_id`, best effort.
    ///
    /// Tries, in order, each only after the previous failed:
    /// 1. recommendations with limit, market and the seed's popularity,
    /// 2. recommendations seeded by the track alone,
    /// 3. the seed's primary artist's top tracks without the seed itself.
    ///
    /// Returns an empty list when every step fails.
    pub async fn get_recommendations(&self, track_id: &str) -> Vec<Track> {
        let track_id = track_id.trim();
        if !is_spotify_id(track_id) {
            warn!(track_id, "invalid track id for recommendations");
            return Vec::new();
        }

        let seed = match self.fetch_track(track_id).await {
            Ok(track) => {
                debug!(
                    track_id,
                    name = %track.name,
                    popularity = ?track.popularity,
                    "seed track found"
                );
                Some(track)
            }
            Err(e) => {
                warn!(track_id, "failed to fetch seed track: {}", e);
                None
            }
        };

        let mut full = RecommendationRequest::for_track(track_id)
            .with_limit(RECOMMENDATION_LIMIT)
            .with_market(RECOMMENDATION_MARKET);
        full.target_popularity = seed.as_ref().and_then(|t| t.popularity).filter(|p| *p > 0);

        match self.fetch_recommendations(&full).await {
            Ok(tracks) => return tracks,
            Err(e) => warn!(track_id, "recommendations failed: {}", e),
        }

        info!(track_id, "retrying recommendations with minimal parameters");
        match self
            .fetch_recommendations(&RecommendationRequest::for_track(track_id))
            .await
        {
            Ok(tracks) => return tracks,
            Err(e) => warn!(track_id, "minimal recommendations failed: {}", e),
        }

        let Some(artist_id) = seed.as_ref().and_then(Track::primary_artist_id) else {
            return Vec::new();
        };

        info!(track_id, artist_id, "falling back to artist top tracks");
        match self.fetch_top_tracks(artist_id).await {
            Ok(tracks) => tracks.into_iter().filter(|t| t.id != track_id).collect(),
            Err(e) => {
                warn!(artist_id, "artist top tracks failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Recommendations for arbitrary seeds. Invalid requests and failures
    /// yield an empty list; a request without seeds sends nothing.
    pub async fn recommendations_search(&self, request: &RecommendationRequest) -> Vec<Track> {
        if let Err(e) = request.validate() {
            debug!("skipping recommendations: {}", e);
            return Vec::new();
        }

        match self.fetch_recommendations(request).await {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!("recommendations failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_track(&self, track_id: &str) -> Result<Track, ActionError> {
        let res = self.app_request(&format!("/tracks/{track_id}"), &[]).await?;
        Ok(res.json().await?)
    }

    async fn fetch_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<Track>, ActionError> {
        let res = self
            .app_request("/recommendations", &request.to_query())
            .await?;
        let body: TrackListResponse = res.json().await?;
        Ok(body.tracks)
    }

    async fn fetch_top_tracks(&self, artist_id: &str) -> Result<Vec<Track>, ActionError> {
        if !is_spotify_id(artist_id) {
            return Ok(Vec::new());
        }
        let res = self
            .app_request(
                &format!("/artists/{artist_id}/top-tracks"),
                &[("market", RECOMMENDATION_MARKET.to_string())],
            )
            .await?;
        let body: TrackListResponse = res.json().await?;
        Ok(body.tracks)
    }
}
