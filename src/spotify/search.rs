use tracing::{debug, warn};

use super::SpotifyApi;
use crate::{
    error::ActionError,
    types::{SearchKind, SearchResponse, Track},
};

/// Maximum number of results returned by a search.
pub const SEARCH_LIMIT: u32 = 8;

impl SpotifyApi {
    /// Searches the catalog with the application token.
    ///
    /// Only track results are mapped; other kinds yield an empty list, as do
    /// blank queries and failed requests.
    pub async fn search(&self, query: &str, kind: SearchKind) -> Vec<Track> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        if kind != SearchKind::Track {
            debug!(kind = kind.as_str(), "only track search results are supported");
            return Vec::new();
        }

        match self.search_tracks(query).await {
            Ok(tracks) => {
                debug!(query, count = tracks.len(), "search completed");
                tracks
            }
            Err(e) => {
                warn!(query, "search failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn search_tracks(&self, query: &str) -> Result<Vec<Track>, ActionError> {
        let res = self
            .app_request(
                "/search",
                &[
                    ("q", query.to_string()),
                    ("type", SearchKind::Track.as_str().to_string()),
                    ("limit", SEARCH_LIMIT.to_string()),
                ],
            )
            .await?;

        let body: SearchResponse = res.json().await?;
        Ok(body.tracks.map(|p| p.items).unwrap_or_default())
    }
}
