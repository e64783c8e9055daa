use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use rand::Rng;

use crate::types::{Track, TrackTableRow};

/// Random bytes behind every authorization state value.
pub const STATE_ENTROPY_BYTES: usize = 32;

/// Generates an unguessable, URL-safe authorization state value.
pub fn generate_state_value() -> String {
    let mut bytes = [0u8; STATE_ENTROPY_BYTES];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Value of the `Authorization` header for the token endpoint.
pub fn basic_credentials(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{client_id}:{client_secret}"))
    )
}

/// Splits a comma-separated id list, dropping blanks.
pub fn parse_seed_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

pub fn track_table_rows(tracks: &[Track]) -> Vec<TrackTableRow> {
    tracks
        .iter()
        .map(|t| TrackTableRow {
            name: t.name.clone(),
            artists: t
                .artists
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            album: t.album.as_ref().map(|a| a.name.clone()).unwrap_or_default(),
            link: t
                .external_urls
                .as_ref()
                .and_then(|u| u.spotify.clone())
                .unwrap_or_default(),
        })
        .collect()
}
