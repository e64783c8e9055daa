use spotlink::{
    config::Config,
    error::AuthError,
    spotify::is_spotify_id,
    types::{PlaybackState, RepeatState, TokenGrant, Track},
    utils::*,
};

mod support;

#[test]
fn test_generate_state_value() {
    let value = generate_state_value();

    // 32 random bytes, base64url without padding
    assert_eq!(value.len(), 43);
    assert!(
        value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    );
    assert_ne!(value, generate_state_value());
}

#[test]
fn test_basic_credentials() {
    assert_eq!(
        basic_credentials("client-id", "client-secret"),
        support::BASIC_AUTH
    );
}

#[test]
fn test_parse_seed_list() {
    assert_eq!(parse_seed_list(Some("a, b,,c ")), vec!["a", "b", "c"]);
    assert!(parse_seed_list(Some(" , ")).is_empty());
    assert!(parse_seed_list(None).is_empty());
}

#[test]
fn test_track_table_rows() {
    let track: Track = serde_json::from_value(serde_json::json!({
        "id": "T1",
        "name": "Around the World",
        "artists": [{ "id": "A1", "name": "Daft Punk" }, { "name": "Guest" }],
        "album": { "name": "Homework" },
        "external_urls": { "spotify": "https://open.spotify.com/track/T1" }
    }))
    .unwrap();

    let rows = track_table_rows(&[track, Track::default()]);
    assert_eq!(rows[0].name, "Around the World");
    assert_eq!(rows[0].artists, "Daft Punk, Guest");
    assert_eq!(rows[0].album, "Homework");
    assert_eq!(rows[0].link, "https://open.spotify.com/track/T1");
    assert_eq!(rows[1].album, "");
    assert_eq!(rows[1].link, "");
}

#[test]
fn test_token_grant_refresh_token_carry_over() {
    let rotated = TokenGrant::from_response(
        support::token_response("a2", Some("r2"), 3600),
        Some("r1"),
    )
    .unwrap();
    assert_eq!(rotated.refresh_token, "r2");

    let kept =
        TokenGrant::from_response(support::token_response("a2", None, 3600), Some("r1")).unwrap();
    assert_eq!(kept.refresh_token, "r1");

    let empty =
        TokenGrant::from_response(support::token_response("a2", Some(""), 3600), Some("r1"))
            .unwrap();
    assert_eq!(empty.refresh_token, "r1");

    assert!(TokenGrant::from_response(support::token_response("a1", None, 3600), None).is_none());
}

#[test]
fn test_repeat_state_cycle() {
    assert_eq!(RepeatState::Off.next(), RepeatState::Context);
    assert_eq!(RepeatState::Context.next(), RepeatState::Track);
    assert_eq!(RepeatState::Track.next(), RepeatState::Off);
    assert_eq!(RepeatState::Context.as_str(), "context");
}

#[test]
fn test_sparse_playback_state_deserializes() {
    let state: PlaybackState =
        serde_json::from_value(serde_json::json!({ "is_playing": false })).unwrap();
    assert_eq!(state.repeat_state, RepeatState::Off);
    assert!(!state.shuffle_state);
    assert!(state.item.is_none());
}

#[test]
fn test_is_spotify_id() {
    assert!(is_spotify_id("4uLU6hMCjMI75M1A2tKUQC"));
    assert!(!is_spotify_id(""));
    assert!(!is_spotify_id("abc/def"));
    assert!(!is_spotify_id("abc?x=1"));
}

#[test]
fn test_auth_error_stages() {
    assert_eq!(AuthError::NotConfigured.stage(), "configuration");
    assert_eq!(AuthError::StateExpired.stage(), "state verification");
    assert_eq!(AuthError::Network("timeout".into()).stage(), "token exchange");
    assert_eq!(AuthError::Persistence("disk full".into()).stage(), "token storage");
    assert!(AuthError::StateNotFound.is_invalid_state());
    assert!(!AuthError::ExchangeFailed("x".into()).is_invalid_state());
}

#[test]
fn test_config_is_configured() {
    assert!(support::test_config().is_configured());
    assert!(!Config::new("id", "secret", " ").is_configured());
    assert!(Config::new("id", "secret", "").has_client_credentials());
    assert!(!Config::new("id", "", "").has_client_credentials());
}

#[test]
fn test_config_endpoint_overrides() {
    let config = support::test_config()
        .with_accounts_url("http://localhost:9000/")
        .with_api_url("http://localhost:9000/v1/");

    assert_eq!(config.auth_url, "http://localhost:9000/authorize");
    assert_eq!(config.token_url, "http://localhost:9000/api/token");
    assert_eq!(config.api_url, "http://localhost:9000/v1");
}
