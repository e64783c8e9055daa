use crate::{
    app::App,
    spotify::recommendations::RecommendationRequest,
    types::SearchKind,
    warning,
};

use super::{print_tracks, spinner};

pub async fn search(app: &App, query: &str, kind: SearchKind) {
    if kind != SearchKind::Track {
        warning!("Only track results are shown; {} search returns nothing.", kind.as_str());
    }

    let pb = spinner("Searching Spotify...");
    let tracks = app.spotify.search(query, kind).await;
    pb.finish_and_clear();

    print_tracks(&tracks);
}

pub async fn recommend_for_track(app: &App, track_id: &str) {
    let pb = spinner("Fetching recommendations...");
    let tracks = app.spotify.get_recommendations(track_id).await;
    pb.finish_and_clear();

    print_tracks(&tracks);
}

pub async fn recommend_from_seeds(app: &App, request: RecommendationRequest) {
    if let Err(e) = request.validate() {
        warning!("Invalid recommendation request: {}", e);
        return;
    }

    let pb = spinner("Fetching recommendations...");
    let tracks = app.spotify.recommendations_search(&request).await;
    pb.finish_and_clear();

    print_tracks(&tracks);
}
