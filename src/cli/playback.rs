use clap::ValueEnum;

use crate::{app::App, info, success, types::PlaybackState, warning};

use super::spinner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlaybackAction {
    /// Show what is playing
    Show,
    /// Skip to the next track
    Next,
    /// Go back to the previous track
    Previous,
    Pause,
    Resume,
    /// Toggle shuffle
    Shuffle,
    /// Cycle repeat: off, context, track
    Repeat,
}

pub async fn playback(app: &App, user_id: &str, action: PlaybackAction) {
    let api = &app.spotify;

    let pb = spinner("Talking to Spotify...");
    let updated = match action {
        PlaybackAction::Show => {
            let state = api.get_current_playback(user_id).await;
            pb.finish_and_clear();
            show(state);
            return;
        }
        PlaybackAction::Next => api.playback_next(user_id).await,
        PlaybackAction::Previous => api.playback_previous(user_id).await,
        PlaybackAction::Pause => api.playback_pause(user_id).await,
        PlaybackAction::Resume => api.playback_resume(user_id).await,
        PlaybackAction::Shuffle => api.toggle_shuffle(user_id).await,
        PlaybackAction::Repeat => api.toggle_repeat(user_id).await,
    };
    pb.finish_and_clear();

    if updated {
        success!("Playback updated.");
    } else {
        warning!("Could not update playback. Is {} connected and a device active?", user_id);
    }
}

fn show(state: Option<PlaybackState>) {
    let Some(state) = state else {
        info!("Nothing is playing.");
        return;
    };

    match &state.item {
        Some(track) => {
            let artists: Vec<&str> = track.artists.iter().map(|a| a.name.as_str()).collect();
            info!(
                "{} {} - {}",
                if state.is_playing { "Playing" } else { "Paused" },
                track.name,
                artists.join(", ")
            );
        }
        None => info!("Playing {}", state.currently_playing_type.as_deref().unwrap_or("unknown")),
    }

    if let Some(device) = &state.device {
        info!("Device: {} ({})", device.name, device.kind);
    }
    info!(
        "Shuffle: {}, repeat: {}",
        if state.shuffle_state { "on" } else { "off" },
        state.repeat_state.as_str()
    );
}
