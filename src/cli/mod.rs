//! # CLI Module
//!
//! Command implementations behind the `spotlink` binary. Each command takes
//! the [`App`](crate::app::App) built in `main`, calls into the library and
//! prints the outcome with the colored console macros.
//!
//! ## Commands
//!
//! ### Account Linking
//!
//! - [`serve`] - Runs the authorization server in the foreground
//! - [`connect`] - Links a user's Spotify account through the browser
//! - [`status`] - Shows whether a user's stored token is usable
//!
//! ### Catalog
//!
//! - [`search`] - Track search with the application token
//! - [`recommend_for_track`] - Recommendations similar to one track
//! - [`recommend_from_seeds`] - Recommendations from explicit seed lists
//!
//! ### Playback
//!
//! - [`playback`] - Shows or changes a user's playback
//!
//! ## Error Presentation
//!
//! Library calls never fail loudly for catalog and playback commands; an
//! empty table or a "could not update playback" warning is printed instead.
//! Configuration and storage problems end the process through `error!`.

mod auth;
mod playback;
mod search;
mod serve;

pub use auth::{connect, status};
pub use playback::{PlaybackAction, playback};
pub use search::{recommend_for_track, recommend_from_seeds, search};
pub use serve::serve;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{info, types::Track, utils};

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

fn print_tracks(tracks: &[Track]) {
    if tracks.is_empty() {
        info!("No tracks found.");
        return;
    }
    let table = Table::new(utils::track_table_rows(tracks));
    println!("{}", table);
}
