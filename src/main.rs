use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spotlink::{
    app::App,
    cli::{self, PlaybackAction},
    config, error,
    spotify::recommendations::RecommendationRequest,
    types::SearchKind,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Show debug logs
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the authorization server
    Serve,

    /// Link a user's Spotify account through the browser
    Connect(UserOptions),

    /// Show whether a user's Spotify account is linked
    Status(UserOptions),

    /// Search the Spotify catalog
    Search(SearchOptions),

    /// Recommend tracks for a track or for explicit seeds
    Recommend(RecommendOptions),

    /// Show or control a user's playback
    Playback(PlaybackOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct UserOptions {
    /// User id the Spotify account is linked to
    #[clap(long)]
    pub user: String,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    pub query: String,

    #[clap(long, value_enum, default_value_t = SearchKind::Track)]
    pub kind: SearchKind,
}

#[derive(Parser, Debug, Clone)]
#[command(
    about = "Recommend tracks for a track or for explicit seeds",
    group(clap::ArgGroup::new("source").required(true).multiple(true))
)]
pub struct RecommendOptions {
    /// Track to find similar tracks for
    #[clap(
        group = "source",
        conflicts_with_all = ["seed_tracks", "seed_artists", "seed_genres"]
    )]
    pub track_id: Option<String>,

    /// Comma-separated seed track ids
    #[clap(long, group = "source")]
    pub seed_tracks: Option<String>,

    /// Comma-separated seed artist ids
    #[clap(long, group = "source")]
    pub seed_artists: Option<String>,

    /// Comma-separated seed genres
    #[clap(long, group = "source")]
    pub seed_genres: Option<String>,

    /// Number of tracks for seed-based recommendations (1-100, default 10)
    #[clap(long)]
    pub limit: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaybackOptions {
    /// User id the Spotify account is linked to
    #[clap(long)]
    pub user: String,

    #[clap(value_enum, default_value_t = PlaybackAction::Show)]
    pub action: PlaybackAction,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let app = match App::from_env() {
        Ok(app) => app,
        Err(e) => error!("Cannot initialize spotlink. Err: {}", e),
    };

    match cli.command {
        Command::Serve => cli::serve(app).await,
        Command::Connect(opt) => cli::connect(&app, &opt.user).await,
        Command::Status(opt) => cli::status(&app, &opt.user).await,
        Command::Search(opt) => cli::search(&app, &opt.query, opt.kind).await,
        Command::Recommend(opt) => match opt.track_id {
            Some(track_id) => cli::recommend_for_track(&app, &track_id).await,
            None => {
                let mut request = RecommendationRequest::from_seed_lists(
                    opt.seed_tracks.as_deref(),
                    opt.seed_artists.as_deref(),
                    opt.seed_genres.as_deref(),
                );
                if let Some(limit) = opt.limit {
                    request = request.with_limit(limit);
                }
                cli::recommend_from_seeds(&app, request).await
            }
        },
        Command::Playback(opt) => cli::playback(&app, &opt.user, opt.action).await,
        Command::Completions(_) => {}
    }
}
