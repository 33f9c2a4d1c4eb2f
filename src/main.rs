use std::sync::Arc;

use clap::{
    ArgAction, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use mixtape::{
    cli::{self, DEFAULT_EXTEND_LIMIT, DEFAULT_SHUFFLE_PLAYLIST, MixRequest},
    config, error,
    mixer::{DEFAULT_MAX_TRACKS, DEFAULT_MIN_ARTIST_SEPARATION, MixOptions},
    types::PkceToken,
    utils,
};
use tokio::sync::Mutex;

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
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Mix several playlists into a new one
    Mix(MixOptionsArgs),

    /// Create an extended copy of a playlist with similar tracks
    Extend(ExtendOptions),

    /// Shuffle a playlist in place
    Shuffle(ShuffleOptions),

    /// Mix with defaults, then shuffle the radio mix
    Daily,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct MixOptionsArgs {
    /// Comma separated playlist names; one of them is picked at random.
    /// Can be repeated. Defaults to the Daily Mix 1-3 and 4-6 groups.
    #[clap(
        long = "group",
        value_parser = utils::parse_playlist_group,
        action = ArgAction::Append,
        num_args = 1
    )]
    pub groups: Vec<utils::PlaylistGroup>,

    /// Playlist to include as its own source. Can be repeated.
    #[clap(long = "source", action = ArgAction::Append, num_args = 1)]
    pub sources: Vec<String>,

    /// Name of the playlist to create
    #[clap(long)]
    pub name: Option<String>,

    /// Maximum number of tracks in the mix
    #[clap(long, default_value_t = DEFAULT_MAX_TRACKS)]
    pub max_tracks: usize,

    /// Number of recent tracks an artist must be absent from before it is
    /// picked again (0 disables the check)
    #[clap(long, default_value_t = DEFAULT_MIN_ARTIST_SEPARATION)]
    pub min_artist_separation: usize,

    /// Allow the same track to appear more than once
    #[clap(long)]
    pub no_dedup: bool,

    /// Keep trying after a full round without a usable track
    #[clap(long)]
    pub no_fail_fast: bool,
}

impl From<MixOptionsArgs> for MixRequest {
    fn from(args: MixOptionsArgs) -> Self {
        let defaults = MixRequest::default();
        let use_defaults = args.groups.is_empty() && args.sources.is_empty();

        MixRequest {
            groups: if use_defaults {
                defaults.groups
            } else {
                args.groups
            },
            sources: if use_defaults {
                defaults.sources
            } else {
                args.sources
            },
            name: args.name.unwrap_or(defaults.name),
            options: MixOptions {
                dedup: !args.no_dedup,
                min_artist_separation: args.min_artist_separation,
                fail_fast: !args.no_fail_fast,
                max_tracks: args.max_tracks,
            },
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ExtendOptions {
    /// Name of the playlist to extend
    playlist: String,

    /// Maximum number of recommended tracks
    #[clap(long, default_value_t = DEFAULT_EXTEND_LIMIT)]
    limit: usize,
}

#[derive(Parser, Debug, Clone)]
pub struct ShuffleOptions {
    /// Name of the playlist to shuffle
    #[clap(long, default_value = DEFAULT_SHUFFLE_PLAYLIST)]
    playlist: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    match cli.command {
        Command::Auth => {
            let oauth_result: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
            cli::auth(Arc::clone(&oauth_result)).await;
        }
        Command::Mix(opt) => cli::mix(opt.into()).await,
        Command::Extend(opt) => cli::extend(opt.playlist, opt.limit).await,
        Command::Shuffle(opt) => cli::shuffle(opt.playlist).await,
        Command::Daily => cli::daily().await,
        Command::Completions(_) => {}
    }
}
