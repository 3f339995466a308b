use std::{path::PathBuf, time::Duration};

use bgm_player_controls::{
    config::PlayerConfig,
    controls::Controls,
    player::Player,
    simulated::SimulatedOutput,
    sink::{AudioOutput, RodioOutput},
    tracklist::Tracklist,
};
use clap::{Args, Parser, Subcommand};
use snafu::prelude::*;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    playlist::{self, Playlist},
    terminal,
};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(short, long)]
    /// Log level
    verbosity: Option<tracing::Level>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PlaylistArgs {
    /// Playlist file (TOML) with tracks and player settings.
    #[clap(short, long, env = "BGM_PLAYLIST")]
    playlist: Option<PathBuf>,

    /// Audio files to play after the playlist tracks, in order.
    tracks: Vec<PathBuf>,

    #[clap(short, long, default_value_t = false)]
    /// Shuffle the play order once at startup.
    shuffle: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the player
    Open {
        #[clap(flatten)]
        playlist: PlaylistArgs,

        #[clap(short, long, default_value_t = false)]
        /// Try to start playing shortly after startup.
        autoplay: bool,

        #[clap(long, default_value_t = false)]
        /// Use a silent simulated output instead of the audio device.
        simulate: bool,

        #[clap(long, default_value_t = 30)]
        /// Track length in seconds for the simulated output.
        simulated_track_seconds: u64,

        #[clap(long, default_value_t = false)]
        /// Make the simulated output refuse to play until the first input line.
        require_interaction: bool,
    },
    /// List the tracks in play order
    List {
        #[clap(flatten)]
        playlist: PlaylistArgs,
    },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Unable to read playlist {}: {source}", path.display()))]
    PlaylistRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Unable to parse playlist: {source}"))]
    PlaylistParse { source: toml::de::Error },
    #[snafu(display("No tracks. Pass audio files or a playlist with --playlist"))]
    NoTracks,
    #[snafu(display("{error}"))]
    PlayerError { error: String },
}

impl From<bgm_player_controls::error::Error> for Error {
    fn from(error: bgm_player_controls::error::Error) -> Self {
        match error {
            bgm_player_controls::error::Error::EmptyPlaylist => Error::NoTracks,
            error => Error::PlayerError {
                error: error.to_string(),
            },
        }
    }
}

fn load_playlist(args: &PlaylistArgs) -> Result<(Tracklist, PlayerConfig), Error> {
    let mut playlist = match &args.playlist {
        Some(path) => playlist::parse_playlist(path)?,
        None => Playlist::default(),
    };
    playlist.extend_paths(&args.tracks);

    let mut tracklist = Tracklist::new(playlist.tracks)?;
    if args.shuffle {
        tracklist = tracklist.shuffled();
    }

    Ok((tracklist, playlist.config))
}

pub async fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Commands::Open {
            playlist,
            autoplay,
            simulate,
            simulated_track_seconds,
            require_interaction,
        } => {
            let (tracklist, config) = load_playlist(&playlist)?;
            let simulated = || {
                SimulatedOutput::new(
                    Duration::from_secs(simulated_track_seconds),
                    require_interaction,
                )
            };

            if simulate {
                return open(tracklist, simulated(), config, autoplay).await;
            }

            match RodioOutput::new() {
                Ok(output) => open(tracklist, output, config, autoplay).await,
                Err(err) => {
                    warn!(%err, "no audio output, falling back to simulated output");
                    open(tracklist, simulated(), config, autoplay).await
                }
            }
        }
        Commands::List { playlist } => {
            let (tracklist, _) = load_playlist(&playlist)?;
            for (position, track) in tracklist.tracks().iter().enumerate() {
                println!("{:>3}. {} ({})", position + 1, track.title, track.file);
            }
            Ok(())
        }
    }
}

async fn open<O: AudioOutput>(
    tracklist: Tracklist,
    output: O,
    config: PlayerConfig,
    autoplay: bool,
) -> Result<(), Error> {
    info!(tracks = tracklist.total(), "opening player");

    let mut player = Player::new(tracklist, output, config);
    let controls = player.controls();

    tokio::spawn(terminal::print_notifications(
        player.broadcast().notify_receiver(),
    ));
    tokio::spawn(terminal::read_commands(controls.clone()));

    if autoplay {
        spawn_autoplay(controls.clone(), config.autoplay_delay());
    }

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            controls.quit();
        }
    });

    player.player_loop().await?;
    Ok(())
}

/// Send a single play request once `delay` has passed. A refused request is
/// retried by the player on the next interaction.
pub(crate) fn spawn_autoplay(controls: Controls, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        debug!("autoplay");
        controls.play();
    })
}
