/// NeriPlayer CLI - playback engine tools
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use neri_cli::{
    offline::OfflineNetease,
    simulate::{self, SimulationOptions},
    NeriConfig, Playlist,
};
use neri_core::LyricEntry;
use neri_playback::{DirectoryLibrary, LocalLibrary, LyricService, PlayerEvent, RepeatMode};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "neri")]
#[command(about = "NeriPlayer playback engine tools", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./neri.toml if present)
    #[arg(short, long, global = true, env = "NERI_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show cache keys and download status of every song in a playlist
    Inspect {
        /// Playlist JSON or saved queue file
        playlist: PathBuf,
    },
    /// Print the lyrics of one song
    Lyrics {
        /// Playlist JSON or saved queue file
        playlist: PathBuf,
        /// Song index in the playlist
        #[arg(short, long, default_value_t = 0)]
        index: usize,
        /// Print the translation instead
        #[arg(short, long)]
        translated: bool,
    },
    /// Dry-run a playlist through the playback engine
    Simulate {
        /// Playlist JSON or saved queue file
        playlist: PathBuf,
        /// Start index (default: the saved index, or 0)
        #[arg(short, long)]
        start: Option<usize>,
        #[arg(long)]
        shuffle: bool,
        #[arg(short, long, value_enum, default_value_t = RepeatArg::Off)]
        repeat: RepeatArg,
        /// Virtual length of every song in milliseconds
        #[arg(long, default_value_t = 200)]
        track_ms: u64,
        /// Stop after this many songs
        #[arg(long, default_value_t = 50)]
        max_tracks: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RepeatArg {
    Off,
    All,
    One,
}

impl From<RepeatArg> for RepeatMode {
    fn from(arg: RepeatArg) -> Self {
        match arg {
            RepeatArg::Off => RepeatMode::Off,
            RepeatArg::All => RepeatMode::All,
            RepeatArg::One => RepeatMode::One,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = NeriConfig::load(cli.config.as_deref())?;
    config.validate()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Inspect { playlist } => inspect(&config, &playlist)?,
        Commands::Lyrics {
            playlist,
            index,
            translated,
        } => lyrics(&config, &playlist, index, translated).await?,
        Commands::Simulate {
            playlist,
            start,
            shuffle,
            repeat,
            track_ms,
            max_tracks,
        } => {
            let loaded = load_playlist(&playlist)?;
            let options = SimulationOptions {
                start: start.unwrap_or(loaded.start),
                shuffle,
                repeat: repeat.into(),
                track_duration: Duration::from_millis(track_ms),
                max_tracks,
            };
            run_simulation(&config, loaded, &options).await?;
        }
    }

    Ok(())
}

fn load_playlist(path: &Path) -> anyhow::Result<Playlist> {
    let playlist =
        Playlist::load(path).with_context(|| format!("loading playlist {}", path.display()))?;
    if playlist.songs.is_empty() {
        anyhow::bail!("playlist {} has no songs", path.display());
    }
    Ok(playlist)
}

fn inspect(config: &NeriConfig, path: &Path) -> anyhow::Result<()> {
    let playlist = load_playlist(path)?;
    let library = DirectoryLibrary::new(&config.library.download_dir);

    println!(
        "{} songs, start at {} (downloads: {})",
        playlist.songs.len(),
        playlist.start,
        library.root().display()
    );
    for (index, song) in playlist.songs.iter().enumerate() {
        let marker = if index == playlist.start { '>' } else { ' ' };
        let local = library
            .local_file(song)
            .map_or_else(|| "-".to_string(), |p| p.display().to_string());
        println!(
            "{} {:>3}  {:<32} {:<20} {:<28} {}",
            marker,
            index,
            song.name,
            song.artist,
            song.cache_key(&config.quality),
            local
        );
    }
    Ok(())
}

async fn lyrics(
    config: &NeriConfig,
    path: &Path,
    index: usize,
    translated: bool,
) -> anyhow::Result<()> {
    let playlist = load_playlist(path)?;
    let song = playlist.songs.get(index).with_context(|| {
        format!(
            "index {} out of range ({} songs)",
            index,
            playlist.songs.len()
        )
    })?;

    let service = LyricService::new(
        Arc::new(OfflineNetease),
        Arc::new(DirectoryLibrary::new(&config.library.download_dir)),
    );
    let lines = if translated {
        service.translated_lyrics(song).await
    } else {
        service.lyrics(song).await
    };

    if lines.is_empty() {
        println!("No lyrics for {} - {}", song.name, song.artist);
        return Ok(());
    }
    for line in &lines {
        println!("{}", format_line(line, song.user_lyric_offset_ms));
    }
    Ok(())
}

async fn run_simulation(
    config: &NeriConfig,
    playlist: Playlist,
    options: &SimulationOptions,
) -> anyhow::Result<()> {
    tracing::info!(songs = playlist.songs.len(), start = options.start, "Starting simulation");
    let report = simulate::run(config, playlist.songs, options).await?;

    println!("Played {} songs:", report.played.len());
    for (n, song) in report.played.iter().enumerate() {
        println!("  {:>3}. {} - {} [{}]", n + 1, song.name, song.artist, song.source);
    }
    for event in &report.events {
        match event {
            PlayerEvent::ShowError { message } => println!("  error: {}", message),
            PlayerEvent::ShowLoginPrompt { message } => println!("  login: {}", message),
            PlayerEvent::PlaybackHalted { failures } => {
                println!("  halted after {} consecutive failures", failures);
            }
        }
    }
    println!("Final state: {:?}", report.final_state);
    Ok(())
}

/// `[mm:ss.cc] text`, shifted by the user's offset
fn format_line(line: &LyricEntry, offset_ms: i64) -> String {
    let ms = (line.start_ms as i64 + offset_ms).max(0) as u64;
    format!(
        "[{:02}:{:02}.{:02}] {}",
        ms / 60_000,
        (ms / 1000) % 60,
        (ms % 1000) / 10,
        line.text
    )
}
