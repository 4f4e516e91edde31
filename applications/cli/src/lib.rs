//! NeriPlayer command line tools
//!
//! Inspect playlists and saved queues, print lyrics, and dry-run the
//! playback engine against a download directory.

pub mod config;
pub mod error;
pub mod offline;
pub mod playlist;
pub mod simulate;

pub use config::NeriConfig;
pub use error::{CliError, Result};
pub use playlist::Playlist;
