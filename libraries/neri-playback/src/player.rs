//! Media player seam
//!
//! The engine never decodes audio itself. It hands a [`MediaItem`] to the
//! platform player and drives it with transport calls; the player reports
//! track ends and errors back through the manager handle.

use crate::types::MediaItem;
use std::time::Duration;

/// Transport control of the underlying audio player
///
/// Calls are expected to return quickly; long work belongs on the player's
/// own thread.
pub trait MediaPlayer: Send + Sync {
    /// Replace the loaded item and prepare it
    fn load(&self, item: MediaItem);

    fn play(&self);

    fn pause(&self);

    /// Stop and unload everything
    fn stop(&self);

    fn seek(&self, position: Duration);

    /// Current playback position
    fn position(&self) -> Duration;

    /// Whether an item is loaded and prepared
    fn is_loaded(&self) -> bool;
}
