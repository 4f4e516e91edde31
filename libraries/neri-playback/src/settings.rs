//! Quality settings source
//!
//! The resolver reads the active quality on every resolve, so a change made
//! in the settings screen applies to the next song without a restart.

use neri_core::{BiliQuality, NeteaseQuality, QualitySettings};
use tokio::sync::watch;

/// Read access to the user's quality settings
pub trait SettingsStore: Send + Sync {
    fn quality(&self) -> QualitySettings;
}

/// Settings held in memory and observable through a `watch` channel
#[derive(Debug)]
pub struct SharedSettings {
    quality: watch::Sender<QualitySettings>,
}

impl SharedSettings {
    pub fn new(quality: QualitySettings) -> Self {
        let (quality, _) = watch::channel(quality);
        Self { quality }
    }

    pub fn set_netease_quality(&self, level: NeteaseQuality) {
        self.quality.send_modify(|q| q.netease = level);
    }

    pub fn set_bili_quality(&self, level: BiliQuality) {
        self.quality.send_modify(|q| q.bilibili = level);
    }

    /// Receiver notified on every change
    pub fn subscribe(&self) -> watch::Receiver<QualitySettings> {
        self.quality.subscribe()
    }
}

impl Default for SharedSettings {
    fn default() -> Self {
        Self::new(QualitySettings::default())
    }
}

impl SettingsStore for SharedSettings {
    fn quality(&self) -> QualitySettings {
        *self.quality.borrow()
    }
}
