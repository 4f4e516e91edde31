mod quality;
mod song;

pub use quality::{BiliQuality, NeteaseQuality, QualitySettings};
pub use song::{MatchedMetadata, MusicPlatform, Song, SongSource, BILI_SOURCE_TAG};
