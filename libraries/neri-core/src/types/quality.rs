/// Audio quality preferences per platform
use crate::error::NeriError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// NetEase Cloud Music quality level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeteaseQuality {
    Standard,
    Higher,
    #[default]
    Exhigh,
    Lossless,
    Hires,
    Jyeffect,
    Sky,
    Jymaster,
}

impl NeteaseQuality {
    /// Level name as sent to the platform
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Higher => "higher",
            Self::Exhigh => "exhigh",
            Self::Lossless => "lossless",
            Self::Hires => "hires",
            Self::Jyeffect => "jyeffect",
            Self::Sky => "sky",
            Self::Jymaster => "jymaster",
        }
    }
}

impl FromStr for NeteaseQuality {
    type Err = NeriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "higher" => Ok(Self::Higher),
            "exhigh" => Ok(Self::Exhigh),
            "lossless" => Ok(Self::Lossless),
            "hires" => Ok(Self::Hires),
            "jyeffect" => Ok(Self::Jyeffect),
            "sky" => Ok(Self::Sky),
            "jymaster" => Ok(Self::Jymaster),
            other => Err(NeriError::UnknownQuality(other.to_string())),
        }
    }
}

impl std::fmt::Display for NeteaseQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bilibili audio stream quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiliQuality {
    Dolby,
    Hires,
    Lossless,
    #[default]
    High,
    Medium,
    Low,
}

impl BiliQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dolby => "dolby",
            Self::Hires => "hires",
            Self::Lossless => "lossless",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl FromStr for BiliQuality {
    type Err = NeriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dolby" => Ok(Self::Dolby),
            "hires" => Ok(Self::Hires),
            "lossless" => Ok(Self::Lossless),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(NeriError::UnknownQuality(other.to_string())),
        }
    }
}

impl std::fmt::Display for BiliQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Active quality preference for each platform
///
/// Part of every cache key, so switching quality never reuses a cached stream
/// of a different quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QualitySettings {
    #[serde(default)]
    pub netease: NeteaseQuality,

    #[serde(default)]
    pub bilibili: BiliQuality,
}
