//! Quality tiers behind stored format ids.
//!
//! Stored format ids mix real yt-dlp ids with sentinel strings: English
//! literals (`best`, `wa`), localized labels (`Best Quality`) and generic
//! tiers (`1080p_ytdlnisgeneric`, `128kbps_ytdlnisgeneric`). [`QualityTier::classify`]
//! is the only place those strings are compared.

use crate::providers::{Catalog, OptionCatalog};

const GENERIC_SUFFIX: &str = "_ytdlnisgeneric";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityTier {
    Best,
    Worst,
    /// Average audio bitrate in kbps, e.g. `128`
    AudioBitrate(String),
    /// Maximum video height in pixels
    MaxHeight(u32),
    /// A concrete yt-dlp format id
    Specific(String),
}

impl QualityTier {
    pub fn classify<O: OptionCatalog + ?Sized>(format_id: &str, catalog: &O) -> Self {
        let id = format_id.trim();

        // Both the English literals and the localized labels are accepted
        if matches!(id, "" | "0" | "ba" | "best") || id == catalog.string(Catalog::BEST_QUALITY) {
            return QualityTier::Best;
        }
        if matches!(id, "wa" | "worst") || id == catalog.string(Catalog::WORST_QUALITY) {
            return QualityTier::Worst;
        }

        if id.contains(&format!("kbps{GENERIC_SUFFIX}")) {
            let kbps = id.split("kbps").next().unwrap_or_default();
            return QualityTier::AudioBitrate(kbps.to_string());
        }

        if let Some(height) = id
            .strip_suffix(GENERIC_SUFFIX)
            .and_then(|tier| tier.strip_suffix('p'))
            .and_then(|h| h.parse().ok())
        {
            return QualityTier::MaxHeight(height);
        }

        QualityTier::Specific(id.to_string())
    }

    pub fn is_worst(&self) -> bool {
        matches!(self, QualityTier::Worst)
    }

    /// Video stream selector for this tier.
    pub fn video_selector(&self) -> String {
        match self {
            QualityTier::Best | QualityTier::Worst => "bv".to_string(),
            QualityTier::MaxHeight(height) => format!("bv[height<={height}]"),
            QualityTier::AudioBitrate(kbps) => format!("{kbps}kbps{GENERIC_SUFFIX}"),
            QualityTier::Specific(id) => id.clone(),
        }
    }
}

/// Sort keys that turn the default "largest first" ordering into "smallest first".
pub const ASCENDING_SORT: [&str; 3] = ["+br", "+res", "+fps"];

/// Sort key preferring https, used when cutting sections.
pub const HTTPS_SORT: &str = "proto:https";
