//! Download request model consumed by the command builder.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Container value meaning "let the builder decide".
pub const DEFAULT_CONTAINER: &str = "Default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadType {
    Audio,
    Video,
    Command,
}

impl fmt::Display for DownloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadType::Audio => write!(f, "audio"),
            DownloadType::Video => write!(f, "video"),
            DownloadType::Command => write!(f, "command"),
        }
    }
}

/// A stream descriptor as reported by yt-dlp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Format {
    pub format_id: String,
    /// For command downloads this holds the raw command text
    pub format_note: String,
    pub container: String,
    pub vcodec: String,
    pub acodec: String,
    pub filesize: u64,
    pub tbr: String,
    pub lang: Option<String>,
}

impl Default for Format {
    fn default() -> Self {
        Self {
            format_id: String::new(),
            format_note: String::new(),
            container: String::new(),
            vcodec: "none".to_string(),
            acodec: "none".to_string(),
            filesize: 0,
            tbr: String::new(),
            lang: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioPreferences {
    pub embed_thumb: bool,
    /// `None` defers to the global `crop_thumbnail` preference
    pub crop_thumb: Option<bool>,
    pub split_by_chapters: bool,
    pub sponsorblock_filters: Vec<String>,
    pub bitrate: String,
}

impl Default for AudioPreferences {
    fn default() -> Self {
        Self {
            embed_thumb: true,
            crop_thumb: None,
            split_by_chapters: false,
            sponsorblock_filters: Vec::new(),
            bitrate: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoPreferences {
    pub add_chapters: bool,
    pub embed_subs: bool,
    pub write_subs: bool,
    pub write_auto_subs: bool,
    pub subs_languages: String,
    pub remove_audio: bool,
    pub recode_video: bool,
    pub compatibility_mode: bool,
    pub embed_thumbnail: bool,
    pub split_by_chapters: bool,
    pub sponsorblock_filters: Vec<String>,
    /// Audio streams muxed with the chosen video stream
    pub audio_format_ids: Vec<String>,
    pub live_from_start: bool,
    pub wait_for_video_minutes: u32,
}

/// Type-specific preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "preferences", rename_all = "lowercase")]
pub enum Payload {
    Audio(AudioPreferences),
    Video(VideoPreferences),
    /// Raw pass-through; the command text lives in `format.format_note`
    Command,
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Video(VideoPreferences::default())
    }
}

/// Everything needed to build one yt-dlp invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadRequest {
    pub id: i64,
    /// Item URL, or a path to a `.txt` list of URLs
    pub url: String,
    pub title: String,
    pub author: String,
    pub payload: Payload,
    pub format: Format,
    pub container: String,
    /// `;`-separated cut specifications, each `"<range> <label>"`
    pub download_sections: String,
    pub all_formats: Vec<Format>,
    pub download_path: String,
    pub playlist_url: Option<String>,
    pub playlist_title: String,
    pub playlist_index: Option<u32>,
    pub row_number: u32,
    pub extra_commands: String,
    pub custom_file_name_template: String,
    pub save_thumbnail: bool,
}

impl Default for DownloadRequest {
    fn default() -> Self {
        Self {
            id: 0,
            url: String::new(),
            title: String::new(),
            author: String::new(),
            payload: Payload::default(),
            format: Format::default(),
            container: DEFAULT_CONTAINER.to_string(),
            download_sections: String::new(),
            all_formats: Vec::new(),
            download_path: String::new(),
            playlist_url: None,
            playlist_title: String::new(),
            playlist_index: None,
            row_number: 0,
            extra_commands: String::new(),
            custom_file_name_template: String::new(),
            save_thumbnail: false,
        }
    }
}

/// Random positive id for requests that arrive without one.
pub fn new_request_id() -> i64 {
    loop {
        let id = (Uuid::new_v4().as_u128() as i64) & i64::MAX;
        if id != 0 {
            return id;
        }
    }
}

fn known_language(format: &Format) -> Option<&str> {
    format
        .lang
        .as_deref()
        .map(str::trim)
        .filter(|lang| !lang.is_empty() && *lang != "None")
}

impl DownloadRequest {
    pub fn download_type(&self) -> DownloadType {
        match self.payload {
            Payload::Audio(_) => DownloadType::Audio,
            Payload::Video(_) => DownloadType::Video,
            Payload::Command => DownloadType::Command,
        }
    }

    /// SponsorBlock categories chosen for this item.
    pub fn sponsorblock_filters(&self) -> &[String] {
        match &self.payload {
            Payload::Audio(prefs) => &prefs.sponsorblock_filters,
            Payload::Video(prefs) => &prefs.sponsorblock_filters,
            Payload::Command => &[],
        }
    }

    /// Non-blank cut specifications, in order.
    pub fn cut_sections(&self) -> impl Iterator<Item = &str> {
        self.download_sections
            .split(';')
            .filter(|section| !section.trim().is_empty())
    }

    pub fn has_cuts(&self) -> bool {
        !self.download_sections.trim().is_empty()
    }

    /// Give a request without an id a random positive one.
    pub fn ensure_id(&mut self) -> i64 {
        if self.id == 0 {
            self.id = new_request_id();
        }
        self.id
    }

    /// Language of the chosen format, falling back to the matching entry of
    /// `all_formats` when the format itself carries none.
    pub fn format_language(&self) -> Option<&str> {
        known_language(&self.format).or_else(|| {
            self.all_formats
                .iter()
                .find(|f| f.format_id == self.format.format_id)
                .and_then(known_language)
        })
    }
}
