//! Video and playlist metadata from `yt-dlp -J`.

use crate::request::{DownloadRequest, Format};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    pub uploader: Option<String>,
    pub channel: Option<String>,
    pub webpage_url: Option<String>,
    /// Set instead of `webpage_url` on flat playlist entries
    pub url: Option<String>,
    pub duration: Option<f64>,
    pub thumbnail: Option<String>,
    pub extractor: Option<String>,
    #[serde(deserialize_with = "formats")]
    pub formats: Vec<Format>,
    pub chapters: Option<Vec<Chapter>>,
    /// Present when the URL names a playlist
    pub entries: Option<Vec<VideoInfo>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Chapter {
    pub start_time: f64,
    pub end_time: f64,
    pub title: String,
}

/// Format entry as yt-dlp prints it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YtDlpFormat {
    format_id: Option<String>,
    format_note: Option<String>,
    ext: Option<String>,
    vcodec: Option<String>,
    acodec: Option<String>,
    filesize: Option<f64>,
    filesize_approx: Option<f64>,
    tbr: Option<f64>,
    language: Option<String>,
}

impl From<YtDlpFormat> for Format {
    fn from(f: YtDlpFormat) -> Self {
        Format {
            format_id: f.format_id.unwrap_or_default(),
            format_note: f.format_note.unwrap_or_default(),
            container: f.ext.unwrap_or_default(),
            vcodec: f.vcodec.unwrap_or_else(|| "none".to_string()),
            acodec: f.acodec.unwrap_or_else(|| "none".to_string()),
            filesize: f.filesize.or(f.filesize_approx).unwrap_or(0.0) as u64,
            tbr: f.tbr.map(|tbr| tbr.to_string()).unwrap_or_default(),
            lang: f.language,
        }
    }
}

fn formats<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Format>, D::Error> {
    let raw: Option<Vec<YtDlpFormat>> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default().into_iter().map(Format::from).collect())
}

impl VideoInfo {
    pub fn author(&self) -> String {
        self.uploader
            .as_deref()
            .or(self.channel.as_deref())
            .unwrap_or_default()
            .to_string()
    }

    pub fn item_url(&self) -> Option<&str> {
        self.webpage_url.as_deref().or(self.url.as_deref())
    }

    /// Requests for this item, one per entry for playlists.
    ///
    /// Each request starts from `template`, so payload and destination carry
    /// over. A single video also gets its format list for language lookups.
    pub fn to_requests(&self, template: &DownloadRequest) -> Vec<DownloadRequest> {
        match &self.entries {
            Some(entries) => entries
                .iter()
                .enumerate()
                .map(|(i, entry)| DownloadRequest {
                    id: 0,
                    url: entry.item_url().unwrap_or_default().to_string(),
                    title: entry.title.clone(),
                    author: entry.author(),
                    playlist_url: Some(template.url.clone()),
                    playlist_title: self.title.clone(),
                    playlist_index: Some(i as u32 + 1),
                    ..template.clone()
                })
                .collect(),
            None => vec![DownloadRequest {
                url: self.item_url().unwrap_or(&template.url).to_string(),
                title: self.title.clone(),
                author: self.author(),
                all_formats: self.formats.clone(),
                ..template.clone()
            }],
        }
    }
}
