//! URL helpers used to pick the addressing mode.

use regex::Regex;
use std::sync::OnceLock;

/// Suffix marking a URL field that points at a newline-delimited list of URLs.
pub const LIST_FILE_SUFFIX: &str = ".txt";

pub fn is_list_file(url: &str) -> bool {
    url.ends_with(LIST_FILE_SUFFIX)
}

pub fn is_youtube_url(url: &str) -> bool {
    url.contains("youtube.com") || url.contains("youtu.be")
}

fn youtube_id_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?:youtube\.com/watch\?v=|youtu\.be/)([a-zA-Z0-9_-]{11})",
            r"youtube\.com/shorts/([a-zA-Z0-9_-]{11})",
            r"youtube\.com/embed/([a-zA-Z0-9_-]{11})",
            r"youtube\.com/v/([a-zA-Z0-9_-]{11})",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

/// Extract the 11-character video id from a YouTube URL.
pub fn youtube_id(url: &str) -> Option<&str> {
    youtube_id_patterns()
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_youtube_id() {
        assert_eq!(youtube_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), Some("dQw4w9WgXcQ"));
        assert_eq!(youtube_id("https://youtu.be/dQw4w9WgXcQ?t=42"), Some("dQw4w9WgXcQ"));
        assert_eq!(youtube_id("https://youtube.com/shorts/abcdefghijk"), Some("abcdefghijk"));
        assert_eq!(youtube_id("https://www.youtube.com/embed/abcdefghijk"), Some("abcdefghijk"));
        assert_eq!(youtube_id("https://www.youtube.com/@channel/releases"), None);
        assert_eq!(youtube_id("https://vimeo.com/123456"), None);
    }

    #[test]
    fn test_url_kinds() {
        assert!(is_youtube_url("https://music.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(!is_youtube_url("https://example.com/video"));
        assert!(is_list_file("/home/me/urls.txt"));
        assert!(!is_list_file("https://example.com/list"));
    }
}
