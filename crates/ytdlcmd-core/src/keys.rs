//! Preference keys read by the command builder.
//!
//! These strings are the storage contract with the settings store, so they
//! must not be renamed.

pub const USE_ITEM_URL: &str = "use_itemurl_instead_playlisturl";
pub const CACHE_DOWNLOADS: &str = "cache_downloads";

// Network
pub const ARIA2: &str = "aria2";
pub const CONCURRENT_FRAGMENTS: &str = "concurrent_fragments";
pub const RETRIES: &str = "retries";
pub const FRAGMENT_RETRIES: &str = "fragment_retries";
pub const LIMIT_RATE: &str = "limit_rate";
pub const BUFFER_SIZE: &str = "buffer_size";
pub const SOCKET_TIMEOUT: &str = "socket_timeout";
pub const RESTRICT_FILENAMES: &str = "restrict_filenames";
pub const FORCE_IPV4: &str = "force_ipv4";
pub const USE_COOKIES: &str = "use_cookies";
pub const NO_CHECK_CERTIFICATES: &str = "no_check_certificates";
pub const PROXY: &str = "proxy";
pub const KEEP_CACHE: &str = "keep_cache";

// Processing
pub const NO_PART: &str = "no_part";
pub const MTIME: &str = "mtime";
pub const EMBED_METADATA: &str = "embed_metadata";
pub const THUMBNAIL_FORMAT: &str = "thumbnail_format";
pub const CROP_THUMBNAIL: &str = "crop_thumbnail";
pub const WRITE_DESCRIPTION: &str = "write_description";
pub const PREVENT_DUPLICATE_DOWNLOADS: &str = "prevent_duplicate_downloads";
pub const USE_FORMAT_SORTING: &str = "use_format_sorting";
pub const AUDIO_LANGUAGE: &str = "audio_language";
pub const SUB_FORMAT: &str = "sub_format";
pub const NO_KEEP_SUBS: &str = "no_keep_subs";

// SponsorBlock
pub const USE_SPONSORBLOCK: &str = "use_sponsorblock";
pub const FORCE_KEYFRAMES: &str = "force_keyframes";
pub const SPONSORBLOCK_URL: &str = "sponsorblock_url";

/// Value of [`PREVENT_DUPLICATE_DOWNLOADS`] that selects archive-based deduplication.
pub const DOWNLOAD_ARCHIVE: &str = "download_archive";
