//! yt-dlp command construction.
//!
//! [`CommandBuilder::build`] turns a [`DownloadRequest`] into the option list
//! written to a `--config-locations` file, plus the few arguments passed on
//! the real command line. It only reads from its injected providers.

use crate::args::CommandArgs;
use crate::keys;
use crate::providers::{ConfigAccessor, OptionCatalog, PathResolver};
use crate::request::{new_request_id, DownloadRequest, DownloadType, Payload};
use crate::url::{is_list_file, is_youtube_url, youtube_id};
use chrono::Utc;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;
use uuid::Uuid;

/// yt-dlp's filename length ceiling, shared with the destination directory.
const MAX_PATH_LENGTH: usize = 254;

/// Result of one build.
#[derive(Debug, Clone)]
pub struct BuiltCommand {
    /// URL to pass to yt-dlp, `None` in list-file mode
    pub url: Option<String>,
    /// Command-line arguments, ending with `--config-locations <config_path>`
    pub arguments: Vec<String>,
    /// Where the caller must write [`BuiltCommand::config_text`]
    pub config_path: String,
    /// Options destined for the config file
    pub options: CommandArgs,
    /// Directory passed to `-P`
    pub download_dir: String,
    /// True when `download_dir` is a cache staging directory
    pub staged: bool,
}

impl BuiltCommand {
    pub fn config_text(&self) -> String {
        self.options.to_config_text()
    }

    /// Arguments followed by the URL, ready for the process builder.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = self.arguments.clone();
        argv.extend(self.url.clone());
        argv
    }
}

/// State shared between the common pass and the type-specific builders.
pub(crate) struct BuildContext<'r> {
    pub request: &'r DownloadRequest,
    pub args: CommandArgs,
    /// Metadata rewrites and embeds, appended after everything else
    pub metadata: CommandArgs,
    pub download_dir: String,
    pub file_name_template: String,
    pub thumbnail_format: String,
    pub embed_metadata: bool,
}

impl BuildContext<'_> {
    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.contains_flag(flag) || self.metadata.contains_flag(flag)
    }

    /// `-o` with a single trailing extension placeholder, if a template is set.
    pub fn push_output_template(&mut self) {
        let template = self.file_name_template.trim();
        if !template.is_empty() {
            let stem = template.strip_suffix(".%(ext)s").unwrap_or(template);
            self.args.opt("-o", format!("{stem}.%(ext)s"));
        }
    }
}

/// Builds yt-dlp invocations from download requests.
#[derive(Debug, Clone)]
pub struct CommandBuilder<C, P, O> {
    pub(crate) prefs: C,
    pub(crate) paths: P,
    pub(crate) catalog: O,
}

impl<C, P, O> CommandBuilder<C, P, O>
where
    C: ConfigAccessor,
    P: PathResolver,
    O: OptionCatalog,
{
    pub fn new(prefs: C, paths: P, catalog: O) -> Self {
        Self {
            prefs,
            paths,
            catalog,
        }
    }

    pub fn build(&self, request: &DownloadRequest) -> BuiltCommand {
        let download_type = request.download_type();

        let mut use_item_url = self.prefs.get_bool(keys::USE_ITEM_URL, false);
        // Channel pages such as /releases hold playlists of playlists
        if is_youtube_url(&request.url) && youtube_id(&request.url).is_none() {
            use_item_url = true;
        }

        let mut args = CommandArgs::new();
        let mut metadata = CommandArgs::new();

        let url = self.resolve_url(request, use_item_url, &mut args);
        args.flag("--newline");

        if let (Some(index), true) = (request.playlist_index, use_item_url) {
            metadata.opt("--parse-metadata", format!(" {index}: %(playlist_index)s"));
        }
        if request.row_number > 0 {
            args.opt("--autonumber-start", request.row_number.to_string());
        }

        let target = self.paths.format_path(&request.download_path);
        let path_in_command = download_type == DownloadType::Command
            && request.format.format_note.contains("-P ");
        let direct = path_in_command
            || (!self.prefs.get_bool(keys::CACHE_DOWNLOADS, true) && self.paths.can_write(&target));

        let download_dir = if direct {
            args.flag("--no-quiet");
            args.flag("--no-simulate");
            args.opt("--print", "after_move:'%(filepath,_filename)s'");
            target
        } else {
            // Requests without an id still get a staging directory of their own
            let id = match request.id {
                0 => new_request_id(),
                id => id,
            };
            format!("{}/{}", self.paths.cache_path(), id)
        };

        self.push_network_options(&mut args);

        let mut ctx = BuildContext {
            request,
            args,
            metadata,
            download_dir,
            file_name_template: request.custom_file_name_template.clone(),
            thumbnail_format: self.prefs.get_string(keys::THUMBNAIL_FORMAT, "jpg"),
            embed_metadata: self.prefs.get_bool(keys::EMBED_METADATA, true),
        };

        if download_type != DownloadType::Command {
            self.push_shared_options(&mut ctx);
        }

        if self.prefs.get_string(keys::PREVENT_DUPLICATE_DOWNLOADS, "") == keys::DOWNLOAD_ARCHIVE {
            ctx.args
                .opt("--download-archive", self.paths.download_archive_path());
        }

        match &request.payload {
            Payload::Audio(prefs) => self.build_audio(&mut ctx, prefs),
            Payload::Video(prefs) => self.build_video(&mut ctx, prefs),
            Payload::Command => {
                if !path_in_command {
                    let dir = ctx.download_dir.clone();
                    ctx.args.opt("-P", dir);
                }
                ctx.args.raw(request.format.format_note.as_str());
            }
        }

        let BuildContext {
            mut args,
            metadata,
            download_dir,
            ..
        } = ctx;
        args.append(metadata);

        let mut arguments = Vec::new();
        if !request.extra_commands.trim().is_empty() && download_type != DownloadType::Command {
            if let Some(cache_dir) = hoisted_cache_dir(&request.extra_commands) {
                arguments.push("--cache-dir".to_string());
                arguments.push(cache_dir);
            }
            args.raw(request.extra_commands.as_str());
        }

        if args.mentions("--sponsorblock") {
            let api = self.prefs.get_string(keys::SPONSORBLOCK_URL, "");
            if !api.trim().is_empty() {
                args.opt("--sponsorblock-api", api);
            }
        }

        let config_path = format!(
            "{}/{}{}.txt",
            self.paths.cache_path(),
            Utc::now().timestamp_millis(),
            Uuid::new_v4()
        );
        arguments.push("--config-locations".to_string());
        arguments.push(config_path.clone());

        debug!(
            "Built {} command for {} ({} options, config {})",
            download_type,
            url.as_deref().unwrap_or(&request.url),
            args.len(),
            config_path
        );

        BuiltCommand {
            url,
            arguments,
            config_path,
            options: args,
            download_dir,
            staged: !direct,
        }
    }

    /// Picks list-file, item or playlist addressing and emits the matching
    /// selection options.
    fn resolve_url(
        &self,
        request: &DownloadRequest,
        use_item_url: bool,
        args: &mut CommandArgs,
    ) -> Option<String> {
        if is_list_file(&request.url) {
            args.opt("-a", request.url.as_str());
            return None;
        }

        let item_url = || (!request.url.trim().is_empty()).then(|| request.url.clone());

        let playlist_url = match request.playlist_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url,
            _ => return item_url(),
        };
        if request.playlist_title.trim().is_empty() || use_item_url {
            return item_url();
        }

        match (youtube_id(&request.url), request.playlist_index) {
            (Some(id), _) => {
                args.opt("--match-filter", format!("id~='{id}'"));
            }
            (None, Some(index)) => {
                args.opt("-I", format!("{index}:{index}"));
            }
            (None, None) => {
                debug!("No index or id to select {} in its playlist", request.url);
                return item_url();
            }
        }

        Some(playlist_url.to_string())
    }

    fn push_network_options(&self, args: &mut CommandArgs) {
        if self.prefs.get_bool(keys::ARIA2, false) {
            args.opt("--downloader", "aria2c");
            args.flag("--no-check-certificates");
        }

        let fragments = self.prefs.get_int(keys::CONCURRENT_FRAGMENTS, 1);
        if fragments > 1 {
            args.opt("-N", fragments.to_string());
        }

        let retries = self.prefs.get_string(keys::RETRIES, "");
        if !retries.is_empty() {
            args.opt("--retries", retries);
        }
        let fragment_retries = self.prefs.get_string(keys::FRAGMENT_RETRIES, "");
        if !fragment_retries.is_empty() {
            args.opt("--fragment-retries", fragment_retries);
        }

        let limit_rate = self.prefs.get_string(keys::LIMIT_RATE, "");
        if !limit_rate.trim().is_empty() {
            args.opt("-r", limit_rate);
        }

        let buffer_size = self.prefs.get_string(keys::BUFFER_SIZE, "");
        if !buffer_size.trim().is_empty() {
            args.opt("--buffer-size", buffer_size);
            args.flag("--no-resize-buffer");
        }

        let socket_timeout = self.prefs.get_string(keys::SOCKET_TIMEOUT, "");
        if !socket_timeout.trim().is_empty() {
            args.opt("--socket-timeout", socket_timeout);
        }

        if self.prefs.get_bool(keys::RESTRICT_FILENAMES, true) {
            args.flag("--restrict-filenames");
        }
        if self.prefs.get_bool(keys::FORCE_IPV4, false) {
            args.flag("-4");
        }

        if self.prefs.get_bool(keys::USE_COOKIES, false) {
            if let Some(cookies) = self.paths.cookie_file_path() {
                args.opt("--cookies", cookies);
            }
        }

        if self.prefs.get_bool(keys::NO_CHECK_CERTIFICATES, false)
            && !args.contains_flag("--no-check-certificates")
        {
            args.flag("--no-check-certificates");
        }

        let proxy = self.prefs.get_string(keys::PROXY, "");
        if !proxy.trim().is_empty() {
            args.opt("--proxy", proxy);
        }

        if self.prefs.get_bool(keys::KEEP_CACHE, false) {
            args.flag("--keep-fragments");
        }
    }

    /// Options common to audio and video downloads.
    fn push_shared_options(&self, ctx: &mut BuildContext<'_>) {
        let request = ctx.request;
        let force_keyframes = self.prefs.get_bool(keys::FORCE_KEYFRAMES, false);

        if self.prefs.get_bool(keys::NO_PART, false) {
            ctx.args.flag("--no-part");
        }

        let budget = MAX_PATH_LENGTH as i64 - ctx.download_dir.chars().count() as i64;
        ctx.args.opt("--trim-filenames", budget.to_string());

        if request.save_thumbnail {
            ctx.args.flag("--write-thumbnail");
            ctx.args
                .opt("--convert-thumbnails", ctx.thumbnail_format.as_str());
        }

        if self.prefs.get_bool(keys::MTIME, false) {
            ctx.args.flag("--mtime");
        } else {
            ctx.args.flag("--no-mtime");
        }

        if self.prefs.get_bool(keys::USE_SPONSORBLOCK, true) {
            let categories: Vec<&str> = request
                .sponsorblock_filters()
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .collect();
            if !categories.is_empty() {
                ctx.args.opt("--sponsorblock-remove", categories.join(","));
                if force_keyframes {
                    ctx.args.flag("--force-keyframes-at-cuts");
                }
            }
        }

        if !request.title.trim().is_empty() {
            ctx.metadata.opt_values(
                "--replace-in-metadata",
                ["title", "^.*$", escape_metadata(&request.title).as_str()],
            );
            ctx.metadata
                .opt("--parse-metadata", "%(title)s:%(meta_title)s");
        }
        if !request.author.trim().is_empty() {
            ctx.metadata.opt_values(
                "--replace-in-metadata",
                ["uploader", "^.*$", escape_metadata(&request.author).as_str()],
            );
            ctx.metadata
                .opt("--parse-metadata", "%(uploader)s:%(artist)s");
        }

        if request.has_cuts() {
            let mut cuts = 0;
            for section in request.cut_sections() {
                let range = section.split_whitespace().next().unwrap_or_default();
                ctx.args.opt("--download-sections", format!("*{range}"));
                cuts += 1;

                if force_keyframes && !ctx.args.contains_flag("--force-keyframes-at-cuts") {
                    ctx.args.flag("--force-keyframes-at-cuts");
                }
            }

            if cuts > 1 {
                let template = ctx.file_name_template.trim();
                let stem = template.strip_suffix(".%(ext)s").unwrap_or(template);
                ctx.file_name_template =
                    format!("%(autonumber)d. {stem} [%(section_start>%H∶%M∶%S)s]");
            }
        }

        if self.prefs.get_bool(keys::WRITE_DESCRIPTION, false) {
            ctx.args.flag("--write-description");
        }
    }
}

/// Escape quotes in a `--replace-in-metadata` replacement value.
fn escape_metadata(value: &str) -> String {
    value.replace('"', "\\\"")
}

fn cache_dir_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"--cache-dir\s+(?:"([^"]+)"|(\S+))"#).expect("cache-dir pattern is valid")
    })
}

/// `--cache-dir` value found in user-supplied extra arguments.
fn hoisted_cache_dir(extra: &str) -> Option<String> {
    let caps = cache_dir_pattern().captures(extra)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().replace('"', ""))
}
