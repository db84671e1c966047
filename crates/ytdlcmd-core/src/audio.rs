//! Audio-only downloads: stream selection, extraction and tagging.

use crate::builder::{BuildContext, CommandBuilder};
use crate::keys;
use crate::providers::{Catalog, ConfigAccessor, OptionCatalog, PathResolver};
use crate::quality::{QualityTier, ASCENDING_SORT, HTTPS_SORT};
use crate::request::{AudioPreferences, DEFAULT_CONTAINER};
use regex::Regex;
use std::sync::OnceLock;

const BEST_AUDIO: &str = "ba/b";

/// Square crop centered on the shorter side.
const CROP_FILTER: &str = r#"-vf crop="'if(gt(ih,iw),iw,ih)':'if(gt(iw,ih),ih,iw)'""#;
const JPG_QUALITY: &str = "-qmin 1 -q:v 1";

fn numeric_suffix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"-[0-9]+").expect("numeric suffix pattern is valid"))
}

/// `ThumbnailsConvertor` arguments for the chosen thumbnail format.
fn thumbnail_convertor_args(thumbnail_format: &str, crop: bool) -> Option<String> {
    match (thumbnail_format == "jpg", crop) {
        (true, true) => Some(format!("ThumbnailsConvertor:{JPG_QUALITY} {CROP_FILTER}")),
        (true, false) => Some(format!("ThumbnailsConvertor:{JPG_QUALITY}")),
        (false, true) => Some(format!("ThumbnailsConvertor:{CROP_FILTER}")),
        (false, false) => None,
    }
}

impl<C, P, O> CommandBuilder<C, P, O>
where
    C: ConfigAccessor,
    P: PathResolver,
    O: OptionCatalog,
{
    pub(crate) fn build_audio(&self, ctx: &mut BuildContext<'_>, prefs: &AudioPreferences) {
        let request = ctx.request;
        let tier = QualityTier::classify(&request.format.format_id, &self.catalog);
        let preferred_language = self.prefs.get_string(keys::AUDIO_LANGUAGE, "");

        let mut abr_sort = None;
        let mut selector = match tier {
            QualityTier::Best | QualityTier::Worst => BEST_AUDIO.to_string(),
            QualityTier::AudioBitrate(ref kbps) => {
                abr_sort = Some(format!("abr:{kbps}"));
                String::new()
            }
            _ => format!("{}/ba/b", request.format.format_id.trim()),
        };

        if (selector.is_empty() || selector == BEST_AUDIO) && !preferred_language.trim().is_empty() {
            selector = format!("ba[language^={}]/ba/b", preferred_language.trim());
        }

        if !selector.is_empty() {
            // Ids like 251-drc or 140-1 name one of several language/DRC variants
            if numeric_suffix().is_match(&selector) {
                let prefix = selector.split('-').next().unwrap_or_default().to_string();
                selector = match request.format_language() {
                    Some(lang) => format!("ba[format_id~='^({prefix})'][language^={lang}]/ba/b"),
                    None => format!("{selector}/{prefix}"),
                };
            }
            ctx.args.opt("-f", selector);
        }

        ctx.args.flag("-x");

        let mut sort: Vec<String> = Vec::new();
        if self.prefs.get_bool(keys::USE_FORMAT_SORTING, false) {
            sort.push("hasaud".to_string());
        }

        // webm is not accepted cleanly by --audio-format
        let container = request.container.trim();
        let supported = self.catalog.string_array(Catalog::AUDIO_CONTAINERS);
        if !container.is_empty()
            && container != DEFAULT_CONTAINER
            && container != "webm"
            && supported.iter().any(|c| c == container)
        {
            ctx.args.opt("--audio-format", container);
            sort.push(format!("aext:{container}"));
        }

        if tier.is_worst() {
            sort.retain(|key| key != "size" && key != "+size");
            let mut ascending: Vec<String> = ASCENDING_SORT.iter().map(|k| k.to_string()).collect();
            ascending.append(&mut sort);
            sort = ascending;
        }
        if let Some(abr) = abr_sort {
            sort.insert(0, abr);
        }
        if request.has_cuts() {
            sort.insert(0, HTTPS_SORT.to_string());
        }
        if !sort.is_empty() {
            ctx.args.opt("-S", sort.join(","));
        }

        let download_dir = ctx.download_dir.clone();
        ctx.args.opt("-P", download_dir);

        if prefs.split_by_chapters && !request.has_cuts() {
            ctx.args.flag("--split-chapters");
            ctx.args.opt("-o", "chapter:%(section_title)s.%(ext)s");
        } else {
            if ctx.embed_metadata {
                ctx.metadata.flag("--embed-metadata");
            }

            if prefs.embed_thumb {
                ctx.metadata.flag("--embed-thumbnail");
                if !ctx.has_flag("--convert-thumbnails") {
                    ctx.metadata
                        .opt("--convert-thumbnails", ctx.thumbnail_format.as_str());
                }

                let crop = prefs
                    .crop_thumb
                    .unwrap_or_else(|| self.prefs.get_bool(keys::CROP_THUMBNAIL, true));
                if let Some(convertor) = thumbnail_convertor_args(&ctx.thumbnail_format, crop) {
                    ctx.args.opt("--ppa", convertor);
                }
            }

            ctx.push_output_template();
        }

        if !prefs.bitrate.trim().is_empty() {
            ctx.args.opt("--audio-quality", prefs.bitrate.trim());
        }
    }
}
