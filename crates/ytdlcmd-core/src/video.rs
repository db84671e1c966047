//! Video downloads: stream pairing, containers, subtitles and live streams.

use crate::builder::{BuildContext, CommandBuilder};
use crate::keys;
use crate::providers::{Catalog, ConfigAccessor, OptionCatalog, PathResolver};
use crate::quality::{QualityTier, ASCENDING_SORT, HTTPS_SORT};
use crate::request::{VideoPreferences, DEFAULT_CONTAINER};

/// Containers `--recode-video` cannot produce.
const NO_RECODE: &[&str] = &["avi"];

/// Containers that cannot carry an embedded thumbnail.
const NO_THUMBNAIL: &[&str] = &["webm", "avi", "flv", "gif"];

const DEFAULT_SUB_LANGS: &str = "en.*,.*-orig";

impl<C, P, O> CommandBuilder<C, P, O>
where
    C: ConfigAccessor,
    P: PathResolver,
    O: OptionCatalog,
{
    pub(crate) fn build_video(&self, ctx: &mut BuildContext<'_>, prefs: &VideoPreferences) {
        let request = ctx.request;

        if prefs.add_chapters {
            if self.prefs.get_bool(keys::USE_SPONSORBLOCK, true) {
                ctx.args.opt("--sponsorblock-mark", "all");
            }
            ctx.args.flag("--embed-chapters");
        }

        let container = request.container.trim();
        let supported = self.catalog.string_array(Catalog::VIDEO_CONTAINERS);
        if !container.is_empty()
            && container != DEFAULT_CONTAINER
            && supported.iter().any(|c| c == container)
        {
            let container = container.to_lowercase();
            if prefs.recode_video && !NO_RECODE.contains(&container.as_str()) {
                ctx.args.opt("--recode-video", container.as_str());
            } else if prefs.compatibility_mode {
                ctx.args.opt("--recode-video", "mp4");
                ctx.args.opt("--merge-output-format", "mp4/mkv");
            } else {
                ctx.args.opt("--merge-output-format", container.as_str());
            }

            if prefs.embed_thumbnail && !NO_THUMBNAIL.contains(&container.as_str()) {
                ctx.metadata.flag("--embed-thumbnail");
                if !ctx.has_flag("--convert-thumbnails") {
                    ctx.args
                        .opt("--convert-thumbnails", ctx.thumbnail_format.as_str());
                }
            }
        }

        let tier = QualityTier::classify(&request.format.format_id, &self.catalog);
        let video = tier.video_selector();
        let audio = if prefs.remove_audio {
            String::new()
        } else {
            let ids: Vec<&str> = prefs
                .audio_format_ids
                .iter()
                .map(|id| id.trim())
                .filter(|id| !id.is_empty())
                .collect();
            if ids.is_empty() {
                "ba".to_string()
            } else {
                ids.join("+")
            }
        };
        let selector = if audio.is_empty() {
            format!("{video}/bv/b")
        } else {
            format!("{video}+{audio}/{video}+ba/{video}/b")
        };

        let mut sort: Vec<String> = Vec::new();
        if tier.is_worst() {
            sort.extend(ASCENDING_SORT.iter().map(|k| k.to_string()));
        }
        if request.has_cuts() {
            sort.insert(0, HTTPS_SORT.to_string());
        }
        if !sort.is_empty() {
            ctx.args.opt("-S", sort.join(","));
        }
        ctx.args.opt("-f", selector);

        self.push_subtitle_options(ctx, prefs);

        if prefs.remove_audio && container != "gif" {
            ctx.args.opt("--use-postprocessor", "FFmpegCopyStream");
            ctx.args.opt("--ppa", "CopyStream:-c copy -an");
        }

        let download_dir = ctx.download_dir.clone();
        ctx.args.opt("-P", download_dir);

        if prefs.split_by_chapters && !request.has_cuts() {
            ctx.args.flag("--split-chapters");
            ctx.args
                .opt("-o", "chapter:%(section_number)d - %(section_title)s.%(ext)s");
        } else {
            ctx.push_output_template();
        }

        if prefs.live_from_start {
            ctx.args.flag("--live-from-start");
        }
        if prefs.wait_for_video_minutes > 0 {
            let seconds = u64::from(prefs.wait_for_video_minutes) * 60;
            ctx.args.opt("--wait-for-video", seconds.to_string());
        }
    }

    fn push_subtitle_options(&self, ctx: &mut BuildContext<'_>, prefs: &VideoPreferences) {
        if prefs.write_subs {
            ctx.args.flag("--write-subs");
        }
        if prefs.write_auto_subs {
            ctx.args.flag("--write-auto-subs");
        }

        let writes = prefs.write_subs || prefs.write_auto_subs;
        if prefs.embed_subs {
            if writes && self.prefs.get_bool(keys::NO_KEEP_SUBS, false) {
                ctx.args.opt("--compat-options", "no-keep-subs");
            }
            ctx.args.flag("--embed-subs");
        }

        if prefs.embed_subs || writes {
            let sub_format = self.prefs.get_string(keys::SUB_FORMAT, "");
            let sub_format = sub_format.trim();
            if !sub_format.is_empty() {
                ctx.args.opt("--sub-format", format!("{sub_format}/best"));
                ctx.args.opt("--convert-subtitles", sub_format);
            }

            let langs = prefs.subs_languages.trim();
            let langs = if langs.is_empty() { DEFAULT_SUB_LANGS } else { langs };
            ctx.args.opt("--sub-langs", langs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn video(prefs: VideoPreferences) -> DownloadRequest {
        DownloadRequest {
            payload: Payload::Video(prefs),
            ..video_request("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        }
    }

    fn with_container(container: &str, prefs: VideoPreferences) -> DownloadRequest {
        DownloadRequest {
            container: container.to_string(),
            ..video(prefs)
        }
    }

    #[test]
    fn test_avi_is_never_recoded() {
        let request = with_container(
            "avi",
            VideoPreferences {
                recode_video: true,
                ..Default::default()
            },
        );
        let built = builder(Preferences::new()).build(&request);

        assert!(!built.options.contains_flag("--recode-video"));
        assert_eq!(built.options.value("--merge-output-format"), Some("avi"));
    }

    #[test]
    fn test_recode_supported_container() {
        let request = with_container(
            "mkv",
            VideoPreferences {
                recode_video: true,
                ..Default::default()
            },
        );
        let built = builder(Preferences::new()).build(&request);

        assert_eq!(built.options.value("--recode-video"), Some("mkv"));
        assert!(!built.options.contains_flag("--merge-output-format"));
    }

    #[test]
    fn test_compatibility_mode_forces_mp4() {
        let request = with_container(
            "webm",
            VideoPreferences {
                compatibility_mode: true,
                ..Default::default()
            },
        );
        let built = builder(Preferences::new()).build(&request);

        assert_eq!(built.options.value("--recode-video"), Some("mp4"));
        assert_eq!(built.options.value("--merge-output-format"), Some("mp4/mkv"));
    }

    #[test]
    fn test_default_and_unknown_containers_emit_no_conversion() {
        for container in ["Default", "", "ogv"] {
            let request = with_container(
                container,
                VideoPreferences {
                    recode_video: true,
                    embed_thumbnail: true,
                    ..Default::default()
                },
            );
            let built = builder(Preferences::new()).build(&request);

            for flag in ["--recode-video", "--merge-output-format", "--audio-format", "--embed-thumbnail"] {
                assert!(!built.options.contains_flag(flag), "{flag} with {container:?}");
            }
        }
    }

    #[test]
    fn test_thumbnail_embedding_depends_on_container() {
        let prefs = VideoPreferences {
            embed_thumbnail: true,
            ..Default::default()
        };

        let built = builder(Preferences::new()).build(&with_container("mp4", prefs.clone()));
        assert!(built.options.contains_flag("--embed-thumbnail"));
        assert_eq!(built.options.value("--convert-thumbnails"), Some("jpg"));
        assert!(built.options.position("--embed-thumbnail") > built.options.position("-P"));

        let built = builder(Preferences::new()).build(&with_container("webm", prefs));
        assert!(!built.options.contains_flag("--embed-thumbnail"));
        assert!(!built.options.contains_flag("--convert-thumbnails"));
    }

    #[test]
    fn test_saved_and_embedded_thumbnail_convert_once() {
        let request = DownloadRequest {
            save_thumbnail: true,
            ..with_container(
                "mkv",
                VideoPreferences {
                    embed_thumbnail: true,
                    ..Default::default()
                },
            )
        };
        let built = builder(Preferences::new().with(keys::THUMBNAIL_FORMAT, "png")).build(&request);

        assert_eq!(built.options.count("--convert-thumbnails"), 1);
        assert_eq!(built.options.value("--convert-thumbnails"), Some("png"));
        assert!(built.options.contains_flag("--embed-thumbnail"));
    }

    #[test]
    fn test_format_pairing() {
        let request = DownloadRequest {
            format: Format {
                format_id: "137".to_string(),
                ..Default::default()
            },
            ..video(VideoPreferences {
                audio_format_ids: vec!["140".to_string(), "251".to_string()],
                ..Default::default()
            })
        };
        let built = builder(Preferences::new()).build(&request);
        assert_eq!(built.options.value("-f"), Some("137+140+251/137+ba/137/b"));
    }

    #[test]
    fn test_generic_tiers_pair_with_best_audio() {
        let cases = [
            ("", "bv+ba/bv+ba/bv/b"),
            ("best", "bv+ba/bv+ba/bv/b"),
            ("Best Quality", "bv+ba/bv+ba/bv/b"),
            ("720p_ytdlnisgeneric", "bv[height<=720]+ba/bv[height<=720]+ba/bv[height<=720]/b"),
        ];
        for (id, expected) in cases {
            let request = DownloadRequest {
                format: Format {
                    format_id: id.to_string(),
                    ..Default::default()
                },
                ..video(VideoPreferences::default())
            };
            let built = builder(Preferences::new()).build(&request);
            assert_eq!(built.options.value("-f"), Some(expected), "{id:?}");
        }
    }

    #[test]
    fn test_worst_sorts_ascending() {
        let request = DownloadRequest {
            format: Format {
                format_id: "worst".to_string(),
                ..Default::default()
            },
            download_sections: "0:10-0:20 intro".to_string(),
            ..video(VideoPreferences::default())
        };
        let built = builder(Preferences::new()).build(&request);

        assert_eq!(built.options.value("-f"), Some("bv+ba/bv+ba/bv/b"));
        assert_eq!(built.options.value("-S"), Some("proto:https,+br,+res,+fps"));
        assert!(built.options.position("-S") < built.options.position("-f"));
    }

    #[test]
    fn test_remove_audio() {
        let request = DownloadRequest {
            format: Format {
                format_id: "137".to_string(),
                ..Default::default()
            },
            ..with_container(
                "mp4",
                VideoPreferences {
                    remove_audio: true,
                    audio_format_ids: vec!["140".to_string()],
                    ..Default::default()
                },
            )
        };
        let built = builder(Preferences::new()).build(&request);

        assert_eq!(built.options.value("-f"), Some("137/bv/b"));
        assert_eq!(built.options.value("--use-postprocessor"), Some("FFmpegCopyStream"));
        assert_eq!(built.options.value("--ppa"), Some("CopyStream:-c copy -an"));

        let gif = DownloadRequest {
            container: "gif".to_string(),
            ..request
        };
        let built = builder(Preferences::new()).build(&gif);
        assert!(!built.options.contains_flag("--use-postprocessor"));
    }

    #[test]
    fn test_subtitles() {
        let prefs = VideoPreferences {
            write_subs: true,
            embed_subs: true,
            ..Default::default()
        };

        let built = builder(
            Preferences::new()
                .with(keys::NO_KEEP_SUBS, true)
                .with(keys::SUB_FORMAT, "srt"),
        )
        .build(&video(prefs.clone()));
        assert!(built.options.contains_flag("--write-subs"));
        assert_eq!(built.options.value("--compat-options"), Some("no-keep-subs"));
        assert!(built.options.contains_flag("--embed-subs"));
        assert_eq!(built.options.value("--sub-format"), Some("srt/best"));
        assert_eq!(built.options.value("--convert-subtitles"), Some("srt"));
        assert_eq!(built.options.value("--sub-langs"), Some("en.*,.*-orig"));

        let built = builder(Preferences::new()).build(&video(VideoPreferences {
            subs_languages: "de,fr".to_string(),
            ..prefs
        }));
        assert!(!built.options.contains_flag("--compat-options"));
        assert!(!built.options.contains_flag("--sub-format"));
        assert_eq!(built.options.value("--sub-langs"), Some("de,fr"));
    }

    #[test]
    fn test_embed_only_keeps_subs() {
        let built = builder(Preferences::new().with(keys::NO_KEEP_SUBS, true)).build(&video(
            VideoPreferences {
                embed_subs: true,
                ..Default::default()
            },
        ));
        assert!(!built.options.contains_flag("--compat-options"));
        assert!(built.options.contains_flag("--embed-subs"));
    }

    #[test]
    fn test_no_subtitle_options_by_default() {
        let built = builder(Preferences::new()).build(&video(VideoPreferences::default()));
        assert!(!built.options.contains_flag("--sub-langs"));
        assert!(!built.options.contains_flag("--embed-subs"));
    }

    #[test]
    fn test_chapters() {
        let prefs = VideoPreferences {
            add_chapters: true,
            ..Default::default()
        };
        let built = builder(Preferences::new()).build(&video(prefs.clone()));
        assert_eq!(built.options.value("--sponsorblock-mark"), Some("all"));
        assert!(built.options.contains_flag("--embed-chapters"));

        let built = builder(Preferences::new().with(keys::USE_SPONSORBLOCK, false)).build(&video(prefs));
        assert!(!built.options.contains_flag("--sponsorblock-mark"));
        assert!(built.options.contains_flag("--embed-chapters"));
    }

    #[test]
    fn test_split_by_chapters() {
        let prefs = VideoPreferences {
            split_by_chapters: true,
            ..Default::default()
        };
        let built = builder(Preferences::new()).build(&video(prefs.clone()));
        assert!(built.options.contains_flag("--split-chapters"));
        assert_eq!(
            built.options.value("-o"),
            Some("chapter:%(section_number)d - %(section_title)s.%(ext)s")
        );

        let cut = DownloadRequest {
            download_sections: "0:10-0:20 intro".to_string(),
            custom_file_name_template: "%(title)s.%(ext)s".to_string(),
            ..video(prefs)
        };
        let built = builder(Preferences::new()).build(&cut);
        assert!(!built.options.contains_flag("--split-chapters"));
        assert_eq!(built.options.value("-o"), Some("%(title)s.%(ext)s"));
    }

    #[test]
    fn test_live_options() {
        let built = builder(Preferences::new()).build(&video(VideoPreferences {
            live_from_start: true,
            wait_for_video_minutes: 5,
            ..Default::default()
        }));
        assert!(built.options.contains_flag("--live-from-start"));
        assert_eq!(built.options.value("--wait-for-video"), Some("300"));

        let built = builder(Preferences::new()).build(&video(VideoPreferences::default()));
        assert!(!built.options.contains_flag("--live-from-start"));
        assert!(!built.options.contains_flag("--wait-for-video"));
    }
}
