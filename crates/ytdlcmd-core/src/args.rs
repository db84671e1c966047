//! Ordered yt-dlp option list and its config-file text form.
//!
//! yt-dlp reads `--config-locations` files with POSIX shell-like splitting,
//! so only its quoting rules matter here, not the host shell's.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// A flag followed by zero or more values
    Option { flag: String, values: Vec<String> },
    /// User-supplied text written verbatim
    Raw(String),
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Option { flag, values } => {
                write!(f, "{flag}")?;
                for value in values {
                    write!(f, " {}", quote(value))?;
                }
                Ok(())
            }
            Arg::Raw(text) => write!(f, "{text}"),
        }
    }
}

/// Append-only option list. Order is preserved because later occurrences
/// of some yt-dlp flags override earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs {
    args: Vec<Arg>,
}

impl CommandArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flag(&mut self, flag: &str) -> &mut Self {
        self.args.push(Arg::Option {
            flag: flag.to_string(),
            values: Vec::new(),
        });
        self
    }

    pub fn opt(&mut self, flag: &str, value: impl Into<String>) -> &mut Self {
        self.args.push(Arg::Option {
            flag: flag.to_string(),
            values: vec![value.into()],
        });
        self
    }

    pub fn opt_values<I, S>(&mut self, flag: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.push(Arg::Option {
            flag: flag.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn raw(&mut self, text: impl Into<String>) -> &mut Self {
        self.args.push(Arg::Raw(text.into()));
        self
    }

    pub fn append(&mut self, other: CommandArgs) {
        self.args.extend(other.args);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arg> {
        self.args.iter()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// True if `flag` was emitted, either structured or inside raw text.
    pub fn contains_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|arg| match arg {
            Arg::Option { flag: f, .. } => f == flag,
            Arg::Raw(text) => tokenize(text).iter().any(|t| t == flag),
        })
    }

    /// True if any emitted flag starts with `prefix`.
    pub fn mentions(&self, prefix: &str) -> bool {
        self.args.iter().any(|arg| match arg {
            Arg::Option { flag, .. } => flag.starts_with(prefix),
            Arg::Raw(text) => text.contains(prefix),
        })
    }

    /// Number of structured occurrences of `flag`.
    pub fn count(&self, flag: &str) -> usize {
        self.args
            .iter()
            .filter(|arg| matches!(arg, Arg::Option { flag: f, .. } if f == flag))
            .count()
    }

    /// First value of the first structured occurrence of `flag`.
    pub fn value(&self, flag: &str) -> Option<&str> {
        self.values(flag).into_iter().next()
    }

    /// First value of every structured occurrence of `flag`, in order.
    pub fn values(&self, flag: &str) -> Vec<&str> {
        self.args
            .iter()
            .filter_map(|arg| match arg {
                Arg::Option { flag: f, values } if f == flag => {
                    values.first().map(String::as_str)
                }
                _ => None,
            })
            .collect()
    }

    /// Position of the first structured occurrence of `flag`.
    pub fn position(&self, flag: &str) -> Option<usize> {
        self.args
            .iter()
            .position(|arg| matches!(arg, Arg::Option { flag: f, .. } if f == flag))
    }

    /// Logical tokens as yt-dlp will see them after reading the config file.
    pub fn tokens(&self) -> Vec<String> {
        self.args
            .iter()
            .flat_map(|arg| match arg {
                Arg::Option { flag, values } => std::iter::once(flag.clone())
                    .chain(values.iter().cloned())
                    .collect::<Vec<_>>(),
                Arg::Raw(text) => tokenize(text),
            })
            .collect()
    }

    /// Config-file text: one option (with its values) per line.
    pub fn to_config_text(&self) -> String {
        let mut text = String::new();
        for arg in &self.args {
            text.push_str(&arg.to_string());
            text.push('\n');
        }
        text
    }
}

/// Wrap a value in double quotes, escaping `\` and `"`.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Split config text into tokens the way yt-dlp does: whitespace separates
/// tokens, `'…'` is literal, `"…"` honours `\"` and `\\`, a bare backslash
/// escapes the next character, and `#` at the start of a token comments out
/// the rest of the line.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '#' if !in_token => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        break;
                    }
                }
            }
            '\'' => {
                in_token = true;
                for inner in chars.by_ref() {
                    if inner == '\'' {
                        break;
                    }
                    current.push(inner);
                }
            }
            '"' => {
                in_token = true;
                while let Some(inner) = chars.next() {
                    match inner {
                        '"' => break,
                        '\\' => match chars.peek() {
                            Some(&next) if next == '"' || next == '\\' => {
                                current.push(next);
                                chars.next();
                            }
                            _ => current.push('\\'),
                        },
                        _ => current.push(inner),
                    }
                }
            }
            '\\' => {
                in_token = true;
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            _ => {
                in_token = true;
                current.push(c);
            }
        }
    }

    if in_token {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_are_quoted() {
        let mut args = CommandArgs::new();
        args.flag("--newline")
            .opt("-f", "ba/b")
            .opt("--print", "after_move:'%(filepath,_filename)s'");

        assert_eq!(
            args.to_config_text(),
            "--newline\n-f \"ba/b\"\n--print \"after_move:'%(filepath,_filename)s'\"\n"
        );
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote(r#"A "B""#), r#""A \"B\"""#);
        assert_eq!(quote(r"C:\dir"), r#""C:\\dir""#);
    }

    #[test]
    fn test_tokenize_shell_like() {
        assert_eq!(
            tokenize(r#"--ppa "CopyStream:-c copy -an" -o 'a b' x\ y"#),
            vec!["--ppa", "CopyStream:-c copy -an", "-o", "a b", "x y"]
        );
        assert_eq!(tokenize(r#"--title """#), vec!["--title", ""]);
        assert_eq!(tokenize("-4 # force ipv4\n--newline"), vec!["-4", "--newline"]);
        assert_eq!(tokenize(r#""keep \n as is""#), vec![r"keep \n as is"]);
    }

    #[test]
    fn test_config_text_is_lossless() {
        let mut args = CommandArgs::new();
        args.opt_values("--replace-in-metadata", ["title", "^.*$", r#"A \"Quoted\" Title"#])
            .opt("-P", r"C:\Users\me\Music")
            .opt("--ppa", r#"ThumbnailsConvertor:-vf crop="'if(gt(ih,iw),iw,ih)'""#)
            .raw("--verbose --cache-dir \"/tmp/my cache\"");

        assert_eq!(tokenize(&args.to_config_text()), args.tokens());
    }

    #[test]
    fn test_lookups() {
        let mut args = CommandArgs::new();
        args.opt("--download-sections", "*0:10-0:20")
            .opt("--download-sections", "*1:00-1:30")
            .raw("--embed-subs --sponsorblock-mark all");

        assert_eq!(args.count("--download-sections"), 2);
        assert_eq!(args.values("--download-sections"), vec!["*0:10-0:20", "*1:00-1:30"]);
        assert!(args.contains_flag("--embed-subs"));
        assert!(!args.contains_flag("--embed"));
        assert!(args.mentions("--sponsorblock"));
        assert_eq!(args.position("--download-sections"), Some(0));
    }
}
