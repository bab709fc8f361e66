//! Release-date rewriting for build recipes.
//!
//! A recipe pins its base image by release date, in two spellings:
//!
//! - compact: `FROM debian:bookworm-20230101` (a run of exactly 8 digits)
//! - ISO: `# Based on the 2023-01-01 release` (`YYYY-MM-DD`)
//!
//! [`rewrite`] replaces every such token with the new date and leaves all
//! other text untouched. A digit run longer or shorter than 8 (digests, port
//! numbers, versions) is not a date token.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use relsync_core::ReleaseDate;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit run pattern is valid"));

static DASHED_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:-[0-9]+)+").expect("dashed digits pattern is valid"));

/// Rewrite every embedded release date in `text` to `date`.
///
/// Idempotent: applying it twice with the same date gives the same text.
/// Text without date tokens comes back unchanged.
///
/// ```
/// use relsync_build::recipe::rewrite;
/// use relsync_core::ReleaseDate;
///
/// let date = ReleaseDate::parse("20230612").unwrap();
/// let text = "FROM debian:20230101\n# 2023-01-01";
/// assert_eq!(rewrite(text, &date), "FROM debian:20230612\n# 2023-06-12");
/// ```
pub fn rewrite(text: &str, date: &ReleaseDate) -> String {
    let compact = date.compact();
    let iso = date.iso();

    let text = DIGIT_RUN.replace_all(text, |caps: &Captures<'_>| {
        let run = &caps[0];
        if run.len() == 8 {
            compact.clone()
        } else {
            run.to_owned()
        }
    });

    DASHED_DIGITS
        .replace_all(&text, |caps: &Captures<'_>| rewrite_dashed(&caps[0], &iso))
        .into_owned()
}

/// Replace each `4-2-2` group inside a dash-separated digit chain.
fn rewrite_dashed(chain: &str, iso: &str) -> String {
    let parts: Vec<&str> = chain.split('-').collect();
    let mut out: Vec<&str> = Vec::with_capacity(parts.len());
    let mut rest = parts.as_slice();
    while !rest.is_empty() {
        match rest {
            [y, m, d, tail @ ..] if y.len() == 4 && m.len() == 2 && d.len() == 2 => {
                out.push(iso);
                rest = tail;
            }
            [part, tail @ ..] => {
                out.push(part);
                rest = tail;
            }
            [] => break,
        }
    }
    out.join("-")
}

/// Normalize CRLF and lone CR line endings to LF.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// A recipe file loaded into memory.
#[derive(Debug, Clone)]
pub struct RecipeDocument {
    path: PathBuf,
    content: String,
}

impl RecipeDocument {
    pub fn load(path: &Path) -> Result<Self, RecipeError> {
        let content = std::fs::read_to_string(path).map_err(|e| RecipeError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Rewrite the in-memory content; returns whether any token changed.
    pub fn rewrite(&mut self, date: &ReleaseDate) -> bool {
        let rewritten = rewrite(&self.content, date);
        let changed = rewritten != self.content;
        if changed {
            tracing::debug!(path = %self.path.display(), date = %date, "recipe dates rewritten");
            self.content = rewritten;
        }
        changed
    }

    /// Write the content back with normalized line endings.
    pub fn store(&self) -> Result<(), RecipeError> {
        write_normalized(&self.path, &self.content)
    }
}

/// Overwrite `path` with `content`, line endings normalized to LF.
pub fn write_normalized(path: &Path, content: &str) -> Result<(), RecipeError> {
    std::fs::write(path, normalize_line_endings(content)).map_err(|e| RecipeError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error("failed to read recipe at {path}")]
    Read {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write recipe at {path}")]
    Write {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}
