//! Page band maintenance.
//!
//! A page band is the fixed comment block placed immediately before each
//! frame, recording its 1-based ordinal:
//!
//! ```text
//! %@@PAGEBAND@@
//! % ----------------------------------------…
//! %   page 07
//! % ----------------------------------------…
//! \begin{frame}…
//! ```
//!
//! Refreshing is a strip-then-renumber rewrite: every existing band is
//! removed structurally (by shape, never by ordinal value), then one fresh
//! band is inserted per line-anchored `\begin{frame}`. Running the refresh
//! twice in a row is byte-for-byte idempotent.

// Allow unwrap for compile-time constant regex patterns in lazy_static blocks
#![allow(clippy::unwrap_used)]

use std::io::Write;
use std::path::Path;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::error::{Error, Result};

/// Start-tag line that opens every page band.
pub const BAND_TAG: &str = "%@@PAGEBAND@@";

/// Rule line body: 88 dashes, as wide as the templates' own separators.
const BAND_RULE: &str = "----------------------------------------------------------------------------------------";

lazy_static! {
    // A band is the exact start-tag line plus the immediately following
    // band-shaped comment lines (rules and page labels). Author comments
    // never match, so they survive the strip. The optional leading blank
    // line is the one insertion adds; consuming exactly one keeps the
    // rewrite idempotent without eating surrounding blank runs.
    static ref BAND_RE: Regex = Regex::new(
        r"(?m)(?:^[ \t]*\n)?^[ \t]*%@@PAGEBAND@@[ \t]*\n(?:[ \t]*%[ \t]*(?:-{4,}|page[ \t]+\d+)[ \t]*\n)*"
    )
    .unwrap();
    static ref FRAME_BEGIN_RE: Regex = Regex::new(r"(?m)^\\begin\{frame\}").unwrap();
}

/// Outcome of a band refresh against one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandStatus {
    /// The file changed and was rewritten.
    Rewritten {
        /// Number of frames annotated.
        frames: usize,
    },
    /// The file already carried current bands; nothing was written.
    AlreadyNormalized {
        /// Number of frames annotated.
        frames: usize,
    },
}

impl BandStatus {
    /// Number of frames the document carries.
    #[must_use]
    pub const fn frames(&self) -> usize {
        match self {
            Self::Rewritten { frames } | Self::AlreadyNormalized { frames } => *frames,
        }
    }
}

/// Strip every page band from the document, wherever located.
#[must_use]
pub fn strip(text: &str) -> String {
    BAND_RE.replace_all(text, "").into_owned()
}

/// Render the band for a given 1-based ordinal, with its leading separator.
fn band_for(ordinal: usize) -> String {
    format!("\n{BAND_TAG}\n% {BAND_RULE}\n%   page {ordinal:02}\n% {BAND_RULE}\n")
}

/// Strip stale bands and insert one fresh band per frame.
///
/// Returns the annotated text and the number of frames found. Stale,
/// duplicated, and orphaned bands are all removed first, so ordinals always
/// come out contiguous from 1 regardless of what the document carried.
#[must_use]
pub fn annotate(text: &str) -> (String, usize) {
    let cleaned = strip(text);
    let mut count = 0usize;
    let annotated = FRAME_BEGIN_RE.replace_all(&cleaned, |caps: &Captures<'_>| {
        count += 1;
        format!("{}{}", band_for(count), &caps[0])
    });
    (annotated.into_owned(), count)
}

/// Extract the ordinals of every band currently in the document.
///
/// Useful for verifying the contiguity invariant; refresh never reads these
/// values back.
#[must_use]
pub fn ordinals(text: &str) -> Vec<usize> {
    lazy_static! {
        static ref PAGE_LINE_RE: Regex =
            Regex::new(r"(?m)^[ \t]*%[ \t]*page[ \t]+(\d+)[ \t]*$").unwrap();
    }
    PAGE_LINE_RE
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

/// Refresh the bands of a source file on disk.
///
/// The rewrite goes through a temporary file in the same directory and an
/// atomic rename, so an interrupted run never leaves a half-written source.
/// When the annotated text equals what is already on disk, nothing is
/// written at all.
pub fn refresh_file(path: &Path) -> Result<BandStatus> {
    let original = fs_err::read_to_string(path)?;
    let (annotated, frames) = annotate(&original);

    if annotated == original {
        return Ok(BandStatus::AlreadyNormalized { frames });
    }

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = tempfile::NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))
        .map_err(|e| Error::io(e, path.to_path_buf()))?;
    tmp.write_all(annotated.as_bytes())
        .map_err(|e| Error::io(e, path.to_path_buf()))?;
    tmp.persist(path)
        .map_err(|e| Error::io(e.error, path.to_path_buf()))?;

    Ok(BandStatus::Rewritten { frames })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]

    use super::*;

    const DOC: &str = "\
% lecture 7\n\
\n\
\\begin{frame}{Intro}\n\
content A\n\
\\end{frame}\n\
prose between frames\n\
\\begin{frame}[fragile]{Code}\n\
content B\n\
\\end{frame}\n";

    #[test]
    fn annotate_numbers_every_frame() {
        let (out, frames) = annotate(DOC);
        assert_eq!(frames, 2);
        assert_eq!(out.matches(BAND_TAG).count(), 2);
        assert_eq!(ordinals(&out), vec![1, 2]);
    }

    #[test]
    fn annotate_is_idempotent() {
        let (once, _) = annotate(DOC);
        let (twice, _) = annotate(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn renumbers_after_frame_insertion() {
        let (once, _) = annotate(DOC);
        // A new first frame pushes the old ones down; ordinals must follow
        let edited = format!("\\begin{{frame}}{{New}}\nx\n\\end{{frame}}\n{once}");
        let (renumbered, frames) = annotate(&edited);
        assert_eq!(frames, 3);
        assert_eq!(ordinals(&renumbered), vec![1, 2, 3]);
    }

    #[test]
    fn strip_removes_orphan_bands() {
        let (once, _) = annotate(DOC);
        // Orphan the bands by deleting the frames below them
        let orphaned = once.replace("\\begin{frame}{Intro}\n", "");
        let stripped = strip(&orphaned);
        assert!(!stripped.contains(BAND_TAG));
    }

    #[test]
    fn strip_preserves_author_comments() {
        let doc = "% keep me\n\\begin{frame}{A}\nx\n\\end{frame}\n";
        let (out, _) = annotate(doc);
        assert!(out.contains("% keep me"));
        let (again, _) = annotate(&out);
        assert!(again.contains("% keep me"));
    }

    #[test]
    fn author_blank_lines_survive_the_round_trip() {
        let doc = "prose\n\n\n\\begin{frame}{A}\nx\n\\end{frame}\n";
        let (once, _) = annotate(doc);
        let (twice, _) = annotate(&once);
        assert_eq!(once, twice);
        assert_eq!(strip(&once), doc);
    }

    #[test]
    fn inline_begin_is_not_annotated() {
        // Band insertion is line-anchored, like the rest of the toolchain
        let doc = "see \\begin{frame} in prose\n\\begin{frame}{Real}\nx\n\\end{frame}\n";
        let (out, frames) = annotate(doc);
        assert_eq!(frames, 1);
        assert_eq!(out.matches(BAND_TAG).count(), 1);
    }

    #[test]
    fn ordinals_are_two_digit_padded() {
        let (out, _) = annotate(DOC);
        assert!(out.contains("%   page 01"));
        assert!(out.contains("%   page 02"));
    }

    #[test]
    fn refresh_file_reports_no_op_on_second_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.tex");
        fs_err::write(&path, DOC).unwrap();

        let first = refresh_file(&path).unwrap();
        assert_eq!(first, BandStatus::Rewritten { frames: 2 });

        let second = refresh_file(&path).unwrap();
        assert_eq!(second, BandStatus::AlreadyNormalized { frames: 2 });

        let on_disk = fs_err::read_to_string(&path).unwrap();
        assert_eq!(ordinals(&on_disk), vec![1, 2]);
    }

    #[test]
    fn refresh_file_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.tex");
        assert!(refresh_file(&missing).is_err());
    }
}
