//! Frame title listing.
//!
//! Scans a source document for slide titles, either inline on the begin
//! delimiter (`\begin{frame}[…]{Title}`) or as a separate `\frametitle{…}`.
//! Formatting macros that would clutter a plain-text listing (`\texttt`,
//! emoji commands) are unwrapped or dropped.

// Allow unwrap for compile-time constant regex patterns in lazy_static blocks
#![allow(clippy::unwrap_used)]

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BEGIN_TITLE_RE: Regex =
        Regex::new(r"\\begin\{frame\}(?:\[[^\]]*\])?\{(.*?)\}").unwrap();
    static ref FRAMETITLE_RE: Regex = Regex::new(r"\\frametitle\{(.*?)\}").unwrap();
    static ref TEXTTT_RE: Regex = Regex::new(r"\\texttt\{([^}]*)\}").unwrap();
    static ref EMOJI_RE: Regex = Regex::new(r"\\emj[a-zA-Z]+").unwrap();
}

/// One discovered slide title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTitle {
    /// 1-based discovery order.
    pub ordinal: usize,
    /// Cleaned title text.
    pub title: String,
}

/// Strip listing-hostile markup from a captured title.
fn clean(raw: &str) -> String {
    let without_emoji = EMOJI_RE.replace_all(raw, "");
    without_emoji.replace('\\', "").trim().to_string()
}

/// List every frame title in the document, in order.
///
/// Line-based scan. `\texttt{…}` is unwrapped before the title is captured:
/// the title capture is non-greedy up to the first closing brace, so inner
/// brace groups have to go first.
#[must_use]
pub fn list_titles(text: &str) -> Vec<FrameTitle> {
    let mut titles = Vec::new();
    for line in text.lines() {
        let line = TEXTTT_RE.replace_all(line, "$1");
        let raw = if let Some(caps) = BEGIN_TITLE_RE.captures(&line) {
            caps.get(1).map(|m| m.as_str())
        } else {
            FRAMETITLE_RE.captures(&line).and_then(|caps| caps.get(1)).map(|m| m.as_str())
        };
        if let Some(raw) = raw {
            titles.push(FrameTitle {
                ordinal: titles.len() + 1,
                title: clean(raw),
            });
        }
    }
    titles
}
