//! Frame location and selection.
//!
//! A frame is one slide's markup unit, delimited by `\begin{frame}` and the
//! nearest following `\end{frame}`. The locator is a single forward pass over
//! the document; frames never nest, and a dangling or nested delimiter is a
//! diagnostic rather than a silent truncation.

use crate::error::{Error, Result};

/// Begin-of-frame delimiter.
pub const FRAME_BEGIN: &str = r"\begin{frame}";
/// End-of-frame delimiter.
pub const FRAME_END: &str = r"\end{frame}";

/// Half-open byte-offset span of one frame, both delimiters included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpan {
    /// Offset of the frame's `\begin{frame}`.
    pub start: usize,
    /// Offset just past the frame's `\end{frame}`.
    pub end: usize,
}

impl FrameSpan {
    /// The frame's original text, delimiters included.
    #[must_use]
    pub fn text<'a>(&self, document: &'a str) -> &'a str {
        &document[self.start..self.end]
    }
}

/// 1-based line number of a byte offset, for diagnostics.
fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

/// Locate every frame in the document, in document order.
///
/// Each returned span reproduces the frame verbatim via [`FrameSpan::text`],
/// including an option list or title argument after the begin delimiter.
/// Runs in linear time: the scan position only moves forward.
pub fn locate(text: &str) -> Result<Vec<FrameSpan>> {
    let mut spans = Vec::new();
    let mut pos = 0;
    let mut open: Option<usize> = None;

    loop {
        let next_begin = text[pos..].find(FRAME_BEGIN).map(|i| pos + i);
        let next_end = text[pos..].find(FRAME_END).map(|i| pos + i);

        match (open, next_begin, next_end) {
            // Outside a frame: the next marker must be a begin.
            (None, Some(b), Some(e)) if b < e => {
                open = Some(b);
                pos = b + FRAME_BEGIN.len();
            }
            (None, Some(b), None) => {
                open = Some(b);
                pos = b + FRAME_BEGIN.len();
            }
            (None, _, Some(e)) => {
                return Err(Error::UnmatchedMarker {
                    marker: FRAME_END,
                    line: line_of(text, e),
                });
            }
            (None, None, None) => return Ok(spans),

            // Inside a frame: the next marker must be the matching end.
            (Some(_), Some(b), Some(e)) if b < e => {
                return Err(Error::UnmatchedMarker {
                    marker: FRAME_BEGIN,
                    line: line_of(text, b),
                });
            }
            (Some(start), _, Some(e)) => {
                spans.push(FrameSpan {
                    start,
                    end: e + FRAME_END.len(),
                });
                open = None;
                pos = e + FRAME_END.len();
            }
            (Some(start), _, None) => {
                return Err(Error::UnmatchedMarker {
                    marker: FRAME_BEGIN,
                    line: line_of(text, start),
                });
            }
        }
    }
}

/// Extract the frames with ordinals in `first..=last` (1-based, inclusive).
///
/// Bounds are clamped to the document: `first` is floored at 1 and `last`
/// capped at the frame count. A range that falls entirely outside the
/// document yields an empty string; deciding what to build instead is the
/// caller's policy. Selected frames are joined by exactly one blank line,
/// each frame's own formatting untouched.
pub fn select(text: &str, first: usize, last: usize) -> Result<String> {
    let spans = locate(text)?;
    if spans.is_empty() {
        return Ok(String::new());
    }

    let first = first.max(1);
    let last = last.min(spans.len());
    if first > last {
        return Ok(String::new());
    }

    Ok(spans[first - 1..last]
        .iter()
        .map(|span| span.text(text))
        .collect::<Vec<_>>()
        .join("\n\n"))
}
