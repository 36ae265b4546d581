//! Page range parsing.
//!
//! Turns the user-supplied `--page` token into a normalized inclusive
//! interval of 1-based frame ordinals.

use crate::error::{Error, Result};

/// A normalized selection of frame ordinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRange {
    /// No range given: build the whole document.
    All,
    /// An inclusive 1-based interval, `first <= last` guaranteed.
    Span {
        /// First frame ordinal, at least 1.
        first: usize,
        /// Last frame ordinal, at least `first`.
        last: usize,
    },
}

impl PageRange {
    /// Whether this range selects the whole document.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Parse a page range token.
///
/// * `""` selects the whole document.
/// * `"5"` selects frame 5; `"0"` selects frame 1 (kept for compatibility
///   with older build scripts).
/// * `"3-7"` selects frames 3 through 7. The lower bound is floored at 1,
///   and an inverted interval collapses to the single lower frame rather
///   than an empty selection.
///
/// Anything that is not an integer in one of those forms fails with
/// [`Error::MalformedRange`]; the caller must surface that to the user
/// rather than defaulting silently.
pub fn parse(input: &str) -> Result<PageRange> {
    let s = input.trim();
    if s.is_empty() {
        return Ok(PageRange::All);
    }

    if let Some((left, right)) = s.split_once('-') {
        let a: i64 = left
            .trim()
            .parse()
            .map_err(|_| Error::malformed_range(input))?;
        let b: i64 = right
            .trim()
            .parse()
            .map_err(|_| Error::malformed_range(input))?;
        let first = usize::try_from(a.max(1)).unwrap_or(1);
        let last = usize::try_from(b).map_or(first, |b| b.max(first));
        return Ok(PageRange::Span { first, last });
    }

    let n: i64 = s.parse().map_err(|_| Error::malformed_range(input))?;
    // 0 historically meant "first frame"; negatives floor to it as well.
    let n = usize::try_from(n.max(1)).unwrap_or(1);
    Ok(PageRange::Span { first: n, last: n })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn empty_means_whole_document() {
        assert_eq!(parse("").unwrap(), PageRange::All);
        assert_eq!(parse("   ").unwrap(), PageRange::All);
    }

    #[test]
    fn single_frame() {
        assert_eq!(parse("5").unwrap(), PageRange::Span { first: 5, last: 5 });
    }

    #[test]
    fn zero_is_first_frame() {
        assert_eq!(parse("0").unwrap(), PageRange::Span { first: 1, last: 1 });
    }

    #[test]
    fn interval() {
        assert_eq!(parse("3-7").unwrap(), PageRange::Span { first: 3, last: 7 });
    }

    #[test]
    fn inverted_interval_collapses() {
        // "7-3" selects frame 7 only, never an empty range
        assert_eq!(parse("7-3").unwrap(), PageRange::Span { first: 7, last: 7 });
    }

    #[test]
    fn lower_bound_is_floored() {
        assert_eq!(parse("0-4").unwrap(), PageRange::Span { first: 1, last: 4 });
    }

    #[test]
    fn non_integer_is_rejected() {
        assert!(matches!(parse("abc"), Err(Error::MalformedRange { .. })));
        assert!(matches!(parse("3-x"), Err(Error::MalformedRange { .. })));
        assert!(matches!(parse("x-3"), Err(Error::MalformedRange { .. })));
    }

    #[test]
    fn whitespace_around_token_is_tolerated() {
        assert_eq!(parse(" 2-4 ").unwrap(), PageRange::Span { first: 2, last: 4 });
    }
}
