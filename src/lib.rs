//! Replace URIs in plain text with links.
//!
//! Candidate URIs are located by their scheme prefix (`http://`, `www.`, ...)
//! using a case-insensitive [Aho-Corasick](ahocorasick::AhoCorasick)
//! automaton. The end of each URI is then found by scanning URI characters,
//! trimming trailing sentence punctuation and keeping parentheses that belong
//! to the URI itself.
//!
//! ```
//! use autolink::AutoLink;
//!
//! let text = "Check it out at Wikipedia (http://en.wikipedia.org/wiki/Link_(film)).";
//! assert_eq!(
//!     AutoLink::new().link(text),
//!     "Check it out at Wikipedia (<a href=\"http://en.wikipedia.org/wiki/Link_(film)\">\
//!      http://en.wikipedia.org/wiki/Link_(film)</a>).",
//! );
//! ```

pub mod ahocorasick;
pub mod autolink;
mod error;

use core::ops::Range;

pub use crate::ahocorasick::{AhoCorasick, Matches};
pub use crate::autolink::{AutoLink, DEFAULT_SCHEMES, Links};
pub use crate::error::ConfigurationError;

/// A completed occurrence of a pattern within some text.
///
/// `start` and `end` are byte offsets, and `text[start..end]` equals the
/// pattern up to ASCII case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    pattern: &'a str,
    pattern_id: usize,
    start: usize,
    end: usize,
}

impl<'a> Match<'a> {
    pub(crate) fn new(pattern: &'a str, pattern_id: usize, end: usize) -> Self {
        Self {
            pattern,
            pattern_id,
            start: end - pattern.len(),
            end,
        }
    }

    /// The pattern as it was supplied to the automaton.
    pub fn pattern(&self) -> &'a str {
        self.pattern
    }

    /// Insertion index of the pattern.
    pub fn pattern_id(&self) -> usize {
        self.pattern_id
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Index of the first byte after the match.
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}
