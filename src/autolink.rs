use core::ops::Range;
use std::borrow::Cow;

use tracing::trace;

use crate::{AhoCorasick, ConfigurationError};

/// Scheme prefixes recognized by [`AutoLink::new`].
pub const DEFAULT_SCHEMES: [&str; 5] = ["http://", "https://", "ftp://", "mailto:", "www."];

/// Replaces URIs in plain text with HTML links.
///
/// The input is assumed to be raw text, not HTML. Trailing punctuation is kept
/// out of each link while parentheses that belong to the URI are kept in.
#[derive(Debug, Clone)]
pub struct AutoLink {
    schemes: AhoCorasick,
}

impl AutoLink {
    /// Recognize [`DEFAULT_SCHEMES`].
    pub fn new() -> Self {
        Self {
            schemes: AhoCorasick::build(DEFAULT_SCHEMES.map(String::from).to_vec()),
        }
    }

    /// Recognize exactly `schemes`.
    ///
    /// Only ASCII letters compare case-insensitively; `é` and `É` are
    /// different schemes.
    ///
    /// # Errors
    ///
    /// Fails if `schemes` is empty or contains an empty string.
    pub fn with_schemes<I, S>(schemes: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            schemes: AhoCorasick::new(schemes)?,
        })
    }

    pub fn schemes(&self) -> impl ExactSizeIterator<Item = &str> {
        self.schemes.patterns()
    }

    /// Replace every URI in `text` with `<a href="URL">URI</a>`.
    ///
    /// `URL` is the URI itself, or `http://` followed by the URI when it starts
    /// with `www.`.
    pub fn link<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.link_with(text, default_replace)
    }

    /// Replace every URI in `text` with the output of `replace`.
    ///
    /// `replace` receives the URI exactly as it appears in `text`. Its output
    /// is inserted as is.
    pub fn link_with<'t, F>(&self, text: &'t str, mut replace: F) -> Cow<'t, str>
    where
        F: FnMut(&str) -> String,
    {
        let mut spans = self.links(text).peekable();
        if spans.peek().is_none() {
            return Cow::Borrowed(text);
        }

        let mut result = String::with_capacity(text.len());
        let mut last = 0;
        for span in spans {
            result.push_str(&text[last..span.start]);
            result.push_str(&replace(&text[span.clone()]));
            last = span.end;
        }
        result.push_str(&text[last..]);
        Cow::Owned(result)
    }

    /// Byte ranges of the URIs in `text`, left to right.
    pub fn links<'a, 't>(&'a self, text: &'t str) -> Links<'a, 't> {
        Links {
            schemes: &self.schemes,
            text,
            at: 0,
        }
    }
}

impl Default for AutoLink {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over URI spans returned by [`AutoLink::links`].
#[derive(Debug, Clone)]
pub struct Links<'a, 't> {
    schemes: &'a AhoCorasick,
    text: &'t str,
    at: usize,
}

impl Iterator for Links<'_, '_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = &self.text[self.at..];
            if rest.trim_start().is_empty() {
                return None;
            }
            let found = self.schemes.find(rest)?;
            let start = self.at + found.start();
            let end = find_end(self.text, start);
            if end == start {
                // Nothing URI-like follows the scheme; leave it as text.
                self.at += found.end();
                continue;
            }
            trace!(start, end, scheme = found.pattern(), "found link");
            self.at = end;
            return Some(start..end);
        }
    }
}

fn default_replace(uri: &str) -> String {
    let is_www = uri
        .as_bytes()
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(b"www."));
    if is_www {
        format!(r#"<a href="http://{uri}">{uri}</a>"#)
    } else {
        format!(r#"<a href="{uri}">{uri}</a>"#)
    }
}

/// Return the end of the URI starting at `start`.
///
/// Every URI character is ASCII, so the result is always a char boundary.
fn find_end(text: &str, start: usize) -> usize {
    let bytes = text.as_bytes();
    let mut parens: isize = 0;
    let mut end = start;

    // skip over URI characters, counting parens
    while let Some(&c) = bytes.get(end) {
        if !is_uri_char(c) {
            break;
        }
        match c {
            b'(' => parens += 1,
            b')' => parens -= 1,
            _ => {}
        }
        end += 1;
    }

    // trim punctuation and unbalanced closing parens
    while end > start {
        let c = bytes[end - 1];
        if parens < 0 && c == b')' {
            parens += 1;
        } else if !is_punctuation(c) {
            break;
        }
        end -= 1;
    }

    end
}

fn is_punctuation(c: u8) -> bool {
    matches!(c, b'!' | b'?' | b'.' | b':' | b';' | b',' | b']')
}

fn is_uri_char(c: u8) -> bool {
    matches!(
        c,
        b'a'..=b'z' | b'?'..=b'[' | b'#'..=b';' | b'!' | b'=' | b'_' | b'~' | b']'
    )
}
