use core::fmt;
use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::{ConfigurationError, Match};

const FAIL: usize = 0;
const START: usize = 1;

/// Automaton node.
#[derive(Clone)]
struct Node {
    /// Ids of the patterns that end at this node, ascending.
    matches: Vec<usize>,
    /// Transitions on ASCII-lowercased bytes.
    transitions: [usize; 256],
    /// Fail transition id.
    fail: usize,
}

/// Multi-pattern matcher with ASCII case-insensitive comparison.
///
/// [`search`](Self::search) reports every occurrence of every pattern, ordered
/// by end offset and then by pattern insertion order, in one pass over the
/// text.
#[derive(Clone)]
pub struct AhoCorasick {
    patterns: Vec<String>,
    nodes: Vec<Node>,
}

impl AhoCorasick {
    /// Build an automaton from `patterns`.
    ///
    /// Patterns equal up to ASCII case collapse into the first one supplied.
    /// Non-ASCII characters are compared exactly.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NoPatterns`] if `patterns` is empty, or
    /// [`ConfigurationError::EmptyPattern`] if any pattern is `""`.
    pub fn new<I, P>(patterns: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for (index, pattern) in patterns.into_iter().enumerate() {
            let pattern = pattern.as_ref();
            if pattern.is_empty() {
                return Err(ConfigurationError::EmptyPattern { index });
            }
            if seen.insert(pattern.to_ascii_lowercase()) {
                unique.push(pattern.to_owned());
            } else {
                debug!(pattern, "duplicate pattern ignored");
            }
        }
        if unique.is_empty() {
            return Err(ConfigurationError::NoPatterns);
        }
        Ok(Self::build(unique))
    }

    /// Build from patterns already known to be unique and non-empty.
    pub(crate) fn build(patterns: Vec<String>) -> Self {
        let mut ac = Self {
            patterns,
            nodes: Vec::new(),
        };
        ac.build_trie();
        ac.encode_start_to_start();
        ac.encode_trie_failure();
        debug!(
            patterns = ac.patterns.len(),
            nodes = ac.nodes.len(),
            "built automaton"
        );
        ac
    }

    /// Return a lazy stream of all matches in `text`.
    pub fn search<'a, 'h>(&'a self, text: &'h str) -> Matches<'a, 'h> {
        Matches {
            ac: self,
            haystack: text.as_bytes(),
            at: 0,
            state: START,
            pending: 0,
        }
    }

    /// Return the earliest-ending match in `text`.
    pub fn find<'a>(&'a self, text: &str) -> Option<Match<'a>> {
        self.search(text).next()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.find(text).is_some()
    }

    /// Patterns in insertion order, after duplicates were removed.
    pub fn patterns(&self) -> impl ExactSizeIterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Return the next non-fail node id.
    fn next_state(&self, mut id: usize, byte: u8) -> usize {
        let byte = usize::from(byte.to_ascii_lowercase());
        loop {
            let next = self.nodes[id].transitions[byte];
            if next != FAIL {
                return next;
            }
            id = self.nodes[id].fail;
        }
    }

    //>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>
    // Trie
    //<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<

    /// Build a trie with a node for each folded byte in the patterns.
    fn build_trie(&mut self) {
        // FAIL, START.
        for _ in 0..2 {
            self.add_node();
        }
        for pattern_id in 0..self.patterns.len() {
            let folded = self.patterns[pattern_id].to_ascii_lowercase();
            let mut current = START;
            for byte in folded.bytes() {
                let byte = usize::from(byte);
                let next = self.nodes[current].transitions[byte];
                current = if next == FAIL {
                    let id = self.add_node();
                    self.nodes[current].transitions[byte] = id;
                    id
                } else {
                    next
                };
            }
            self.nodes[current].matches.push(pattern_id);
        }
    }

    /// Encode START->FAIL transitions as START->START.
    fn encode_start_to_start(&mut self) {
        for transition in &mut self.nodes[START].transitions {
            if *transition == FAIL {
                *transition = START;
            }
        }
    }

    /// Encode a fail transition for each node, breadth first, and copy the
    /// matches of each fail target into the node it is reached from.
    fn encode_trie_failure(&mut self) {
        let mut queue = VecDeque::new();
        for byte in 0..256 {
            let child = self.nodes[START].transitions[byte];
            if child != START {
                self.nodes[child].fail = START;
                queue.push_back(child);
            }
        }

        while let Some(id) = queue.pop_front() {
            for byte in 0..256 {
                let next_id = self.nodes[id].transitions[byte];
                if next_id == FAIL {
                    continue;
                }
                queue.push_back(next_id);

                // START has a transition for every byte, so this terminates.
                let mut fallback = self.nodes[id].fail;
                while self.nodes[fallback].transitions[byte] == FAIL {
                    fallback = self.nodes[fallback].fail;
                }
                let fail_id = self.nodes[fallback].transitions[byte];
                debug_assert_ne!(fail_id, next_id);
                self.nodes[next_id].fail = fail_id;

                let (fail_node, next_node) = if fail_id < next_id {
                    let (left, right) = self.nodes.split_at_mut(next_id);
                    (&left[fail_id], &mut right[0])
                } else {
                    let (left, right) = self.nodes.split_at_mut(fail_id);
                    (&right[0], &mut left[next_id])
                };
                next_node.matches.extend_from_slice(&fail_node.matches);
                next_node.matches.sort_unstable();
                next_node.matches.dedup();
            }
        }
    }

    /// Add a Node and return its id.
    fn add_node(&mut self) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node {
            matches: Vec::new(),
            transitions: [FAIL; 256],
            fail: START,
        });
        id
    }
}

impl fmt::Debug for AhoCorasick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AhoCorasick")
            .field("patterns", &self.patterns)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

/// Lazy stream of matches produced by [`AhoCorasick::search`].
#[derive(Debug, Clone)]
pub struct Matches<'a, 'h> {
    ac: &'a AhoCorasick,
    haystack: &'h [u8],
    /// Number of bytes consumed so far.
    at: usize,
    state: usize,
    /// Matches of `state` already reported.
    pending: usize,
}

impl<'a> Iterator for Matches<'a, '_> {
    type Item = Match<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = &self.ac.nodes[self.state];
            if let Some(&pattern_id) = node.matches.get(self.pending) {
                self.pending += 1;
                return Some(Match::new(
                    &self.ac.patterns[pattern_id],
                    pattern_id,
                    self.at,
                ));
            }
            let &byte = self.haystack.get(self.at)?;
            self.state = self.ac.next_state(self.state, byte);
            self.at += 1;
            self.pending = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ahocorasick_basics() {
        let haystack = "abc def ghi jkl mno pqr abc";
        let patterns = ["bc", "ghi", "o p", "qr"];
        let expected = [(0, 1, 3), (1, 8, 11), (2, 18, 21), (3, 21, 23), (0, 25, 27)];
        t(&patterns, haystack, &expected);
    }

    #[test]
    fn overlapping_suffixes() {
        let patterns = ["he", "she", "his", "hers"];
        let expected = [(0, 2, 4), (1, 1, 4), (3, 2, 6)];
        t(&patterns, "ushers", &expected);
    }

    #[test]
    fn ties_follow_insertion_order() {
        t(&["she", "he"], "she", &[(0, 0, 3), (1, 1, 3)]);
    }

    #[test]
    fn case_insensitive() {
        let patterns = ["http://", "www."];
        let expected = [(0, 4, 11), (1, 11, 15)];
        t(&patterns, "see HTTP://WwW.x", &expected);
    }

    #[test]
    fn fail_chain_restarts_partial_match() {
        t(&["abcd", "bce"], "abce", &[(1, 1, 4)]);
        t(&["aab"], "aaab", &[(0, 1, 4)]);
    }

    #[test]
    fn non_ascii_text() {
        t(&["www."], "für www.ä.de", &[(0, 5, 9)]);
        t(&["ä:"], "xÄ: ä:", &[(0, 5, 8)]);
    }

    #[test]
    fn non_ascii_case_is_exact() {
        t(&["élan:"], "ÉLAN:x élan:y", &[(0, 8, 14)]);
    }

    #[test]
    fn empty_and_unmatched_text() {
        let ac = AhoCorasick::new(["http://"]).unwrap();
        assert_eq!(ac.search("").count(), 0);
        assert_eq!(ac.search("nothing here, http:/ or http//").count(), 0);
        assert!(!ac.is_match("http:"));
    }

    #[test]
    fn search_is_restartable() {
        let ac = AhoCorasick::new(["ab"]).unwrap();
        let first: Vec<_> = ac.search("abab").collect();
        let second: Vec<_> = ac.search("abab").collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn match_reports_original_pattern() {
        let ac = AhoCorasick::new(["MailTo:"]).unwrap();
        let m = ac.find("mailto:x@y").unwrap();
        assert_eq!(m.pattern(), "MailTo:");
        assert_eq!(m.range(), 0..7);
    }

    #[test]
    fn duplicates_collapse() {
        let ac = AhoCorasick::new(["www.", "WWW.", "ftp://", "www."]).unwrap();
        assert_eq!(ac.patterns().collect::<Vec<_>>(), ["www.", "ftp://"]);
        assert_eq!(ac.search("www.").count(), 1);
    }

    #[test]
    fn rejects_bad_configuration() {
        let none: [&str; 0] = [];
        assert_eq!(
            AhoCorasick::new(none).unwrap_err(),
            ConfigurationError::NoPatterns
        );
        assert_eq!(
            AhoCorasick::new(["a", ""]).unwrap_err(),
            ConfigurationError::EmptyPattern { index: 1 }
        );
    }

    #[track_caller]
    fn t(patterns: &[&str], haystack: &str, expected: &[(usize, usize, usize)]) {
        let ac = AhoCorasick::new(patterns).unwrap();
        let matches: Vec<_> = ac
            .search(haystack)
            .map(|m| (m.pattern_id(), m.start(), m.end()))
            .collect();
        assert_eq!(expected, matches.as_slice());
        for m in ac.search(haystack) {
            assert!(haystack[m.range()].eq_ignore_ascii_case(m.pattern()));
        }
    }
}
