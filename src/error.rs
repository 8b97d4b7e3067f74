use thiserror::Error;

/// Caller mistakes detected while building an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No patterns were supplied, so nothing could ever match.
    #[error("at least one pattern is required")]
    NoPatterns,
    /// The pattern at `index` is the empty string.
    #[error("pattern at index {index} is empty")]
    EmptyPattern { index: usize },
}
