//! Outbound port for operator decisions
//!
//! The curation loop and the pre-generation gate both suspend on the
//! operator. The console implementation blocks on stdin with no
//! timeout; tests and automation supply scripted implementations.

/// Operator decision on a single suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

/// Source of accept/reject decisions and confirmations.
pub trait ReviewPort: Send {
    /// Present one suggestion for the given entity label and wait for
    /// a verdict.
    fn review(&mut self, label: &str, suggestion: &str) -> std::io::Result<Verdict>;

    /// Ask a yes/no question before an expensive stage runs.
    fn confirm(&mut self, question: &str) -> std::io::Result<bool>;
}
