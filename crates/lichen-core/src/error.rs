//! Engine-wide error taxonomy.
//!
//! Only [`ParseError`] is an expected, caller-recoverable condition (skip
//! the input, report, continue). Everything else signals a bug in a rule or
//! an adapter and must surface loudly rather than be swallowed.

use crate::{SourceText, Span};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Source text the external parser could not turn into a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Identity of the offending input, when known.
    pub origin: Option<PathBuf>,
    pub message: String,
}

impl ParseError {
    pub fn new(origin: Option<&Path>, message: impl Into<String>) -> Self {
        Self {
            origin: origin.map(Path::to_path_buf),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.origin {
            Some(origin) => write!(f, "{}: parse error: {}", origin.display(), self.message),
            None => write!(f, "parse error: {}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}

/// Everything that can go wrong inside the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A span does not fit the buffer it was used against.
    #[error("span {span} is out of bounds for a buffer of {len} bytes")]
    OutOfBounds { span: Span, len: usize },

    /// A rule's pattern text failed to compile at registration time.
    #[error("invalid pattern for rule `{rule_id}`: {message}")]
    InvalidPattern { rule_id: String, message: String },

    /// A second rule was registered under an already-taken id.
    #[error("duplicate rule id `{rule_id}`")]
    DuplicateRule { rule_id: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A rule proposed an edit that does not fit the current buffer.
    #[error("rule `{rule_id}` proposed an invalid edit at {span} (buffer is {len} bytes)")]
    InvalidEdit {
        rule_id: String,
        span: Span,
        len: usize,
    },

    /// An accepted edit turned out to target a previous version of the
    /// buffer. Indicates a rule computed spans against an outdated tree.
    #[error("rule `{rule_id}` proposed edit {span} against a stale tree (buffer is {len} bytes)")]
    StaleEdit {
        rule_id: String,
        span: Span,
        len: usize,
    },

    /// The correction loop hit its pass ceiling without settling. Carries
    /// the last buffer so the caller can inspect the oscillation.
    #[error("correction loop did not settle after {iterations} passes")]
    CorrectionLoop {
        iterations: usize,
        last_text: SourceText,
    },
}
