//! Shared leaf types for the lichen engine.
//!
//! This crate holds everything both the rule engine and the parser adapters
//! need to agree on:
//! - [`SourceText`]: an immutable source buffer with byte-span slicing
//! - [`Span`]: a half-open byte interval into a buffer
//! - [`Node`] / [`SyntaxTree`]: the read-only tree model adapters produce
//! - [`Parser`]: the seam between the engine and an external parser
//! - [`EngineError`]: the engine-wide error taxonomy
//!
//! The engine never parses source itself; an adapter (see
//! `lichen-languages`) turns text into a [`SyntaxTree`] and the engine only
//! reads it.

mod error;
mod source;
mod tree;

pub use error::{EngineError, ParseError};
pub use source::{Edit, SourceText, Span};
pub use tree::{Descendants, Node, Parser, SyntaxTree};

use serde::{Deserialize, Serialize};

/// Severity level for rule findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    #[default]
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" | "warn" => Ok(Severity::Warning),
            "info" | "note" => Ok(Severity::Info),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_round_trip() {
        for s in ["error", "warning", "info"] {
            let sev: Severity = s.parse().expect("should parse");
            assert_eq!(sev.to_string(), s);
        }
    }

    #[test]
    fn test_severity_aliases() {
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("note".parse::<Severity>(), Ok(Severity::Info));
        assert_eq!("ERROR".parse::<Severity>(), Ok(Severity::Error));
        assert!("fatal".parse::<Severity>().is_err());
    }
}
