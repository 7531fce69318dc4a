//! Immutable source buffers and byte spans.

use crate::EngineError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A half-open `[start, end)` byte interval into a [`SourceText`].
///
/// Invariant: `start <= end`. A zero-width span marks an insertion point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "span start {} exceeds end {}", start, end);
        Self { start, end }
    }

    /// Zero-width span at `offset`.
    pub fn empty(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the spans share at least one byte. A zero-width span overlaps
    /// another span only when it sits strictly inside it; it never overlaps
    /// at a boundary, and two zero-width spans never overlap each other.
    pub fn overlaps(&self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `other` lies entirely within this span.
    pub fn covers(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A proposed textual replacement over a span of source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub span: Span,
    pub replacement: String,
    /// Rule that proposed this edit.
    pub rule_id: String,
}

impl Edit {
    pub fn replace(span: Span, replacement: impl Into<String>, rule_id: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
            rule_id: rule_id.into(),
        }
    }

    pub fn delete(span: Span, rule_id: impl Into<String>) -> Self {
        Self::replace(span, "", rule_id)
    }

    pub fn insert(offset: usize, text: impl Into<String>, rule_id: impl Into<String>) -> Self {
        Self::replace(Span::empty(offset), text, rule_id)
    }
}

/// An immutable source buffer with a precomputed line table.
///
/// The optional origin names where the text came from; it is carried through
/// edits and used for diagnostics and per-rule allow globs, never for
/// matching.
#[derive(Debug, Clone)]
pub struct SourceText {
    text: String,
    origin: Option<PathBuf>,
    /// Byte offset of the first character of each line.
    line_starts: Vec<usize>,
}

impl SourceText {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = line_starts(&text);
        Self {
            text,
            origin: None,
            line_starts,
        }
    }

    pub fn with_origin(text: impl Into<String>, origin: impl Into<PathBuf>) -> Self {
        let mut source = Self::new(text);
        source.origin = Some(origin.into());
        source
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// The exact substring for a span.
    ///
    /// Fails with [`EngineError::OutOfBounds`] when the span exceeds the
    /// buffer or either endpoint splits a UTF-8 character.
    pub fn slice(&self, span: Span) -> Result<&str, EngineError> {
        self.text
            .get(span.start..span.end)
            .ok_or(EngineError::OutOfBounds {
                span,
                len: self.text.len(),
            })
    }

    /// 1-based line and 0-based column for a byte offset. Offsets past the
    /// end of the buffer resolve to the last position.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let line_idx = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        (line_idx + 1, offset - self.line_starts[line_idx])
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Text of a 1-based line, without its trailing newline.
    pub fn line_text(&self, line: usize) -> Option<&str> {
        let idx = line.checked_sub(1)?;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&next| next - 1)
            .unwrap_or(self.text.len());
        Some(&self.text[start..end])
    }

    /// Apply a non-conflicting edit set, producing a new buffer.
    ///
    /// Edits are applied right-to-left by descending start offset so earlier
    /// offsets stay valid while the buffer is rebuilt. Callers are expected
    /// to have resolved conflicts already; an edit that does not fit the
    /// buffer fails with [`EngineError::InvalidEdit`].
    pub fn apply(&self, edits: &[Edit]) -> Result<SourceText, EngineError> {
        for edit in edits {
            if self.text.get(edit.span.start..edit.span.end).is_none() {
                return Err(EngineError::InvalidEdit {
                    rule_id: edit.rule_id.clone(),
                    span: edit.span,
                    len: self.text.len(),
                });
            }
        }

        // Descending start; at equal starts the wider edit goes first so an
        // insertion at the same offset ends up before the replacement text.
        let mut order: Vec<&Edit> = edits.iter().collect();
        order.sort_by(|a, b| {
            b.span
                .start
                .cmp(&a.span.start)
                .then(b.span.end.cmp(&a.span.end))
        });

        let mut text = self.text.clone();
        for edit in order {
            text.replace_range(edit.span.start..edit.span.end, &edit.replacement);
        }

        let line_starts = line_starts(&text);
        Ok(SourceText {
            text,
            origin: self.origin.clone(),
            line_starts,
        })
    }
}

fn line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}
