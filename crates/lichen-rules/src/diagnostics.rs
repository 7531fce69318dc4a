//! Findings and the per-invocation report sink.

use crate::correct::EditSet;
use lichen_core::{Severity, SourceText, Span};
use serde::Serialize;

/// A diagnostic produced by a rule during one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub rule_id: String,
    pub message: String,
    pub severity: Severity,
    pub span: Span,
    /// 1-based line of the span start.
    pub line: usize,
    /// 0-based column of the span start.
    pub column: usize,
    /// First line of the matched source.
    pub matched_text: String,
    #[serde(skip)]
    pub(crate) rule_index: usize,
}

/// Accumulates findings for one pass in discovery order: tree pre-order,
/// then rule-registration order for same-node ties. No deduplication: two
/// rules flagging overlapping spans both surface.
#[derive(Default)]
pub struct DiagnosticCollector {
    findings: Vec<Finding>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Findings in discovery order.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Findings sorted for presentation: span start, then registration
    /// order. The sort is stable, so discovery order breaks any remaining
    /// ties.
    pub fn into_sorted(mut self) -> Vec<Finding> {
        self.findings
            .sort_by(|a, b| (a.span.start, a.rule_index).cmp(&(b.span.start, b.rule_index)));
        self.findings
    }
}

/// Where one rule invocation reports what it found.
///
/// Stamped with the invoking rule's identity; findings and edits emitted on
/// a suppressed line (see [`is_suppressed`]) are dropped here, at the
/// emission boundary, so neither the collector nor the corrector ever sees
/// them.
pub struct Report<'a> {
    pub(crate) source: &'a SourceText,
    pub(crate) rule_id: &'a str,
    pub(crate) message: &'a str,
    pub(crate) severity: Severity,
    pub(crate) rule_index: usize,
    pub(crate) collector: &'a mut DiagnosticCollector,
    pub(crate) edits: &'a mut EditSet,
}

impl Report<'_> {
    /// Flag a span with the rule's default message.
    pub fn flag(&mut self, span: Span) {
        let message = self.message.to_string();
        self.flag_msg(span, message);
    }

    /// Flag a span with a custom message.
    pub fn flag_msg(&mut self, span: Span, message: impl Into<String>) {
        if is_suppressed(self.source, span, self.rule_id) {
            return;
        }
        let (line, column) = self.source.line_col(span.start);
        let matched_text = self
            .source
            .slice(span)
            .unwrap_or("")
            .lines()
            .next()
            .unwrap_or("")
            .to_string();
        self.collector.push(Finding {
            rule_id: self.rule_id.to_string(),
            message: message.into(),
            severity: self.severity,
            span,
            line,
            column,
            matched_text,
            rule_index: self.rule_index,
        });
    }

    /// Propose replacing a span.
    pub fn replace(&mut self, span: Span, replacement: impl Into<String>) {
        if is_suppressed(self.source, span, self.rule_id) {
            return;
        }
        self.edits.push(span, replacement.into(), self.rule_id, self.rule_index);
    }

    /// Propose deleting a span.
    pub fn delete(&mut self, span: Span) {
        self.replace(span, "");
    }

    /// Propose inserting text at the start of a span.
    pub fn insert_before(&mut self, span: Span, text: impl Into<String>) {
        self.replace(Span::empty(span.start), text);
    }

    /// Propose inserting text at the end of a span.
    pub fn insert_after(&mut self, span: Span, text: impl Into<String>) {
        self.replace(Span::empty(span.end), text);
    }
}

/// Check if a line contains an allow comment for the given rule.
/// Matches `lichen-allow: rule-id`, optionally followed by a reason.
fn line_has_allow_comment(line: &str, rule_id: &str) -> bool {
    let Some(pos) = line.find("lichen-allow:") else {
        return false;
    };
    let after = line[pos + "lichen-allow:".len()..].trim_start();
    if !after.starts_with(rule_id) {
        return false;
    }
    // A reason or comment close may follow, separated by whitespace;
    // `rule-id-and-more` must not count as `rule-id`.
    let rest = &after[rule_id.len()..];
    rest.is_empty() || rest.starts_with(char::is_whitespace) || rest.starts_with("*/")
}

/// Whether findings at `span` are suppressed by an allow comment on the
/// same line or the line above.
pub(crate) fn is_suppressed(source: &SourceText, span: Span, rule_id: &str) -> bool {
    let (line, _) = source.line_col(span.start);
    if let Some(text) = source.line_text(line) {
        if line_has_allow_comment(text, rule_id) {
            return true;
        }
    }
    if line > 1 {
        if let Some(text) = source.line_text(line - 1) {
            if line_has_allow_comment(text, rule_id) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(rule_index: usize, start: usize, id: &str) -> Finding {
        Finding {
            rule_id: id.to_string(),
            message: "m".to_string(),
            severity: Severity::Warning,
            span: Span::new(start, start + 1),
            line: 1,
            column: start,
            matched_text: String::new(),
            rule_index,
        }
    }

    #[test]
    fn test_sorted_by_start_then_registration() {
        let mut collector = DiagnosticCollector::new();
        collector.push(finding(2, 8, "late-rule"));
        collector.push(finding(1, 3, "b"));
        collector.push(finding(0, 8, "early-rule"));
        let sorted = collector.into_sorted();
        let ids: Vec<&str> = sorted.iter().map(|f| f.rule_id.as_str()).collect();
        assert_eq!(ids, ["b", "early-rule", "late-rule"]);
    }

    #[test]
    fn test_finding_serializes_without_internal_index() {
        let json = serde_json::to_value(finding(3, 5, "typo")).expect("should serialize");
        assert_eq!(json["rule_id"], "typo");
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["span"]["start"], 5);
        assert!(json.get("rule_index").is_none());
    }

    #[test]
    fn test_no_dedup() {
        let mut collector = DiagnosticCollector::new();
        collector.push(finding(0, 3, "a"));
        collector.push(finding(1, 3, "b"));
        assert_eq!(collector.len(), 2);
    }

    #[test]
    fn test_allow_comment_matching() {
        assert!(line_has_allow_comment("x = 1 # lichen-allow: no-magic", "no-magic"));
        assert!(line_has_allow_comment("// lichen-allow: no-magic - legacy", "no-magic"));
        assert!(line_has_allow_comment("/* lichen-allow: no-magic */", "no-magic"));
        // Rule id must match fully, not by prefix.
        assert!(!line_has_allow_comment("# lichen-allow: no-magic-numbers", "no-magic"));
        assert!(!line_has_allow_comment("# lichen-allow: other-rule", "no-magic"));
        assert!(!line_has_allow_comment("plain line", "no-magic"));
    }

    #[test]
    fn test_suppression_looks_at_line_and_line_above() {
        let source = SourceText::new("# lichen-allow: quiet\nflagged_here\nflagged_too\n");
        // Line 2 is covered by the comment above it.
        assert!(is_suppressed(&source, Span::new(22, 34), "quiet"));
        // Line 3 is not.
        assert!(!is_suppressed(&source, Span::new(35, 46), "quiet"));
        // Other rules are unaffected.
        assert!(!is_suppressed(&source, Span::new(22, 34), "loud"));
    }
}
