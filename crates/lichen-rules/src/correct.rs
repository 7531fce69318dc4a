//! Deterministic resolution of possibly-conflicting edits.
//!
//! Many rules propose edits against the same buffer in one pass; applying
//! overlapping edits in arbitrary order corrupts source. The corrector
//! sorts proposals by ascending span start (registration order breaking
//! ties), collapses exact duplicates, then greedily accepts every edit that
//! does not conflict with the previously accepted one. Rejected edits are
//! deferred: the pass runner re-parses after applying and the losing rule
//! gets another chance on the next pass.
//!
//! Leftmost-first acceptance guarantees progress (the lowest-offset edit in
//! any conflicting cluster is always applied) and keeps the winner
//! independent of rule registration order except at identical spans.

use lichen_core::{Edit, EngineError, SourceText, Span};

/// All edits proposed during one pass, in discovery order.
#[derive(Default)]
pub struct EditSet {
    proposed: Vec<ProposedEdit>,
}

struct ProposedEdit {
    edit: Edit,
    rule_index: usize,
}

impl EditSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(
        &mut self,
        span: Span,
        replacement: String,
        rule_id: &str,
        rule_index: usize,
    ) {
        self.proposed.push(ProposedEdit {
            edit: Edit::replace(span, replacement, rule_id),
            rule_index,
        });
    }

    pub fn len(&self) -> usize {
        self.proposed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposed.is_empty()
    }
}

/// The outcome of conflict resolution for one pass.
#[derive(Debug)]
pub struct Resolution {
    /// Non-conflicting edits, ascending by span start.
    pub accepted: Vec<Edit>,
    /// Edits that lost to an accepted edit this pass; retried next pass.
    pub deferred: Vec<Edit>,
}

/// Two edits conflict when their spans share a byte, or when they target
/// the identical span with different replacement text (which also covers
/// two insertions at one offset).
fn conflicts(a: &Edit, b: &Edit) -> bool {
    a.span.overlaps(b.span) || (a.span == b.span && a.replacement != b.replacement)
}

/// Resolve an edit set: sort, deduplicate, greedily accept leftmost-first.
pub fn resolve(set: EditSet) -> Resolution {
    let mut proposed = set.proposed;
    proposed.sort_by(|a, b| {
        (a.edit.span.start, a.edit.span.end, a.rule_index)
            .cmp(&(b.edit.span.start, b.edit.span.end, b.rule_index))
    });

    let mut accepted: Vec<Edit> = Vec::new();
    let mut deferred: Vec<Edit> = Vec::new();
    let mut seen: Vec<(Span, String)> = Vec::new();

    for proposal in proposed {
        let edit = proposal.edit;
        // Identical span + identical replacement collapse to one proposal,
        // whatever their rules and wherever the first copy ended up.
        let key = (edit.span, edit.replacement.clone());
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);

        match accepted.last() {
            Some(last) if conflicts(last, &edit) => deferred.push(edit),
            _ => accepted.push(edit),
        }
    }

    Resolution { accepted, deferred }
}

/// Apply the accepted edits, producing a new buffer.
///
/// An accepted edit that does not fit the buffer means a rule computed its
/// span against an outdated tree; that is a fatal [`EngineError::StaleEdit`]
/// naming the rule, never a silent drop.
pub fn apply(source: &SourceText, resolution: &Resolution) -> Result<SourceText, EngineError> {
    for edit in &resolution.accepted {
        if source.as_str().get(edit.span.start..edit.span.end).is_none() {
            return Err(EngineError::StaleEdit {
                rule_id: edit.rule_id.clone(),
                span: edit.span,
                len: source.len(),
            });
        }
    }
    source.apply(&resolution.accepted)
}
