//! Pass execution: one pass, the fixpoint loop, and batch fan-out.
//!
//! A pass is parse → visit → correct. The fixpoint loop repeats passes on
//! the corrected text until a pass applies nothing, reporting only that
//! final pass's findings, since findings from earlier passes describe text
//! that no longer exists. A constant pass ceiling guards against rule pairs that
//! keep re-triggering each other's edits.

use crate::correct::{self, EditSet};
use crate::diagnostics::{DiagnosticCollector, Finding};
use crate::dispatch::visit_tree;
use crate::registry::RuleRegistry;
use crate::sources::SourceRegistry;
use lichen_core::{EngineError, Parser, SourceText};
use rayon::prelude::*;
use std::time::Instant;

/// Pass ceiling used when the caller has no opinion. Constant and
/// independent of input size.
pub const DEFAULT_MAX_PASSES: usize = 10;

/// Debug output categories.
#[derive(Default)]
pub struct DebugFlags {
    pub timing: bool,
}

impl DebugFlags {
    pub fn from_args(args: &[String]) -> Self {
        let all = args.iter().any(|s| s == "all");
        Self {
            timing: all || args.iter().any(|s| s == "timing"),
        }
    }
}

/// Outcome of a single pass.
#[derive(Debug)]
pub struct PassResult {
    /// Findings of this pass, sorted for presentation.
    pub findings: Vec<Finding>,
    /// The corrected buffer; the input buffer when nothing applied.
    pub text: SourceText,
    pub edits_applied: usize,
    /// Edits that lost a conflict and were not applied this pass.
    pub edits_deferred: usize,
}

impl PassResult {
    pub fn changed(&self) -> bool {
        self.edits_applied > 0
    }
}

/// Run one parse → visit → correct cycle. This is "check only" mode when
/// the caller does not loop: findings out, corrections available but the
/// caller decides what to do with the new text.
pub fn run_pass(
    source: &SourceText,
    registry: &RuleRegistry,
    parser: &dyn Parser,
    data: &SourceRegistry,
) -> Result<PassResult, EngineError> {
    let tree = parser.parse(source)?;

    let mut collector = DiagnosticCollector::new();
    let mut edits = EditSet::new();
    visit_tree(&tree, source, registry, data, &mut collector, &mut edits);

    let resolution = correct::resolve(edits);
    let edits_applied = resolution.accepted.len();
    let edits_deferred = resolution.deferred.len();
    let text = if edits_applied == 0 {
        source.clone()
    } else {
        correct::apply(source, &resolution)?
    };

    Ok(PassResult {
        findings: collector.into_sorted(),
        text,
        edits_applied,
        edits_deferred,
    })
}

/// Outcome of a fixpoint run.
#[derive(Debug)]
pub struct FixpointResult {
    pub text: SourceText,
    /// Findings of the final pass, the ones that still describe the text.
    pub findings: Vec<Finding>,
    pub passes: usize,
}

/// Loop passes until none applies an edit, or until applying changes
/// nothing (a rule pair stuck on the same span makes no progress; stopping
/// there still reports the losing rule's findings). Exceeding `max_passes`
/// is a fatal [`EngineError::CorrectionLoop`] carrying the last buffer.
pub fn run_to_fixpoint(
    source: &SourceText,
    registry: &RuleRegistry,
    parser: &dyn Parser,
    data: &SourceRegistry,
    max_passes: usize,
) -> Result<FixpointResult, EngineError> {
    let mut current = source.clone();
    let mut passes = 0;
    loop {
        if passes >= max_passes {
            return Err(EngineError::CorrectionLoop {
                iterations: passes,
                last_text: current,
            });
        }
        passes += 1;

        let result = run_pass(&current, registry, parser, data)?;
        if result.edits_applied == 0 || result.text.as_str() == current.as_str() {
            return Ok(FixpointResult {
                text: result.text,
                findings: result.findings,
                passes,
            });
        }
        current = result.text;
    }
}

/// Fixpoint every input in parallel. Inputs are independent (no shared
/// mutable state), so this is a plain rayon fan-out; each input gets its
/// own `Result` and one unparsable file cannot abort the batch.
pub fn run_batch(
    inputs: &[SourceText],
    registry: &RuleRegistry,
    parser: &(dyn Parser + Sync),
    data: &SourceRegistry,
    max_passes: usize,
    debug: &DebugFlags,
) -> Vec<Result<FixpointResult, EngineError>> {
    let start = Instant::now();
    let results: Vec<_> = inputs
        .par_iter()
        .map(|source| run_to_fixpoint(source, registry, parser, data, max_passes))
        .collect();
    if debug.timing {
        eprintln!(
            "[timing] {} inputs, {} corrected: {:?}",
            inputs.len(),
            results
                .iter()
                .filter(|r| r.as_ref().is_ok_and(|f| f.passes > 1))
                .count(),
            start.elapsed()
        );
    }
    results
}
