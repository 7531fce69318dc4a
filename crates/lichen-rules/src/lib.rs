//! Syntax-rule matching with conflict-free autocorrection.
//!
//! This crate provides:
//! - A pattern language compiled into node matchers ([`NodePattern`])
//! - Rule registration and kind-indexed dispatch ([`RuleRegistry`])
//! - A single-traversal visitor collecting findings and proposed edits
//! - A corrector that resolves overlapping edits deterministically
//! - A pass runner that loops parse → visit → correct to a fixpoint
//! - Pluggable data sources for rule conditionals ([`SourceRegistry`])
//!
//! # Pattern language
//!
//! ```text
//! (call (identifier "update_attributes") ...)   ; kind head + child sequence
//! _                                             ; any node
//! "text"      /regexp/                          ; leaf value matchers
//! {(call ...) (def ...)}                        ; alternation
//! [call !(call _)]                              ; conjunction, negation
//! <(identifier "save")>                         ; some child matches
//! $(identifier /_attributes$/)                  ; positional capture
//! ```
//!
//! A rule pairs a pattern (or an explicit kind filter) with a default
//! message and, optionally, a callback, a fix template over the pattern's
//! captures, a prepare hook for whole-tree state, and `requires` conditions
//! resolved against external data sources.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = RuleRegistry::new();
//! registry.register(
//!     Rule::new("update-attributes", "Prefer `update` over `update_attributes`")
//!         .pattern(r#"(identifier "update_attributes")"#)?
//!         .fix("update"),
//! )?;
//! let result = run_to_fixpoint(&source, &registry, &parser, &sources, DEFAULT_MAX_PASSES)?;
//! ```

mod correct;
mod diagnostics;
mod dispatch;
mod pattern;
mod registry;
mod runner;
mod sources;
#[cfg(test)]
mod testutil;

pub use correct::{EditSet, Resolution, apply, resolve};
pub use diagnostics::{DiagnosticCollector, Finding, Report};
pub use dispatch::{Ancestors, MatchCtx};
pub use pattern::{NodePattern, PatternError};
pub use registry::RuleRegistry;
pub use runner::{
    DEFAULT_MAX_PASSES, DebugFlags, FixpointResult, PassResult, run_batch, run_pass,
    run_to_fixpoint,
};
pub use sources::{
    DataSource, EnvSource, SourceContext, SourceRegistry, TableSource, builtin_registry,
};

pub use lichen_core::{
    Edit, EngineError, Node, ParseError, Parser, Severity, SourceText, Span, SyntaxTree,
};

use std::any::Any;

/// Per-pass state prepared by a rule before visiting starts.
pub type RuleState = Box<dyn Any + Send>;

/// Whole-tree pre-scan run once per pass for rules that need it.
pub type PrepareFn = Box<dyn Fn(&SyntaxTree, &SourceText) -> RuleState + Send + Sync>;

/// Rule callback: inspect the matched node, report findings and edits.
pub type CheckFn = Box<dyn Fn(&MatchCtx<'_>, &mut Report<'_>) + Send + Sync>;

/// A syntax rule: a stable id, a match filter, and a response.
///
/// Built with chained methods and handed to [`RuleRegistry::register`].
/// A rule with no callback gets the default response: flag the matched node
/// with the rule's message, and propose the expanded fix template as a
/// whole-match replacement when one is set.
pub struct Rule {
    pub(crate) id: String,
    pub(crate) message: String,
    pub(crate) severity: Severity,
    /// Node kinds this rule dispatches on; empty means "derive from the
    /// pattern head, else every kind".
    pub(crate) kinds: Vec<String>,
    pub(crate) pattern: Option<NodePattern>,
    /// Fix template over positional captures (`$0` = whole match).
    pub(crate) fix: Option<String>,
    /// Origin globs for which matches are allowed (skipped).
    pub(crate) allow: Vec<glob::Pattern>,
    /// Conditions on external data, `("env.RAILS_ENV", ">=6")`-style.
    pub(crate) requires: Vec<(String, String)>,
    pub(crate) enabled: bool,
    pub(crate) prepare: Option<PrepareFn>,
    pub(crate) check: Option<CheckFn>,
}

impl Rule {
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            severity: Severity::default(),
            kinds: Vec::new(),
            pattern: None,
            fix: None,
            allow: Vec::new(),
            requires: Vec::new(),
            enabled: true,
            prepare: None,
            check: None,
        }
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Explicit dispatch filter. Overrides the kinds derived from the
    /// pattern head.
    pub fn kinds<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.kinds = kinds.into_iter().map(Into::into).collect();
        self
    }

    /// Compile and attach a pattern. Malformed pattern text fails here, at
    /// registration time, never during matching.
    pub fn pattern(mut self, text: &str) -> Result<Self, EngineError> {
        match NodePattern::compile(text) {
            Ok(pattern) => {
                self.pattern = Some(pattern);
                Ok(self)
            }
            Err(err) => Err(EngineError::InvalidPattern {
                rule_id: self.id,
                message: err.to_string(),
            }),
        }
    }

    /// Fix template expanded from the pattern's positional captures:
    /// `$1`..`$n` substitute capture text, `$0` the whole matched text.
    pub fn fix(mut self, template: impl Into<String>) -> Self {
        self.fix = Some(template.into());
        self
    }

    /// Skip this rule for sources whose origin matches the glob.
    pub fn allow(mut self, pattern: &str) -> Result<Self, EngineError> {
        match glob::Pattern::new(pattern) {
            Ok(compiled) => {
                self.allow.push(compiled);
                Ok(self)
            }
            Err(err) => Err(EngineError::InvalidPattern {
                rule_id: self.id,
                message: format!("bad allow glob `{}`: {}", pattern, err),
            }),
        }
    }

    /// Require an external data value, e.g. `("env.STRICT", "1")` or
    /// `("schema.version", ">=6")`. All conditions must hold for the rule to
    /// run on an input.
    pub fn requires(mut self, key: impl Into<String>, expected: impl Into<String>) -> Self {
        self.requires.push((key.into(), expected.into()));
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whole-tree pre-scan producing per-pass state handed back to the
    /// callback through [`MatchCtx::state`].
    pub fn prepare<F>(mut self, prepare: F) -> Self
    where
        F: Fn(&SyntaxTree, &SourceText) -> RuleState + Send + Sync + 'static,
    {
        self.prepare = Some(Box::new(prepare));
        self
    }

    pub fn check<F>(mut self, check: F) -> Self
    where
        F: Fn(&MatchCtx<'_>, &mut Report<'_>) + Send + Sync + 'static,
    {
        self.check = Some(Box::new(check));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Kinds the dispatcher should visit this rule for; `None` means all.
    pub(crate) fn dispatch_kinds(&self) -> Option<Vec<String>> {
        if !self.kinds.is_empty() {
            return Some(self.kinds.clone());
        }
        self.pattern.as_ref().and_then(NodePattern::kind_hints)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("severity", &self.severity)
            .field("kinds", &self.kinds)
            .field("pattern", &self.pattern)
            .field("fix", &self.fix)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
