//! The tree visitor: one pre-order pass dispatching nodes to rules.

use crate::correct::EditSet;
use crate::diagnostics::{DiagnosticCollector, Report};
use crate::sources::{SourceContext, SourceRegistry, requires_met};
use crate::{RuleRegistry, RuleState};
use lichen_core::{Node, SourceText, SyntaxTree};
use std::any::Any;

/// The ancestor chain of the node being matched, outermost first.
///
/// Maintained by the visitor as a stack: pushed on node enter, popped on
/// exit. Matches are recorded on enter, so a callback sees every enclosing
/// construct but nothing below its node.
#[derive(Clone, Copy)]
pub struct Ancestors<'a> {
    chain: &'a [&'a Node],
}

impl<'a> Ancestors<'a> {
    pub fn parent(self) -> Option<&'a Node> {
        self.chain.last().copied()
    }

    pub fn root(self) -> Option<&'a Node> {
        self.chain.first().copied()
    }

    /// Nearest-first walk up the chain.
    pub fn iter(self) -> impl Iterator<Item = &'a Node> {
        self.chain.iter().rev().copied()
    }

    /// Closest enclosing node of the given kind.
    pub fn nearest(self, kind: &str) -> Option<&'a Node> {
        self.iter().find(|node| node.kind() == kind)
    }

    pub fn has_kind(self, kind: &str) -> bool {
        self.nearest(kind).is_some()
    }

    pub fn depth(self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(self) -> bool {
        self.chain.is_empty()
    }
}

/// Everything a rule callback may look at for one matched node.
pub struct MatchCtx<'a> {
    pub source: &'a SourceText,
    pub node: &'a Node,
    pub ancestors: Ancestors<'a>,
    /// `$`-captured nodes in pattern order.
    pub captures: &'a [&'a Node],
    /// State produced by the rule's `prepare` hook, if any.
    pub state: Option<&'a (dyn Any + Send)>,
    /// External data sources for out-of-band context.
    pub data: &'a SourceRegistry,
}

impl<'a> MatchCtx<'a> {
    /// Source text of a node, empty when the span is somehow invalid.
    pub fn text(&self, node: &Node) -> &'a str {
        self.source.slice(node.span()).unwrap_or("")
    }
}

struct Pass<'p> {
    source: &'p SourceText,
    registry: &'p RuleRegistry,
    data: &'p SourceRegistry,
    /// Per-rule: enabled, not allow-listed for this origin, `requires` met.
    active: &'p [bool],
    states: &'p [Option<RuleState>],
}

/// Run every active rule over the tree, collecting findings and proposed
/// edits. Deterministic: fixed tree + fixed registry yields the identical
/// sequence on every run.
pub(crate) fn visit_tree(
    tree: &SyntaxTree,
    source: &SourceText,
    registry: &RuleRegistry,
    data: &SourceRegistry,
    collector: &mut DiagnosticCollector,
    edits: &mut EditSet,
) {
    let ctx = SourceContext {
        origin: source.origin(),
    };
    let origin_text = source.origin().map(|p| p.to_string_lossy().into_owned());

    let active: Vec<bool> = registry
        .rules()
        .iter()
        .map(|rule| {
            if !rule.enabled {
                return false;
            }
            if let Some(origin) = &origin_text {
                if rule.allow.iter().any(|glob| glob.matches(origin)) {
                    return false;
                }
            }
            requires_met(&rule.requires, data, &ctx)
        })
        .collect();

    let states: Vec<Option<RuleState>> = registry
        .rules()
        .iter()
        .enumerate()
        .map(|(index, rule)| {
            if active[index] {
                rule.prepare.as_ref().map(|prepare| prepare(tree, source))
            } else {
                None
            }
        })
        .collect();

    let pass = Pass {
        source,
        registry,
        data,
        active: &active,
        states: &states,
    };
    let mut ancestors: Vec<&Node> = Vec::new();
    walk(&pass, tree.root(), &mut ancestors, collector, edits);
}

fn walk<'t>(
    pass: &Pass<'_>,
    node: &'t Node,
    ancestors: &mut Vec<&'t Node>,
    collector: &mut DiagnosticCollector,
    edits: &mut EditSet,
) {
    for (index, rule) in pass.registry.rules_for(node.kind()) {
        if !pass.active[index] {
            continue;
        }
        let captures: Vec<&Node> = match &rule.pattern {
            Some(pattern) => match pattern.captures(node) {
                Some(captures) => captures,
                None => continue,
            },
            None => Vec::new(),
        };

        let mut report = Report {
            source: pass.source,
            rule_id: &rule.id,
            message: &rule.message,
            severity: rule.severity,
            rule_index: index,
            collector: &mut *collector,
            edits: &mut *edits,
        };

        match &rule.check {
            Some(check) => {
                let ctx = MatchCtx {
                    source: pass.source,
                    node,
                    ancestors: Ancestors {
                        chain: ancestors.as_slice(),
                    },
                    captures: &captures,
                    state: pass.states[index].as_deref(),
                    data: pass.data,
                };
                check(&ctx, &mut report);
            }
            None => {
                report.flag(node.span());
                if let Some(template) = &rule.fix {
                    let replacement = expand_fix(template, node, &captures, pass.source);
                    report.replace(node.span(), replacement);
                }
            }
        }
    }

    ancestors.push(node);
    for child in node.children() {
        walk(pass, child, ancestors, collector, edits);
    }
    ancestors.pop();
}

/// Expand a fix template: `$1`..`$n` substitute the pattern's captures,
/// `$0` the whole matched text, `$$` a literal dollar.
fn expand_fix(template: &str, node: &Node, captures: &[&Node], source: &SourceText) -> String {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            if bytes.get(i + 1) == Some(&b'$') {
                out.push('$');
                i += 2;
                continue;
            }
            let mut j = i + 1;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j > i + 1 {
                let n: usize = template[i + 1..j].parse().unwrap_or(0);
                let span = if n == 0 {
                    Some(node.span())
                } else {
                    captures.get(n - 1).map(|captured| captured.span())
                };
                if let Some(span) = span {
                    out.push_str(source.slice(span).unwrap_or(""));
                }
                i = j;
                continue;
            }
        }
        match template[i..].chars().next() {
            Some(ch) => {
                out.push(ch);
                i += ch.len_utf8();
            }
            None => break,
        }
    }
    out
}
