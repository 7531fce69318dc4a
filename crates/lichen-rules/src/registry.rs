//! Rule registration and kind-indexed lookup.

use crate::Rule;
use lichen_core::EngineError;
use std::collections::HashMap;

/// Holds the active rules for a run. Registered once at startup and
/// read-only during a pass; rules are handed to the dispatcher in
/// registration order, which is the tie-break order everywhere downstream.
#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
    /// Kind → indices of rules dispatching on that kind, ascending.
    by_kind: HashMap<String, Vec<usize>>,
    /// Rules that dispatch on every kind, ascending.
    wildcard: Vec<usize>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule. Fails with [`EngineError::DuplicateRule`] when the
    /// id is already taken; the registry is left unchanged so the caller
    /// can keep registering other rules.
    pub fn register(&mut self, rule: Rule) -> Result<(), EngineError> {
        if self.rules.iter().any(|existing| existing.id == rule.id) {
            return Err(EngineError::DuplicateRule { rule_id: rule.id });
        }
        let index = self.rules.len();
        match rule.dispatch_kinds() {
            Some(kinds) => {
                for kind in kinds {
                    let bucket = self.by_kind.entry(kind).or_default();
                    if bucket.last() != Some(&index) {
                        bucket.push(index);
                    }
                }
            }
            None => self.wildcard.push(index),
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Disable a rule by id. Returns whether the id was known.
    pub fn disable(&mut self, id: &str) -> bool {
        match self.rules.iter_mut().find(|rule| rule.id == id) {
            Some(rule) => {
                rule.enabled = false;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Enabled rules whose filter accepts `kind`, with their registration
    /// indices, in registration order. Merges the kind bucket with the
    /// wildcard rules; never iterates a map, so the order is reproducible.
    pub fn rules_for(&self, kind: &str) -> Vec<(usize, &Rule)> {
        let bucket = self.by_kind.get(kind).map(Vec::as_slice).unwrap_or(&[]);
        let mut merged = Vec::with_capacity(bucket.len() + self.wildcard.len());
        let (mut b, mut w) = (0, 0);
        while b < bucket.len() || w < self.wildcard.len() {
            let next = match (bucket.get(b), self.wildcard.get(w)) {
                (Some(&x), Some(&y)) if x < y => {
                    b += 1;
                    x
                }
                (Some(_), Some(&y)) => {
                    w += 1;
                    y
                }
                (Some(&x), None) => {
                    b += 1;
                    x
                }
                (None, Some(&y)) => {
                    w += 1;
                    y
                }
                (None, None) => unreachable!(),
            };
            if self.rules[next].enabled {
                merged.push((next, &self.rules[next]));
            }
        }
        merged
    }
}
