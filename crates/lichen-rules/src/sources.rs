//! Pluggable data sources for rule conditionals.
//!
//! Some rules only make sense under conditions the syntax tree cannot
//! answer: an environment flag, a schema version, a directory inventory.
//! That data arrives through a [`SourceRegistry`] of namespaced
//! [`DataSource`]s, built once per run by the caller; the engine only reads
//! it. A rule's `requires` conditions are resolved against the registry
//! once per pass, and callbacks can query it through `MatchCtx::data`.

use std::collections::BTreeMap;
use std::path::Path;

/// Identity of the input currently being processed.
pub struct SourceContext<'a> {
    pub origin: Option<&'a Path>,
}

/// One namespace of externally supplied values.
pub trait DataSource: Send + Sync {
    /// Namespace this source answers for, e.g. `env` in `env.CI`.
    fn namespace(&self) -> &str;

    /// Look up a key within the namespace.
    fn get(&self, ctx: &SourceContext<'_>, key: &str) -> Option<String>;
}

/// Registry of data sources, queried by `namespace.key`.
#[derive(Default)]
pub struct SourceRegistry {
    sources: Vec<Box<dyn DataSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, source: Box<dyn DataSource>) {
        self.sources.push(source);
    }

    /// Resolve a dotted key like `env.RAILS_ENV`. Returns `None` for an
    /// unknown namespace, an unanswered key, or a key with no dot.
    pub fn get(&self, ctx: &SourceContext<'_>, dotted: &str) -> Option<String> {
        let (namespace, key) = dotted.split_once('.')?;
        self.sources
            .iter()
            .find(|source| source.namespace() == namespace)
            .and_then(|source| source.get(ctx, key))
    }
}

/// Registry preloaded with the sources every run can use.
pub fn builtin_registry() -> SourceRegistry {
    let mut registry = SourceRegistry::new();
    registry.register(Box::new(EnvSource));
    registry
}

/// Process environment, namespace `env`.
pub struct EnvSource;

impl DataSource for EnvSource {
    fn namespace(&self) -> &str {
        "env"
    }

    fn get(&self, _ctx: &SourceContext<'_>, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// An immutable key → value table registered at startup. The shape callers
/// use to hand rule-specific side-channel data (schema versions, model
/// inventories) to their rules without the engine knowing the format.
pub struct TableSource {
    namespace: String,
    entries: BTreeMap<String, String>,
}

impl TableSource {
    pub fn new<K, V>(namespace: impl Into<String>, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            namespace: namespace.into(),
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl DataSource for TableSource {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn get(&self, _ctx: &SourceContext<'_>, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

/// Check a rule's `requires` conditions against the registry.
///
/// Supported operators on the expected value:
/// - `value` - exact match
/// - `>=value` - greater or equal (lexicographic, as for editions)
/// - `<=value` - less or equal
/// - `!value` - not equal
///
/// A condition whose source is missing fails; the rule simply does not run.
pub(crate) fn requires_met(
    requires: &[(String, String)],
    registry: &SourceRegistry,
    ctx: &SourceContext<'_>,
) -> bool {
    for (key, expected) in requires {
        let Some(actual) = registry.get(ctx, key) else {
            return false;
        };

        let matches = if let Some(rest) = expected.strip_prefix(">=") {
            actual.as_str() >= rest
        } else if let Some(rest) = expected.strip_prefix("<=") {
            actual.as_str() <= rest
        } else if let Some(rest) = expected.strip_prefix('!') {
            actual != rest
        } else {
            actual == *expected
        };

        if !matches {
            return false;
        }
    }
    true
}
