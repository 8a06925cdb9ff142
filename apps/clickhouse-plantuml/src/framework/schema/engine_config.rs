//! # Engine Config Resolver
//!
//! Turns the positional constructor arguments of an engine into named
//! configuration pairs. Every known engine family has a fixed rule: the
//! arguments are consumed from the front, in order, and some families derive
//! dependency edges from the values they consumed.
//!
//! The order of the produced pairs is part of the contract. Derivations read
//! values back by position (`Distributed` takes its target from the pairs at
//! index 1 and 2), so rules and positions must change together.

use super::engine_args::EngineArguments;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

const REPLICATED_PREFIX: &str = "Replicated";
const REPLICATION_FIELDS: &[&str] = &["zoo_path", "replica"];

/// Ordered `(name, value)` pairs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineConfig(Vec<(String, String)>);

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn get(&self, index: usize) -> Option<(&str, &str)> {
        self.0
            .get(index)
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// First value stored under `name`
    pub fn value(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn value_at(&self, index: usize) -> Option<&str> {
        self.get(index).map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn extend(&mut self, other: EngineConfig) {
        self.0.extend(other.0);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EngineConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        EngineConfig(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Engine families with a known argument layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineFamily {
    GraphiteMergeTree,
    ReplacingMergeTree,
    SummingMergeTree,
    CollapsingMergeTree,
    VersionedCollapsingMergeTree,
    Odbc,
    Jdbc,
    MySql,
    Distributed,
    Merge,
    Join,
    Buffer,
    /// Anything else. Resolves to an empty config.
    Other(String),
}

impl EngineFamily {
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "graphitemergetree" => EngineFamily::GraphiteMergeTree,
            "replacingmergetree" => EngineFamily::ReplacingMergeTree,
            "summingmergetree" => EngineFamily::SummingMergeTree,
            "collapsingmergetree" => EngineFamily::CollapsingMergeTree,
            "versionedcollapsingmergetree" => EngineFamily::VersionedCollapsingMergeTree,
            "odbc" => EngineFamily::Odbc,
            "jdbc" => EngineFamily::Jdbc,
            "mysql" => EngineFamily::MySql,
            "distributed" => EngineFamily::Distributed,
            "merge" => EngineFamily::Merge,
            "join" => EngineFamily::Join,
            "buffer" => EngineFamily::Buffer,
            _ => EngineFamily::Other(name.to_string()),
        }
    }

    fn rule(&self) -> Option<EngineRule> {
        let rule = match self {
            EngineFamily::GraphiteMergeTree => EngineRule::fields(&["rollup_config"]),
            EngineFamily::ReplacingMergeTree | EngineFamily::SummingMergeTree => EngineRule {
                optional: &["version"],
                ..EngineRule::fields(&[])
            },
            EngineFamily::CollapsingMergeTree => EngineRule::fields(&["sign"]),
            EngineFamily::VersionedCollapsingMergeTree => EngineRule::fields(&["sign", "version"]),
            EngineFamily::Odbc => EngineRule::fields(&["settings", "database", "table"]),
            EngineFamily::Jdbc => EngineRule::fields(&["uri", "database", "table"]),
            EngineFamily::MySql => EngineRule {
                optional: &["replace_query", "on_duplicate"],
                ..EngineRule::fields(&["host:port", "database", "table", "user", "password"])
            },
            EngineFamily::Distributed => EngineRule {
                optional: &["sharding_key", "policy"],
                derivation: Derivation::ReverseTarget,
                ..EngineRule::fields(&["cluster", "database", "table"])
            },
            EngineFamily::Merge => EngineRule {
                derivation: Derivation::MatchingTables,
                ..EngineRule::fields(&["database", "table_re"])
            },
            EngineFamily::Join => EngineRule {
                rest: Some("k"),
                ..EngineRule::fields(&["strictness", "type"])
            },
            EngineFamily::Buffer => EngineRule {
                derivation: Derivation::ForwardTarget,
                ..EngineRule::fields(&[
                    "database",
                    "table",
                    "num_layers",
                    "min_time",
                    "max_time",
                    "min_rows",
                    "max_rows",
                    "min_bytes",
                    "max_bytes",
                ])
            },
            EngineFamily::Other(_) => return None,
        };
        Some(rule)
    }
}

/// Engine name split into the replication marker and the family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineKind {
    pub replicated: bool,
    pub family: EngineFamily,
}

impl EngineKind {
    /// Case-insensitive. A bare `Replicated` is a family name, not a prefix.
    pub fn parse(engine: &str) -> Self {
        let remainder = engine
            .get(..REPLICATED_PREFIX.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(REPLICATED_PREFIX))
            .and_then(|_| engine.get(REPLICATED_PREFIX.len()..))
            .filter(|rest| !rest.is_empty());

        match remainder {
            Some(rest) => EngineKind {
                replicated: true,
                family: EngineFamily::parse(rest),
            },
            None => EngineKind {
                replicated: false,
                family: EngineFamily::parse(engine),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Derivation {
    None,
    /// `<database>.<table>` from pairs 0 and 1 becomes a dependency
    ForwardTarget,
    /// `<database>.<table>` from pairs 1 and 2 becomes the reverse dependency
    ReverseTarget,
    /// Reverse dependencies are the tables matching pairs 0 and 1
    MatchingTables,
}

#[derive(Debug, Clone, Copy)]
struct EngineRule {
    required: &'static [&'static str],
    /// Each one is taken only while arguments remain
    optional: &'static [&'static str],
    /// Prefix for numbered fields consuming every remaining argument
    rest: Option<&'static str>,
    derivation: Derivation,
}

impl EngineRule {
    const fn fields(required: &'static [&'static str]) -> Self {
        EngineRule {
            required,
            optional: &[],
            rest: None,
            derivation: Derivation::None,
        }
    }
}

/// Popping an argument that is not there
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing engine argument `{field}` at position {position}, only {available} available")]
pub struct MissingEngineArgument {
    pub field: String,
    pub position: usize,
    pub available: usize,
}

/// Engine arguments consumed from the front
#[derive(Debug)]
pub struct ArgumentQueue {
    args: VecDeque<String>,
    consumed: usize,
    available: usize,
}

impl ArgumentQueue {
    /// `X()` holds no arguments for the resolver
    pub fn new(args: EngineArguments) -> Self {
        let args: VecDeque<String> = if args.is_blank_call() {
            VecDeque::new()
        } else {
            args.into_vec().into()
        };
        let available = args.len();
        ArgumentQueue {
            args,
            consumed: 0,
            available,
        }
    }

    pub fn pop(&mut self, field: &str) -> Result<String, MissingEngineArgument> {
        let value = self.args.pop_front().ok_or_else(|| MissingEngineArgument {
            field: field.to_string(),
            position: self.consumed,
            available: self.available,
        })?;
        self.consumed += 1;
        Ok(value)
    }

    pub fn pop_optional(&mut self) -> Option<String> {
        let value = self.args.pop_front()?;
        self.consumed += 1;
        Some(value)
    }

    pub fn has_remaining(&self) -> bool {
        !self.args.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = String> + '_ {
        self.consumed = self.available;
        self.args.drain(..)
    }
}

/// Tables of `database` whose names match `pattern` (a `Merge` engine)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyLookup {
    pub database: String,
    pub pattern: String,
}

/// Everything derived from one engine definition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineResolution {
    pub engine_config: EngineConfig,
    pub replication_config: EngineConfig,
    /// Dependencies to add to the catalog-reported ones
    pub dependencies: Vec<String>,
    /// Replaces the reverse dependencies when set
    pub rev_dependencies: Option<Vec<String>>,
    pub lookup: Option<DependencyLookup>,
}

/// Resolves `engine` (the family name) with the arguments found in
/// `engine_full`.
pub fn resolve_engine_config(
    engine: &str,
    engine_full: &str,
) -> Result<EngineResolution, MissingEngineArgument> {
    let kind = EngineKind::parse(engine);
    let mut queue = ArgumentQueue::new(EngineArguments::parse(engine_full));
    let mut resolution = EngineResolution::default();

    if kind.replicated {
        for field in REPLICATION_FIELDS {
            let value = queue.pop(field)?;
            resolution.replication_config.push(*field, value);
        }
    }

    let Some(rule) = kind.family.rule() else {
        debug!("No argument rule for engine {}", engine);
        return Ok(resolution);
    };

    let config = &mut resolution.engine_config;
    for field in rule.required {
        let value = queue.pop(field)?;
        config.push(*field, value);
    }
    for field in rule.optional {
        match queue.pop_optional() {
            Some(value) => config.push(*field, value),
            None => break,
        }
    }
    if let Some(prefix) = rule.rest {
        for (i, value) in queue.drain().enumerate() {
            config.push(format!("{}{}", prefix, i + 1), value);
        }
    }
    if queue.has_remaining() {
        debug!("Unused arguments left for engine {}", engine);
    }

    let target = |db: usize, table: usize| -> Option<String> {
        Some(format!("{}.{}", config.value_at(db)?, config.value_at(table)?))
    };
    match rule.derivation {
        Derivation::None => {}
        Derivation::ForwardTarget => resolution.dependencies.extend(target(0, 1)),
        Derivation::ReverseTarget => {
            resolution.rev_dependencies = Some(target(1, 2).into_iter().collect());
        }
        Derivation::MatchingTables => {
            if let (Some(database), Some(pattern)) = (config.value_at(0), config.value_at(1)) {
                resolution.lookup = Some(DependencyLookup {
                    database: database.to_string(),
                    pattern: pattern.to_string(),
                });
            }
        }
    }

    Ok(resolution)
}

impl fmt::Display for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "[{}]", pairs.join(", "))
    }
}
