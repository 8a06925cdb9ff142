use super::catalog::TableRow;
use super::column::Column;
use super::engine_config::{resolve_engine_config, DependencyLookup, EngineConfig};
use super::errors::SchemaError;
use itertools::Itertools;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

pub const MATERIALIZED_VIEW_ENGINE: &str = "MaterializedView";

static MATERIALIZED_VIEW_TO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // A name part is either `quoted` or runs up to whitespace, a dot or a parenthesis
    let name = r"(?:`(?:[^`\\]|\\.)*`|[^\s`.()]+)";
    // TO <table> right after the view name, never inside the SELECT
    Regex::new(&format!(
        r"(?is)^\s*CREATE\s+MATERIALIZED\s+VIEW\s+(?:IF\s+NOT\s+EXISTS\s+)?(?:{name}\.)?{name}(?:\s+UUID\s+'[^']*')?(?:\s+ON\s+CLUSTER\s+{name})?\s+TO\s+(?:({name})\.)?({name})"
    ))
    .expect("MATERIALIZED_VIEW_TO_PATTERN regex should compile")
});

/// Strips the backticks of a quoted identifier and its backslash escapes
fn unquote_identifier(part: &str) -> String {
    let Some(inner) = part
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
    else {
        return part.to_string();
    };
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => result.extend(chars.next()),
            _ => result.push(c),
        }
    }
    result
}

/// The four table keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KeyKind {
    Partition,
    Sorting,
    Primary,
    Sampling,
}

impl KeyKind {
    pub const ALL: [KeyKind; 4] = [
        KeyKind::Partition,
        KeyKind::Sorting,
        KeyKind::Primary,
        KeyKind::Sampling,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            KeyKind::Partition => "partition",
            KeyKind::Sorting => "sorting",
            KeyKind::Primary => "primary",
            KeyKind::Sampling => "sampling",
        }
    }

    /// PlantUML sprite marking the key
    pub fn sign(&self) -> &'static str {
        match self {
            KeyKind::Partition => "<size:15><&list-rich></size>",
            KeyKind::Sorting => "<size:15><&signal></size>",
            KeyKind::Primary => "<size:15><&key></size>",
            KeyKind::Sampling => "<size:15><&collapse-down></size>",
        }
    }
}

/// A table, view or dictionary from `system.tables`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub database: String,
    pub name: String,
    pub dependencies: Vec<String>,
    pub rev_dependencies: Vec<String>,
    pub create_table_query: String,
    pub engine: String,
    pub engine_full: String,
    pub partition_key: String,
    pub sorting_key: String,
    pub primary_key: String,
    pub sampling_key: String,
    pub engine_config: EngineConfig,
    pub replication_config: EngineConfig,
    pub columns: Vec<Column>,
}

impl From<TableRow> for Table {
    fn from(row: TableRow) -> Self {
        Table {
            database: row.database,
            name: row.name,
            dependencies: row.dependencies,
            rev_dependencies: Vec::new(),
            create_table_query: row.create_table_query,
            engine: row.engine,
            engine_full: row.engine_full,
            partition_key: row.partition_key,
            sorting_key: row.sorting_key,
            primary_key: row.primary_key,
            sampling_key: row.sampling_key,
            engine_config: EngineConfig::new(),
            replication_config: EngineConfig::new(),
            columns: Vec::new(),
        }
    }
}

impl Table {
    /// `database.name`, the key of the table in a collection
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.database, self.name)
    }

    pub fn is_materialized_view(&self) -> bool {
        self.engine == MATERIALIZED_VIEW_ENGINE
    }

    pub fn key(&self, kind: KeyKind) -> &str {
        match kind {
            KeyKind::Partition => &self.partition_key,
            KeyKind::Sorting => &self.sorting_key,
            KeyKind::Primary => &self.primary_key,
            KeyKind::Sampling => &self.sampling_key,
        }
    }

    /// Resolves the engine configuration from `engine_full`.
    ///
    /// Both configs are replaced and derived dependencies are added only once,
    /// so calling it again gives the same table. A `Merge` engine returns the
    /// lookup that produces its reverse dependencies.
    pub fn resolve_engine(&mut self) -> Result<Option<DependencyLookup>, SchemaError> {
        let resolution = resolve_engine_config(&self.engine, &self.engine_full).map_err(|e| {
            SchemaError::EngineArguments {
                table: self.qualified_name(),
                engine: self.engine.clone(),
                source: e,
            }
        })?;

        self.engine_config = resolution.engine_config;
        self.replication_config = resolution.replication_config;
        for dependency in resolution.dependencies {
            if !self.dependencies.contains(&dependency) {
                self.dependencies.push(dependency);
            }
        }
        if let Some(rev_dependencies) = resolution.rev_dependencies {
            self.rev_dependencies = rev_dependencies;
        }

        debug!(
            "Resolved {} engine of {}: {}",
            self.engine,
            self.qualified_name(),
            self.engine_config
        );
        Ok(resolution.lookup)
    }

    pub fn set_rev_dependencies(&mut self, rev_dependencies: Vec<String>) {
        self.rev_dependencies = rev_dependencies;
    }

    /// Attaches a column. It must belong to this table.
    pub fn add_column(&mut self, column: Column) -> Result<(), SchemaError> {
        if column.database != self.database || column.table != self.name {
            let owner = column.db_table();
            return Err(SchemaError::ColumnOwnerMismatch {
                column: column.name,
                owner,
                table: self.qualified_name(),
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Qualified name of the table a materialized view stores its data in:
    /// the `TO` target of the CREATE statement, otherwise the implicit
    /// `<database>..inner.<name>`.
    pub fn data_table_name(&self) -> String {
        MATERIALIZED_VIEW_TO_PATTERN
            .captures(&self.create_table_query)
            .and_then(|caps| {
                let table = unquote_identifier(caps.get(2)?.as_str());
                let database = caps
                    .get(1)
                    .map(|m| unquote_identifier(m.as_str()))
                    .unwrap_or_else(|| self.database.clone());
                Some(format!("{database}.{table}"))
            })
            .unwrap_or_else(|| format!("{}..inner.{}", self.database, self.name))
    }

    /// Takes over the storage table of a materialized view: its keys,
    /// columns, replication and engine config, prefixed with
    /// `data_table_name` and `data_table_engine`.
    pub fn absorb_data_table(&mut self, data: Table) {
        let mut engine_config: EngineConfig = [
            ("data_table_name", data.qualified_name()),
            ("data_table_engine", data.engine.clone()),
        ]
        .into_iter()
        .collect();
        engine_config.extend(data.engine_config);
        engine_config.extend(std::mem::take(&mut self.engine_config));
        self.engine_config = engine_config;

        self.partition_key = data.partition_key;
        self.sorting_key = data.sorting_key;
        self.primary_key = data.primary_key;
        self.sampling_key = data.sampling_key;
        self.replication_config = data.replication_config;

        self.columns = data
            .columns
            .into_iter()
            .map(|column| Column {
                database: self.database.clone(),
                table: self.name.clone(),
                ..column
            })
            .collect();

        self.dependencies.extend(data.dependencies);
        self.rev_dependencies.extend(data.rev_dependencies);
    }

    /// Renames the edges pointing at `from` to `to`, dropping self edges and
    /// duplicates.
    pub fn repoint(&mut self, from: &str, to: &str) {
        let own_name = self.qualified_name();
        let rename = |names: &mut Vec<String>| {
            *names = names
                .drain(..)
                .map(|name| if name == from { to.to_string() } else { name })
                .filter(|name| *name != own_name)
                .unique()
                .collect();
        };
        rename(&mut self.dependencies);
        rename(&mut self.rev_dependencies);
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} ({})", self.database, self.name, self.engine)
    }
}
