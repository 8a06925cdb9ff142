//! The catalog reader seam.
//!
//! The model never talks to a server directly. Everything it needs comes
//! through [`CatalogReader`], which the ClickHouse adapter implements and
//! tests replace with an in-memory catalog.

use super::column::Column;
use super::errors::CatalogError;
use async_trait::async_trait;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Which part of the catalog to read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogScope {
    pub databases: Vec<String>,
    /// Empty means every table of `databases`
    pub tables: Vec<String>,
}

impl CatalogScope {
    pub fn new(databases: Vec<String>, tables: Vec<String>) -> Self {
        CatalogScope { databases, tables }
    }

    /// Table filter to send to the server, including the implicit storage
    /// tables of materialized views (`.inner.<view>`).
    pub fn table_names(&self) -> Vec<String> {
        self.tables
            .iter()
            .cloned()
            .chain(self.tables.iter().map(|t| format!(".inner.{t}")))
            .unique()
            .collect()
    }
}

/// A row of `system.tables`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub database: String,
    pub name: String,
    /// `database.table` strings
    pub dependencies: Vec<String>,
    pub create_table_query: String,
    pub engine: String,
    pub engine_full: String,
    pub partition_key: String,
    pub sorting_key: String,
    pub primary_key: String,
    pub sampling_key: String,
}

#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Tables in `scope`, ordered by database and name
    async fn fetch_tables(&self, scope: &CatalogScope) -> Result<Vec<TableRow>, CatalogError>;

    /// Columns of the given tables, in table position order
    async fn fetch_columns(
        &self,
        databases: &[String],
        tables: &[String],
    ) -> Result<Vec<Column>, CatalogError>;

    /// `database.name` of every table of `database` matching the regular
    /// expression `pattern`
    async fn tables_matching(
        &self,
        database: &str,
        pattern: &str,
    ) -> Result<Vec<String>, CatalogError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names_include_inner_tables() {
        let scope = CatalogScope::new(
            vec!["db".to_string()],
            vec!["events".to_string(), "events_mv".to_string()],
        );
        assert_eq!(
            scope.table_names(),
            vec!["events", "events_mv", ".inner.events", ".inner.events_mv"]
        );
        assert!(CatalogScope::default().table_names().is_empty());
    }
}
