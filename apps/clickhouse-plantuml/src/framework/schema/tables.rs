//! # Table Collection
//!
//! Tables keyed by `database.name`, kept in catalog order. The collection is
//! built in one pass by [`TableCollection::load`]:
//!
//! 1. read the tables of the requested scope
//! 2. resolve every engine, a malformed engine aborts the load
//! 3. look up the tables behind `Merge` engines, failures only warn
//! 4. read and attach the columns
//! 5. fold materialized views and their storage tables together

use super::catalog::{CatalogReader, CatalogScope};
use super::column::Column;
use super::engine_config::DependencyLookup;
use super::errors::SchemaError;
use super::table::Table;
use indexmap::IndexMap;
use itertools::Itertools;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCollection {
    tables: IndexMap<String, Table>,
}

impl TableCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table at the end. Names are unique.
    pub fn insert(&mut self, table: Table) -> Result<(), SchemaError> {
        let name = table.qualified_name();
        if self.tables.contains_key(&name) {
            return Err(SchemaError::DuplicateTable { name });
        }
        self.tables.insert(name, table);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    pub fn get_index(&self, index: usize) -> Option<&Table> {
        self.tables.get_index(index).map(|(_, table)| table)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.tables.get_index_of(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Removes a table, the following ones move up by one
    pub fn remove(&mut self, name: &str) -> Option<Table> {
        self.tables.shift_remove(name)
    }

    /// Stores `table` under its name, in place if the name is taken.
    /// Returns the table it replaced.
    pub fn replace(&mut self, table: Table) -> Option<Table> {
        self.tables.insert(table.qualified_name(), table)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Attaches a column to the table it belongs to
    pub fn attach_column(&mut self, column: Column) -> Result<(), SchemaError> {
        let owner = column.db_table();
        match self.tables.get_mut(&owner) {
            Some(table) => table.add_column(column),
            None => Err(SchemaError::UnknownColumnOwner {
                column: column.name,
                owner,
            }),
        }
    }

    /// Folds every materialized view and its storage table into one entry.
    ///
    /// Views whose storage table is not in the collection are left alone.
    pub fn merge_materialized_views(&mut self) {
        let views: Vec<(String, String)> = self
            .tables
            .values()
            .filter(|t| t.is_materialized_view())
            .map(|t| (t.qualified_name(), t.data_table_name()))
            .collect();

        for (view_name, data_name) in views {
            if view_name == data_name || !self.tables.contains_key(&view_name) {
                continue;
            }
            let Some(data) = self.tables.shift_remove(&data_name) else {
                debug!(
                    "Data table {} of {} is not loaded, skipping",
                    data_name, view_name
                );
                continue;
            };
            if let Some(view) = self.tables.get_mut(&view_name) {
                view.absorb_data_table(data);
            }
            for table in self.tables.values_mut() {
                table.repoint(&data_name, &view_name);
            }
            debug!("Merged {} into {}", data_name, view_name);
        }
    }

    /// Reads `scope` from the catalog and builds the collection
    pub async fn load(
        reader: &dyn CatalogReader,
        scope: &CatalogScope,
    ) -> Result<TableCollection, SchemaError> {
        let rows = reader.fetch_tables(scope).await?;
        info!("Fetched {} tables", rows.len());

        let mut collection = TableCollection::new();
        let mut lookups: Vec<(String, DependencyLookup)> = Vec::new();
        for row in rows {
            let mut table = Table::from(row);
            if let Some(lookup) = table.resolve_engine()? {
                lookups.push((table.qualified_name(), lookup));
            }
            collection.insert(table)?;
        }

        for (name, lookup) in lookups {
            let rev_dependencies = resolve_lookup(reader, &name, &lookup).await;
            if let Some(table) = collection.get_mut(&name) {
                table.set_rev_dependencies(rev_dependencies);
            }
        }

        let databases: Vec<String> = collection
            .iter()
            .map(|t| t.database.clone())
            .unique()
            .collect();
        let names: Vec<String> = collection
            .iter()
            .map(|t| t.name.clone())
            .unique()
            .collect();
        if !collection.is_empty() {
            let columns = reader.fetch_columns(&databases, &names).await?;
            debug!("Fetched {} columns", columns.len());
            for column in columns {
                collection.attach_column(column)?;
            }
        }

        collection.merge_materialized_views();
        Ok(collection)
    }
}

async fn resolve_lookup(
    reader: &dyn CatalogReader,
    table: &str,
    lookup: &DependencyLookup,
) -> Vec<String> {
    match reader
        .tables_matching(&lookup.database, &lookup.pattern)
        .await
    {
        Ok(names) if names.is_empty() => {
            warn!(
                "No tables in {} match '{}' for {}",
                lookup.database, lookup.pattern, table
            );
            Vec::new()
        }
        Ok(names) => names,
        Err(e) => {
            warn!("Failed to look up the tables behind {}: {}", table, e);
            Vec::new()
        }
    }
}

impl<'a> IntoIterator for &'a TableCollection {
    type Item = &'a Table;
    type IntoIter = indexmap::map::Values<'a, String, Table>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.values()
    }
}
