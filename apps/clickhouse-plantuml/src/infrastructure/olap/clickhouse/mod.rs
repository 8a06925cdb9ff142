//! # Clickhouse Catalog
//!
//! Reads table and column metadata from the `system` database of a
//! ClickHouse server over its HTTP interface.

use async_trait::async_trait;
use clickhouse::Client;
use tracing::debug;

use self::config::ClickHouseConfig;
use self::errors::ClickhouseError;
use self::model::{QualifiedNameRow, SystemColumnRow, SystemTableRow};
use crate::framework::schema::{CatalogError, CatalogReader, CatalogScope, Column, TableRow};

pub mod config;
pub mod errors;
pub mod model;

const TABLES_QUERY: &str = "SELECT database, name, \
    arrayMap((x, y) -> concat(x, '.', y), dependencies_database, dependencies_table) AS dependencies, \
    create_table_query, engine, engine_full, partition_key, sorting_key, primary_key, sampling_key \
    FROM system.tables WHERE has(?, database)";

const TABLES_ORDER: &str = " ORDER BY database, name";

const COLUMNS_QUERY: &str = "SELECT database, table, name, type, default_kind, default_expression, \
    comment, is_in_partition_key, is_in_sorting_key, is_in_primary_key, is_in_sampling_key, \
    compression_codec \
    FROM system.columns WHERE has(?, database) AND has(?, table) \
    ORDER BY database, table, position";

const MATCHING_TABLES_QUERY: &str = "SELECT concat(database, '.', name) AS name \
    FROM system.tables WHERE database = ? AND match(name, ?) ORDER BY name";

pub struct ConfiguredDBClient {
    pub client: Client,
    pub config: ClickHouseConfig,
}

/// Creates a configured ClickHouse client with the provided configuration
pub fn create_client(clickhouse_config: ClickHouseConfig) -> ConfiguredDBClient {
    ConfiguredDBClient {
        client: Client::default()
            .with_url(clickhouse_config.url())
            .with_user(clickhouse_config.user.to_string())
            .with_password(clickhouse_config.password.to_string())
            .with_database(clickhouse_config.db_name.to_string()),
        config: clickhouse_config,
    }
}

fn tables_query(scope: &CatalogScope) -> String {
    if scope.tables.is_empty() {
        format!("{TABLES_QUERY}{TABLES_ORDER}")
    } else {
        format!("{TABLES_QUERY} AND has(?, name){TABLES_ORDER}")
    }
}

#[async_trait]
impl CatalogReader for ConfiguredDBClient {
    async fn fetch_tables(&self, scope: &CatalogScope) -> Result<Vec<TableRow>, CatalogError> {
        let query = tables_query(scope);
        debug!("Running query: {:?}", query);

        let mut query = self.client.query(&query).bind(&scope.databases);
        if !scope.tables.is_empty() {
            query = query.bind(scope.table_names());
        }
        let rows = query
            .fetch_all::<SystemTableRow>()
            .await
            .map_err(|e| ClickhouseError::client(e, "system.tables"))?;

        Ok(rows.into_iter().map(TableRow::from).collect())
    }

    async fn fetch_columns(
        &self,
        databases: &[String],
        tables: &[String],
    ) -> Result<Vec<Column>, CatalogError> {
        debug!("Running query: {:?}", COLUMNS_QUERY);
        let rows = self
            .client
            .query(COLUMNS_QUERY)
            .bind(databases)
            .bind(tables)
            .fetch_all::<SystemColumnRow>()
            .await
            .map_err(|e| ClickhouseError::client(e, "system.columns"))?;

        Ok(rows.into_iter().map(Column::from).collect())
    }

    async fn tables_matching(
        &self,
        database: &str,
        pattern: &str,
    ) -> Result<Vec<String>, CatalogError> {
        debug!(
            "Looking up tables of {} matching {:?}",
            database, pattern
        );
        let rows = self
            .client
            .query(MATCHING_TABLES_QUERY)
            .bind(database)
            .bind(pattern)
            .fetch_all::<QualifiedNameRow>()
            .await
            .map_err(|e| ClickhouseError::client(e, database))?;

        Ok(rows.into_iter().map(|row| row.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_query_filters_names_only_when_asked() {
        let scope = CatalogScope::new(vec!["db".to_string()], vec![]);
        let query = tables_query(&scope);
        assert!(!query.contains("has(?, name)"));
        assert!(query.ends_with("ORDER BY database, name"));

        let scope = CatalogScope::new(vec!["db".to_string()], vec!["events".to_string()]);
        let query = tables_query(&scope);
        assert!(query.contains("WHERE has(?, database) AND has(?, name) ORDER BY"));
        assert_eq!(query.matches('?').count(), 2);
    }

    #[test]
    fn test_create_client_keeps_config() {
        let config = ClickHouseConfig {
            host: "ch.internal".to_string(),
            host_port: 8443,
            use_ssl: true,
            ..Default::default()
        };
        let client = create_client(config.clone());
        assert_eq!(client.config, config);
    }
}
