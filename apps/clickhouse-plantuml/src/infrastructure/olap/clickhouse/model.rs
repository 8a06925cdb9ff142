//! Rows of the `system` tables, as they come over the wire.

use crate::framework::schema::{Column, TableRow};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, clickhouse::Row)]
pub struct SystemTableRow {
    pub database: String,
    pub name: String,
    pub dependencies: Vec<String>,
    pub create_table_query: String,
    pub engine: String,
    pub engine_full: String,
    pub partition_key: String,
    pub sorting_key: String,
    pub primary_key: String,
    pub sampling_key: String,
}

impl From<SystemTableRow> for TableRow {
    fn from(row: SystemTableRow) -> Self {
        TableRow {
            database: row.database,
            name: row.name,
            dependencies: row.dependencies,
            create_table_query: row.create_table_query,
            engine: row.engine,
            engine_full: row.engine_full,
            partition_key: row.partition_key,
            sorting_key: row.sorting_key,
            primary_key: row.primary_key,
            sampling_key: row.sampling_key,
        }
    }
}

/// `is_in_*_key` are UInt8 on the server
#[derive(Debug, Clone, Deserialize, clickhouse::Row)]
pub struct SystemColumnRow {
    pub database: String,
    pub table: String,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub default_kind: String,
    pub default_expression: String,
    pub comment: String,
    pub is_in_partition_key: u8,
    pub is_in_sorting_key: u8,
    pub is_in_primary_key: u8,
    pub is_in_sampling_key: u8,
    pub compression_codec: String,
}

impl From<SystemColumnRow> for Column {
    fn from(row: SystemColumnRow) -> Self {
        Column {
            database: row.database,
            table: row.table,
            name: row.name,
            column_type: row.column_type,
            default_kind: row.default_kind,
            default_expression: row.default_expression,
            comment: row.comment,
            compression_codec: row.compression_codec,
            is_in_partition_key: row.is_in_partition_key != 0,
            is_in_sorting_key: row.is_in_sorting_key != 0,
            is_in_primary_key: row.is_in_primary_key != 0,
            is_in_sampling_key: row.is_in_sampling_key != 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, clickhouse::Row)]
pub struct QualifiedNameRow {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_flags() {
        let column = Column::from(SystemColumnRow {
            database: "db".to_string(),
            table: "events".to_string(),
            name: "date".to_string(),
            column_type: "Date".to_string(),
            default_kind: String::new(),
            default_expression: String::new(),
            comment: "event day".to_string(),
            is_in_partition_key: 1,
            is_in_sorting_key: 0,
            is_in_primary_key: 0,
            is_in_sampling_key: 1,
            compression_codec: "CODEC(Delta(2), LZ4)".to_string(),
        });

        assert!(column.is_in_partition_key);
        assert!(!column.is_in_sorting_key);
        assert!(column.is_in_sampling_key);
        assert_eq!(column.db_table(), "db.events");
        assert_eq!(column.compression_codec, "CODEC(Delta(2), LZ4)");
    }
}
