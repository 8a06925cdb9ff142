//! The table model read from the ClickHouse catalog.

pub mod catalog;
pub mod column;
pub mod engine_args;
pub mod engine_config;
pub mod engine_lexer;
pub mod errors;
pub mod table;
pub mod tables;

pub use catalog::{CatalogReader, CatalogScope, TableRow};
pub use column::Column;
pub use engine_config::EngineConfig;
pub use errors::{CatalogError, SchemaError};
pub use table::{KeyKind, Table};
pub use tables::TableCollection;
