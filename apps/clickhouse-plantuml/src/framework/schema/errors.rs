use super::engine_config::MissingEngineArgument;

/// Failures that abort building the table model
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("Cannot resolve engine {engine} of table {table}")]
    EngineArguments {
        table: String,
        engine: String,
        #[source]
        source: MissingEngineArgument,
    },

    #[error("Column {column} belongs to {owner}, which is not loaded")]
    UnknownColumnOwner { column: String, owner: String },

    #[error("Column {column} belongs to {owner}, not to {table}")]
    ColumnOwnerMismatch {
        column: String,
        owner: String,
        table: String,
    },

    #[error("Table {name} is already in the collection")]
    DuplicateTable { name: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// A catalog read that did not succeed
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("Failed to read {}", resource.as_deref().unwrap_or("the catalog"))]
    Query {
        resource: Option<String>,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
