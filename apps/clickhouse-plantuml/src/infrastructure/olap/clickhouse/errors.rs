use crate::framework::schema::CatalogError;

#[derive(Debug, thiserror::Error)]
pub enum ClickhouseError {
    #[error("Error interacting with Clickhouse{}", .resource.as_ref().map(|t| format!(" for '{t}'")).unwrap_or_default())]
    Client {
        #[source]
        error: clickhouse::error::Error,
        resource: Option<String>,
    },
}

impl ClickhouseError {
    pub fn client(error: clickhouse::error::Error, resource: &str) -> Self {
        ClickhouseError::Client {
            error,
            resource: Some(resource.to_string()),
        }
    }
}

impl From<ClickhouseError> for CatalogError {
    fn from(e: ClickhouseError) -> Self {
        match e {
            ClickhouseError::Client { error, resource } => CatalogError::Query {
                resource,
                source: Box::new(error),
            },
        }
    }
}
