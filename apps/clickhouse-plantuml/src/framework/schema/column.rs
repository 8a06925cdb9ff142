use super::table::KeyKind;
use serde::{Deserialize, Serialize};

/// A column as reported by `system.columns`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub database: String,
    pub table: String,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub default_kind: String,
    pub default_expression: String,
    pub comment: String,
    pub compression_codec: String,
    pub is_in_partition_key: bool,
    pub is_in_sorting_key: bool,
    pub is_in_primary_key: bool,
    pub is_in_sampling_key: bool,
}

impl Column {
    /// `database.table` of the owning table
    pub fn db_table(&self) -> String {
        format!("{}.{}", self.database, self.table)
    }

    pub fn is_in_key(&self, kind: KeyKind) -> bool {
        match kind {
            KeyKind::Partition => self.is_in_partition_key,
            KeyKind::Sorting => self.is_in_sorting_key,
            KeyKind::Primary => self.is_in_primary_key,
            KeyKind::Sampling => self.is_in_sampling_key,
        }
    }

    /// Key memberships, in display order
    pub fn keys(&self) -> impl Iterator<Item = KeyKind> + '_ {
        KeyKind::ALL
            .into_iter()
            .filter(move |kind| self.is_in_key(*kind))
    }
}
