use anyhow::{Context, Result};
use serde::Serialize;
use tokio_postgres::Client;

use crate::filter::{FieldDescriptor, FieldResolver};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDetails {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub ordinal_position: i32,
}

/// Column layout of one table, used to resolve predicate fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    schema: String,
    table: String,
    columns: Vec<ColumnDetails>,
    qualified_name: String,
}

impl TableSchema {
    pub fn new(schema: &str, table: &str, columns: Vec<ColumnDetails>) -> Self {
        Self {
            schema: schema.to_string(),
            table: table.to_string(),
            columns,
            qualified_name: format!("{}.{}", schema, table),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnDetails] {
        &self.columns
    }

    /// `schema.table`
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDetails> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl FieldResolver for TableSchema {
    fn resolve_field(&self, name: &str) -> Option<FieldDescriptor<'_>> {
        self.column(name).map(|c| FieldDescriptor {
            name: &c.name,
            data_type: &c.data_type,
        })
    }

    fn row_type(&self) -> &str {
        &self.qualified_name
    }
}

/// Load the columns of `schema.table` from `information_schema`.
pub async fn load_table_schema(
    client: &Client,
    schema: &str,
    table: &str,
) -> Result<TableSchema> {
    let rows = client
        .query(
            r#"
            SELECT
                c.column_name as name,
                c.data_type,
                c.is_nullable = 'YES' as is_nullable,
                c.ordinal_position::int4 as ordinal_position
            FROM information_schema.columns c
            WHERE c.table_schema = $1 AND c.table_name = $2
            ORDER BY c.ordinal_position
            "#,
            &[&schema, &table],
        )
        .await
        .with_context(|| format!("Failed to load columns for {}.{}", schema, table))?;

    let columns: Vec<ColumnDetails> = rows
        .iter()
        .map(|row| ColumnDetails {
            name: row.get("name"),
            data_type: row.get("data_type"),
            is_nullable: row.get("is_nullable"),
            ordinal_position: row.get("ordinal_position"),
        })
        .collect();

    if columns.is_empty() {
        anyhow::bail!("Table {}.{} not found or has no columns", schema, table);
    }

    tracing::debug!(schema, table, columns = columns.len(), "loaded table schema");

    Ok(TableSchema::new(schema, table, columns))
}
