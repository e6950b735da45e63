//! TOML filter documents.
//!
//! A document names the target table, optionally lists its columns (so the
//! clause can be rendered without a database), and holds the predicates in
//! order:
//!
//! ```toml
//! schema = "public"
//! table = "users"
//! columns = [{ name = "status", type = "text" }, { name = "age", type = "integer" }]
//!
//! [[predicate]]
//! field = "status"
//! operand = "EQUALS"
//! value = "active"
//!
//! [[predicate]]
//! conjunction = "or"
//! field = "age"
//! operand = ">"
//! value = 21
//! ```
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::clause::WhereClause;
use super::error::WhereClauseError;
use super::types::{Conjunction, Operand, Value};
use crate::db::{ColumnDetails, TableSchema};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterDocument {
    #[serde(default = "default_schema")]
    pub schema: String,
    pub table: String,
    #[serde(default)]
    pub columns: Vec<ColumnEntry>,
    #[serde(default, rename = "predicate")]
    pub predicates: Vec<PredicateEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnEntry {
    pub name: String,
    #[serde(rename = "type", default = "default_column_type")]
    pub data_type: String,
}

/// A predicate as written in a document. The operand stays textual until the
/// clause is built so an unknown operand can be reported against its table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredicateEntry {
    pub field: String,
    pub operand: String,
    pub value: Value,
    #[serde(default)]
    pub conjunction: Conjunction,
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_column_type() -> String {
    "unknown".to_string()
}

impl FilterDocument {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid filter document")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("In {}", path.display()))
    }

    /// `schema.table`
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    /// Schema built from the document's own column list. `None` when the
    /// document has predicates but no columns to resolve them against; a
    /// document without predicates needs no columns.
    pub fn offline_schema(&self) -> Option<TableSchema> {
        if self.columns.is_empty() && !self.predicates.is_empty() {
            return None;
        }
        let columns = self
            .columns
            .iter()
            .zip(1..)
            .map(|(c, position)| ColumnDetails {
                name: c.name.clone(),
                data_type: c.data_type.clone(),
                is_nullable: true,
                ordinal_position: position,
            })
            .collect();
        Some(TableSchema::new(&self.schema, &self.table, columns))
    }

    /// Build the clause in document order.
    ///
    /// Fails with `UnsupportedOperand` on the first operand outside the
    /// vocabulary. Predicates with a blank field are rejected by the builder
    /// and reported as an error here, since a document cannot mean them.
    pub fn to_clause(&self) -> Result<WhereClause> {
        let mut clause = WhereClause::new();

        for (index, entry) in self.predicates.iter().enumerate() {
            let operand: Operand =
                entry
                    .operand
                    .parse()
                    .map_err(|_| WhereClauseError::UnsupportedOperand {
                        operand: entry.operand.clone(),
                        row: self.qualified_table(),
                    })?;

            if !clause.append(
                entry.field.clone(),
                operand,
                entry.value.clone(),
                entry.conjunction,
            ) {
                anyhow::bail!("Predicate #{} has an empty field name", index + 1);
            }
        }

        Ok(clause)
    }
}
