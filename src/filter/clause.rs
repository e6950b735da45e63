//! WHERE-clause builder.
//!
//! Predicates are accumulated without validation and checked only when the
//! clause is rendered against a concrete row type and quoter. A clause either
//! renders completely or fails; partial SQL is never returned.
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_128;

use super::error::WhereClauseError;
use super::quote::ValueQuoter;
use super::resolver::FieldResolver;
use super::types::{Conjunction, Operand, Predicate, Value};

/// An ordered list of predicates rendered as ` WHERE ...`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    predicates: Vec<Predicate>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a predicate joined to the previous one with AND.
    pub fn and(
        &mut self,
        field: impl Into<String>,
        operand: Operand,
        value: impl Into<Value>,
    ) -> bool {
        self.append(field, operand, value, Conjunction::And)
    }

    /// Append a predicate joined to the previous one with OR.
    pub fn or(
        &mut self,
        field: impl Into<String>,
        operand: Operand,
        value: impl Into<Value>,
    ) -> bool {
        self.append(field, operand, value, Conjunction::Or)
    }

    /// Append a predicate with an explicit conjunction.
    ///
    /// Returns `false` and appends nothing when the field name is blank. Field
    /// existence and value shape are checked by [`WhereClause::render`].
    pub fn append(
        &mut self,
        field: impl Into<String>,
        operand: Operand,
        value: impl Into<Value>,
        conjunction: Conjunction,
    ) -> bool {
        let field = field.into();
        if field.trim().is_empty() {
            warn!(%operand, "rejected predicate with an empty field name");
            return false;
        }
        self.predicates
            .push(Predicate::new(field, operand, value, conjunction));
        true
    }

    pub fn count(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Render the clause, including the leading ` WHERE`.
    ///
    /// An empty clause renders to the empty string. With three or more
    /// predicates mixing AND and OR the output is not parenthesized, so the
    /// database's own precedence applies.
    pub fn render<Q, R>(&self, quoter: &Q, row: &R) -> Result<String, WhereClauseError>
    where
        Q: ValueQuoter + ?Sized,
        R: FieldResolver + ?Sized,
    {
        let count = self.count();
        debug!(count, "rendering where clause");

        if count == 0 {
            return Ok(String::new());
        }

        let mut sql = String::from(" WHERE");

        for (offset, predicate) in self.predicates.iter().enumerate() {
            if offset != 0 && count > 1 {
                sql.push_str(predicate.conjunction().sql_token());
            }
            sql.push_str(&render_predicate(quoter, row, predicate)?);
        }

        debug!(%sql, "rendered where clause");
        Ok(sql)
    }

    /// Order-sensitive fingerprint of the predicate list, as 32 hex digits.
    pub fn checksum(&self) -> String {
        let params: String = self
            .predicates
            .iter()
            .map(Predicate::checksum_line)
            .collect();

        let checksum = format!("{:032x}", xxh3_128(params.as_bytes()));
        debug!(%params, %checksum, "computed where checksum");
        checksum
    }

    /// Cache key for results of this clause against `table`.
    pub fn cache_key(&self, table: &str) -> String {
        format!("{}:{}", table, self.checksum())
    }
}

fn render_predicate<Q, R>(
    quoter: &Q,
    row: &R,
    predicate: &Predicate,
) -> Result<String, WhereClauseError>
where
    Q: ValueQuoter + ?Sized,
    R: FieldResolver + ?Sized,
{
    let field = predicate.field();

    if row.resolve_field(field).is_none() {
        return Err(WhereClauseError::FieldNotFound {
            field: field.to_string(),
            row: row.row_type().to_string(),
        });
    }

    let value = quote_value(quoter, predicate.value())?;

    Ok(format!(
        " {} {} {}",
        field,
        predicate.operand().sql_token(),
        value
    ))
}

fn quote_value<Q: ValueQuoter + ?Sized>(
    quoter: &Q,
    value: &Value,
) -> Result<String, WhereClauseError> {
    match value {
        Value::Text(s) => Ok(quoter.text_value(s)),
        Value::Float(f) => Ok(quoter.float_value(*f)),
        Value::Integer(i) => Ok(quoter.int_value(*i)),
        Value::Null | Value::Bool(_) => Err(WhereClauseError::UnsupportedValueType {
            shape: value.shape().to_string(),
        }),
    }
}
