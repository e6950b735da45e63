//! Predicate types for the WHERE-clause builder.
//!
//! Operands and conjunctions are closed enums, so every rendering match is
//! checked for exhaustiveness at compile time. Values are a closed scalar enum
//! whose shape is only checked when the clause is rendered.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Comparison and set-membership operators supported in a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operand {
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    In,
    NotIn,
}

impl Operand {
    pub const ALL: [Operand; 6] = [
        Operand::Equals,
        Operand::NotEquals,
        Operand::LessThan,
        Operand::GreaterThan,
        Operand::In,
        Operand::NotIn,
    ];

    /// The SQL token emitted between field and value.
    pub fn sql_token(&self) -> &'static str {
        match self {
            Operand::Equals => "=",
            Operand::NotEquals => "!=",
            Operand::LessThan => "<",
            Operand::GreaterThan => ">",
            Operand::In => "IN",
            Operand::NotIn => "NOT IN",
        }
    }

    /// Stable identifier used in checksums and filter documents.
    pub fn identifier(&self) -> &'static str {
        match self {
            Operand::Equals => "EQUALS",
            Operand::NotEquals => "NOT_EQUALS",
            Operand::LessThan => "LESS_THAN",
            Operand::GreaterThan => "GREATER_THAN",
            Operand::In => "IN",
            Operand::NotIn => "NOT_IN",
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

/// Returned when text does not name an operand in the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperand(pub String);

impl FromStr for Operand {
    type Err = UnknownOperand;

    /// Accepts either the identifier (`GREATER_THAN`) or the SQL token (`>`),
    /// case-insensitively and with surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        let upper = normalized.to_uppercase();
        Operand::ALL
            .into_iter()
            .find(|op| {
                op.identifier() == upper
                    || op.sql_token() == upper
                    || op.identifier().replace('_', " ") == upper
            })
            .ok_or_else(|| UnknownOperand(s.to_string()))
    }
}

/// How a predicate combines with the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conjunction {
    #[default]
    #[serde(alias = "AND")]
    And,
    #[serde(alias = "OR")]
    Or,
}

impl Conjunction {
    /// Token placed before the predicate. The predicate text supplies the
    /// trailing space.
    pub fn sql_token(&self) -> &'static str {
        match self {
            Conjunction::And => " AND",
            Conjunction::Or => " OR",
        }
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conjunction::And => write!(f, "AND"),
            Conjunction::Or => write!(f, "OR"),
        }
    }
}

/// A dynamically shaped scalar held by a predicate.
///
/// Only `Text`, `Float` and `Integer` can be rendered; the other shapes are
/// accepted at append time and rejected when the clause is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Name of the value's shape, used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "string",
        }
    }

    /// Textual form fed into the checksum buffer.
    ///
    /// Booleans follow the loose string coercion of the cache keys already in
    /// use: `true` is `"1"`, `false` and null are empty.
    pub fn checksum_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(true) => "1".to_string(),
            Value::Bool(false) => String::new(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// One field/operand/value comparison plus its link to the previous predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Predicate {
    field: String,
    operand: Operand,
    value: Value,
    conjunction: Conjunction,
}

impl Predicate {
    pub fn new(
        field: impl Into<String>,
        operand: Operand,
        value: impl Into<Value>,
        conjunction: Conjunction,
    ) -> Self {
        Self {
            field: field.into(),
            operand,
            value: value.into(),
            conjunction,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operand(&self) -> Operand {
        self.operand
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn conjunction(&self) -> Conjunction {
        self.conjunction
    }

    /// The canonical `field|OPERAND|value` line hashed into the checksum.
    pub fn checksum_line(&self) -> String {
        format!(
            "{}|{}|{}\n",
            self.field,
            self.operand.identifier(),
            self.value.checksum_text()
        )
    }
}
