use thiserror::Error;

/// Errors raised while turning a predicate list into SQL.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WhereClauseError {
    /// A predicate names a field the row does not have.
    #[error("Failed to find field={field} on {row}")]
    FieldNotFound { field: String, row: String },
    /// An operand outside the supported vocabulary.
    #[error("Unsupported operand type={operand} model={row}")]
    UnsupportedOperand { operand: String, row: String },
    /// A value whose shape cannot be quoted (anything but text, float, integer).
    #[error("Unsupported value type value={shape}")]
    UnsupportedValueType { shape: String },
}
