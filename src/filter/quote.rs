//! Driver-specific quoting of literal values.
//!
//! The clause builder never escapes values itself: every literal goes through
//! a `ValueQuoter`, dispatched on the value's shape.

/// Turns typed values into SQL literal text for one database driver.
///
/// Implementations must return text that is safe to splice directly into a
/// statement for their driver.
pub trait ValueQuoter {
    fn text_value(&self, value: &str) -> String;

    fn float_value(&self, value: f64) -> String;

    fn int_value(&self, value: i64) -> String;
}

/// PostgreSQL literal quoting.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgQuoter;

impl PgQuoter {
    pub fn new() -> Self {
        Self
    }
}

impl ValueQuoter for PgQuoter {
    /// Single-quoted with embedded quotes doubled. Text containing a backslash
    /// is written as an escape string (`E'...'`) so the result does not depend
    /// on `standard_conforming_strings`.
    fn text_value(&self, value: &str) -> String {
        let escaped = value.replace('\'', "''");
        if value.contains('\\') {
            format!("E'{}'", escaped.replace('\\', "\\\\"))
        } else {
            format!("'{}'", escaped)
        }
    }

    fn float_value(&self, value: f64) -> String {
        if value.is_nan() {
            "'NaN'".to_string()
        } else if value.is_infinite() {
            if value.is_sign_positive() {
                "'Infinity'".to_string()
            } else {
                "'-Infinity'".to_string()
            }
        } else {
            format!("{}", value)
        }
    }

    fn int_value(&self, value: i64) -> String {
        value.to_string()
    }
}
