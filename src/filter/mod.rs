/// WHERE-clause construction for PostgreSQL queries.
///
/// ```text
/// and / or / append       (clause.rs)
///       ↓
/// Predicate list          (types.rs)
///       ↓
/// render(quoter, row)     field lookup (resolver.rs), literal quoting (quote.rs)
///       ↓
/// " WHERE ..." / checksum
/// ```
///
/// Filter documents (document.rs) describe a clause in TOML for the CLI.
pub mod clause;
pub mod document;
pub mod error;
pub mod quote;
pub mod resolver;
pub mod types;

pub use clause::WhereClause;
pub use document::{ColumnEntry, FilterDocument, PredicateEntry};
pub use error::WhereClauseError;
pub use quote::{PgQuoter, ValueQuoter};
pub use resolver::{FieldDescriptor, FieldResolver};
pub use types::*;
