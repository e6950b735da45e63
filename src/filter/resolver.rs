//! Field lookup on the row type a clause is rendered against.

/// A field as seen by the clause renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor<'a> {
    pub name: &'a str,
    pub data_type: &'a str,
}

/// A row-like type whose fields can be looked up by name.
///
/// The renderer only needs to know whether a field exists; nothing else about
/// the row is consulted.
pub trait FieldResolver {
    fn resolve_field(&self, name: &str) -> Option<FieldDescriptor<'_>>;

    /// Name of the row type, used in error messages.
    fn row_type(&self) -> &str;
}
