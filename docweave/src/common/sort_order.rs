/// Specifies the direction for sorting documents.
///
/// Used by sort specifications of a query: `("name", SortOrder::Descending)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in ascending order (smallest to largest, A-Z)
    Ascending,
    /// Sort in descending order (largest to smallest, Z-A)
    Descending,
}

impl SortOrder {
    /// Parses a normalized sort field such as `name` or `-name`.
    ///
    /// A leading `-` selects descending order and is stripped from the field.
    pub fn parse_field(field: &str) -> (String, SortOrder) {
        match field.strip_prefix('-') {
            Some(stripped) => (stripped.to_string(), SortOrder::Descending),
            None => (field.to_string(), SortOrder::Ascending),
        }
    }
}
