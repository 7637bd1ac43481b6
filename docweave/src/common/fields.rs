use crate::collection::Document;
use crate::common::{SortOrder, Value, DOC_ID};
use itertools::Itertools;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// An ordered list of sort keys.
///
/// Earlier keys take precedence; later keys only break ties.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortableFields {
    sorting_order: Vec<(String, SortOrder)>,
}

impl SortableFields {
    pub fn new() -> Self {
        SortableFields {
            sorting_order: Vec::new(),
        }
    }

    /// `_id` ascending, the order used when a query names none.
    pub fn by_id() -> Self {
        SortableFields::new().add_sorted_field(DOC_ID.to_string(), SortOrder::Ascending)
    }

    pub fn add_sorted_field(mut self, field_name: String, sort_order: SortOrder) -> Self {
        self.sorting_order.push((field_name, sort_order));
        self
    }

    pub fn sorting_order(&self) -> &[(String, SortOrder)] {
        &self.sorting_order
    }

    pub fn is_empty(&self) -> bool {
        self.sorting_order.is_empty()
    }

    /// Compares two documents key by key; missing fields sort as null.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for (field, order) in self.sorting_order.iter() {
            let a_value = sort_key(a, field);
            let b_value = sort_key(b, field);
            let cmp = a_value.cmp(b_value);
            if cmp != Ordering::Equal {
                return match order {
                    SortOrder::Ascending => cmp,
                    SortOrder::Descending => cmp.reverse(),
                };
            }
        }
        Ordering::Equal
    }
}

static NULL: Value = Value::Null;

fn sort_key<'a>(document: &'a Document, field: &str) -> &'a Value {
    document.resolve_path(field).into_iter().next().unwrap_or(&NULL)
}

impl Display for SortableFields {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let keys = self.sorting_order.iter().map(|(field, order)| match order {
            SortOrder::Ascending => format!("{}: 1", field),
            SortOrder::Descending => format!("{}: -1", field),
        });
        write!(f, "{{{}}}", keys.format(", "))
    }
}
