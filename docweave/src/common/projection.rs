use crate::collection::Document;
use crate::common::DOC_ID;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// Shapes returned documents: either keeps only the listed fields or drops
/// them, never both.
///
/// Inclusive projections always keep `_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Projection {
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl Projection {
    pub fn include(fields: &[&str]) -> Self {
        Projection::Include(fields.iter().map(|f| f.to_string()).collect())
    }

    pub fn exclude(fields: &[&str]) -> Self {
        Projection::Exclude(fields.iter().map(|f| f.to_string()).collect())
    }

    pub fn fields(&self) -> &[String] {
        match self {
            Projection::Include(fields) | Projection::Exclude(fields) => fields,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    pub fn apply(&self, document: &Document) -> Document {
        match self {
            Projection::Include(fields) => {
                let mut keep = fields.clone();
                if !keep.iter().any(|f| f == DOC_ID) {
                    keep.insert(0, DOC_ID.to_string());
                }
                document.retain_paths(&keep)
            }
            Projection::Exclude(fields) => {
                let mut projected = document.clone();
                for field in fields {
                    projected.remove_path(field);
                }
                projected
            }
        }
    }
}

impl Display for Projection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let flag = match self {
            Projection::Include(_) => 1,
            Projection::Exclude(_) => 0,
        };
        write!(
            f,
            "{{{}}}",
            self.fields().iter().map(|field| format!("{}: {}", field, flag)).join(", ")
        )
    }
}
