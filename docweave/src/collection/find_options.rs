use crate::collection::Document;
use crate::common::{Projection, SortOrder, SortableFields};

/// Options for controlling find operations on a collection.
///
/// `FindOptions` covers projection, sorting, pagination and the embeds to
/// attach to every returned document. It supports method chaining.
///
/// # Examples
///
/// ```rust,ignore
/// use docweave::collection::{FindOptions, order_by};
/// use docweave::common::{Projection, SortOrder};
///
/// let options = FindOptions::new()
///     .sort_by("name", SortOrder::Descending)
///     .skip(10)
///     .limit(20)
///     .embed("parent");
///
/// let options = order_by("name", SortOrder::Ascending)
///     .projection(Projection::exclude(&["secret"]));
/// ```
#[derive(Clone, Debug, Default)]
pub struct FindOptions {
    pub(crate) projection: Option<Projection>,
    pub(crate) sort_by: Option<SortableFields>,
    pub(crate) skip: Option<u64>,
    pub(crate) limit: Option<u64>,
    pub(crate) embed: Vec<String>,
}

/// Creates `FindOptions` with sorting by a field.
pub fn order_by(field_name: &str, sort_order: SortOrder) -> FindOptions {
    FindOptions::new().sort_by(field_name, sort_order)
}

/// Creates `FindOptions` that skips a number of results.
pub fn skip_by(skip: u64) -> FindOptions {
    FindOptions::new().skip(skip)
}

/// Creates `FindOptions` that limits the number of results.
///
/// Combined with skip for pagination: skip(10).limit(20) returns results 11-30.
pub fn limit_to(limit: u64) -> FindOptions {
    FindOptions::new().limit(limit)
}

/// Creates `FindOptions` requesting the named embeds.
pub fn embed_all(names: &[&str]) -> FindOptions {
    names
        .iter()
        .fold(FindOptions::new(), |options, name| options.embed(name))
}

impl FindOptions {
    /// Creates a new `FindOptions` with default settings.
    pub fn new() -> FindOptions {
        FindOptions {
            projection: None,
            sort_by: None,
            skip: None,
            limit: None,
            embed: Vec::new(),
        }
    }

    pub fn projection(mut self, projection: Projection) -> FindOptions {
        self.projection = Some(projection);
        self
    }

    /// Sets the number of documents to skip.
    pub fn skip(mut self, skip: u64) -> FindOptions {
        self.skip = Some(skip);
        self
    }

    /// Sets the maximum number of documents to return.
    ///
    /// Falls back to the configured default limit when unset.
    pub fn limit(mut self, limit: u64) -> FindOptions {
        self.limit = Some(limit);
        self
    }

    /// Appends a sort key; earlier keys take precedence.
    pub fn sort_by(mut self, field_name: &str, sort_order: SortOrder) -> FindOptions {
        let fields = self.sort_by.unwrap_or_default();
        self.sort_by = Some(fields.add_sorted_field(field_name.to_string(), sort_order));
        self
    }

    pub fn sortable_fields(mut self, fields: SortableFields) -> FindOptions {
        self.sort_by = Some(fields);
        self
    }

    /// Requests an embed by its registered name.
    pub fn embed(mut self, name: &str) -> FindOptions {
        if !self.embed.iter().any(|e| e == name) {
            self.embed.push(name.to_string());
        }
        self
    }

    pub fn get_projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    pub fn get_sort_by(&self) -> Option<&SortableFields> {
        self.sort_by.as_ref()
    }

    pub fn get_skip(&self) -> u64 {
        self.skip.unwrap_or(0)
    }

    pub fn get_limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn get_embed(&self) -> &[String] {
        &self.embed
    }
}

/// One page of a find together with the number of documents matching the
/// filter regardless of pagination.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FindResult {
    documents: Vec<Document>,
    total_count: u64,
}

impl FindResult {
    pub fn new(documents: Vec<Document>, total_count: u64) -> Self {
        FindResult {
            documents,
            total_count,
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Ids of the returned documents, in page order.
    pub fn ids(&self) -> Vec<i64> {
        self.documents.iter().filter_map(Document::id).collect()
    }
}
