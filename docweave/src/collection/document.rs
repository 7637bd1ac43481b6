use crate::common::{Value, DOC_ID, FIELD_SEPARATOR};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

/// An ordered mapping of field names to [Value]s.
///
/// Fields keep their insertion order, which is also the order in which they
/// are rendered and compared. Nested documents are addressed with dotted
/// paths (`"parent.name"`) through the `*_path` family of methods; the plain
/// `put`/`get`/`remove` methods treat the key literally.
///
/// Every stored document carries an integer `_id` assigned on insert.
///
/// ```ignore
/// let mut doc = doc! { name: "Algebra", parent_id: 1 };
/// doc.put_path("meta.level", 2);
/// assert_eq!(doc.get_path("meta.level"), Some(&Value::I64(2)));
/// ```
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Document {
    data: IndexMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Sets a top level field, keeping its position if it already exists.
    pub fn put<T: Into<Value>>(&mut self, key: impl Into<String>, value: T) {
        self.data.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.data.get_mut(key)
    }

    /// Removes a top level field, preserving the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns the integer `_id` of the document, if present.
    pub fn id(&self) -> Option<i64> {
        self.data.get(DOC_ID).and_then(Value::as_i64)
    }

    /// Field names in insertion order.
    pub fn fields(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    /// Looks up a dotted path through nested documents.
    ///
    /// Arrays are not traversed; use [Document::resolve_path] for
    /// array-aware lookups.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split(FIELD_SEPARATOR);
        let first = segments.next()?;
        let mut current = self.data.get(first)?;
        for segment in segments {
            current = current.as_document()?.data.get(segment)?;
        }
        Some(current)
    }

    /// Collects every value reachable by a dotted path.
    ///
    /// Arrays met on the way are traversed element by element, so
    /// `questions.text` on a document whose `questions` field is an array of
    /// documents yields the `text` of each of them. Missing fields yield
    /// nothing.
    pub fn resolve_path(&self, path: &str) -> Vec<&Value> {
        let segments: Vec<&str> = path.split(FIELD_SEPARATOR).collect();
        let mut found = Vec::new();
        collect_path(self, &segments, &mut found);
        found
    }

    /// Sets the value at a dotted path, creating intermediate documents.
    ///
    /// A non-document value sitting on the path is replaced by a document.
    pub fn put_path<T: Into<Value>>(&mut self, path: &str, value: T) {
        match path.split_once(FIELD_SEPARATOR) {
            None => self.put(path, value),
            Some((head, rest)) => {
                let slot = self
                    .data
                    .entry(head.to_string())
                    .or_insert_with(|| Value::Document(Document::new()));
                if !slot.is_document() {
                    *slot = Value::Document(Document::new());
                }
                if let Some(inner) = slot.as_document_mut() {
                    inner.put_path(rest, value);
                }
            }
        }
    }

    /// Removes the value at a dotted path, returning it.
    pub fn remove_path(&mut self, path: &str) -> Option<Value> {
        match path.split_once(FIELD_SEPARATOR) {
            None => self.remove(path),
            Some((head, rest)) => self.data.get_mut(head)?.as_document_mut()?.remove_path(rest),
        }
    }

    /// Copies every field of `other` into this document, overwriting
    /// existing top level fields.
    pub fn merge(&mut self, other: &Document) {
        for (key, value) in other.iter() {
            self.data.insert(key.clone(), value.clone());
        }
    }

    /// Keeps only the listed fields (dotted paths allowed), in the order they
    /// appear in this document.
    ///
    /// A dotted path through an array of documents projects every element;
    /// elements that are not documents are dropped.
    pub fn retain_paths(&self, paths: &[String]) -> Document {
        let mut projected = Document::new();
        for (key, value) in self.data.iter() {
            let nested: Vec<String> = paths
                .iter()
                .filter_map(|p| p.strip_prefix(key.as_str()))
                .filter_map(|rest| rest.strip_prefix(FIELD_SEPARATOR))
                .map(str::to_string)
                .collect();
            if paths.iter().any(|p| p == key) {
                projected.put(key.clone(), value.clone());
            } else if !nested.is_empty() {
                match value {
                    Value::Document(inner) => {
                        projected.put(key.clone(), inner.retain_paths(&nested));
                    }
                    Value::Array(items) => {
                        let items = items
                            .iter()
                            .filter_map(Value::as_document)
                            .map(|inner| Value::Document(inner.retain_paths(&nested)))
                            .collect();
                        projected.put(key.clone(), Value::Array(items));
                    }
                    _ => {}
                }
            }
        }
        projected
    }
}

fn collect_path<'a>(doc: &'a Document, segments: &[&str], found: &mut Vec<&'a Value>) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    let Some(value) = doc.data.get(*head) else {
        return;
    };
    collect_value(value, rest, found);
}

fn collect_value<'a>(value: &'a Value, rest: &[&str], found: &mut Vec<&'a Value>) {
    if rest.is_empty() {
        found.push(value);
        return;
    }
    match value {
        Value::Document(inner) => collect_path(inner, rest, found),
        Value::Array(items) => {
            for item in items {
                if let Value::Document(inner) = item {
                    collect_path(inner, rest, found);
                }
            }
        }
        _ => {}
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Document {}

impl PartialOrd for Document {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Document {
    fn cmp(&self, other: &Self) -> Ordering {
        self.data.iter().cmp(other.data.iter())
    }
}

impl Hash for Document {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for (key, value) in self.data.iter() {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Document {
            data: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

/// Strips the quotes `stringify!` leaves around string literal keys.
pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] from a literal.
///
/// Keys may be identifiers or string literals; values may be nested `{}`
/// documents, `[]` arrays or any expression convertible into a [Value]
/// (wrap negative numbers and arithmetic in parentheses).
///
/// ```ignore
/// let category = doc! {
///     "_id": 2,
///     name: "Algebra",
///     parent_id: 1,
///     tags: ["math", "school"],
///     meta: { level: (1 + 1) },
/// };
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::collection::Document::new()
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.put($crate::collection::normalize(stringify!($key)), $crate::doc_value!($value));
            )*
            doc
        }
    };
}

/// Helper macro converting `doc!` values.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    fn set_up() -> Document {
        doc! {
            "_id": 3,
            name: "Quiz",
            author: { name: "Ann", address: { city: "Krakow" } },
            questions: [
                { text: "2+2", points: 1 },
                { text: "3*3", points: 2 },
            ],
            tags: ["math", "easy"],
        }
    }

    #[test]
    fn doc_macro_keeps_insertion_order() {
        let doc = set_up();
        assert_eq!(doc.fields(), vec!["_id", "name", "author", "questions", "tags"]);
        assert_eq!(doc.id(), Some(3));
    }

    #[test]
    fn get_path_walks_nested_documents() {
        let doc = set_up();
        assert_eq!(doc.get_path("author.address.city"), Some(&Value::from("Krakow")));
        assert_eq!(doc.get_path("author.missing"), None);
        assert_eq!(doc.get_path("questions.text"), None);
    }

    #[test]
    fn resolve_path_traverses_arrays() {
        let doc = set_up();
        let texts = doc.resolve_path("questions.text");
        assert_eq!(texts, vec![&Value::from("2+2"), &Value::from("3*3")]);
        assert!(doc.resolve_path("nothing.here").is_empty());
        assert_eq!(doc.resolve_path("tags").len(), 1);
    }

    #[test]
    fn put_path_creates_intermediate_documents() {
        let mut doc = doc! { name: "x" };
        doc.put_path("meta.level.value", 5);
        assert_eq!(doc.get_path("meta.level.value"), Some(&Value::I64(5)));

        doc.put_path("name.first", "y");
        assert_eq!(doc.get_path("name.first"), Some(&Value::from("y")));
    }

    #[test]
    fn put_keeps_position_of_existing_key() {
        let mut doc = doc! { a: 1, b: 2 };
        doc.put("a", 10);
        assert_eq!(doc.fields(), vec!["a", "b"]);
        assert_eq!(doc.get("a"), Some(&Value::I64(10)));
    }

    #[test]
    fn remove_path_removes_nested_field() {
        let mut doc = set_up();
        assert_eq!(doc.remove_path("author.address.city"), Some(Value::from("Krakow")));
        assert_eq!(doc.get_path("author.address.city"), None);
        assert!(doc.get_path("author.name").is_some());
        assert_eq!(doc.remove_path("absent.field"), None);
    }

    #[test]
    fn remove_preserves_order() {
        let mut doc = doc! { a: 1, b: 2, c: 3 };
        doc.remove("b");
        assert_eq!(doc.fields(), vec!["a", "c"]);
    }

    #[test]
    fn retain_paths_projects_nested_fields() {
        let doc = set_up();
        let projected = doc.retain_paths(&["name".to_string(), "author.name".to_string()]);
        assert_eq!(projected, doc! { name: "Quiz", author: { name: "Ann" } });
    }

    #[test]
    fn retain_paths_projects_array_elements() {
        let doc = doc! {
            name: "Algebra",
            questions: [ { text: "x+1", level: 2 }, { text: "2y", level: 3 }, 7 ],
        };
        let projected = doc.retain_paths(&["questions.text".to_string()]);
        assert_eq!(projected, doc! { questions: [ { text: "x+1" }, { text: "2y" } ] });
    }

    #[test]
    fn merge_overwrites_fields() {
        let mut doc = doc! { a: 1, b: 2 };
        doc.merge(&doc! { b: 3, c: 4 });
        assert_eq!(doc, doc! { a: 1, b: 3, c: 4 });
    }

    #[test]
    fn display_renders_json_like() {
        let doc = doc! { a: 1, b: "x" };
        assert_eq!(doc.to_string(), "{\"a\": 1, \"b\": \"x\"}");
    }
}
