use crate::collection::Document;
use crate::common::Value;
use crate::pipeline::{JoinSpec, Pipeline, Stage};

/// Runs `pipeline` over `source`.
///
/// `foreign` returns a snapshot of another collection for join stages.
pub(crate) fn evaluate<F>(source: Vec<Document>, pipeline: &Pipeline, foreign: F) -> Vec<Document>
where
    F: Fn(&str) -> Vec<Document>,
{
    let mut documents = source;
    for stage in pipeline.stages() {
        documents = match stage {
            Stage::Lookup(join) => {
                let candidates = foreign(&join.from_collection);
                documents
                    .into_iter()
                    .map(|document| lookup(document, join, &candidates))
                    .collect()
            }
            Stage::Match(filter) => documents
                .into_iter()
                .filter(|document| filter.matches(document))
                .collect(),
            Stage::Project(projection) => documents.iter().map(|d| projection.apply(d)).collect(),
            Stage::Sort(fields) => {
                // sort_by is stable, equal keys keep their stream order
                documents.sort_by(|a, b| fields.compare(a, b));
                documents
            }
            Stage::Skip(n) => documents.into_iter().skip(to_usize(*n)).collect(),
            Stage::Limit(n) => {
                documents.truncate(to_usize(*n));
                documents
            }
            Stage::Flatten(field) => documents
                .into_iter()
                .map(|document| flatten(document, field))
                .collect(),
            Stage::Count(field) => {
                if documents.is_empty() {
                    Vec::new()
                } else {
                    let mut count = Document::new();
                    count.put(field.clone(), documents.len() as i64);
                    vec![count]
                }
            }
        };
    }
    documents
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

/// Writes the foreign documents whose join field equals any of the host's
/// local values into the output field. Array values on either side match
/// element-wise.
fn lookup(mut document: Document, join: &JoinSpec, candidates: &[Document]) -> Document {
    let local = flattened(document.resolve_path(&join.local_field));
    let joined: Vec<Value> = if local.is_empty() {
        Vec::new()
    } else {
        candidates
            .iter()
            .filter(|candidate| {
                flattened(candidate.resolve_path(&join.foreign_field))
                    .iter()
                    .any(|value| local.contains(value))
            })
            .map(|candidate| Value::Document(candidate.clone()))
            .collect()
    };
    document.put_path(&join.output_field, Value::Array(joined));
    document
}

fn flattened(values: Vec<&Value>) -> Vec<&Value> {
    let mut flat = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Value::Array(items) => flat.extend(items.iter()),
            Value::Null => {}
            other => flat.push(other),
        }
    }
    flat
}

/// Left outer flatten: an array collapses to its first element, an empty or
/// missing one to null.
fn flatten(mut document: Document, field: &str) -> Document {
    let flat = match document.get_path(field) {
        Some(Value::Array(items)) => items.first().cloned().unwrap_or_default(),
        Some(other) => other.clone(),
        None => Value::Null,
    };
    document.put_path(field, flat);
    document
}
