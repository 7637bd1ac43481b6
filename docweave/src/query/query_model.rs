use crate::collection::{Document, FindOptions};
use crate::common::{Projection, SortOrder, Value};
use crate::errors::{ErrorKind, WeaveError, WeaveResult};
use crate::filter::{field, Filter, Matcher};

const EXCLUDE: &str = "exclude";
const SORT: &str = "sort";
const LIMIT: &str = "limit";
const SKIP: &str = "skip";
const EMBED: &str = "embed";

/// A request's filter, projection, sort, pagination and embeds.
#[derive(Clone, Debug, Default)]
pub struct QueryModel {
    filter: Filter,
    options: FindOptions,
}

impl QueryModel {
    pub fn new(filter: Filter, options: FindOptions) -> Self {
        QueryModel { filter, options }
    }

    /// Maps a normalized query object.
    ///
    /// The reserved keys are `exclude` (fields to hide), `sort` (fields, a
    /// leading `-` sorts descending), `limit`, `skip` and `embed`. Every
    /// other key filters on the field of the same name: a list matches any
    /// of its elements, where integers and booleans match exactly and
    /// strings are case-insensitive patterns. A scalar string is a pattern,
    /// any other scalar an exact match.
    ///
    /// Only the lower bounds of `limit` and `skip` are checked here; the upper
    /// bound of `limit` depends on the engine, see [QueryModel::validate].
    pub fn from_normalized(query: &Document) -> WeaveResult<QueryModel> {
        let mut filter = Filter::new();
        let mut options = FindOptions::new();

        for (key, value) in query.iter() {
            match key.as_str() {
                EXCLUDE => {
                    let fields = string_list(key, value)?;
                    options = options.projection(Projection::Exclude(fields));
                }
                SORT => {
                    for entry in string_list(key, value)? {
                        let (name, order) = SortOrder::parse_field(&entry);
                        options = options.sort_by(&name, order);
                    }
                }
                LIMIT => options = options.limit(page_bound(key, value, 1)?),
                SKIP => options = options.skip(page_bound(key, value, 0)?),
                EMBED => {
                    for name in string_list(key, value)? {
                        options = options.embed(&name);
                    }
                }
                _ => filter = filter.and(field_filter(key, value)?),
            }
        }

        Ok(QueryModel { filter, options })
    }

    /// Checks that the limit, when set, lies within `1..=max_limit`.
    pub fn validate(&self, max_limit: u64) -> WeaveResult<()> {
        match self.options.get_limit() {
            Some(limit) => check_limit(limit, max_limit),
            None => Ok(()),
        }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn options(&self) -> &FindOptions {
        &self.options
    }
}

/// Fails with `Invalid` unless `1 <= limit <= max_limit`.
pub fn check_limit(limit: u64, max_limit: u64) -> WeaveResult<()> {
    if limit == 0 || limit > max_limit {
        log::error!("Limit {} outside of 1..={}", limit, max_limit);
        return Err(WeaveError::new(
            &format!("Limit must be between 1 and {}, got {}", max_limit, limit),
            ErrorKind::Invalid,
        ));
    }
    Ok(())
}

fn field_filter(key: &str, value: &Value) -> WeaveResult<Filter> {
    match value {
        Value::Array(items) => {
            let matchers = items
                .iter()
                .map(|item| match item {
                    Value::String(pattern) => Matcher::pattern(pattern),
                    other => Ok(Matcher::Exact(other.clone())),
                })
                .collect::<WeaveResult<Vec<Matcher>>>()?;
            Ok(field(key).is_in(matchers))
        }
        Value::String(pattern) => field(key).text(pattern),
        other => Ok(field(key).eq(other.clone())),
    }
}

fn string_list(key: &str, value: &Value) -> WeaveResult<Vec<String>> {
    let items = match value {
        Value::Array(items) => items.as_slice(),
        Value::String(single) => return Ok(vec![single.clone()]),
        _ => return Err(invalid(key, value)),
    };
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(|| invalid(key, value)))
        .collect()
}

fn page_bound(key: &str, value: &Value, min: i64) -> WeaveResult<u64> {
    match value.as_i64() {
        Some(n) if n >= min => Ok(n as u64),
        _ => Err(invalid(key, value)),
    }
}

fn invalid(key: &str, value: &Value) -> WeaveError {
    log::error!("Invalid value {} for query parameter {}", value, key);
    WeaveError::new(
        &format!("Invalid value {} for query parameter {}", value, key),
        ErrorKind::Invalid,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SortOrder;
    use crate::doc;

    #[test]
    fn maps_reserved_keys() {
        let query = QueryModel::from_normalized(&doc! {
            exclude: ["secret", "meta.a"],
            sort: ["-name", "level"],
            limit: 20,
            skip: 40,
            embed: ["parent"],
        })
        .unwrap();

        let options = query.options();
        assert_eq!(
            options.get_projection(),
            Some(&Projection::exclude(&["secret", "meta.a"]))
        );
        let sort = options.get_sort_by().unwrap().sorting_order();
        assert_eq!(sort[0], ("name".to_string(), SortOrder::Descending));
        assert_eq!(sort[1], ("level".to_string(), SortOrder::Ascending));
        assert_eq!(options.get_limit(), Some(20));
        assert_eq!(options.get_skip(), 40);
        assert_eq!(options.get_embed(), &["parent".to_string()]);
        assert!(query.filter().is_empty());
    }

    #[test]
    fn lists_mix_exact_integers_and_patterns() {
        let query = QueryModel::from_normalized(&doc! { tags: ["MATH", 3] }).unwrap();
        let filter = query.filter();
        assert!(filter.matches(&doc! { tags: ["easy", "mathematics"] }));
        assert!(filter.matches(&doc! { tags: 3 }));
        assert!(!filter.matches(&doc! { tags: "3" }));
        assert!(!filter.matches(&doc! { tags: ["physics"] }));
    }

    #[test]
    fn scalars_map_to_pattern_or_equality() {
        let query = QueryModel::from_normalized(&doc! { name: "alg", level: 2, public: true })
            .unwrap();
        let filter = query.filter();
        assert_eq!(filter.clauses().len(), 3);
        assert!(filter.matches(&doc! { name: "Algebra", level: 2, public: true }));
        assert!(!filter.matches(&doc! { name: "Algebra", level: 3, public: true }));
    }

    #[test]
    fn defaults_leave_options_unset() {
        let query = QueryModel::from_normalized(&doc! {}).unwrap();
        assert!(query.options().get_limit().is_none());
        assert_eq!(query.options().get_skip(), 0);
        assert!(query.options().get_sort_by().is_none());
    }

    #[test]
    fn rejects_out_of_range_pagination() {
        for query in [doc! { limit: 0 }, doc! { skip: (-1) }] {
            let error = QueryModel::from_normalized(&query).unwrap_err();
            assert_eq!(error.kind(), &ErrorKind::Invalid);
        }
    }

    #[test]
    fn upper_limit_is_checked_against_the_given_maximum() {
        let query = QueryModel::from_normalized(&doc! { limit: 300 }).unwrap();
        assert!(query.validate(500).is_ok());
        assert_eq!(query.validate(200).unwrap_err().kind(), &ErrorKind::Invalid);
    }

    #[test]
    fn rejects_invalid_pattern() {
        let error = QueryModel::from_normalized(&doc! { name: ["("] }).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::Invalid);
    }

    #[test]
    fn rejects_non_string_lists() {
        let error = QueryModel::from_normalized(&doc! { sort: [1] }).unwrap_err();
        assert_eq!(error.code(), "invalid_query");
    }

    #[test]
    fn check_limit_bounds() {
        assert!(check_limit(1, 10).is_ok());
        assert!(check_limit(10, 10).is_ok());
        assert!(check_limit(11, 10).is_err());
        assert!(check_limit(0, 10).is_err());
    }
}
