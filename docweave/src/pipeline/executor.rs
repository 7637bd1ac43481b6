use crate::collection::{Document, FindResult};
use crate::common::TOTAL_COUNT_FIELD;
use crate::errors::WeaveResult;
use crate::pipeline::{AggregatePlan, PlainFind, QueryPlan};
use crate::store::DocumentStore;

/// Runs compiled [QueryPlan]s against a store and derives totals.
#[derive(Clone)]
pub struct QueryExecutor {
    store: DocumentStore,
}

impl QueryExecutor {
    pub fn new(store: DocumentStore) -> Self {
        QueryExecutor { store }
    }

    /// Executes `plan` on `collection`.
    ///
    /// With `with_count` unset the total count is reported as zero and no
    /// count query is issued.
    pub fn execute(
        &self,
        collection: &str,
        plan: &QueryPlan,
        with_count: bool,
    ) -> WeaveResult<FindResult> {
        match plan {
            QueryPlan::Plain(find) => self.execute_plain(collection, find, with_count),
            QueryPlan::Aggregate(aggregate) => {
                self.execute_aggregate(collection, aggregate, with_count)
            }
        }
    }

    fn execute_plain(
        &self,
        collection: &str,
        find: &PlainFind,
        with_count: bool,
    ) -> WeaveResult<FindResult> {
        let documents = self.store.find(collection, find)?;
        let total_count = if with_count {
            self.store.count(collection, &find.filter)?
        } else {
            0
        };
        Ok(FindResult::new(documents, total_count))
    }

    fn execute_aggregate(
        &self,
        collection: &str,
        plan: &AggregatePlan,
        with_count: bool,
    ) -> WeaveResult<FindResult> {
        let mut documents = self.store.aggregate(collection, &plan.pipeline)?;

        // an empty page is reported with a zero total, even past the last page
        let total_count = if with_count && !documents.is_empty() {
            let counted = self.store.aggregate(collection, &plan.count_pipeline)?;
            read_count(&counted)
        } else {
            0
        };

        for embed in &plan.function_embeds {
            for document in documents.iter_mut() {
                embed.resolve(document)?;
            }
        }
        Ok(FindResult::new(documents, total_count))
    }
}

fn read_count(counted: &[Document]) -> u64 {
    counted
        .first()
        .and_then(|document| document.get(TOTAL_COUNT_FIELD))
        .and_then(|value| value.as_i64())
        .map_or(0, |count| count.max(0) as u64)
}
