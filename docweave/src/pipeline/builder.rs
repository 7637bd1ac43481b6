use crate::collection::FindOptions;
use crate::common::{Projection, SortableFields, DOC_ID, FIELD_SEPARATOR, TOTAL_COUNT_FIELD};
use crate::embed::{EmbedDescriptor, EmbedRegistry, ForeignKeyEmbed, FunctionEmbed};
use crate::errors::{ErrorKind, WeaveError, WeaveResult};
use crate::filter::Filter;
use crate::pipeline::{Pipeline, Stage};

/// A native find, used when a query needs no join.
#[derive(Clone, Debug)]
pub struct PlainFind {
    pub filter: Filter,
    pub projection: Option<Projection>,
    pub sort: SortableFields,
    pub skip: u64,
    pub limit: u64,
}

/// A compiled aggregation together with its counting pipeline and the
/// computed embeds to apply to the returned page.
#[derive(Clone, Debug)]
pub struct AggregatePlan {
    pub pipeline: Pipeline,
    pub count_pipeline: Pipeline,
    pub function_embeds: Vec<FunctionEmbed>,
}

/// The execution strategy chosen for a query.
#[derive(Clone, Debug)]
pub enum QueryPlan {
    Plain(PlainFind),
    Aggregate(AggregatePlan),
}

impl QueryPlan {
    pub fn is_aggregate(&self) -> bool {
        matches!(self, QueryPlan::Aggregate(_))
    }
}

/// The embeds taking part in one query, in registry order.
#[derive(Default)]
struct EmbedSet {
    /// Joined embeds and whether the caller asked for them explicitly.
    foreign_keys: Vec<(ForeignKeyEmbed, bool)>,
    functions: Vec<FunctionEmbed>,
}

/// Compiles queries into [QueryPlan]s against an [EmbedRegistry].
pub struct PipelineBuilder<'a> {
    registry: &'a EmbedRegistry,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(registry: &'a EmbedRegistry) -> Self {
        PipelineBuilder { registry }
    }

    /// Compiles a find on `collection`.
    ///
    /// `limit` is the already validated page size. Queries with a dotted
    /// filter field or with requested embeds compile to an aggregation;
    /// everything else runs as a plain find.
    pub fn build(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
        limit: u64,
    ) -> WeaveResult<QueryPlan> {
        let sort = options
            .get_sort_by()
            .filter(|fields| !fields.is_empty())
            .cloned()
            .unwrap_or_else(SortableFields::by_id);
        let projection = options.get_projection().filter(|p| !p.is_empty()).cloned();

        if !filter.has_dotted_field() && options.get_embed().is_empty() {
            log::debug!(
                "Plain find on {}: filter {}, sort {}, skip {}, limit {}",
                collection,
                filter,
                sort,
                options.get_skip(),
                limit
            );
            return Ok(QueryPlan::Plain(PlainFind {
                filter: filter.clone(),
                projection,
                sort,
                skip: options.get_skip(),
                limit,
            }));
        }

        let embeds = self.partition(&filter.dotted_prefixes(), options.get_embed())?;
        let mut pipeline = Pipeline::new();

        for (embed, _) in &embeds.foreign_keys {
            pipeline.push(Stage::Lookup(embed.join_spec()));
        }
        pipeline.push(Stage::Match(filter.clone()));

        let deferred = match projection {
            Some(projection) => {
                let (projection, sort_only) =
                    keep_sort_keys(keep_embeds(projection, &embeds), &sort);
                pipeline.push(Stage::Project(projection));
                sort_only
            }
            None => Vec::new(),
        };
        pipeline.push(Stage::Sort(sort));
        pipeline.push(Stage::Skip(options.get_skip()));
        pipeline.push(Stage::Limit(limit));

        for (embed, _) in &embeds.foreign_keys {
            if !embed.is_array() {
                pipeline.push(Stage::Flatten(embed.name().to_string()));
            }
        }

        let mut hidden = hidden_local_fields(&embeds);
        for field in deferred {
            if !hidden.contains(&field) {
                hidden.push(field);
            }
        }
        if !hidden.is_empty() {
            pipeline.push(Stage::Project(Projection::Exclude(hidden)));
        }

        let implied_only: Vec<String> = embeds
            .foreign_keys
            .iter()
            .filter(|(_, requested)| !requested)
            .map(|(embed, _)| embed.name().to_string())
            .collect();
        if !implied_only.is_empty() {
            pipeline.push(Stage::Project(Projection::Exclude(implied_only)));
        }

        let count_pipeline = pipeline.count_pipeline(TOTAL_COUNT_FIELD).ok_or_else(|| {
            log::error!("Compiled pipeline for {} has no match stage", collection);
            WeaveError::new("Compiled pipeline has no match stage", ErrorKind::Invalid)
        })?;

        log::debug!("Compiled pipeline for {}: {}", collection, pipeline);
        Ok(QueryPlan::Aggregate(AggregatePlan {
            pipeline,
            count_pipeline,
            function_embeds: embeds.functions,
        }))
    }

    /// Splits the embeds implied by dotted filter prefixes and the requested
    /// embeds into joined and computed ones.
    ///
    /// Requested names must be registered. A dotted prefix that is not a
    /// registered name addresses a nested field of the host document, and a
    /// prefix naming a computed embed joins nothing.
    fn partition(&self, implied: &[String], requested: &[String]) -> WeaveResult<EmbedSet> {
        for name in requested {
            self.registry.resolve(name)?;
        }

        let mut embeds = EmbedSet::default();
        for descriptor in self.registry.iter() {
            let is_requested = requested.iter().any(|n| n == descriptor.name());
            let is_implied = implied.iter().any(|n| n == descriptor.name());
            match descriptor {
                EmbedDescriptor::ForeignKey(embed) if is_requested || is_implied => {
                    embeds.foreign_keys.push((embed.clone(), is_requested));
                }
                EmbedDescriptor::Function(embed) if is_requested => {
                    embeds.functions.push(embed.clone());
                }
                _ => {}
            }
        }
        Ok(embeds)
    }
}

/// Inclusive projections would drop the joined fields and the inputs of
/// computed embeds, so those are added to the kept set.
fn keep_embeds(projection: Projection, embeds: &EmbedSet) -> Projection {
    match projection {
        Projection::Include(mut fields) => {
            let needed = embeds
                .foreign_keys
                .iter()
                .filter(|(_, requested)| *requested)
                .map(|(embed, _)| embed.name())
                .chain(embeds.functions.iter().map(FunctionEmbed::local_field));
            for field in needed {
                if !fields.iter().any(|f| f == field) {
                    fields.push(field.to_string());
                }
            }
            Projection::Include(fields)
        }
        exclude => exclude,
    }
}

/// The sort runs after the projection, so sort keys the projection would
/// drop are kept through it. Returns the adjusted projection and the fields
/// to drop once the page is sorted.
fn keep_sort_keys(projection: Projection, sort: &SortableFields) -> (Projection, Vec<String>) {
    let keys = sort.sorting_order().iter().map(|(key, _)| key.as_str());
    let mut deferred: Vec<String> = Vec::new();
    match projection {
        Projection::Include(mut fields) => {
            for key in keys {
                if key == DOC_ID || fields.iter().any(|f| overlaps(f, key)) {
                    continue;
                }
                fields.push(key.to_string());
                deferred.push(key.to_string());
            }
            (Projection::Include(fields), deferred)
        }
        Projection::Exclude(mut fields) => {
            for key in keys {
                fields.retain(|f| {
                    if overlaps(f, key) {
                        deferred.push(f.clone());
                        false
                    } else {
                        true
                    }
                });
            }
            (Projection::Exclude(fields), deferred)
        }
    }
}

/// Whether one dotted path equals or contains the other.
fn overlaps(a: &str, b: &str) -> bool {
    let within = |outer: &str, inner: &str| {
        inner
            .strip_prefix(outer)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(FIELD_SEPARATOR))
    };
    within(a, b) || within(b, a)
}

fn hidden_local_fields(embeds: &EmbedSet) -> Vec<String> {
    let mut hidden: Vec<String> = Vec::new();
    for (embed, _) in &embeds.foreign_keys {
        let local = embed.local_field();
        let needed_by_function = embeds.functions.iter().any(|f| f.local_field() == local);
        let is_embed_output = embeds.foreign_keys.iter().any(|(e, _)| e.name() == local);
        if local == DOC_ID || needed_by_function || is_embed_output {
            continue;
        }
        if !hidden.iter().any(|h| h == local) {
            hidden.push(local.to_string());
        }
    }
    hidden
}
