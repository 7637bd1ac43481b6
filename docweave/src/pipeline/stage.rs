use crate::common::{Projection, SortableFields};
use crate::filter::Filter;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// Left outer join of a host collection with a foreign one.
///
/// Every host document receives `output_field` holding the array of foreign
/// documents whose `foreign_field` equals the host's `local_field`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinSpec {
    pub local_field: String,
    pub from_collection: String,
    pub foreign_field: String,
    pub output_field: String,
    /// Whether the joined array is collapsed to a single value afterwards.
    pub unwind: bool,
}

/// One step of a pipeline.
#[derive(Clone, Debug)]
pub enum Stage {
    Lookup(JoinSpec),
    Match(Filter),
    Project(Projection),
    Sort(SortableFields),
    Skip(u64),
    Limit(u64),
    /// Collapses an array field to its first element, or null when empty or
    /// missing. The host document is always kept.
    Flatten(String),
    /// Replaces the stream by a single document `{field: <count>}`.
    Count(String),
}

impl Stage {
    /// Operator name of the stage, as rendered in pipeline dumps.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Lookup(_) => "$lookup",
            Stage::Match(_) => "$match",
            Stage::Project(_) => "$project",
            Stage::Sort(_) => "$sort",
            Stage::Skip(_) => "$skip",
            Stage::Limit(_) => "$limit",
            Stage::Flatten(_) => "$unwind",
            Stage::Count(_) => "$count",
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Stage::Match(_))
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Lookup(join) => write!(
                f,
                "{{$lookup: {{from: {}, localField: {}, foreignField: {}, as: {}}}}}",
                join.from_collection, join.local_field, join.foreign_field, join.output_field
            ),
            Stage::Match(filter) => write!(f, "{{$match: {}}}", filter),
            Stage::Project(projection) => write!(f, "{{$project: {}}}", projection),
            Stage::Sort(fields) => write!(f, "{{$sort: {}}}", fields),
            Stage::Skip(n) => write!(f, "{{$skip: {}}}", n),
            Stage::Limit(n) => write!(f, "{{$limit: {}}}", n),
            Stage::Flatten(path) => write!(
                f,
                "{{$unwind: {{path: ${}, preserveNullAndEmptyArrays: true}}}}",
                path
            ),
            Stage::Count(field) => write!(f, "{{$count: {}}}", field),
        }
    }
}

/// An ordered sequence of stages.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline { stages: Vec::new() }
    }

    pub fn push(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Operator names of the stages, in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(Stage::name).collect()
    }

    /// The stages up to and including the match stage followed by a count
    /// stage writing to `field`.
    ///
    /// Returns `None` when the pipeline has no match stage.
    pub fn count_pipeline(&self, field: &str) -> Option<Pipeline> {
        let match_index = self.stages.iter().position(Stage::is_match)?;
        let mut stages = self.stages[..=match_index].to_vec();
        stages.push(Stage::Count(field.to_string()));
        Some(Pipeline { stages })
    }
}

impl From<Vec<Stage>> for Pipeline {
    fn from(stages: Vec<Stage>) -> Self {
        Pipeline { stages }
    }
}

impl Display for Pipeline {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.stages.iter().join(", "))
    }
}
