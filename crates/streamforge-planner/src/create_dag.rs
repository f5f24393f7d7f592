use streamforge_model::Pipeline;
use streamforge_types::{Dag, PlannerError};

use crate::lowering::lower_transform;
use crate::planner::Planner;
use crate::toposort::topological_order;

/// Lowers a pipeline into an executable `Dag`.
///
/// 1. Validates that every transform is either declared `Sink` or has at
///    least one downstream transform.
/// 2. Topologically sorts the transforms (a cycle fails here).
/// 3. Lowers each transform, in order, via its `addToDag` equivalent
///    ([`lower_transform`]).
#[tracing::instrument(skip(pipeline), fields(transform_count = pipeline.len()))]
pub fn create_dag(pipeline: &Pipeline) -> Result<Dag, PlannerError> {
    validate_no_leakage(pipeline)?;
    let order = topological_order(pipeline)?;

    let mut planner = Planner::new();
    for id in order {
        let transform = pipeline
            .get(id)
            .expect("topological_order only yields ids that exist in this pipeline");
        lower_transform(transform, &mut planner)?;
    }

    tracing::info!("pipeline planned into dag");
    Ok(planner.into_dag())
}

/// Every non-sink transform must have at least one downstream transform;
/// a transform with an empty downstream list is a sink by declaration.
fn validate_no_leakage(pipeline: &Pipeline) -> Result<(), PlannerError> {
    let downstream = pipeline.adjacency_map();
    let mut leaked: Vec<_> = pipeline
        .transforms()
        .filter(|t| {
            !t.kind.is_sink() && downstream.get(&t.id).map(|d| d.is_empty()).unwrap_or(true)
        })
        .collect();
    if leaked.is_empty() {
        return Ok(());
    }
    leaked.sort_by_key(|t| t.id);
    let names = leaked
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Err(PlannerError::InvalidPipeline(format!(
        "unattached transforms: {names}"
    )))
}
