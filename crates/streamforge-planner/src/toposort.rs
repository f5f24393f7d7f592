use std::collections::HashMap;

use streamforge_model::{Pipeline, TransformId};
use streamforge_types::PlannerError;

/// Sorts `pipeline`'s transforms so every producer appears before every
/// consumer, tie-breaking deterministically by each transform's `Display`
/// string.
///
/// Kahn's algorithm: each round, every transform whose remaining in-degree
/// is zero is a candidate; among candidates we always pick the
/// lexicographically smallest `Display` string, with ties (two transforms
/// sharing a kind+name) broken by insertion order, which keeps the result
/// reproducible across runs of the same pipeline construction.
pub fn topological_order(pipeline: &Pipeline) -> Result<Vec<TransformId>, PlannerError> {
    let downstream = pipeline.adjacency_map();
    let mut in_degree: HashMap<TransformId, usize> = pipeline
        .transforms()
        .map(|t| (t.id, t.upstream.len()))
        .collect();

    let mut ready: Vec<TransformId> = pipeline
        .transforms()
        .filter(|t| t.upstream.is_empty())
        .map(|t| t.id)
        .collect();

    let mut order = Vec::with_capacity(pipeline.len());
    while !ready.is_empty() {
        ready.sort_by(|a, b| {
            let ta = pipeline.get(*a).expect("id came from this pipeline");
            let tb = pipeline.get(*b).expect("id came from this pipeline");
            ta.to_string().cmp(&tb.to_string()).then_with(|| a.cmp(b))
        });
        let next = ready.remove(0);
        order.push(next);

        for &down in downstream.get(&next).into_iter().flatten() {
            let degree = in_degree.get_mut(&down).expect("every transform has an in-degree entry");
            *degree -= 1;
            if *degree == 0 {
                ready.push(down);
            }
        }
    }

    if order.len() != pipeline.len() {
        let stuck: Vec<String> = pipeline
            .transforms()
            .filter(|t| !order.contains(&t.id))
            .map(|t| t.to_string())
            .collect();
        return Err(PlannerError::InvalidPipeline(format!(
            "cycle detected among transforms: {}",
            stuck.join(", ")
        )));
    }

    Ok(order)
}
