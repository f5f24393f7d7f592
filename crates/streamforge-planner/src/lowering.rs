use std::sync::Arc;

use streamforge_model::{Transform, TransformKind};
use streamforge_types::{NamedMetaSupplier, PeekMetaSupplier, PlannerError, RoutingPolicy};

use crate::ops::PlannerOps;

/// Materializes one transform into the DAG under construction (the
/// `addToDag` equivalent). Encoded as a free function matching on
/// `TransformKind` rather than a trait method, since the variant set is
/// closed and fixed.
pub fn lower_transform(transform: &Transform, ops: &mut dyn PlannerOps) -> Result<(), PlannerError> {
    match &transform.kind {
        TransformKind::Source { processor_supplier, .. } => {
            let name = ops.vertex_name(&transform.name, "");
            ops.add_vertex(transform, name, processor_supplier.clone())?;
        }

        TransformKind::Map { .. } | TransformKind::Filter { .. } | TransformKind::FlatMap { .. } => {
            let name = ops.vertex_name(&transform.name, "");
            let meta = Arc::new(NamedMetaSupplier::new(transform.kind.label().to_lowercase()));
            let v = ops.add_vertex(transform, name, meta)?;
            ops.add_edges(transform, v, &mut |edge, _| edge.routing = RoutingPolicy::Unicast)?;
        }

        TransformKind::MapUsingContext { .. } | TransformKind::MapUsingContextAsync { .. } => {
            let name = ops.vertex_name(&transform.name, "");
            let meta = Arc::new(NamedMetaSupplier::new("map-using-context"));
            let v = ops.add_vertex(transform, name, meta)?;
            ops.add_edges(transform, v, &mut |edge, _| edge.routing = RoutingPolicy::Unicast)?;
        }

        TransformKind::Group { key_fn, .. } => {
            // Two-stage lowering: a partitioning accumulator fed by a
            // partitioned-by-key edge, then a combiner that re-partitions
            // by the same key to finish the aggregation. Only the combiner
            // is registered as the transform's public output (the second
            // add_vertex call below overwrites the first's registration).
            let accumulate_name = ops.vertex_name(&transform.name, "-accumulate");
            let accumulate_meta = Arc::new(NamedMetaSupplier::new("group-accumulate"));
            let accumulate = ops.add_vertex(transform, accumulate_name, accumulate_meta)?;
            let key_for_accumulate = key_fn.clone();
            ops.add_edges(transform, accumulate, &mut |edge, _| {
                edge.routing = RoutingPolicy::Partitioned(key_for_accumulate.clone())
            })?;

            let combine_name = ops.vertex_name(&transform.name, "");
            let combine_meta = Arc::new(NamedMetaSupplier::new("group-combine"));
            let combine = ops.add_vertex(transform, combine_name, combine_meta)?;
            let key_for_combine = key_fn.clone();
            ops.add_internal_edge(accumulate, combine, 0, &mut |edge| {
                edge.routing = RoutingPolicy::Partitioned(key_for_combine.clone())
            });
        }

        TransformKind::CoGroup { key_fns, .. } => {
            let name = ops.vertex_name(&transform.name, "");
            let meta = Arc::new(NamedMetaSupplier::new("co-group"));
            let v = ops.add_vertex(transform, name, meta)?;
            let key_fns = key_fns.clone();
            ops.add_edges(transform, v, &mut |edge, dest_ordinal| {
                edge.routing = RoutingPolicy::Partitioned(key_fns[dest_ordinal as usize].clone())
            })?;
        }

        TransformKind::CoAggregate { .. } => {
            let name = ops.vertex_name(&transform.name, "");
            let meta = Arc::new(NamedMetaSupplier::new("co-aggregate"));
            let v = ops.add_vertex(transform, name, meta)?;
            ops.add_edges(transform, v, &mut |edge, _| edge.routing = RoutingPolicy::Broadcast)?;
        }

        TransformKind::HashJoin { .. } => {
            let name = ops.vertex_name(&transform.name, "");
            let meta = Arc::new(NamedMetaSupplier::new("hash-join"));
            let v = ops.add_vertex(transform, name, meta)?;
            // Primary (ordinal 0) flows unicast; every side input
            // (ordinal >= 1) is broadcast so each instance holds a full
            // replica of the side data to join against.
            ops.add_edges(transform, v, &mut |edge, dest_ordinal| {
                edge.routing = if dest_ordinal == 0 {
                    RoutingPolicy::Unicast
                } else {
                    RoutingPolicy::Broadcast
                };
            })?;
        }

        TransformKind::Merge => {
            let name = ops.vertex_name(&transform.name, "");
            let meta = Arc::new(NamedMetaSupplier::new("merge"));
            let v = ops.add_vertex(transform, name, meta)?;
            ops.add_edges(transform, v, &mut |edge, _| edge.routing = RoutingPolicy::Unicast)?;
        }

        TransformKind::Peeked(inner) => {
            let shadow = Transform {
                id: transform.id,
                name: transform.name.clone(),
                upstream: transform.upstream.clone(),
                local_parallelism: transform.local_parallelism,
                kind: (**inner).clone(),
            };
            lower_transform(&shadow, ops)?;
            ops.decorate_output(transform, &mut |meta| Arc::new(PeekMetaSupplier::wrap(meta)))?;
        }

        TransformKind::Sink { processor_supplier } => {
            let name = ops.vertex_name(&transform.name, "");
            let v = ops.add_vertex(transform, name, processor_supplier.clone())?;
            ops.add_edges(transform, v, &mut |edge, _| edge.routing = RoutingPolicy::AllToOne)?;
        }

        TransformKind::Custom { processor_meta_supplier } => {
            let name = ops.vertex_name(&transform.name, "");
            let v = ops.add_vertex(transform, name, processor_meta_supplier.clone())?;
            ops.add_edges(transform, v, &mut |edge, _| edge.routing = RoutingPolicy::Unicast)?;
        }
    }
    Ok(())
}
