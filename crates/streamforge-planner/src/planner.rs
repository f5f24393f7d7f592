use std::collections::HashSet;
use std::sync::Arc;

use streamforge_model::Transform;
use streamforge_types::{Dag, Edge, PlannerError, ProcessorMetaSupplier, RoutingPolicy, Vertex};

use crate::ops::{PlannerOps, VertexToken};

/// Per-transform planning record: the vertex a transform's lowering most
/// recently allocated, plus the next free outbound ordinal on it.
struct PlannerVertexRecord {
    vertex_name: String,
    available_ordinal: u32,
}

/// Production implementation of [`PlannerOps`], and the owner of the `Dag`
/// under construction. A single instance is used for exactly one
/// `create_dag` call; if lowering fails partway through, the half-built
/// `Dag` is dropped with it rather than handed back to the caller.
pub struct Planner {
    dag: Dag,
    records: Vec<PlannerVertexRecord>,
    xform2vertex: std::collections::HashMap<streamforge_model::TransformId, VertexToken>,
    taken_names: HashSet<String>,
}

impl Planner {
    pub fn new() -> Self {
        Planner {
            dag: Dag::new(),
            records: Vec::new(),
            xform2vertex: std::collections::HashMap::new(),
            taken_names: HashSet::new(),
        }
    }

    /// Consumes the planner, handing ownership of the accumulated `Dag` to
    /// the caller. Only called once `create_dag` has lowered every
    /// transform successfully.
    pub fn into_dag(self) -> Dag {
        self.dag
    }

    fn record(&self, token: VertexToken) -> &PlannerVertexRecord {
        &self.records[token.0]
    }

    fn record_mut(&mut self, token: VertexToken) -> &mut PlannerVertexRecord {
        &mut self.records[token.0]
    }
}

impl Default for Planner {
    fn default() -> Self {
        Planner::new()
    }
}

impl PlannerOps for Planner {
    fn add_vertex(
        &mut self,
        transform: &Transform,
        name: String,
        meta_supplier: Arc<dyn ProcessorMetaSupplier>,
    ) -> Result<VertexToken, PlannerError> {
        self.dag.add_vertex(Vertex {
            name: name.clone(),
            meta_supplier,
            local_parallelism: transform.local_parallelism.map(|p| p as i32).unwrap_or(-1),
        })?;
        tracing::info!(vertex = %name, transform = %transform, "planned vertex");

        let token = VertexToken(self.records.len());
        self.records.push(PlannerVertexRecord {
            vertex_name: name,
            available_ordinal: 0,
        });
        self.xform2vertex.insert(transform.id, token);
        Ok(token)
    }

    fn add_edges(
        &mut self,
        transform: &Transform,
        to: VertexToken,
        configure_edge: &mut dyn FnMut(&mut Edge, u32),
    ) -> Result<(), PlannerError> {
        for (dest_ordinal, upstream_id) in transform.upstream.iter().enumerate() {
            let from_token = *self.xform2vertex.get(upstream_id).ok_or_else(|| {
                PlannerError::InternalError(format!(
                    "no planned vertex for upstream {upstream_id} of {transform}; \
                     topological order should have placed it first"
                ))
            })?;
            self.wire(from_token, to, dest_ordinal as u32, configure_edge);
        }
        Ok(())
    }

    fn add_internal_edge(
        &mut self,
        from: VertexToken,
        to: VertexToken,
        to_ordinal: u32,
        configure_edge: &mut dyn FnMut(&mut Edge),
    ) {
        self.wire(from, to, to_ordinal, &mut |edge, _| configure_edge(edge));
    }

    fn vertex_name(&mut self, base_name: &str, suffix: &str) -> String {
        let mut index = 1u32;
        loop {
            let candidate = if index == 1 {
                format!("{base_name}{suffix}")
            } else {
                format!("{base_name}-{index}{suffix}")
            };
            if self.taken_names.insert(candidate.clone()) {
                return candidate;
            }
            index += 1;
        }
    }

    fn decorate_output(
        &mut self,
        transform: &Transform,
        decorate: &mut dyn FnMut(Arc<dyn ProcessorMetaSupplier>) -> Arc<dyn ProcessorMetaSupplier>,
    ) -> Result<(), PlannerError> {
        let token = *self.xform2vertex.get(&transform.id).ok_or_else(|| {
            PlannerError::InternalError(format!(
                "no planned vertex for {transform} to decorate"
            ))
        })?;
        let name = self.record(token).vertex_name.clone();
        let vertex = self.dag.vertex_mut(&name).ok_or_else(|| {
            PlannerError::InternalError(format!("vertex '{name}' missing from dag"))
        })?;
        vertex.meta_supplier = decorate(vertex.meta_supplier.clone());
        Ok(())
    }
}

impl Planner {
    fn wire(
        &mut self,
        from: VertexToken,
        to: VertexToken,
        to_ordinal: u32,
        configure_edge: &mut dyn FnMut(&mut Edge, u32),
    ) {
        let from_ordinal = {
            let record = self.record_mut(from);
            let ordinal = record.available_ordinal;
            record.available_ordinal += 1;
            ordinal
        };
        let mut edge = Edge {
            from_vertex: self.record(from).vertex_name.clone(),
            from_ordinal,
            to_vertex: self.record(to).vertex_name.clone(),
            to_ordinal,
            routing: RoutingPolicy::Unicast,
            distributed: false,
            priority: 0,
        };
        configure_edge(&mut edge, to_ordinal);
        self.dag.add_edge(edge);
    }
}
