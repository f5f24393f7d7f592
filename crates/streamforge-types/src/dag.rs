use crate::error::PlannerError;
use crate::processor::ProcessorMetaSupplier;
use crate::routing::RoutingPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A single node of the executable DAG.
pub struct Vertex {
    pub name: String,
    pub meta_supplier: Arc<dyn ProcessorMetaSupplier>,
    /// Engine-level local parallelism; `-1` means "use the engine default".
    pub local_parallelism: i32,
}

impl std::fmt::Debug for Vertex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vertex")
            .field("name", &self.name)
            .field("meta_supplier", &self.meta_supplier.describe())
            .field("local_parallelism", &self.local_parallelism)
            .finish()
    }
}

/// A single directed connection between two vertex ordinals.
pub struct Edge {
    pub from_vertex: String,
    pub from_ordinal: u32,
    pub to_vertex: String,
    pub to_ordinal: u32,
    pub routing: RoutingPolicy,
    pub distributed: bool,
    pub priority: i32,
}

impl std::fmt::Debug for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Edge")
            .field("from_vertex", &self.from_vertex)
            .field("from_ordinal", &self.from_ordinal)
            .field("to_vertex", &self.to_vertex)
            .field("to_ordinal", &self.to_ordinal)
            .field("routing", &self.routing)
            .field("distributed", &self.distributed)
            .field("priority", &self.priority)
            .finish()
    }
}

/// The planner's output: a set of vertices and edges forming a DAG.
/// Construction is append-only and owned exclusively by
/// `streamforge-planner`; this crate only defines the shape and the
/// invariant checks that make a `Dag` valid once returned.
#[derive(Default)]
pub struct Dag {
    vertices: Vec<Vertex>,
    name_index: HashMap<String, usize>,
    edges: Vec<Edge>,
}

impl Dag {
    pub fn new() -> Self {
        Dag::default()
    }

    /// Inserts a new vertex. Fails with `InternalError` if the name is
    /// already taken (callers are expected to have produced unique names
    /// via `Planner::vertex_name` first, so a collision here means the
    /// planner's own naming contract was bypassed).
    pub fn add_vertex(&mut self, vertex: Vertex) -> Result<(), PlannerError> {
        if self.name_index.contains_key(&vertex.name) {
            return Err(PlannerError::InternalError(format!(
                "duplicate vertex name '{}'",
                vertex.name
            )));
        }
        self.name_index.insert(vertex.name.clone(), self.vertices.len());
        self.vertices.push(vertex);
        Ok(())
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn has_vertex(&self, name: &str) -> bool {
        self.name_index.contains_key(name)
    }

    pub fn vertex(&self, name: &str) -> Option<&Vertex> {
        self.name_index.get(name).map(|&i| &self.vertices[i])
    }

    pub fn vertex_mut(&mut self, name: &str) -> Option<&mut Vertex> {
        if let Some(&i) = self.name_index.get(name) {
            Some(&mut self.vertices[i])
        } else {
            None
        }
    }

    /// A serialization-safe projection of the plan, suitable for shipping
    /// to a control plane or printing via an `--explain`-style CLI flag.
    /// The full `Dag` is not itself `Serialize` because vertices/edges hold
    /// opaque user-function and processor-supplier handles that are never
    /// meant to cross the wire.
    pub fn describe(&self) -> DagSummary {
        DagSummary {
            vertices: self
                .vertices
                .iter()
                .map(|v| VertexSummary {
                    name: v.name.clone(),
                    processor: v.meta_supplier.describe().to_string(),
                    local_parallelism: v.local_parallelism,
                })
                .collect(),
            edges: self.edges.iter().map(|e| self.describe_edge(e)).collect(),
        }
    }

    /// Renders the plan as a `petgraph` digraph of vertex names, for
    /// debug visualization and `petgraph::algo` consumers (e.g. an
    /// `--explain`-style dump, or checking the topological order with
    /// `petgraph::algo::toposort`) without duplicating this crate's own
    /// edge-ordinal/routing bookkeeping inside a graph library.
    pub fn to_petgraph(&self) -> petgraph::graph::DiGraph<String, EdgeSummary> {
        let mut graph = petgraph::graph::DiGraph::new();
        let mut node_index = HashMap::with_capacity(self.vertices.len());
        for vertex in &self.vertices {
            node_index.insert(vertex.name.clone(), graph.add_node(vertex.name.clone()));
        }
        for edge in &self.edges {
            let summary = self.describe_edge(edge);
            graph.add_edge(node_index[&edge.from_vertex], node_index[&edge.to_vertex], summary);
        }
        graph
    }

    fn describe_edge(&self, e: &Edge) -> EdgeSummary {
        EdgeSummary {
            from_vertex: e.from_vertex.clone(),
            from_ordinal: e.from_ordinal,
            to_vertex: e.to_vertex.clone(),
            to_ordinal: e.to_ordinal,
            routing: format!("{:?}", e.routing),
            distributed: e.distributed,
            priority: e.priority,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VertexSummary {
    pub name: String,
    pub processor: String,
    pub local_parallelism: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EdgeSummary {
    pub from_vertex: String,
    pub from_ordinal: u32,
    pub to_vertex: String,
    pub to_ordinal: u32,
    pub routing: String,
    pub distributed: bool,
    pub priority: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DagSummary {
    pub vertices: Vec<VertexSummary>,
    pub edges: Vec<EdgeSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::NamedMetaSupplier;

    fn vertex(name: &str) -> Vertex {
        Vertex {
            name: name.to_string(),
            meta_supplier: Arc::new(NamedMetaSupplier::new(name.to_string())),
            local_parallelism: -1,
        }
    }

    fn edge(from: &str, from_ord: u32, to: &str, to_ord: u32) -> Edge {
        Edge {
            from_vertex: from.to_string(),
            from_ordinal: from_ord,
            to_vertex: to.to_string(),
            to_ordinal: to_ord,
            routing: RoutingPolicy::Unicast,
            distributed: false,
            priority: 0,
        }
    }

    #[test]
    fn duplicate_vertex_name_is_rejected() {
        let mut dag = Dag::new();
        dag.add_vertex(vertex("a")).unwrap();
        let err = dag.add_vertex(vertex("a")).unwrap_err();
        assert!(matches!(err, PlannerError::InternalError(_)));
    }

    #[test]
    fn describe_projects_vertices_and_edges() {
        let mut dag = Dag::new();
        dag.add_vertex(vertex("a")).unwrap();
        dag.add_vertex(vertex("b")).unwrap();
        dag.add_edge(edge("a", 0, "b", 0));

        let summary = dag.describe();
        assert_eq!(summary.vertices.len(), 2);
        assert_eq!(summary.edges.len(), 1);
        assert_eq!(summary.edges[0].from_vertex, "a");
        assert_eq!(summary.edges[0].to_vertex, "b");
        assert_eq!(summary.edges[0].routing, "Unicast");
    }

    #[test]
    fn to_petgraph_preserves_vertex_and_edge_count() {
        let mut dag = Dag::new();
        dag.add_vertex(vertex("a")).unwrap();
        dag.add_vertex(vertex("b")).unwrap();
        dag.add_vertex(vertex("c")).unwrap();
        dag.add_edge(edge("a", 0, "c", 0));
        dag.add_edge(edge("b", 0, "c", 1));

        let graph = dag.to_petgraph();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn vertex_mut_allows_in_place_decoration() {
        let mut dag = Dag::new();
        dag.add_vertex(vertex("a")).unwrap();
        let v = dag.vertex_mut("a").unwrap();
        v.local_parallelism = 4;
        assert_eq!(dag.vertex("a").unwrap().local_parallelism, 4);
        assert!(dag.vertex_mut("missing").is_none());
    }
}
