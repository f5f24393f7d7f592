use std::sync::Arc;

use streamforge_types::{Edge, PlannerError, ProcessorMetaSupplier};
use streamforge_model::Transform;

/// Opaque handle to a vertex a transform has allocated via
/// [`PlannerOps::add_vertex`]. Distinct from a vertex *name*: a transform
/// that allocates more than one internal vertex (e.g. `Group`'s two-stage
/// lowering) needs to keep drawing edges from an earlier vertex after a
/// later `add_vertex` call has overwritten the transform's public
/// `transform -> vertex` registration (only the most recent vertex is
/// registered as the public output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexToken(pub(crate) usize);

/// The planner-operations interface a `Transform` variant's lowering is
/// given instead of a raw mutable `Planner` reference, so the coupling
/// between a lowering and the planner stays explicit and easy to fake out
/// in tests.
///
/// `add_vertex`, `add_edges` and `vertex_name` are the core primitives every
/// lowering builds on. `add_internal_edge` and `decorate_output` cover two
/// cases those three don't: a multi-vertex windowed `Group` needs an edge
/// between its own two vertices that is not one of the transform's declared
/// upstream edges, and `Peeked` needs to mutate the processor already
/// registered for its wrapped transform. See `DESIGN.md`.
pub trait PlannerOps {
    /// Allocates a fresh vertex and registers it as `transform`'s current
    /// output vertex.
    fn add_vertex(
        &mut self,
        transform: &Transform,
        name: String,
        meta_supplier: Arc<dyn ProcessorMetaSupplier>,
    ) -> Result<VertexToken, PlannerError>;

    /// Draws one inbound edge per upstream of `transform`, in upstream-list
    /// order, into `to` at destination ordinals `0, 1, ...`.
    /// `configure_edge(edge, dest_ordinal)` is called per edge so the
    /// lowering can set routing/distribution policy.
    fn add_edges(
        &mut self,
        transform: &Transform,
        to: VertexToken,
        configure_edge: &mut dyn FnMut(&mut Edge, u32),
    ) -> Result<(), PlannerError>;

    /// Draws a single edge between two vertices both owned by the same
    /// transform's multi-vertex lowering (e.g. `Group`'s partitioning
    /// accumulator feeding its combiner). Not one of the transform's
    /// declared upstream edges, so it bypasses `add_edges`'s upstream-list
    /// iteration.
    fn add_internal_edge(
        &mut self,
        from: VertexToken,
        to: VertexToken,
        to_ordinal: u32,
        configure_edge: &mut dyn FnMut(&mut Edge),
    );

    /// Generates a unique vertex name from a base name and suffix.
    fn vertex_name(&mut self, base_name: &str, suffix: &str) -> String;

    /// Wraps the `ProcessorMetaSupplier` currently registered as
    /// `transform`'s output vertex, replacing it with the decorator
    /// `decorate` returns. Used by `Peeked` to install its logging tap
    /// after delegating to the wrapped transform's own lowering.
    fn decorate_output(
        &mut self,
        transform: &Transform,
        decorate: &mut dyn FnMut(Arc<dyn ProcessorMetaSupplier>) -> Arc<dyn ProcessorMetaSupplier>,
    ) -> Result<(), PlannerError>;
}
