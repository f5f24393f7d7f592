//! Shared wire/value types for the streamforge dataflow planner core:
//! the `Dag`/`Vertex`/`Edge` execution-graph shapes, routing policies,
//! opaque user-function handles, processor-meta-supplier trait and the
//! planner's error taxonomy. No planning logic lives here.

mod dag;
mod error;
mod processor;
mod routing;
mod userfn;

pub use dag::{Dag, DagSummary, Edge, EdgeSummary, Vertex, VertexSummary};
pub use error::PlannerError;
pub use processor::{NamedMetaSupplier, PeekMetaSupplier, ProcessorMetaSupplier};
pub use routing::RoutingPolicy;
pub use userfn::{KeyFn, UserFn};
