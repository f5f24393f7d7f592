//! Topologically sorts a `streamforge_model::Pipeline` and lowers each of
//! its transforms into vertices and edges of a `streamforge_types::Dag`.
//! The only crate in this workspace that knows how to turn a `Transform`
//! into DAG shape; `streamforge-model` describes transforms,
//! `streamforge-types` describes the DAG, this crate connects the two.

mod create_dag;
mod lowering;
mod ops;
mod planner;
mod toposort;

pub use create_dag::create_dag;
pub use lowering::lower_transform;
pub use ops::{PlannerOps, VertexToken};
pub use planner::Planner;
pub use toposort::topological_order;
