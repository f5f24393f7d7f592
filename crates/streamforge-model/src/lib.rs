//! The sum-typed pipeline `Transform` model and the `Pipeline` arena that
//! owns it. This crate knows how to describe a pipeline's shape and
//! validate transform arity; it does not know how to lower a transform
//! into DAG vertices/edges, that is `streamforge-planner`'s job, kept
//! separate so the model stays a plain data crate with no planning logic.

mod arity;
mod join;
mod pipeline;
mod transform;
mod window;

pub use arity::ArityRequirement;
pub use join::JoinClause;
pub use pipeline::{Pipeline, TransformId};
pub use transform::{Transform, TransformKind, WatermarkGenerationParams};
pub use window::WindowDefinition;
