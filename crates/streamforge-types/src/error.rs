use thiserror::Error;

/// Build-time failures raised while lowering a pipeline into a `Dag`. All of
/// these are fatal to the current `create_dag` call; none are retried, the
/// caller must correct the pipeline and rebuild.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlannerError {
    /// An unattached (non-sink) transform, a cycle, or an arity mismatch.
    #[error("invalid pipeline: {0}")]
    InvalidPipeline(String),

    /// A caller passed a structurally invalid argument (e.g. negative
    /// parallelism).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The planner's own bookkeeping failed to find a vertex that
    /// topological order guarantees should already exist. Indicates a bug
    /// in a `Transform` variant's lowering, not a user error.
    #[error("internal planner error: {0}")]
    InternalError(String),
}
