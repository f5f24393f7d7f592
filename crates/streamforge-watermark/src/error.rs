use thiserror::Error;

/// Failures raised by `WatermarkSourceUtil`. Unlike
/// `streamforge_types::PlannerError`, none of these are build-time: they
/// surface from a long-lived, per-source-instance utility, but recovery is
/// still entirely the caller's responsibility, nothing here is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WatermarkError {
    /// `increase_partition_count` called with a count smaller than the
    /// current one.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Reserved for interface completeness with a "previous traverser not
    /// drained" style contract violation. That hazard is specific to a
    /// lazy, stateful iterator API; this implementation's `handle_event`
    /// returns an owned `HandleEventOutput` with no borrow into internal
    /// state surviving the call, so there is no stale traverser to fail to
    /// drain and this variant is never constructed (see `DESIGN.md`).
    #[error("contract violation: {0}")]
    ContractViolation(String),
}
