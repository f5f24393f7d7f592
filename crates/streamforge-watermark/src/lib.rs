//! Per-source watermark coalescing with idle-partition handling and
//! snapshot support. The one crate in this workspace that executes
//! user-supplied logic on a hot path; everything else only reasons about
//! the *shape* of a pipeline or DAG.
//!
//! `WatermarkPolicy`/`WatermarkEmissionPolicy` are the pluggable per-
//! partition contracts; `WatermarkSourceUtil` is the stateful coalescer a
//! source processor owns exclusively, one instance per processor instance,
//! with no locks and no I/O.

mod emission;
mod error;
mod policy;
mod wsu;

pub use emission::{AdvanceOnlyEmissionPolicy, MinStepEmissionPolicy, WatermarkEmissionPolicy};
pub use error::WatermarkError;
pub use policy::{BoundedLagWatermarkPolicy, MonotonicWatermarkPolicy, WatermarkPolicy};
pub use wsu::{
    BroadcastKey, HandleEventOutput, WatermarkSignal, WatermarkSnapshot, WatermarkSourceUtil,
};
