/// Decides whether a newly computed candidate watermark is "interesting"
/// enough to release downstream. Must return `true` whenever
/// `candidate > last_emitted` infinitely often, or monotone progress
/// stalls (both reference implementations below satisfy this trivially).
pub trait WatermarkEmissionPolicy: Send {
    fn should_emit(&self, candidate: i64, last_emitted: i64) -> bool;
}

/// Emits every strict advance. Satisfies the liveness requirement exactly:
/// progress is released exactly when progress exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvanceOnlyEmissionPolicy;

impl WatermarkEmissionPolicy for AdvanceOnlyEmissionPolicy {
    fn should_emit(&self, candidate: i64, last_emitted: i64) -> bool {
        candidate > last_emitted
    }
}

/// Suppresses candidates that advance less than `min_step` past
/// `last_emitted`, to bound how often tiny advances reach downstream
/// consumers. Liveness still holds: an unboundedly growing candidate
/// eventually clears the threshold.
#[derive(Debug, Clone, Copy)]
pub struct MinStepEmissionPolicy {
    min_step: i64,
}

impl MinStepEmissionPolicy {
    pub fn new(min_step: i64) -> Self {
        MinStepEmissionPolicy {
            min_step: min_step.max(1),
        }
    }
}

impl WatermarkEmissionPolicy for MinStepEmissionPolicy {
    fn should_emit(&self, candidate: i64, last_emitted: i64) -> bool {
        candidate > last_emitted && candidate.saturating_sub(last_emitted) >= self.min_step
    }
}
