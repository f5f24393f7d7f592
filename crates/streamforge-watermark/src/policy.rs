/// Per-partition event-time tracking primitive. An implementation is
/// associated with exactly one logical partition of one source; the core
/// assumes nothing about it beyond `current_watermark` being
/// non-decreasing across successive calls. Concrete algebras ("limiting
/// lag", session-aware, ...) are supplied by the caller; this crate ships
/// only the two simplest reference implementations needed to exercise its
/// own tests.
pub trait WatermarkPolicy: Send {
    /// Informs the policy of a just-observed event timestamp.
    fn report_event(&mut self, event_ts: i64);

    /// Returns this partition's current watermark estimate. Must be
    /// non-decreasing across successive calls.
    fn current_watermark(&self) -> i64;
}

/// Reports the maximum event timestamp seen so far on this partition, with
/// no allowance for out-of-order lag. The simplest policy that still
/// satisfies the non-decreasing contract.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicWatermarkPolicy {
    max_seen: i64,
}

impl MonotonicWatermarkPolicy {
    pub fn new() -> Self {
        MonotonicWatermarkPolicy { max_seen: i64::MIN }
    }
}

impl Default for MonotonicWatermarkPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl WatermarkPolicy for MonotonicWatermarkPolicy {
    fn report_event(&mut self, event_ts: i64) {
        self.max_seen = self.max_seen.max(event_ts);
    }

    fn current_watermark(&self) -> i64 {
        self.max_seen
    }
}

/// Reports `max_seen_ts - max_lag`, clamped so the watermark never
/// regresses even if a later event arrives with an earlier timestamp.
#[derive(Debug, Clone, Copy)]
pub struct BoundedLagWatermarkPolicy {
    max_seen: i64,
    max_lag: i64,
    high_watermark: i64,
}

impl BoundedLagWatermarkPolicy {
    pub fn new(max_lag: i64) -> Self {
        BoundedLagWatermarkPolicy {
            max_seen: i64::MIN,
            max_lag,
            high_watermark: i64::MIN,
        }
    }
}

impl WatermarkPolicy for BoundedLagWatermarkPolicy {
    fn report_event(&mut self, event_ts: i64) {
        self.max_seen = self.max_seen.max(event_ts);
        let candidate = self.max_seen.saturating_sub(self.max_lag);
        self.high_watermark = self.high_watermark.max(candidate);
    }

    fn current_watermark(&self) -> i64 {
        self.high_watermark
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_policy_tracks_max_seen() {
        let mut p = MonotonicWatermarkPolicy::new();
        assert_eq!(p.current_watermark(), i64::MIN);
        p.report_event(10);
        assert_eq!(p.current_watermark(), 10);
        p.report_event(3);
        assert_eq!(p.current_watermark(), 10, "watermark must not regress on an out-of-order event");
        p.report_event(20);
        assert_eq!(p.current_watermark(), 20);
    }

    #[test]
    fn bounded_lag_policy_never_regresses() {
        let mut p = BoundedLagWatermarkPolicy::new(5);
        p.report_event(100);
        assert_eq!(p.current_watermark(), 95);
        p.report_event(50);
        assert_eq!(p.current_watermark(), 95, "a late event must not pull the watermark backwards");
        p.report_event(110);
        assert_eq!(p.current_watermark(), 105);
    }
}
