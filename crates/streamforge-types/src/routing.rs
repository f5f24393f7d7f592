use crate::userfn::KeyFn;
use std::fmt;

/// How items travel along one edge of the DAG.
#[derive(Clone)]
pub enum RoutingPolicy {
    /// Each item goes to exactly one receiver; order between sender and
    /// receiver is preserved.
    Unicast,
    /// Every item goes to every receiver; no cross-receiver ordering is
    /// implied.
    Broadcast,
    /// Each item goes to the receiver owning its key's partition; per-key
    /// order is preserved from sender to receiver.
    Partitioned(KeyFn),
    /// All items from every sender instance converge on a single receiver
    /// instance.
    AllToOne,
    /// Like `Unicast`, but the edge is scheduled on its own isolated stage
    /// (no fan-in with other edges at the same destination ordinal).
    Isolated,
}

impl RoutingPolicy {
    pub fn is_partitioned(&self) -> bool {
        matches!(self, RoutingPolicy::Partitioned(_))
    }
}

impl fmt::Debug for RoutingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingPolicy::Unicast => f.write_str("Unicast"),
            RoutingPolicy::Broadcast => f.write_str("Broadcast"),
            RoutingPolicy::Partitioned(_) => f.write_str("Partitioned(..)"),
            RoutingPolicy::AllToOne => f.write_str("AllToOne"),
            RoutingPolicy::Isolated => f.write_str("Isolated"),
        }
    }
}
