use std::time::Duration;

/// Window definition attached to a windowed `Group`/`CoGroup`/`CoAggregate`
/// transform. Absent (`None` at the call site) means a rolling, unwindowed
/// aggregation; the planner still lowers `Group` to the same two-vertex
/// shape either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowDefinition {
    Tumbling { size: Duration },
    Sliding { size: Duration, slide: Duration },
    Session { gap: Duration },
}

impl WindowDefinition {
    pub fn tumbling(size: Duration) -> Self {
        WindowDefinition::Tumbling { size }
    }

    pub fn sliding(size: Duration, slide: Duration) -> Self {
        WindowDefinition::Sliding { size, slide }
    }

    pub fn session(gap: Duration) -> Self {
        WindowDefinition::Session { gap }
    }
}
