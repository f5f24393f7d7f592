use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use streamforge_types::{KeyFn, ProcessorMetaSupplier, UserFn};

use crate::arity::ArityRequirement;
use crate::join::JoinClause;
use crate::pipeline::TransformId;
use crate::window::WindowDefinition;

/// Watermark-generation parameters attached to a `Source` transform. The
/// functions are opaque `UserFn` handles, this crate never calls them, it
/// only needs to know they are present so a `Source` can hand them to the
/// runtime's `streamforge-watermark::WatermarkSourceUtil` once the source
/// processor is actually instantiated.
#[derive(Clone)]
pub struct WatermarkGenerationParams {
    pub timestamp_fn: UserFn,
    pub new_wm_policy_fn: UserFn,
    pub emission_policy: UserFn,
    pub idle_timeout: Duration,
}

impl WatermarkGenerationParams {
    pub fn new(
        timestamp_fn: UserFn,
        new_wm_policy_fn: UserFn,
        emission_policy: UserFn,
        idle_timeout: Duration,
    ) -> Self {
        WatermarkGenerationParams {
            timestamp_fn,
            new_wm_policy_fn,
            emission_policy,
            idle_timeout,
        }
    }
}

/// The sum type over every pipeline-transform variant. Encoded as a tagged
/// enum matched inside a free function rather than a class hierarchy with
/// a per-variant `addToDag` override.
///
/// Each variant carries only the fields its lowering needs; the upstream
/// list and arity live one level up on `Transform` itself, since arity is
/// checked uniformly for every variant via
/// [`TransformKind::arity_requirement`].
#[derive(Clone)]
pub enum TransformKind {
    /// No upstream. A processor-supplier plus watermark-generation params.
    Source {
        processor_supplier: Arc<dyn ProcessorMetaSupplier>,
        watermark_params: Option<WatermarkGenerationParams>,
    },
    Map {
        function: UserFn,
    },
    Filter {
        function: UserFn,
    },
    FlatMap {
        function: UserFn,
    },
    /// Synchronous `mapUsingContext`: a context factory plus a function
    /// that consumes it.
    MapUsingContext {
        context_factory: UserFn,
        function: UserFn,
    },
    /// Asynchronous `mapUsingContext`: same shape, plus a bounded
    /// concurrency budget for in-flight async calls.
    MapUsingContextAsync {
        context_factory: UserFn,
        function: UserFn,
        max_concurrent_ops: usize,
    },
    /// Windowed or rolling keyed group-and-aggregate.
    Group {
        key_fn: KeyFn,
        aggregate_op: UserFn,
        window: Option<WindowDefinition>,
    },
    /// N-ary keyed co-group (N upstreams, N key functions, one N-ary
    /// aggregate).
    CoGroup {
        key_fns: Vec<KeyFn>,
        aggregate_op: UserFn,
        window: Option<WindowDefinition>,
    },
    /// N-ary co-aggregate with no keying.
    CoAggregate {
        aggregate_op: UserFn,
        window: Option<WindowDefinition>,
    },
    /// Primary upstream (index 0 of the transform's upstream list) plus
    /// one join clause per side upstream (indices 1..).
    HashJoin {
        sides: Vec<JoinClause>,
    },
    /// Union by concatenation of N upstreams of assignment-compatible
    /// element type.
    Merge,
    /// Wraps another transform's kind to add a logging tap without
    /// changing semantics. The outer `Transform`'s name/upstream/
    /// parallelism describe the wrapped transform; only the kind is
    /// nested.
    Peeked(Box<TransformKind>),
    /// Terminal vertex; one upstream, no downstream.
    Sink {
        processor_supplier: Arc<dyn ProcessorMetaSupplier>,
    },
    /// User-supplied processor-meta-supplier with caller-declared arity.
    Custom {
        processor_meta_supplier: Arc<dyn ProcessorMetaSupplier>,
    },
}

impl TransformKind {
    /// Human-readable variant label, used both for `Display` (the tie-break
    /// string for the planner's topological sort) and for default
    /// `NamedMetaSupplier` descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            TransformKind::Source { .. } => "Source",
            TransformKind::Map { .. } => "Map",
            TransformKind::Filter { .. } => "Filter",
            TransformKind::FlatMap { .. } => "FlatMap",
            TransformKind::MapUsingContext { .. } => "MapUsingContext",
            TransformKind::MapUsingContextAsync { .. } => "MapUsingContextAsync",
            TransformKind::Group { .. } => "Group",
            TransformKind::CoGroup { .. } => "CoGroup",
            TransformKind::CoAggregate { .. } => "CoAggregate",
            TransformKind::HashJoin { .. } => "HashJoin",
            TransformKind::Merge => "Merge",
            TransformKind::Peeked(inner) => return inner.label(),
            TransformKind::Sink { .. } => "Sink",
            TransformKind::Custom { .. } => "Custom",
        }
    }

    /// How many upstream transforms this variant requires. `Peeked`
    /// delegates to the wrapped kind since it shares the outer transform's
    /// upstream list.
    pub fn arity_requirement(&self) -> ArityRequirement {
        match self {
            TransformKind::Source { .. } => ArityRequirement::Exact(0),
            TransformKind::Map { .. }
            | TransformKind::Filter { .. }
            | TransformKind::FlatMap { .. }
            | TransformKind::MapUsingContext { .. }
            | TransformKind::MapUsingContextAsync { .. }
            | TransformKind::Group { .. } => ArityRequirement::Exact(1),
            TransformKind::CoGroup { .. } | TransformKind::CoAggregate { .. } => {
                ArityRequirement::AtLeast(2)
            }
            TransformKind::HashJoin { .. } => ArityRequirement::AtLeast(2),
            TransformKind::Merge => ArityRequirement::AtLeast(1),
            TransformKind::Peeked(inner) => inner.arity_requirement(),
            TransformKind::Sink { .. } => ArityRequirement::Exact(1),
            TransformKind::Custom { .. } => ArityRequirement::Any,
        }
    }

    /// True for the one variant exempt from the "must have a downstream"
    /// check: a transform declared `Sink` is a sink regardless of whether
    /// anything consumes it (it has none by construction).
    pub fn is_sink(&self) -> bool {
        match self {
            TransformKind::Sink { .. } => true,
            TransformKind::Peeked(inner) => inner.is_sink(),
            _ => false,
        }
    }
}

/// A node in the pipeline graph. Shared fields live here; the
/// variant-specific payload is `kind`.
#[derive(Clone)]
pub struct Transform {
    pub id: TransformId,
    pub name: String,
    pub upstream: Vec<TransformId>,
    pub local_parallelism: Option<u32>,
    pub kind: TransformKind,
}

impl Transform {
    /// Stable string representation used by the planner both to tie-break
    /// its topological sort and to name offending transforms in
    /// `PlannerError` messages.
    pub fn display_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.kind.label(), self.name)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("upstream", &self.upstream)
            .field("local_parallelism", &self.local_parallelism)
            .field("kind", &self.kind.label())
            .finish()
    }
}
