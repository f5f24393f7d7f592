use std::fmt;
use std::sync::Arc;

/// Stand-in for the cluster runtime's "producer of per-node processor
/// suppliers". Instantiating real processors on worker nodes happens in the
/// runtime; the planner only needs something it can attach to a `Vertex` and
/// hand off there.
pub trait ProcessorMetaSupplier: Send + Sync {
    /// A short, stable description used in `Debug`/test assertions and by
    /// the `Peeked` decorator below.
    fn describe(&self) -> &str;
}

/// The simplest possible `ProcessorMetaSupplier`: a fixed label. Used by
/// tests and by transform lowerings that have no richer processor
/// configuration to carry (the label is typically the transform's kind,
/// e.g. "map", "hash-join").
#[derive(Clone)]
pub struct NamedMetaSupplier(Arc<str>);

impl NamedMetaSupplier {
    pub fn new(label: impl Into<Arc<str>>) -> Self {
        NamedMetaSupplier(label.into())
    }
}

impl ProcessorMetaSupplier for NamedMetaSupplier {
    fn describe(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NamedMetaSupplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NamedMetaSupplier").field(&self.0).finish()
    }
}

/// Decorates an existing `ProcessorMetaSupplier` with a logging tap,
/// installed by the `Peeked` transform lowering on top of the vertex it
/// wraps, without changing that vertex's semantics.
pub struct PeekMetaSupplier {
    inner: Arc<dyn ProcessorMetaSupplier>,
    description: String,
}

impl PeekMetaSupplier {
    pub fn wrap(inner: Arc<dyn ProcessorMetaSupplier>) -> Self {
        let description = format!("peek({})", inner.describe());
        PeekMetaSupplier { inner, description }
    }

    pub fn inner(&self) -> &Arc<dyn ProcessorMetaSupplier> {
        &self.inner
    }
}

impl ProcessorMetaSupplier for PeekMetaSupplier {
    fn describe(&self) -> &str {
        &self.description
    }
}
