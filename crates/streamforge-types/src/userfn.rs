use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An opaque handle to a user-supplied function (map/filter/key/join-clause/
/// context-factory, ...).
///
/// The planner only ever needs to know that a function slot is *present* and
/// how many of them a transform carries, it never calls one. Serializing a
/// function for cluster distribution and actually invoking it belong to the
/// execution runtime. Keeping `UserFn` type-erased means `streamforge-model`
/// and `streamforge-planner` stay free of a generic item-type parameter;
/// only `streamforge-watermark`, which genuinely executes code on the hot
/// path, is generic.
#[derive(Clone)]
pub struct UserFn(Arc<dyn Any + Send + Sync>);

impl UserFn {
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        UserFn(Arc::new(value))
    }

    /// A placeholder handle for call sites (tests, examples) that only care
    /// about arity, not the function's identity.
    pub fn stub(label: &'static str) -> Self {
        UserFn::opaque(label)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for UserFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserFn(..)")
    }
}

/// `UserFn` used specifically as a grouping/join key extractor. Same
/// representation as `UserFn`; the distinct alias documents intent at call
/// sites (e.g. `Group::key_fn`, `JoinClause::key_left`).
pub type KeyFn = UserFn;
