use streamforge_types::UserFn;

/// One side input's join clause for a `HashJoin` transform: the key
/// extractor for the primary stream, the key extractor for this side, and
/// the projection that merges a matched pair into the output item.
#[derive(Clone)]
pub struct JoinClause {
    pub key_left: UserFn,
    pub key_right: UserFn,
    pub projection: UserFn,
}

impl JoinClause {
    pub fn new(key_left: UserFn, key_right: UserFn, projection: UserFn) -> Self {
        JoinClause {
            key_left,
            key_right,
            projection,
        }
    }
}
