use std::collections::HashMap;
use std::fmt;

use streamforge_types::PlannerError;

use crate::transform::{Transform, TransformKind};

/// Index into a `Pipeline`'s transform arena. Transforms reference their
/// upstreams by `TransformId` into the same arena rather than by object
/// reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransformId(u32);

impl TransformId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Constructs an id directly from a raw arena index. Only meaningful
    /// for ids actually returned by [`Pipeline::add`]; exposed for tests
    /// that need to exercise the "unknown upstream id" error path.
    pub fn from_raw(raw: u32) -> Self {
        TransformId(raw)
    }
}

impl fmt::Display for TransformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owns every `Transform` in a pipeline as a flat arena. Downstream
/// adjacency is never stored directly, it is derived on demand from each
/// transform's `upstream` list via [`Pipeline::adjacency_map`].
#[derive(Default)]
pub struct Pipeline {
    transforms: Vec<Transform>,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline::default()
    }

    /// Appends a new transform. Validates the transform's arity and that
    /// every referenced upstream id already exists in the arena (a bug in
    /// the builder surface producing these ids should fail loudly here
    /// rather than panic later during planning).
    pub fn add(
        &mut self,
        name: impl Into<String>,
        upstream: Vec<TransformId>,
        local_parallelism: Option<u32>,
        kind: TransformKind,
    ) -> Result<TransformId, PlannerError> {
        let name = name.into();
        let arity = kind.arity_requirement();
        if !arity.is_satisfied_by(upstream.len()) {
            return Err(PlannerError::InvalidPipeline(format!(
                "{} '{}' requires {} upstream transform(s), got {}",
                kind.label(),
                name,
                arity.describe(),
                upstream.len()
            )));
        }
        if let Some(0) = local_parallelism {
            return Err(PlannerError::InvalidArgument(
                "local parallelism must be positive".to_string(),
            ));
        }
        for u in &upstream {
            if u.index() >= self.transforms.len() {
                return Err(PlannerError::InternalError(format!(
                    "upstream transform {u} referenced before it was added"
                )));
            }
        }

        let id = TransformId(self.transforms.len() as u32);
        self.transforms.push(Transform {
            id,
            name,
            upstream,
            local_parallelism,
            kind,
        });
        Ok(id)
    }

    pub fn get(&self, id: TransformId) -> Option<&Transform> {
        self.transforms.get(id.index())
    }

    pub fn transforms(&self) -> impl Iterator<Item = &Transform> {
        self.transforms.iter()
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Inverts every transform's `upstream` list into a
    /// `Transform -> downstream Transforms` map, the adjacency the planner
    /// validates for unattached transforms and sorts topologically.
    pub fn adjacency_map(&self) -> HashMap<TransformId, Vec<TransformId>> {
        let mut map: HashMap<TransformId, Vec<TransformId>> = self
            .transforms
            .iter()
            .map(|t| (t.id, Vec::new()))
            .collect();
        for t in &self.transforms {
            for u in &t.upstream {
                map.get_mut(u).expect("upstream id validated on insert").push(t.id);
            }
        }
        map
    }
}
