use glam::Affine3A;
use slotmap::SecondaryMap;

use crate::scene::NodeHandle;
use crate::utils::time::AnimTime;

/// Hit/miss counters of an [`EvalContext`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// One cached value stamped with the query time and node revision it was
/// computed for.
#[derive(Debug, Clone, Copy)]
struct Stamped {
    value: Affine3A,
    time: AnimTime,
    revision: u64,
}

impl Stamped {
    #[inline]
    fn fresh(&self, time: AnimTime, revision: u64) -> Option<Affine3A> {
        (self.time == time && self.revision == revision).then_some(self.value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MatrixCache {
    matrix: Option<Stamped>,
    inverse: Option<Stamped>,
}

/// Per-caller memo of world matrices for lazy evaluation.
///
/// A context is borrowed exclusively by each query, so threads evaluating
/// the same [`Scene`](crate::Scene) each bring their own. It binds to the
/// first scene it is used with and silently resets if handed another one.
#[derive(Debug, Default)]
pub struct EvalContext {
    scene_id: Option<u32>,
    entries: SecondaryMap<NodeHandle, MatrixCache>,
    stats: CacheStats,
}

impl EvalContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every cached matrix and resets the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::default();
        self.scene_id = None;
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of nodes with a cache entry.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn bind(&mut self, scene_id: u32) {
        if self.scene_id != Some(scene_id) {
            if self.scene_id.is_some() {
                log::debug!("Evaluation context rebound to scene {scene_id}; cache dropped");
            }
            self.entries.clear();
            self.scene_id = Some(scene_id);
        }
    }

    pub(crate) fn cached_matrix(&mut self, handle: NodeHandle, time: AnimTime, revision: u64) -> Option<Affine3A> {
        let hit = self
            .entries
            .get(handle)
            .and_then(|e| e.matrix)
            .and_then(|s| s.fresh(time, revision));
        self.count(hit.is_some());
        hit
    }

    pub(crate) fn store_matrix(&mut self, handle: NodeHandle, time: AnimTime, revision: u64, value: Affine3A) {
        let stamped = Some(Stamped { value, time, revision });
        match self.entries.get_mut(handle) {
            Some(entry) => entry.matrix = stamped,
            None => {
                self.entries.insert(handle, MatrixCache { matrix: stamped, inverse: None });
            }
        }
    }

    pub(crate) fn cached_inverse(&mut self, handle: NodeHandle, time: AnimTime, revision: u64) -> Option<Affine3A> {
        let hit = self
            .entries
            .get(handle)
            .and_then(|e| e.inverse)
            .and_then(|s| s.fresh(time, revision));
        self.count(hit.is_some());
        hit
    }

    pub(crate) fn store_inverse(&mut self, handle: NodeHandle, time: AnimTime, revision: u64, value: Affine3A) {
        let stamped = Some(Stamped { value, time, revision });
        match self.entries.get_mut(handle) {
            Some(entry) => entry.inverse = stamped,
            None => {
                self.entries.insert(handle, MatrixCache { matrix: None, inverse: stamped });
            }
        }
    }

    fn count(&mut self, hit: bool) {
        if hit {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
    }
}
