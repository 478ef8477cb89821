use glam::{Affine3A, Mat4, Vec3};

use crate::animation::{Animation, Extrapolator, Interpolator};
use crate::scene::NodeHandle;
use crate::scene::playback::{Playback, Transition};
use crate::utils::time::AnimTime;

/// An animated element of the node tree.
///
/// # Hierarchy
///
/// - `parent`: handle of the parent node (None for roots)
/// - `children`: ordered child handles
///
/// Both are maintained by [`Scene::link`](crate::Scene::link) and
/// [`Scene::unlink`](crate::Scene::unlink); a node is only ever reachable
/// from one parent.
///
/// # Animation bank
///
/// Every node owns at least one [`Animation`] (slot 0 exists from
/// construction). Up to two slots are active at a time and blended by the
/// playback mix factor.
///
/// # Matrices
///
/// - `matrix`: written by the eager [`Scene::evaluate`](crate::Scene::evaluate)
///   pass only.
/// - `revision`: bumped whenever something this node's world transform
///   depends on changes; evaluation contexts compare it against their
///   cached stamp.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: Option<String>,
    pub(crate) pivot: Vec3,

    // === Core Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    // === Animation ===
    pub(crate) animations: Vec<Animation>,
    pub(crate) playback: Playback,

    // === Evaluation ===
    pub(crate) matrix: Affine3A,
    pub(crate) revision: u64,
}

impl Node {
    /// Creates a node with one empty animation using the default policies.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policies(Interpolator::default(), Extrapolator::default())
    }

    #[must_use]
    pub(crate) fn with_policies(interpolator: Interpolator, extrapolator: Extrapolator) -> Self {
        Self {
            name: None,
            pivot: Vec3::ZERO,
            parent: None,
            children: Vec::new(),
            animations: vec![Animation::with_policies(interpolator, extrapolator)],
            playback: Playback::default(),
            matrix: Affine3A::IDENTITY,
            revision: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }

    /// Returns the parent node handle, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Returns a read-only slice of child node handles.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    #[inline]
    #[must_use]
    pub fn animation(&self, index: usize) -> Option<&Animation> {
        self.animations.get(index)
    }

    #[inline]
    #[must_use]
    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    /// Index of the animation in `slot` (0 or 1); `None` for an inactive
    /// secondary slot or an out-of-range slot number.
    #[must_use]
    pub fn active_index(&self, slot: usize) -> Option<usize> {
        match slot {
            0 => Some(self.playback.primary),
            1 => self.playback.secondary,
            _ => None,
        }
    }

    /// The animations in the active slots, primary first.
    pub fn active_animations(&self) -> impl Iterator<Item = &Animation> {
        std::iter::once(self.playback.primary)
            .chain(self.playback.secondary)
            .filter_map(|i| self.animations.get(i))
    }

    /// The committed mix factor between slot 0 and slot 1.
    #[inline]
    #[must_use]
    pub fn mix(&self) -> f32 {
        self.playback.mix
    }

    /// The time offset subtracted from query times before sampling `slot`.
    #[must_use]
    pub fn animation_offset(&self, slot: usize) -> AnimTime {
        self.playback.offsets.get(slot).copied().unwrap_or(0)
    }

    /// The in-flight transition, if any.
    #[inline]
    #[must_use]
    pub fn transition(&self) -> Option<Transition> {
        self.playback.transition
    }

    /// World matrix stored by the last eager evaluation pass.
    #[inline]
    #[must_use]
    pub fn matrix(&self) -> &Affine3A {
        &self.matrix
    }

    #[inline]
    #[must_use]
    pub fn matrix_as_mat4(&self) -> Mat4 {
        Mat4::from(self.matrix)
    }

    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub(crate) fn primary_animation_mut(&mut self) -> &mut Animation {
        &mut self.animations[self.playback.primary]
    }

    #[inline]
    pub(crate) fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
