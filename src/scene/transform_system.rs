//! Hierarchy evaluation.
//!
//! Two ways to obtain world matrices:
//!
//! - Eager: [`Scene::evaluate`] walks a subtree parents-first and stores
//!   each node's world matrix on the node itself.
//! - Lazy: [`Scene::matrix`] computes only the requested node and the
//!   ancestors it needs, memoized in a caller-owned [`EvalContext`]. Only
//!   `&Scene` is borrowed, so any number of threads can query concurrently
//!   with one context each.
//!
//! Both paths compute `world = parent_world * local` and agree exactly for
//! the same selection state.

use glam::{Affine3A, Quat, Vec3};

use crate::animation::Animation;
use crate::errors::Result;
use crate::scene::NodeHandle;
use crate::scene::context::EvalContext;
use crate::scene::scene::Scene;
use crate::utils::time::AnimTime;

impl Scene {
    // ========================================================================
    // Eager evaluation
    // ========================================================================

    /// Commits transitions at `time`, then writes the world matrix of `root`
    /// and every descendant.
    ///
    /// A non-root start uses its parent's stored matrix from the previous
    /// eager pass.
    pub fn evaluate(&mut self, root: NodeHandle, time: AnimTime) -> Result<()> {
        self.update_transitions(root, time)?;

        let parent_world = self
            .parent(root)
            .and_then(|p| self.nodes.get(p))
            .map_or(Affine3A::IDENTITY, |p| p.matrix);

        // Work stack: (node, parent world matrix)
        let mut stack: Vec<(NodeHandle, Affine3A)> = Vec::with_capacity(64);
        stack.push((root, parent_world));

        let mut visited = 0usize;
        while let Some((handle, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(handle) else {
                continue;
            };
            let world = parent_world * node.local_matrix(time);
            node.matrix = world;
            visited += 1;

            // Reverse push keeps children in order.
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }

        log::trace!("Evaluated {visited} node(s) under {root:?} at {time}");
        Ok(())
    }

    /// Stores the local matrix of one node, ignoring its ancestors.
    pub fn evaluate_node(&mut self, handle: NodeHandle, time: AnimTime) -> Result<()> {
        let node = self.node_mut(handle)?;
        node.matrix = node.local_matrix(time);
        Ok(())
    }

    // ========================================================================
    // Lazy evaluation
    // ========================================================================

    /// World matrix of `handle` at `time`, memoized in `ctx`.
    ///
    /// Walks up the parent chain until a fresh cache entry (or a root) is
    /// found, then composes back down, caching every node on the way.
    pub fn matrix(&self, ctx: &mut EvalContext, handle: NodeHandle, time: AnimTime) -> Result<Affine3A> {
        ctx.bind(self.id());

        let mut pending = Vec::new();
        let mut world = Affine3A::IDENTITY;
        let mut current = Some(handle);
        while let Some(h) = current {
            let node = self.node(h)?;
            if let Some(cached) = ctx.cached_matrix(h, time, node.revision) {
                world = cached;
                break;
            }
            pending.push(h);
            current = node.parent;
        }

        for &h in pending.iter().rev() {
            let node = self.node(h)?;
            world = world * node.local_matrix(time);
            log::trace!("Recomputed world matrix of {h:?} at {time}");
            ctx.store_matrix(h, time, node.revision, world);
        }
        Ok(world)
    }

    /// Inverse world matrix of `handle` at `time`, cached separately from
    /// the forward matrix.
    pub fn inv_matrix(&self, ctx: &mut EvalContext, handle: NodeHandle, time: AnimTime) -> Result<Affine3A> {
        ctx.bind(self.id());
        let revision = self.node(handle)?.revision;
        if let Some(cached) = ctx.cached_inverse(handle, time, revision) {
            return Ok(cached);
        }
        let inverse = self.matrix(ctx, handle, time)?.inverse();
        ctx.store_inverse(handle, time, revision, inverse);
        Ok(inverse)
    }

    // ========================================================================
    // World-space sampling
    // ========================================================================

    /// World position of the node's origin at `time`.
    pub fn world_position(&self, ctx: &mut EvalContext, handle: NodeHandle, time: AnimTime) -> Result<Vec3> {
        Ok(self.matrix(ctx, handle, time)?.translation.into())
    }

    /// Product of the local rotations from the root down to `handle`.
    pub fn world_rotation(&self, handle: NodeHandle, time: AnimTime) -> Result<Quat> {
        let mut rotation = self.node(handle)?.sample_rotation(time);
        let mut current = self.parent(handle);
        while let Some(h) = current {
            let node = self.node(h)?;
            rotation = node.sample_rotation(time) * rotation;
            current = node.parent;
        }
        Ok(rotation.normalize())
    }

    /// Componentwise product of the local scales along the parent chain.
    pub fn world_scaling(&self, handle: NodeHandle, time: AnimTime) -> Result<Vec3> {
        let mut scale = Vec3::ONE;
        let mut current = Some(handle);
        while let Some(h) = current {
            let node = self.node(h)?;
            scale *= node.sample_scaling(time);
            current = node.parent;
        }
        Ok(scale)
    }

    // ========================================================================
    // Time range
    // ========================================================================

    /// Earliest keyframe time over the active animations of `handle` and
    /// its descendants.
    pub fn start_time(&self, handle: NodeHandle) -> Result<Option<AnimTime>> {
        self.node(handle)?;
        Ok(self
            .subtree(handle)
            .into_iter()
            .filter_map(|h| self.nodes.get(h))
            .flat_map(|n| n.active_animations().filter_map(Animation::start_time))
            .min())
    }

    /// Latest keyframe time over the active animations of `handle` and its
    /// descendants.
    pub fn end_time(&self, handle: NodeHandle) -> Result<Option<AnimTime>> {
        self.node(handle)?;
        Ok(self
            .subtree(handle)
            .into_iter()
            .filter_map(|h| self.nodes.get(h))
            .flat_map(|n| n.active_animations().filter_map(Animation::end_time))
            .max())
    }
}
