//! Animation bank management, slot selection and keyframe authoring.
//!
//! Each `*_node_*` operation acts on one node; the unprefixed variants apply
//! the same edit to a whole subtree (e.g. switching a skeleton from "walk"
//! to "jump" in one call). Subtree variants validate every node before
//! touching any of them.

use glam::{Quat, Vec3};

use crate::animation::{Animation, Extrapolator, Interpolator};
use crate::errors::{AnimError, Result};
use crate::scene::NodeHandle;
use crate::scene::node::Node;
use crate::scene::scene::Scene;
use crate::utils::time::AnimTime;

fn check_index(node: &Node, index: usize) -> Result<()> {
    if index < node.animations.len() {
        Ok(())
    } else {
        Err(AnimError::InvalidAnimationIndex {
            index,
            count: node.animations.len(),
        })
    }
}

/// Resolves a two-slot request against one node's bank: both valid gives a
/// pair, one valid degrades to that single slot.
fn resolve_pair(node: &Node, a: usize, b: usize) -> Result<(usize, Option<usize>)> {
    match (check_index(node, a), check_index(node, b)) {
        (Ok(()), Ok(())) => Ok((a, Some(b))),
        (Ok(()), Err(_)) => Ok((a, None)),
        (Err(_), Ok(())) => Ok((b, None)),
        (Err(err), Err(_)) => Err(err),
    }
}

fn find_in(node: &Node, name: &str) -> Result<usize> {
    node.animations
        .iter()
        .position(|a| a.name() == Some(name))
        .ok_or_else(|| AnimError::AnimationNotFound(name.to_owned()))
}

impl Scene {
    // ========================================================================
    // Bank
    // ========================================================================

    pub fn animation_count(&self, handle: NodeHandle) -> Result<usize> {
        Ok(self.node(handle)?.animations.len())
    }

    pub fn animation(&self, handle: NodeHandle, index: usize) -> Result<&Animation> {
        let node = self.node(handle)?;
        check_index(node, index)?;
        Ok(&node.animations[index])
    }

    /// Index of the first animation called `name`.
    pub fn find_animation(&self, handle: NodeHandle, name: &str) -> Result<usize> {
        find_in(self.node(handle)?, name)
    }

    pub fn animation_by_name(&self, handle: NodeHandle, name: &str) -> Result<&Animation> {
        let index = self.find_animation(handle, name)?;
        self.animation(handle, index)
    }

    /// Runs `edit` against animation `index` of one node, then invalidates
    /// the node's cached matrices.
    pub fn edit_animation<R>(
        &mut self,
        handle: NodeHandle,
        index: usize,
        edit: impl FnOnce(&mut Animation) -> R,
    ) -> Result<R> {
        let node = self.node_mut(handle)?;
        check_index(node, index)?;
        let result = edit(&mut node.animations[index]);
        self.invalidate(handle);
        Ok(result)
    }

    /// Appends an empty animation to one node; returns its index.
    pub fn add_node_animation(&mut self, handle: NodeHandle) -> Result<usize> {
        let settings = *self.settings();
        let node = self.node_mut(handle)?;
        node.animations
            .push(Animation::with_policies(settings.interpolator, settings.extrapolator));
        Ok(node.animations.len() - 1)
    }

    /// Appends an empty animation to every node of the subtree; returns the
    /// new index on `handle` itself.
    pub fn add_animation(&mut self, handle: NodeHandle) -> Result<usize> {
        let index = self.add_node_animation(handle)?;
        for h in self.subtree(handle).into_iter().skip(1) {
            self.add_node_animation(h)?;
        }
        log::debug!("Added animation slot {index} under {handle:?}");
        Ok(index)
    }

    /// Removes animation `index` from one node.
    ///
    /// Later animations shift down by one. Active slots are remapped: a
    /// removed secondary slot (or transition target) ends the blend, a
    /// removed primary promotes the secondary slot when there is one and
    /// falls back to slot 0 otherwise. The last animation of a node cannot
    /// be removed.
    pub fn remove_node_animation(&mut self, handle: NodeHandle, index: usize) -> Result<()> {
        Self::check_removable(self.node(handle)?, index)?;
        self.remove_unchecked(handle, index);
        self.invalidate(handle);
        Ok(())
    }

    /// Removes animation `index` from every node of the subtree.
    pub fn remove_animation(&mut self, handle: NodeHandle, index: usize) -> Result<()> {
        self.node(handle)?;
        let nodes = self.subtree(handle);
        for &h in &nodes {
            Self::check_removable(self.node(h)?, index)?;
        }
        for &h in &nodes {
            self.remove_unchecked(h, index);
        }
        log::debug!("Removed animation slot {index} under {handle:?}");
        self.invalidate(handle);
        Ok(())
    }

    fn check_removable(node: &Node, index: usize) -> Result<()> {
        check_index(node, index)?;
        if node.animations.len() == 1 {
            log::warn!("Refusing to remove the only animation of a node");
            return Err(AnimError::LastAnimation);
        }
        Ok(())
    }

    fn remove_unchecked(&mut self, handle: NodeHandle, index: usize) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.animations.remove(index);
            node.playback.forget_slot(index);
        }
    }

    // ========================================================================
    // Slot selection
    // ========================================================================

    /// Plays animation `index` alone on one node, cancelling any blend or
    /// transition. No-op if that is already the node's exact state.
    pub fn use_node_animation(&mut self, handle: NodeHandle, index: usize) -> Result<()> {
        let node = self.node_mut(handle)?;
        if let Err(err) = check_index(node, index) {
            log::warn!("Cannot select animation {index} on {handle:?}: {err}");
            return Err(err);
        }
        if node.playback.use_single(index) {
            self.invalidate(handle);
        }
        Ok(())
    }

    /// Subtree variant of [`Scene::use_node_animation`].
    pub fn use_animation(&mut self, handle: NodeHandle, index: usize) -> Result<()> {
        self.node(handle)?;
        let nodes = self.subtree(handle);
        for &h in &nodes {
            if let Err(err) = check_index(self.node(h)?, index) {
                log::warn!("Cannot select animation {index} under {handle:?}: {err}");
                return Err(err);
            }
        }

        let mut changed = false;
        for &h in &nodes {
            if let Some(node) = self.nodes.get_mut(h) {
                changed |= node.playback.use_single(index);
            }
        }
        if changed {
            self.invalidate(handle);
        }
        Ok(())
    }

    /// Blends animations `a` (slot 0) and `b` (slot 1) on one node with a
    /// fixed `mix` (clamped to `[0, 1]`). If only one of the indices exists
    /// the node plays that one alone.
    pub fn use_node_animations(&mut self, handle: NodeHandle, a: usize, b: usize, mix: f32) -> Result<()> {
        let node = self.node_mut(handle)?;
        let changed = match resolve_pair(node, a, b)? {
            (primary, Some(secondary)) => node.playback.use_pair(primary, secondary, mix),
            (single, None) => node.playback.use_single(single),
        };
        if changed {
            self.invalidate(handle);
        }
        Ok(())
    }

    /// Subtree variant of [`Scene::use_node_animations`].
    pub fn use_animations(&mut self, handle: NodeHandle, a: usize, b: usize, mix: f32) -> Result<()> {
        self.node(handle)?;
        let mut plan = Vec::new();
        for h in self.subtree(handle) {
            plan.push((h, resolve_pair(self.node(h)?, a, b)?));
        }

        let mut changed = false;
        for (h, selection) in plan {
            if let Some(node) = self.nodes.get_mut(h) {
                changed |= match selection {
                    (primary, Some(secondary)) => node.playback.use_pair(primary, secondary, mix),
                    (single, None) => node.playback.use_single(single),
                };
            }
        }
        if changed {
            self.invalidate(handle);
        }
        Ok(())
    }

    /// Plays the animation called `name` on every node of the subtree. Each
    /// node looks the name up in its own bank.
    pub fn use_animation_by_name(&mut self, handle: NodeHandle, name: &str) -> Result<()> {
        self.node(handle)?;
        let mut plan = Vec::new();
        for h in self.subtree(handle) {
            plan.push((h, find_in(self.node(h)?, name)?));
        }

        let mut changed = false;
        for (h, index) in plan {
            if let Some(node) = self.nodes.get_mut(h) {
                changed |= node.playback.use_single(index);
            }
        }
        if changed {
            self.invalidate(handle);
        }
        Ok(())
    }

    /// Index of the animation in `slot` (0 or 1) of one node.
    pub fn active_animation_index(&self, handle: NodeHandle, slot: usize) -> Result<Option<usize>> {
        Ok(self.node(handle)?.active_index(slot))
    }

    pub fn active_animation(&self, handle: NodeHandle, slot: usize) -> Result<Option<&Animation>> {
        let node = self.node(handle)?;
        Ok(node.active_index(slot).and_then(|i| node.animations.get(i)))
    }

    /// The committed mix factor of one node.
    pub fn active_mix(&self, handle: NodeHandle) -> Result<f32> {
        Ok(self.node(handle)?.playback.mix)
    }

    // ========================================================================
    // Slot time offsets
    // ========================================================================

    /// Sets the time subtracted from query times before sampling `slot`
    /// (0 or 1). Other slot numbers are ignored.
    pub fn set_node_animation_offset(&mut self, handle: NodeHandle, offset: AnimTime, slot: usize) -> Result<()> {
        let node = self.node_mut(handle)?;
        let Some(entry) = node.playback.offsets.get_mut(slot) else {
            log::warn!("Ignoring offset for nonexistent slot {slot}");
            return Ok(());
        };
        *entry = offset;
        self.invalidate(handle);
        Ok(())
    }

    /// Subtree variant of [`Scene::set_node_animation_offset`].
    pub fn set_animation_offset(&mut self, handle: NodeHandle, offset: AnimTime, slot: usize) -> Result<()> {
        self.node(handle)?;
        for h in self.subtree(handle) {
            self.set_node_animation_offset(h, offset, slot)?;
        }
        Ok(())
    }

    pub fn animation_offset(&self, handle: NodeHandle, slot: usize) -> Result<AnimTime> {
        Ok(self.node(handle)?.animation_offset(slot))
    }

    // ========================================================================
    // Active animation naming & policies
    // ========================================================================

    /// Names the primary animation of one node.
    pub fn set_node_active_animation_name(&mut self, handle: NodeHandle, name: &str) -> Result<()> {
        self.node_mut(handle)?.primary_animation_mut().set_name(name);
        Ok(())
    }

    /// Names the primary animation of every node in the subtree.
    pub fn set_active_animation_name(&mut self, handle: NodeHandle, name: &str) -> Result<()> {
        self.node(handle)?;
        for h in self.subtree(handle) {
            self.set_node_active_animation_name(h, name)?;
        }
        Ok(())
    }

    pub fn active_animation_name(&self, handle: NodeHandle) -> Result<Option<&str>> {
        let node = self.node(handle)?;
        Ok(node.animations[node.playback.primary].name())
    }

    /// Sets the interpolator of all ten tracks of the primary animation.
    pub fn set_interpolator(&mut self, handle: NodeHandle, interpolator: Interpolator) -> Result<()> {
        self.node_mut(handle)?.primary_animation_mut().set_interpolator(interpolator);
        self.invalidate(handle);
        Ok(())
    }

    /// Sets the extrapolator of all ten tracks of the primary animation.
    pub fn set_extrapolator(&mut self, handle: NodeHandle, extrapolator: Extrapolator) -> Result<()> {
        self.node_mut(handle)?.primary_animation_mut().set_extrapolator(extrapolator);
        self.invalidate(handle);
        Ok(())
    }

    // ========================================================================
    // Keyframe authoring (primary animation)
    // ========================================================================

    pub fn set_position(&mut self, handle: NodeHandle, position: Vec3, time: AnimTime) -> Result<()> {
        self.node_mut(handle)?.primary_animation_mut().set_position(position, time);
        self.invalidate(handle);
        Ok(())
    }

    pub fn set_rotation(&mut self, handle: NodeHandle, rotation: Quat, time: AnimTime) -> Result<()> {
        self.node_mut(handle)?.primary_animation_mut().set_rotation(rotation, time);
        self.invalidate(handle);
        Ok(())
    }

    pub fn set_scaling(&mut self, handle: NodeHandle, scale: Vec3, time: AnimTime) -> Result<()> {
        self.node_mut(handle)?.primary_animation_mut().set_scaling(scale, time);
        self.invalidate(handle);
        Ok(())
    }
}
