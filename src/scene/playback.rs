//! Active animation selection and timed transitions.
//!
//! A node plays either one animation (`Steady`) or blends two. A
//! transition is a blend whose mix factor is a function of query time:
//!
//! ```text
//! Steady(from) --transition(to, start, dur)--> Transitioning(from, to, start, dur)
//! Transitioning --query time > start + dur--> Steady(to)
//! ```
//!
//! Query times are expected to be non-decreasing while a transition is in
//! flight. Read-only evaluation derives the effective state with
//! [`Playback::resolve`]; [`Scene::update_transitions`] (and the eager
//! evaluation pass) commit it.

use crate::errors::{AnimError, Result};
use crate::scene::NodeHandle;
use crate::scene::scene::Scene;
use crate::utils::time::AnimTime;

/// Mix factors closer than this are treated as unchanged.
const MIX_EPSILON: f32 = 1e-6;

/// A timed cross-fade from the primary animation to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub target: usize,
    pub start: AnimTime,
    pub duration: AnimTime,
}

/// How far a transition has progressed at a given time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionProgress {
    /// Still blending; the mix factor in `[0, 1]`.
    Blending(f32),
    /// Past `start + duration`.
    Complete,
}

impl Transition {
    #[must_use]
    pub fn progress(&self, time: AnimTime) -> TransitionProgress {
        // i128: any pair of i64 times has a representable difference
        let duration = i128::from(self.duration.max(0));
        let elapsed = i128::from(time) - i128::from(self.start);
        if elapsed > duration {
            TransitionProgress::Complete
        } else if elapsed <= 0 {
            TransitionProgress::Blending(0.0)
        } else {
            // 0 < elapsed <= duration, so duration > 0
            TransitionProgress::Blending((elapsed as f64 / duration as f64) as f32)
        }
    }
}

/// The animations that contribute to a node's pose at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveState {
    pub primary: usize,
    pub primary_offset: AnimTime,
    /// Secondary slot index and its time offset.
    pub secondary: Option<(usize, AnimTime)>,
    pub mix: f32,
}

/// Per-node playback state: two slots, their time offsets, the mix factor
/// and an optional transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playback {
    pub(crate) primary: usize,
    pub(crate) secondary: Option<usize>,
    pub(crate) offsets: [AnimTime; 2],
    pub(crate) mix: f32,
    pub(crate) transition: Option<Transition>,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            primary: 0,
            secondary: None,
            offsets: [0, 0],
            mix: 0.0,
            transition: None,
        }
    }
}

impl Playback {
    /// Effective selection at `time`, without committing anything.
    #[must_use]
    pub fn resolve(&self, time: AnimTime) -> ActiveState {
        if let Some(transition) = self.transition {
            return match transition.progress(time) {
                TransitionProgress::Blending(mix) => ActiveState {
                    primary: self.primary,
                    primary_offset: self.offsets[0],
                    secondary: Some((transition.target, self.offsets[1])),
                    mix,
                },
                TransitionProgress::Complete => ActiveState {
                    primary: transition.target,
                    primary_offset: self.offsets[1],
                    secondary: None,
                    mix: 0.0,
                },
            };
        }

        ActiveState {
            primary: self.primary,
            primary_offset: self.offsets[0],
            secondary: self.secondary.map(|s| (s, self.offsets[1])),
            mix: self.mix,
        }
    }

    /// Commits the transition state for `time`: stores the mix factor and,
    /// once complete, promotes the target into slot 0.
    ///
    /// Returns true when the selection collapsed.
    pub(crate) fn advance(&mut self, time: AnimTime) -> bool {
        let Some(transition) = self.transition else {
            return false;
        };

        match transition.progress(time) {
            TransitionProgress::Blending(mix) => {
                self.mix = mix;
                false
            }
            TransitionProgress::Complete => {
                self.primary = transition.target;
                self.secondary = None;
                self.mix = 0.0;
                self.offsets[0] = self.offsets[1];
                self.transition = None;
                true
            }
        }
    }

    /// Plays a single animation. Returns false when already in exactly
    /// that state.
    pub(crate) fn use_single(&mut self, index: usize) -> bool {
        if self.primary == index && self.secondary.is_none() {
            return false;
        }
        self.primary = index;
        self.secondary = None;
        self.mix = 0.0;
        self.transition = None;
        true
    }

    /// Blends two animations with a fixed mix. Returns false when nothing
    /// changed.
    pub(crate) fn use_pair(&mut self, a: usize, b: usize, mix: f32) -> bool {
        let mix = mix.clamp(0.0, 1.0);
        if self.primary == a
            && self.secondary == Some(b)
            && self.transition.is_none()
            && (self.mix - mix).abs() < MIX_EPSILON
        {
            return false;
        }
        self.primary = a;
        self.secondary = Some(b);
        self.mix = mix;
        self.transition = None;
        true
    }

    /// Starts a transition; false (no-op) when `target` is already primary.
    pub(crate) fn begin_transition(&mut self, target: usize, start: AnimTime, duration: AnimTime) -> bool {
        if target == self.primary {
            return false;
        }
        self.secondary = Some(target);
        self.offsets[1] = start;
        self.mix = 0.0;
        self.transition = Some(Transition {
            target,
            start,
            duration,
        });
        true
    }

    /// Fixes up slot indices after animation `removed` left the bank.
    pub(crate) fn forget_slot(&mut self, removed: usize) {
        let shift = |idx: usize| if idx > removed { idx - 1 } else { idx };

        if self.transition.is_some_and(|t| t.target == removed) {
            self.transition = None;
        }
        if self.secondary == Some(removed) {
            self.secondary = None;
            self.transition = None;
            self.mix = 0.0;
        }

        if self.primary == removed {
            match self.secondary.take() {
                Some(secondary) => {
                    self.primary = secondary;
                    self.offsets[0] = self.offsets[1];
                }
                None => self.primary = 0,
            }
            self.mix = 0.0;
            self.transition = None;
        }

        self.primary = shift(self.primary);
        self.secondary = self.secondary.map(shift);
        if let Some(transition) = &mut self.transition {
            transition.target = shift(transition.target);
        }
    }
}

// ============================================================================
// Scene-level transition API
// ============================================================================

impl Scene {
    /// Cross-fades `handle` and its descendants to animation `target`,
    /// starting at `start` and completing after `duration`.
    ///
    /// Nothing happens if `target` is already the node's primary animation
    /// (its descendants are left alone too). The target slot is validated
    /// on every affected node before anything changes.
    pub fn transition(&mut self, handle: NodeHandle, target: usize, start: AnimTime, duration: AnimTime) -> Result<()> {
        let mut affected = Vec::new();
        let mut stack = vec![handle];
        while let Some(h) = stack.pop() {
            let node = self.node(h)?;
            if node.playback.primary == target {
                continue;
            }
            if target >= node.animations.len() {
                log::warn!("Transition target {target} is out of range for node {h:?}");
                return Err(AnimError::InvalidAnimationIndex {
                    index: target,
                    count: node.animations.len(),
                });
            }
            affected.push(h);
            stack.extend(node.children.iter().rev().copied());
        }

        if affected.is_empty() {
            return Ok(());
        }

        for &h in &affected {
            if let Some(node) = self.nodes.get_mut(h) {
                node.playback.begin_transition(target, start, duration);
            }
        }
        log::debug!(
            "Transition of {} node(s) under {handle:?} to animation {target} at {start} over {duration}",
            affected.len()
        );
        self.invalidate(handle);
        Ok(())
    }

    /// Non-recursive variant of [`Scene::transition`].
    pub fn node_transition(&mut self, handle: NodeHandle, target: usize, start: AnimTime, duration: AnimTime) -> Result<()> {
        let node = self.node_mut(handle)?;
        if target == node.playback.primary {
            return Ok(());
        }
        if target >= node.animations.len() {
            log::warn!("Transition target {target} is out of range for node {handle:?}");
            return Err(AnimError::InvalidAnimationIndex {
                index: target,
                count: node.animations.len(),
            });
        }
        node.playback.begin_transition(target, start, duration);
        self.invalidate(handle);
        Ok(())
    }

    /// Commits transition progress at `time` for `handle` and its
    /// descendants: stores the mix factor and collapses finished
    /// transitions onto their target.
    pub fn update_transitions(&mut self, handle: NodeHandle, time: AnimTime) -> Result<()> {
        self.node(handle)?;

        let mut collapsed = Vec::new();
        let mut stack = vec![handle];
        while let Some(h) = stack.pop() {
            let Some(node) = self.nodes.get_mut(h) else {
                continue;
            };
            if node.playback.advance(time) {
                collapsed.push(h);
            }
            stack.extend(node.children.iter().copied());
        }

        self.finish_collapsed(collapsed);
        Ok(())
    }

    pub(crate) fn finish_collapsed(&mut self, collapsed: Vec<NodeHandle>) {
        for h in collapsed {
            log::debug!("Transition of {h:?} complete");
            self.invalidate(h);
        }
    }

    /// The in-flight transition of `handle`, if any.
    pub fn transition_state(&self, handle: NodeHandle) -> Result<Option<Transition>> {
        Ok(self.node(handle)?.playback.transition)
    }
}
