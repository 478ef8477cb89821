//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`AnimError`] covers every way an authoring or
//! selection call can be rejected:
//! - stale or foreign node handles
//! - animation slot indices and names that do not exist
//! - hierarchy edits that would break the tree shape
//!
//! Errors are always reported to the immediate caller and a rejected call
//! leaves the scene untouched, so callers can fix the input and retry.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, AnimError>`.
//!
//! ```rust,ignore
//! use anim_rig::{Scene, errors::Result};
//!
//! fn build(scene: &mut Scene) -> Result<()> {
//!     let root = scene.create_node();
//!     let arm = scene.create_node();
//!     scene.link(root, arm)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::scene::NodeHandle;

/// The main error type for the animation runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnimError {
    // ========================================================================
    // Hierarchy Errors
    // ========================================================================
    /// The handle does not refer to a live node of this scene.
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeHandle),

    /// Linking would make a node its own ancestor.
    #[error("Linking {child:?} under {parent:?} would create a cycle")]
    CycleDetected {
        /// The requested parent
        parent: NodeHandle,
        /// The requested child
        child: NodeHandle,
    },

    /// Unlink was asked to detach a node from something that is not its parent.
    #[error("Node {child:?} is not a child of {parent:?}")]
    NotAChild {
        /// The claimed parent
        parent: NodeHandle,
        /// The node that was supposed to be detached
        child: NodeHandle,
    },

    // ========================================================================
    // Animation Bank Errors
    // ========================================================================
    /// An animation slot index is outside the node's animation bank.
    #[error("Animation index out of bounds: {index} (count: {count})")]
    InvalidAnimationIndex {
        /// The invalid index
        index: usize,
        /// Number of animations in the bank
        count: usize,
    },

    /// No animation with the given name exists in the node's bank.
    #[error("Animation not found: {0}")]
    AnimationNotFound(String),

    /// Every node keeps at least one animation; slot 0 cannot go away.
    #[error("Cannot remove the last animation of a node")]
    LastAnimation,
}

/// Alias for `Result<T, AnimError>`.
pub type Result<T> = std::result::Result<T, AnimError>;
