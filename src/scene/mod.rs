//! Node hierarchy and evaluation.
//!
//! - [`Scene`]: node arena, linkage, naming and pivots
//! - [`Node`]: per-node animation bank and playback state
//! - [`EvalContext`]: per-caller memo for lazy world matrices
//! - Transitions: timed cross-fades between animations of a bank

pub mod bank;
pub mod context;
pub mod node;
pub mod playback;
pub mod scene;
pub mod settings;
pub mod transform;
pub mod transform_system;

pub use context::{CacheStats, EvalContext};
pub use node::Node;
pub use playback::{ActiveState, Playback, Transition, TransitionProgress};
pub use scene::Scene;
pub use settings::SceneSettings;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    /// Generational handle to a node of a [`Scene`].
    pub struct NodeHandle;
}
