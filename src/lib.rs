#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod errors;
pub mod scene;
pub mod utils;

pub use animation::{Animation, Extrapolator, Interpolator, Keyframe, Track, TrackChannel};
pub use errors::{AnimError, Result};
pub use scene::{CacheStats, EvalContext, Node, NodeHandle, Scene, SceneSettings, Transform, Transition};
pub use utils::time::AnimTime;
