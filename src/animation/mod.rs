//! Keyframe animation data.
//!
//! - [`Track`]: one keyframed scalar with interpolation and extrapolation policy
//! - [`Animation`]: ten tracks forming a position/rotation/scale channel set
//! - [`Interpolatable`]: interpolation and blending of sampled values

pub mod clip;
pub mod tracks;
pub mod values;

pub use clip::{Animation, TrackChannel};
pub use tracks::{Extrapolator, Interpolator, KeySpan, Keyframe, Track};
pub use values::Interpolatable;
