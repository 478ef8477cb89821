//! Scene configuration.
//!
//! ```rust,ignore
//! use anim_rig::{Extrapolator, Interpolator, Scene, SceneSettings};
//!
//! // Every animation created in this scene loops with cubic curves.
//! let scene = Scene::with_settings(
//!     SceneSettings::default()
//!         .with_interpolator(Interpolator::Cubic)
//!         .with_extrapolator(Extrapolator::Repeat),
//! );
//! ```

use crate::animation::{Extrapolator, Interpolator};

/// Defaults applied to every animation a [`Scene`](crate::Scene) creates,
/// both the initial slot of new nodes and slots appended later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneSettings {
    pub interpolator: Interpolator,
    pub extrapolator: Extrapolator,
}

impl SceneSettings {
    #[must_use]
    pub fn with_interpolator(mut self, interpolator: Interpolator) -> Self {
        self.interpolator = interpolator;
        self
    }

    #[must_use]
    pub fn with_extrapolator(mut self, extrapolator: Extrapolator) -> Self {
        self.extrapolator = extrapolator;
        self
    }
}
