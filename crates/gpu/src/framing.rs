use foundation::bounds::Aabb3;
use foundation::math::Vec3;
use foundation::time::Time;
use runtime::{Easing, Tween};

/// Smallest framing distance, so a single-point cloud still gets a usable view.
pub const MIN_FRAMING_DISTANCE: f64 = 1e-3;

/// Where the camera ends up after framing a bounding box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FramingTarget {
    pub center: Vec3,
    pub max_dimension: f64,
    /// Orbit target (the box center).
    pub target: Vec3,
    /// Camera position: `center` backed off along +Z.
    pub position: Vec3,
}

impl FramingTarget {
    /// `None` for an empty box.
    pub fn from_bounds(bounds: &Aabb3, distance_factor: f64) -> Option<Self> {
        if bounds.is_empty() {
            return None;
        }
        let center = bounds.center();
        let max_dimension = bounds.max_dimension();
        let distance = (max_dimension * distance_factor).max(MIN_FRAMING_DISTANCE);
        Some(Self {
            center,
            max_dimension,
            target: center,
            position: center + Vec3::new(0.0, 0.0, distance),
        })
    }
}

/// Eases the orbit target and camera position toward a [`FramingTarget`].
///
/// Both tweens anchor on the first frame they are sampled in.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraAnimation {
    target: Tween<Vec3>,
    position: Tween<Vec3>,
}

impl CameraAnimation {
    pub fn new(
        from_target: Vec3,
        from_position: Vec3,
        framing: &FramingTarget,
        duration_s: f64,
    ) -> Self {
        Self {
            target: Tween::new(from_target, framing.target, duration_s, Easing::Power2InOut),
            position: Tween::new(
                from_position,
                framing.position,
                duration_s,
                Easing::Power2InOut,
            ),
        }
    }

    /// `(target, position)` at `now`.
    pub fn sample(&mut self, now: Time) -> (Vec3, Vec3) {
        (self.target.sample(now), self.position.sample(now))
    }

    pub fn is_finished(&self, now: Time) -> bool {
        self.target.is_finished(now) && self.position.is_finished(now)
    }

    pub fn destination(&self) -> (Vec3, Vec3) {
        (self.target.to, self.position.to)
    }
}
