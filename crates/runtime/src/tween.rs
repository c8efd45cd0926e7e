use foundation::math::Vec3;
use foundation::time::Time;

pub trait Lerp: Copy {
    fn lerp(self, other: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp(self, other: Self, t: f64) -> Self {
        Vec3::lerp(self, other, t)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Quadratic ease-in-out ("power2.inOut").
    #[default]
    Power2InOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Power2InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u / 2.0
                }
            }
        }
    }
}

/// Interpolates a value over a fixed duration.
///
/// The tween is anchored lazily: the first `sample` call fixes the start time,
/// so a tween created between frames starts on the next frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween<T> {
    pub from: T,
    pub to: T,
    duration_s: f64,
    easing: Easing,
    started_at: Option<Time>,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, duration_s: f64, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration_s,
            easing,
            started_at: None,
        }
    }

    pub fn duration_s(&self) -> f64 {
        self.duration_s
    }

    pub fn started_at(&self) -> Option<Time> {
        self.started_at
    }

    /// Linear progress in `[0, 1]`; anchors the tween if needed.
    pub fn progress(&mut self, now: Time) -> f64 {
        let start = *self.started_at.get_or_insert(now);
        if self.duration_s <= 0.0 {
            return 1.0;
        }
        (now.since(start) / self.duration_s).min(1.0)
    }

    pub fn sample(&mut self, now: Time) -> T {
        let t = self.progress(now);
        if t >= 1.0 {
            return self.to;
        }
        self.from.lerp(self.to, self.easing.apply(t))
    }

    pub fn is_finished(&self, now: Time) -> bool {
        match self.started_at {
            Some(start) => self.duration_s <= 0.0 || now.since(start) >= self.duration_s,
            None => false,
        }
    }
}
