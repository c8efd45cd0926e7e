use serde::{Deserialize, Serialize};

pub type Rgb = [f32; 3];

pub const WHITE: Rgb = [1.0, 1.0, 1.0];

/// Hue at the bottom of the altitude ramp (blue); the top is 0 (red).
pub const ALTITUDE_HUE_LOW: f64 = 0.66;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorMode {
    #[default]
    Uniform,
    AltitudeGradient,
}

/// HSL to linear RGB with `h`, `s`, `l` in `[0, 1]` (hue wraps).
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    if s == 0.0 {
        return [l as f32; 3];
    }
    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        hue_to_channel(p, q, h + 1.0 / 3.0) as f32,
        hue_to_channel(p, q, h) as f32,
        hue_to_channel(p, q, h - 1.0 / 3.0) as f32,
    ]
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// `(z - min) / (max - min)`, or 0 for a flat range. Not clamped: points
/// outside an override range map below 0 or above 1.
pub fn normalized_altitude(z: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span > 0.0 { (z - min) / span } else { 0.0 }
}

pub fn altitude_color(z: f64, min: f64, max: f64) -> Rgb {
    let nz = normalized_altitude(z, min, max).clamp(0.0, 1.0);
    hsl_to_rgb(ALTITUDE_HUE_LOW - nz * ALTITUDE_HUE_LOW, 1.0, 0.5)
}

#[cfg(test)]
mod tests {
    use super::{WHITE, altitude_color, hsl_to_rgb, normalized_altitude};

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn hsl_primaries() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]));
        assert!(close(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), [0.0, 1.0, 0.0]));
        assert!(close(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), [0.0, 0.0, 1.0]));
        assert_eq!(hsl_to_rgb(0.3, 0.0, 1.0), WHITE);
    }

    #[test]
    fn flat_range_normalizes_to_zero() {
        assert_eq!(normalized_altitude(12.0, 5.0, 5.0), 0.0);
        assert!(!normalized_altitude(5.0, 5.0, 5.0).is_nan());
        assert_eq!(altitude_color(5.0, 5.0, 5.0), altitude_color(-3.0, 0.0, 10.0));
    }

    #[test]
    fn ramp_runs_blue_to_red() {
        let low = altitude_color(0.0, 0.0, 10.0);
        let high = altitude_color(10.0, 0.0, 10.0);
        assert!(low[2] > 0.99 && low[0] < 0.01);
        assert!(close(high, [1.0, 0.0, 0.0]));

        // Outside an override range the value clamps to the ends.
        assert_eq!(altitude_color(50.0, 0.0, 10.0), high);
        assert_eq!(normalized_altitude(15.0, 0.0, 10.0), 1.5);
    }
}
