// Small numeric helpers shared by the quantizer and the playback scheduler.

/// Clamp `value` into `[min, max]`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Linear interpolation from `a` to `b`. `t` outside [0, 1] extrapolates.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(-5.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(15.0, 0.0, 10.0), 10.0);
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
    }

    #[test]
    fn test_clamp_negative_range() {
        assert_eq!(clamp(-5.0, -10.0, -1.0), -5.0);
        assert_eq!(clamp(-15.0, -10.0, -1.0), -10.0);
        assert_eq!(clamp(0.0, -10.0, -1.0), -1.0);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(10.0, 20.0, 0.0), 10.0);
        assert_eq!(lerp(10.0, 20.0, 1.0), 20.0);
        assert_eq!(lerp(10.0, 20.0, 0.5), 15.0);
        assert_eq!(lerp(-10.0, 10.0, 0.5), 0.0);
        // Extrapolates past the endpoints.
        assert_eq!(lerp(0.0, 10.0, 2.0), 20.0);
    }
}
