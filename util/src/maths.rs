//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

/// Limit a value to the closed range `[min, max]`.
///
/// `NAN` values are mapped to `min`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    if value.is_nan() {
        return min;
    }

    value.max(min).min(max)
}

/// Convert a speed in meters/second into kilometers/hour.
pub fn ms_to_kph<T: Float>(speed_ms: T) -> T {
    speed_ms * kph_per_ms()
}

/// Convert a speed in kilometers/hour into meters/second.
pub fn kph_to_ms<T: Float>(speed_kph: T) -> T {
    speed_kph / kph_per_ms()
}

fn kph_per_ms<T: Float>() -> T {
    T::from(3.6).unwrap_or_else(T::one)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0.0, 4.0), (3.0, 11.0), 0.0), 3.0);
        assert_eq!(lin_map((0.0, 4.0), (3.0, 11.0), 1.0), 5.0);
        assert_eq!(lin_map((0.0, 4.0), (3.0, 11.0), 4.0), 11.0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5.0, 3.0, 10.0), 5.0);
        assert_eq!(clamp(1.0, 3.0, 10.0), 3.0);
        assert_eq!(clamp(12.0, 3.0, 10.0), 10.0);
        assert_eq!(clamp(std::f64::NAN, 3.0, 10.0), 3.0);
    }

    #[test]
    fn test_speed_units() {
        assert!((ms_to_kph(10.0f64) - 36.0).abs() < 1e-12);
        assert!((kph_to_ms(36.0f64) - 10.0).abs() < 1e-12);
    }
}
