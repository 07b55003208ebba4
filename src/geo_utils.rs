//! # Geographic Utilities
//!
//! Distance math used by the connectivity classifier.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two samples |
//! | [`implied_speed_mps`] | Average speed implied by a distance over an interval |
//! | [`elapsed_ms`] | Interval between two samples, saturating on overflow |
//!
//! ## Example
//!
//! ```rust
//! use exploration_stats::{GeoSample, geo_utils};
//!
//! let a = GeoSample::new(51.5074, -0.1278, 0);
//! let b = GeoSample::new(51.5090, -0.1300, 60_000);
//!
//! let dist = geo_utils::haversine_distance(&a, &b);
//! let speed = geo_utils::implied_speed_mps(dist, b.timestamp_ms - a.timestamp_ms);
//! println!("{:.0}m at {:.1}m/s", dist, speed);
//! ```
//!
//! ## Algorithm Notes
//!
//! The haversine formula gives the great-circle distance on a sphere. The radius is
//! fixed at 6,371,000 m so totals stay comparable with previously recorded figures;
//! over the segment lengths the classifier accepts the spherical error is far below
//! GPS noise.
//!
//! Reference: [Haversine formula (Wikipedia)](https://en.wikipedia.org/wiki/Haversine_formula)

use crate::GeoSample;

/// Earth radius used for all distance calculations, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two samples using the Haversine formula.
///
/// Timestamps are ignored. NaN coordinates propagate to a NaN result, so callers
/// validate samples first.
///
/// # Example
///
/// ```rust
/// use exploration_stats::{GeoSample, geo_utils};
///
/// let london = GeoSample::new(51.5074, -0.1278, 0);
/// let paris = GeoSample::new(48.8566, 2.3522, 0);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(a: &GeoSample, b: &GeoSample) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    // Rounding can push antipodal points just above 1.0; clamp keeps NaN intact
    let c = 2.0 * h.sqrt().clamp(0.0, 1.0).asin();

    EARTH_RADIUS_METERS * c
}

/// Average speed in m/s for `distance_meters` covered over `elapsed_ms`.
///
/// Returns `f64::INFINITY` for a zero or negative interval, which any finite
/// speed ceiling rejects.
#[inline]
pub fn implied_speed_mps(distance_meters: f64, elapsed_ms: i64) -> f64 {
    if elapsed_ms <= 0 {
        return f64::INFINITY;
    }
    distance_meters / (elapsed_ms as f64 / 1000.0)
}

/// Milliseconds from `a` to `b`.
///
/// Saturates instead of overflowing, so timestamps at opposite ends of the `i64`
/// range read as an enormous gap rather than a panic or a wrapped negative value.
#[inline]
pub fn elapsed_ms(a: &GeoSample, b: &GeoSample) -> i64 {
    b.timestamp_ms.saturating_sub(a.timestamp_ms)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = GeoSample::new(51.5074, -0.1278, 0);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_distance_known_value() {
        let london = GeoSample::new(51.5074, -0.1278, 0);
        let paris = GeoSample::new(48.8566, 2.3522, 0);
        let dist = haversine_distance(&london, &paris);
        assert!(approx_eq(dist, 343_560.0, 5000.0));
    }

    #[test]
    fn test_haversine_distance_symmetric() {
        let a = GeoSample::new(37.7749, -122.4194, 0);
        let b = GeoSample::new(37.7760, -122.4180, 10_000);
        assert_eq!(haversine_distance(&a, &b), haversine_distance(&b, &a));
    }

    #[test]
    fn test_one_millidegree_latitude() {
        // 0.001 deg of latitude on a 6,371 km sphere is ~111.19 m
        let a = GeoSample::new(0.0, 0.0, 0);
        let b = GeoSample::new(0.001, 0.0, 0);
        assert!(approx_eq(haversine_distance(&a, &b), 111.19, 0.01));
    }

    #[test]
    fn test_antipodal_points() {
        let a = GeoSample::new(0.0, 0.0, 0);
        let b = GeoSample::new(0.0, 180.0, 0);
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_METERS;
        assert!(approx_eq(haversine_distance(&a, &b), half_circumference, 1.0));
    }

    #[test]
    fn test_nan_propagates() {
        let a = GeoSample::new(f64::NAN, 0.0, 0);
        let b = GeoSample::new(0.0, 0.0, 0);
        assert!(haversine_distance(&a, &b).is_nan());
    }

    #[test]
    fn test_implied_speed() {
        assert!(approx_eq(implied_speed_mps(150.0, 30_000), 5.0, 1e-9));
        assert_eq!(implied_speed_mps(10.0, 0), f64::INFINITY);
        assert_eq!(implied_speed_mps(10.0, -5), f64::INFINITY);
    }

    #[test]
    fn test_nan_longitude_propagates() {
        let a = GeoSample::new(0.0, f64::NAN, 0);
        let b = GeoSample::new(10.0, 10.0, 0);
        assert!(haversine_distance(&a, &b).is_nan());
        assert!(haversine_distance(&b, &a).is_nan());
    }

    #[test]
    fn test_elapsed_ms_saturates() {
        let early = GeoSample::new(0.0, 0.0, i64::MIN);
        let late = GeoSample::new(0.0, 0.0, i64::MAX);
        assert_eq!(elapsed_ms(&early, &late), i64::MAX);
        assert_eq!(elapsed_ms(&late, &early), i64::MIN);

        let a = GeoSample::new(0.0, 0.0, 1_000);
        let b = GeoSample::new(0.0, 0.0, 31_000);
        assert_eq!(elapsed_ms(&a, &b), 30_000);
    }
}
