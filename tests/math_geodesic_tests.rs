#![cfg(feature = "dev")]

use approx::{assert_abs_diff_eq, assert_relative_eq};
use cityreach::internals::math::geodesic::{
    destination, haversine, GeoPoint, PlanarBound, EARTH_RADIUS_KM, KM_PER_DEGREE,
};
use cityreach::internals::primitives::errors::ReachError;

// ============================================================================
// GeoPoint validation
// ============================================================================

#[test]
fn test_validate_accepts_in_range_coordinates() {
    assert!(GeoPoint::new(40.0f64, 9.0).validate().is_ok());
    assert!(GeoPoint::new(-90.0f64, 180.0).validate().is_ok());
    assert!(GeoPoint::new(90.0f64, -180.0).validate().is_ok());
}

#[test]
fn test_validate_rejects_out_of_range_and_non_finite() {
    for (lat, lon) in [
        (90.5f64, 0.0),
        (-91.0, 0.0),
        (0.0, 180.5),
        (0.0, -181.0),
        (f64::NAN, 0.0),
        (0.0, f64::INFINITY),
    ] {
        let result = GeoPoint::new(lat, lon).validate();
        assert!(
            matches!(result, Err(ReachError::InvalidPosition { .. })),
            "({lat}, {lon}) should be rejected"
        );
    }
}

// ============================================================================
// Haversine
// ============================================================================

#[test]
fn test_haversine_zero_for_identical_points() {
    let p = GeoPoint::new(40.0f64, 9.0);
    assert_eq!(haversine(p, p), 0.0);
}

#[test]
fn test_haversine_is_symmetric() {
    let a = GeoPoint::new(40.0f64, 9.0);
    let b = GeoPoint::new(40.7f64, 9.4);
    assert_eq!(haversine(a, b), haversine(b, a));
}

#[test]
fn test_haversine_one_degree_of_meridian() {
    // Along a meridian one degree of arc is exactly KM_PER_DEGREE.
    let a = GeoPoint::new(40.0f64, 9.0);
    let b = GeoPoint::new(41.0f64, 9.0);
    assert_relative_eq!(haversine(a, b), KM_PER_DEGREE, max_relative = 1e-12);
}

#[test]
fn test_haversine_quarter_turn_on_equator() {
    let a = GeoPoint::new(0.0f64, 0.0);
    let b = GeoPoint::new(0.0f64, 90.0);
    let quarter = EARTH_RADIUS_KM * core::f64::consts::PI / 2.0;
    assert_relative_eq!(haversine(a, b), quarter, max_relative = 1e-12);
}

#[test]
fn test_haversine_longitude_shrinks_with_latitude() {
    // One degree of longitude spans less ground away from the equator.
    let equator = haversine(GeoPoint::new(0.0f64, 9.0), GeoPoint::new(0.0, 10.0));
    let mid = haversine(GeoPoint::new(45.0f64, 9.0), GeoPoint::new(45.0, 10.0));
    assert!(mid < equator * 0.72);
    assert!(mid > equator * 0.70); // cos(45°) ≈ 0.707
}

// ============================================================================
// Destination (direct problem)
// ============================================================================

#[test]
fn test_destination_round_trips_through_haversine() {
    let origin = GeoPoint::new(40.0f64, 9.0);
    for bearing in [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0] {
        for distance in [0.1, 1.0, 5.0, 25.0] {
            let probe = destination(origin, bearing, distance);
            assert_relative_eq!(
                haversine(origin, probe),
                distance,
                max_relative = 1e-10
            );
        }
    }
}

#[test]
fn test_destination_due_north_moves_only_latitude() {
    let origin = GeoPoint::new(40.0f64, 9.0);
    let probe = destination(origin, 0.0, KM_PER_DEGREE);
    assert_relative_eq!(probe.lat, 41.0, max_relative = 1e-10);
    assert_abs_diff_eq!(probe.lon, 9.0, epsilon = 1e-9);
}

#[test]
fn test_destination_zero_distance_is_identity() {
    let origin = GeoPoint::new(40.0f64, 9.0);
    let probe = destination(origin, 123.0, 0.0);
    assert_abs_diff_eq!(probe.lat, origin.lat, epsilon = 1e-12);
    assert_abs_diff_eq!(probe.lon, origin.lon, epsilon = 1e-12);
}

// ============================================================================
// Planar lower bound
// ============================================================================

#[test]
fn test_bound_never_exceeds_haversine_on_city_grid() {
    // Dense grid over a city-scale region around 40°N; the bound was built
    // for the region's maximum absolute latitude.
    let bound = PlanarBound::for_max_abs_latitude(41.0f64);
    let mut points = Vec::new();
    for i in 0..=20 {
        for j in 0..=20 {
            points.push(GeoPoint::new(
                39.0 + 2.0 * (i as f64) / 20.0,
                8.0 + 2.0 * (j as f64) / 20.0,
            ));
        }
    }
    for &a in &points {
        for &b in &points {
            let exact = haversine(a, b);
            assert!(
                bound.bound_km(a, b) <= exact + 1e-9,
                "bound exceeded haversine for {a:?} -> {b:?}"
            );
        }
    }
}

#[test]
fn test_bound_is_tight_along_a_meridian() {
    // North-south the equirectangular estimate is exact up to the safety
    // deflation.
    let bound = PlanarBound::for_max_abs_latitude(41.0f64);
    let a = GeoPoint::new(40.0f64, 9.0);
    let b = GeoPoint::new(40.5f64, 9.0);
    let exact = haversine(a, b);
    let lower = bound.bound_km(a, b);
    assert!(lower <= exact);
    assert!(lower > exact * 0.998);
}

#[test]
fn test_bound_sq_matches_bound_km() {
    let bound = PlanarBound::for_max_abs_latitude(41.0f64);
    let a = GeoPoint::new(40.0f64, 9.0);
    let b = GeoPoint::new(40.3f64, 9.7);
    assert_relative_eq!(
        bound.bound_sq(a, b),
        bound.bound_km(a, b).powi(2),
        max_relative = 1e-12
    );
}

#[test]
fn test_bound_factors_shrink_with_latitude() {
    let equator = PlanarBound::for_max_abs_latitude(0.0f64);
    let mid = PlanarBound::for_max_abs_latitude(60.0f64);
    let (ky_eq, kx_eq) = equator.factors();
    let (ky_mid, kx_mid) = mid.factors();
    assert_eq!(ky_eq, ky_mid);
    assert_relative_eq!(kx_eq, ky_eq, max_relative = 1e-12);
    assert_relative_eq!(kx_mid, ky_mid * 0.5, max_relative = 1e-12); // cos 60°
}
