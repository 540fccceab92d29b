#![cfg(feature = "dev")]

use cityreach::internals::math::batch::{planar_bound_sq_scalar, BatchGeo};
use cityreach::internals::math::geodesic::PlanarBound;

fn grid_f64(n: usize) -> (Vec<f64>, Vec<f64>) {
    let lat = (0..n).map(|i| 39.5 + 0.001 * i as f64).collect();
    let lon = (0..n).map(|i| 8.7 + 0.0007 * i as f64).collect();
    (lat, lon)
}

#[test]
fn test_f64_batch_matches_scalar_reference() {
    let bound = PlanarBound::for_max_abs_latitude(41.0f64);
    let (ky, kx) = bound.factors();

    // Odd and even lengths exercise the SIMD body and the scalar tail.
    for n in [0, 1, 2, 3, 7, 64, 101] {
        let (lat, lon) = grid_f64(n);
        let mut simd = vec![0.0; n];
        let mut scalar = vec![0.0; n];
        f64::planar_bound_sq(&lat, &lon, 40.0, 9.0, ky, kx, &mut simd);
        planar_bound_sq_scalar(&lat, &lon, 40.0, 9.0, ky, kx, &mut scalar);
        assert_eq!(simd, scalar, "n = {n}");
    }
}

#[test]
fn test_f32_batch_matches_scalar_reference() {
    let bound = PlanarBound::for_max_abs_latitude(41.0f32);
    let (ky, kx) = bound.factors();

    for n in [0, 1, 2, 3, 4, 5, 6, 7, 8, 33, 100] {
        let lat: Vec<f32> = (0..n).map(|i| 39.5 + 0.001 * i as f32).collect();
        let lon: Vec<f32> = (0..n).map(|i| 8.7 + 0.0007 * i as f32).collect();
        let mut simd = vec![0.0; n];
        let mut scalar = vec![0.0; n];
        f32::planar_bound_sq(&lat, &lon, 40.0, 9.0, ky, kx, &mut simd);
        planar_bound_sq_scalar(&lat, &lon, 40.0, 9.0, ky, kx, &mut scalar);
        assert_eq!(simd, scalar, "n = {n}");
    }
}

#[test]
fn test_batch_agrees_with_pointwise_bound() {
    use cityreach::internals::math::geodesic::GeoPoint;

    let bound = PlanarBound::for_max_abs_latitude(41.0f64);
    let (ky, kx) = bound.factors();
    let (lat, lon) = grid_f64(17);
    let mut out = vec![0.0; 17];
    f64::planar_bound_sq(&lat, &lon, 40.0, 9.0, ky, kx, &mut out);

    let origin = GeoPoint::new(40.0f64, 9.0);
    for i in 0..17 {
        let expected = bound.bound_sq(origin, GeoPoint::new(lat[i], lon[i]));
        assert!(
            (out[i] - expected).abs() <= f64::EPSILON * expected.max(1.0),
            "index {i}: {} vs {expected}",
            out[i]
        );
    }
}
