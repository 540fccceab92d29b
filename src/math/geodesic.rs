//! Great-circle geometry and the planar pruning bound.
//!
//! ## Purpose
//!
//! Every score in the model is a function of the distance between a service
//! unit and a demand location on the Earth's surface. This module provides
//! the spherical measures the engine needs: the haversine distance, the
//! direct (destination) problem used to place probe points at exact
//! distances, and a cheap planar lower bound that lets the engine discard
//! most pairs without evaluating any trigonometry.
//!
//! ## Design notes
//!
//! * Distances are kilometers on a sphere of radius [`EARTH_RADIUS_KM`]
//!   (the IUGG mean radius, matching common geodesy libraries).
//! * The lower bound is an equirectangular estimate deflated by a fixed
//!   safety factor. Along a meridian the estimate is exact; east-west it can
//!   exceed the great-circle distance by a relative error of at most u²/24
//!   (u = longitude difference in radians), which for spans below
//!   [`MAX_REGION_SPAN_DEG`] stays under 1/3000, well inside the deflation.
//! * Comparisons happen in squared kilometers so the hot loop never takes a
//!   square root.
//!
//! ## Key concepts
//!
//! * **Lower bound**: a value `b(a, c) ≤ haversine(a, c)` for every pair in
//!   the validated region, so `b ≥ threshold` proves the true distance is
//!   beyond the threshold too.
//!
//! ## Invariants
//!
//! * `haversine` is non-negative and symmetric.
//! * `PlanarBound::bound_km` never exceeds `haversine` for points within a
//!   region of [`MAX_REGION_SPAN_DEG`] span whose maximum absolute latitude
//!   was supplied at construction.
//!
//! ## Non-goals
//!
//! * No ellipsoidal (WGS84) corrections; the reference model is spherical.
//! * No antimeridian handling; regions crossing it fail the span check.

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::primitives::errors::{ReachError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Mean Earth radius in kilometers (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.009;

/// Kilometers per degree of arc on the sphere.
pub const KM_PER_DEGREE: f64 = EARTH_RADIUS_KM * core::f64::consts::PI / 180.0;

/// Widest latitude/longitude span (degrees) a single region may cover.
///
/// Keeps the planar bound provably conservative and rejects antimeridian
/// crossings.
pub const MAX_REGION_SPAN_DEG: f64 = 5.0;

/// Deflation applied to the planar bound factors.
const BOUND_SAFETY: f64 = 0.999;

// ============================================================================
// GeoPoint
// ============================================================================

/// A point on the Earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint<T> {
    /// Latitude in decimal degrees, positive north.
    pub lat: T,
    /// Longitude in decimal degrees, positive east.
    pub lon: T,
}

impl<T: Float> GeoPoint<T> {
    /// Build a point from latitude and longitude in decimal degrees.
    pub fn new(lat: T, lon: T) -> Self {
        Self { lat, lon }
    }

    /// Check that both coordinates are finite and within range.
    pub fn validate(&self) -> Result<()> {
        let lat_limit = T::from(90.0).unwrap();
        let lon_limit = T::from(180.0).unwrap();
        let in_range = self.lat.is_finite()
            && self.lon.is_finite()
            && self.lat.abs() <= lat_limit
            && self.lon.abs() <= lon_limit;
        if in_range {
            Ok(())
        } else {
            Err(ReachError::InvalidPosition {
                latitude: self.lat.to_f64().unwrap_or(f64::NAN),
                longitude: self.lon.to_f64().unwrap_or(f64::NAN),
            })
        }
    }
}

// ============================================================================
// Spherical measures
// ============================================================================

/// Great-circle distance between two points, in kilometers.
pub fn haversine<T: Float>(a: GeoPoint<T>, b: GeoPoint<T>) -> T {
    let radius = T::from(EARTH_RADIUS_KM).unwrap();
    let two = T::from(2.0).unwrap();
    let half = T::from(0.5).unwrap();

    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let sin_lat = (d_lat * half).sin();
    let sin_lon = (d_lon * half).sin();
    let h = sin_lat * sin_lat + lat_a.cos() * lat_b.cos() * sin_lon * sin_lon;

    // Clamp against rounding before the square root feeds `asin`.
    let h = h.min(T::one()).max(T::zero());
    two * radius * h.sqrt().asin()
}

/// Point reached by travelling `distance_km` from `origin` along an initial
/// bearing, in degrees clockwise from north.
///
/// Solves the spherical direct problem; together with [`haversine`] it lets
/// tests place probes at exact geodesic distances.
pub fn destination<T: Float>(origin: GeoPoint<T>, bearing_deg: T, distance_km: T) -> GeoPoint<T> {
    let radius = T::from(EARTH_RADIUS_KM).unwrap();
    let delta = distance_km / radius;
    let theta = bearing_deg.to_radians();
    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();

    let sin_lat2 = lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos();
    let lat2 = sin_lat2.min(T::one()).max(-T::one()).asin();
    let lon2 = lon1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * sin_lat2);

    let half_turn = T::from(180.0).unwrap();
    let full_turn = T::from(360.0).unwrap();
    let mut lon_deg = lon2.to_degrees();
    if lon_deg > half_turn {
        lon_deg = lon_deg - full_turn;
    } else if lon_deg < -half_turn {
        lon_deg = lon_deg + full_turn;
    }

    GeoPoint::new(lat2.to_degrees(), lon_deg)
}

// ============================================================================
// Planar lower bound
// ============================================================================

/// Precomputed per-degree factors for the planar lower bound of a region.
///
/// The meridian factor is `KM_PER_DEGREE`; the parallel factor shrinks it by
/// the cosine of the region's maximum absolute latitude, where parallels are
/// tightest. Both carry the safety deflation, so the bound stays below the
/// great-circle distance for any pair inside the region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarBound<T> {
    km_per_deg_lat: T,
    km_per_deg_lon: T,
}

impl<T: Float> PlanarBound<T> {
    /// Build the bound for a region whose latitudes stay within
    /// `±max_abs_lat_deg`.
    pub fn for_max_abs_latitude(max_abs_lat_deg: T) -> Self {
        let safety = T::from(BOUND_SAFETY).unwrap();
        let km_per_deg = T::from(KM_PER_DEGREE).unwrap();
        let km_per_deg_lat = km_per_deg * safety;
        let km_per_deg_lon = km_per_deg_lat * max_abs_lat_deg.to_radians().cos();
        Self {
            km_per_deg_lat,
            km_per_deg_lon,
        }
    }

    /// Per-degree factors `(latitude, longitude)` in kilometers, for batch
    /// evaluation.
    pub fn factors(&self) -> (T, T) {
        (self.km_per_deg_lat, self.km_per_deg_lon)
    }

    /// Squared lower bound for the distance between two points, in km².
    pub fn bound_sq(&self, a: GeoPoint<T>, b: GeoPoint<T>) -> T {
        let dy = (a.lat - b.lat) * self.km_per_deg_lat;
        let dx = (a.lon - b.lon) * self.km_per_deg_lon;
        dy * dy + dx * dx
    }

    /// Lower bound for the distance between two points, in kilometers.
    pub fn bound_km(&self, a: GeoPoint<T>, b: GeoPoint<T>) -> T {
        self.bound_sq(a, b).sqrt()
    }
}
