//! Service units: one physical instance of a public service.
//!
//! ## Purpose
//!
//! A [`ServiceUnit`] ties together everything the engine needs to know about
//! one service point: its category, position, per-band catchment kernels,
//! precomputed cutoff thresholds, and an optional capacity. Units are built
//! through [`ServiceUnitBuilder`], which validates every field before a unit
//! exists; the engine later writes exactly one field, the estimated
//! attendance.
//!
//! ## Design notes
//!
//! * Cutoff thresholds are solved once at construction, per band. When many
//!   units share the same catchments (all transit stops, say), the caller can
//!   lift the solved map from the first unit and hand it to the rest via
//!   `with_thresholds`, skipping the solve.
//! * A threshold solve failure is not fatal: the band's threshold becomes
//!   infinite, which disables pruning for that band and nothing else.
//! * `rescale` mutates catchments and thresholds only; position, category,
//!   and capacity never change after construction.
//!
//! ## Invariants
//!
//! * Catchment and threshold maps cover exactly the same bands.
//! * A present capacity is finite and strictly positive; NaN input capacity
//!   is normalized to "unknown".
//! * `attendance` is `None` until the engine writes it.

// External dependencies
use num_traits::Float;
use tracing::warn;

// Internal dependencies
use crate::math::geodesic::GeoPoint;
use crate::math::kernel::{Catchment, KERNEL_VALUE_CUTOFF};
use crate::model::age::{AgeBand, BandMap};
use crate::model::category::ServiceCategory;
use crate::primitives::errors::{ReachError, Result};

// ============================================================================
// ServiceUnit
// ============================================================================

/// One physical service point with validated catchments.
#[derive(Debug, Clone)]
pub struct ServiceUnit<T> {
    /// Catalog entry the unit belongs to.
    category: ServiceCategory,
    /// Display name; may be empty.
    name: String,
    /// Stable external identifier.
    unit_id: u64,
    /// Position on the Earth's surface.
    position: GeoPoint<T>,
    /// Users the unit can serve; `None` means unknown.
    capacity: Option<T>,
    /// Per-band distance-decay kernels; only served bands are present.
    catchments: BandMap<Catchment<T>>,
    /// Per-band cutoff distances in kilometers; infinite when the solver
    /// failed for the band.
    thresholds: BandMap<T>,
    /// Kernel value the thresholds were solved against.
    cutoff: T,
    /// Estimated user load, written once per engine run.
    attendance: Option<T>,
    /// Free-form descriptive pairs carried through untouched.
    attributes: Vec<(String, String)>,
}

impl<T: Float> ServiceUnit<T> {
    /// Start building a unit of the given category.
    pub fn builder(category: ServiceCategory) -> ServiceUnitBuilder<T> {
        ServiceUnitBuilder::new(category)
    }

    /// Catalog entry the unit belongs to.
    #[inline]
    pub fn category(&self) -> ServiceCategory {
        self.category
    }

    /// Display name; may be empty.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stable external identifier.
    pub fn unit_id(&self) -> u64 {
        self.unit_id
    }

    /// Position on the Earth's surface.
    #[inline]
    pub fn position(&self) -> GeoPoint<T> {
        self.position
    }

    /// Users the unit can serve, when known.
    pub fn capacity(&self) -> Option<T> {
        self.capacity
    }

    /// Catchment kernel for a band, if the unit serves it.
    #[inline]
    pub fn catchment(&self, band: AgeBand) -> Option<&Catchment<T>> {
        self.catchments.get(band)
    }

    /// Bands the unit serves, in band order.
    pub fn bands(&self) -> impl Iterator<Item = AgeBand> + '_ {
        self.catchments.bands()
    }

    /// Cutoff distance for a band in kilometers; infinite thresholds mean
    /// pruning is disabled for the band.
    #[inline]
    pub fn threshold(&self, band: AgeBand) -> Option<T> {
        self.thresholds.get(band).copied()
    }

    /// Solved per-band cutoff distances, for reuse across units sharing the
    /// same catchments.
    pub fn thresholds(&self) -> &BandMap<T> {
        &self.thresholds
    }

    /// Estimated user load from the last engine run, if any.
    pub fn attendance(&self) -> Option<T> {
        self.attendance
    }

    /// Free-form descriptive pairs.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Write the estimated attendance; called once per engine run.
    pub(crate) fn set_attendance(&mut self, value: T) {
        self.attendance = Some(value);
    }

    /// Rescale every catchment so that `new(d) = factor · old(d / factor)`,
    /// then re-solve the cutoff thresholds.
    ///
    /// Position, category, and capacity are untouched. Fails when the factor
    /// is non-positive or not finite.
    pub fn rescale(&mut self, factor: T) -> Result<()> {
        if !factor.is_finite() || factor <= T::zero() {
            return Err(ReachError::InvalidRescaleFactor {
                value: factor.to_f64().unwrap_or(f64::NAN),
            });
        }
        let mut rescaled = BandMap::new();
        for (band, catchment) in self.catchments.iter() {
            let mut c = *catchment;
            c.rescale(factor);
            rescaled.insert(band, c);
        }
        self.thresholds = solve_thresholds(&rescaled, self.cutoff, &self.name);
        self.catchments = rescaled;
        Ok(())
    }
}

/// Solve the cutoff threshold for every band of a catchment map.
///
/// Bands whose solve fails get an infinite threshold, which disables pruning
/// for that band only.
fn solve_thresholds<T: Float>(
    catchments: &BandMap<Catchment<T>>,
    cutoff: T,
    name: &str,
) -> BandMap<T> {
    let mut thresholds = BandMap::new();
    for (band, catchment) in catchments.iter() {
        let threshold = match catchment.cutoff_distance(cutoff) {
            Some(distance) => distance,
            None => {
                warn!(
                    unit = name,
                    band = band.label(),
                    shape = catchment.shape.label(),
                    "cutoff threshold solve failed, pruning disabled for this band"
                );
                T::infinity()
            }
        };
        thresholds.insert(band, threshold);
    }
    thresholds
}

// ============================================================================
// Builder
// ============================================================================

/// Fluent builder producing a validated [`ServiceUnit`].
#[derive(Debug, Clone)]
pub struct ServiceUnitBuilder<T> {
    category: ServiceCategory,
    name: String,
    unit_id: u64,
    position: Option<GeoPoint<T>>,
    capacity: Option<T>,
    catchments: BandMap<Catchment<T>>,
    precomputed_thresholds: Option<BandMap<T>>,
    cutoff: T,
    attributes: Vec<(String, String)>,
}

impl<T: Float> ServiceUnitBuilder<T> {
    /// Builder with no position, no catchments, and the default kernel value
    /// cutoff.
    pub fn new(category: ServiceCategory) -> Self {
        Self {
            category,
            name: String::new(),
            unit_id: 0,
            position: None,
            capacity: None,
            catchments: BandMap::new(),
            precomputed_thresholds: None,
            cutoff: T::from(KERNEL_VALUE_CUTOFF).unwrap(),
            attributes: Vec::new(),
        }
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the stable external identifier.
    pub fn unit_id(mut self, unit_id: u64) -> Self {
        self.unit_id = unit_id;
        self
    }

    /// Set the position in decimal degrees.
    pub fn position(mut self, lat: T, lon: T) -> Self {
        self.position = Some(GeoPoint::new(lat, lon));
        self
    }

    /// Set the capacity in users; NaN is normalized to "unknown".
    pub fn capacity(mut self, capacity: T) -> Self {
        self.capacity = if capacity.is_nan() { None } else { Some(capacity) };
        self
    }

    /// Add a catchment kernel for one band; later calls for the same band
    /// win.
    pub fn catchment(mut self, band: AgeBand, catchment: Catchment<T>) -> Self {
        self.catchments.insert(band, catchment);
        self
    }

    /// Override the kernel value cutoff the thresholds are solved against.
    pub fn cutoff(mut self, cutoff: T) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Supply thresholds solved for an identical catchment map, skipping the
    /// per-band solve. The map must cover exactly the catchment bands.
    pub fn with_thresholds(mut self, thresholds: BandMap<T>) -> Self {
        self.precomputed_thresholds = Some(thresholds);
        self
    }

    /// Attach a free-form attribute pair.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Validate every field and produce the unit.
    pub fn build(self) -> Result<ServiceUnit<T>> {
        let display = if self.name.is_empty() {
            format!("#{}", self.unit_id)
        } else {
            self.name.clone()
        };

        // Check 1: position present and in range.
        let position = self.position.ok_or_else(|| ReachError::InvalidUnit {
            unit: display.clone(),
            reason: "no position supplied".into(),
        })?;
        position.validate()?;

        // Check 2: kernel value cutoff usable for threshold solving.
        if !self.cutoff.is_finite() || self.cutoff <= T::zero() {
            return Err(ReachError::InvalidCutoff {
                value: self.cutoff.to_f64().unwrap_or(f64::NAN),
            });
        }

        // Check 3: at least one served band, all kernels well-formed.
        if self.catchments.is_empty() {
            return Err(ReachError::InvalidUnit {
                unit: display,
                reason: "no catchment bands supplied".into(),
            });
        }
        for (band, catchment) in self.catchments.iter() {
            if !self.category.demands(band) {
                return Err(ReachError::InvalidUnit {
                    unit: display,
                    reason: format!(
                        "band {} is not demanded by category {}",
                        band.label(),
                        self.category.label()
                    ),
                });
            }
            if !catchment.lengthscale.is_finite() || catchment.lengthscale <= T::zero() {
                return Err(ReachError::InvalidUnit {
                    unit: display,
                    reason: format!("non-positive lengthscale for band {}", band.label()),
                });
            }
            if !catchment.amplitude.is_finite() || catchment.amplitude <= T::zero() {
                return Err(ReachError::InvalidUnit {
                    unit: display,
                    reason: format!("non-positive amplitude for band {}", band.label()),
                });
            }
        }

        // Check 4: capacity unknown-or-valid.
        if let Some(capacity) = self.capacity {
            if !capacity.is_finite() || capacity <= T::zero() {
                return Err(ReachError::InvalidUnit {
                    unit: display,
                    reason: format!(
                        "capacity must be strictly positive, got {}",
                        capacity.to_f64().unwrap_or(f64::NAN)
                    ),
                });
            }
        }

        // Check 5: precomputed thresholds, when supplied, match the bands.
        let thresholds = match self.precomputed_thresholds {
            Some(map) => {
                for band in AgeBand::ALL {
                    if map.contains(band) != self.catchments.contains(band) {
                        return Err(ReachError::ThresholdBandMismatch {
                            unit: display,
                            band: band.label(),
                        });
                    }
                }
                map
            }
            None => solve_thresholds(&self.catchments, self.cutoff, &display),
        };

        Ok(ServiceUnit {
            category: self.category,
            name: self.name,
            unit_id: self.unit_id,
            position,
            capacity: self.capacity,
            catchments: self.catchments,
            thresholds,
            cutoff: self.cutoff,
            attendance: None,
            attributes: self.attributes,
        })
    }
}
