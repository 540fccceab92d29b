#![cfg(feature = "dev")]

use approx::{assert_abs_diff_eq, assert_relative_eq};
use cityreach::internals::engine::attendance::{
    correction_factor, correction_factors, round_output, split_band_population,
};
use cityreach::internals::engine::interaction::{build_band_matrix, PairBudget, PruningCounters};
use cityreach::internals::math::geodesic::PlanarBound;
use cityreach::internals::math::kernel::Catchment;
use cityreach::internals::model::age::AgeBand;
use cityreach::internals::model::category::ServiceCategory;
use cityreach::internals::model::demand::{DemandLocation, DemandTable};
use cityreach::internals::model::unit::ServiceUnit;
use cityreach::internals::primitives::cache::DistanceCache;

fn close_demand() -> DemandTable<f64> {
    DemandTable::new(vec![
        DemandLocation::new(1, 40.000, 9.000).with_population(AgeBand::ChildPrimary, 120.0),
        DemandLocation::new(1, 40.004, 9.000).with_population(AgeBand::ChildPrimary, 80.0),
        DemandLocation::new(2, 40.000, 9.004).with_population(AgeBand::ChildPrimary, 50.0),
    ])
    .unwrap()
}

fn school_at(lat: f64, lon: f64) -> ServiceUnit<f64> {
    ServiceUnit::builder(ServiceCategory::School)
        .position(lat, lon)
        .catchment(AgeBand::ChildPrimary, Catchment::gaussian(1.0))
        .build()
        .unwrap()
}

fn matrix_for<'a>(
    units: &[&'a ServiceUnit<f64>],
    demand: &DemandTable<f64>,
) -> cityreach::internals::engine::interaction::InteractionMatrix<f64> {
    let (lat_min, lat_max, _, _) = demand.extent();
    let bound = PlanarBound::for_max_abs_latitude(lat_min.abs().max(lat_max.abs()));
    let mut cache = DistanceCache::new(1024).unwrap();
    let budget = PairBudget::new(None);
    let mut counters = PruningCounters::default();
    let mut scratch = Vec::new();
    build_band_matrix(
        units,
        AgeBand::ChildPrimary,
        demand,
        &bound,
        &mut cache,
        &budget,
        &mut counters,
        &mut scratch,
    )
    .unwrap()
}

// ============================================================================
// Load splitting
// ============================================================================

#[test]
fn test_loads_conserve_population_when_all_columns_clear_the_cutoff() {
    let a = school_at(40.001, 9.000);
    let b = school_at(40.002, 9.003);
    let units = [&a, &b];
    let demand = close_demand();
    let matrix = matrix_for(&units, &demand);

    let population = demand.population_column(AgeBand::ChildPrimary);
    let loads = split_band_population(&matrix, &population, 1e-4);

    assert_eq!(loads.unassigned, 0.0);
    let total: f64 = loads.loads.iter().sum();
    assert_relative_eq!(total, 250.0, max_relative = 1e-9);
}

#[test]
fn test_closer_unit_takes_the_larger_share() {
    // Unit `a` sits on top of location 0; unit `b` is 1 km north of it.
    let a = school_at(40.0001, 9.000);
    let b = school_at(40.009, 9.000);
    let units = [&a, &b];
    let demand = close_demand();
    let matrix = matrix_for(&units, &demand);

    let population = demand.population_column(AgeBand::ChildPrimary);
    let loads = split_band_population(&matrix, &population, 1e-4);
    assert!(loads.loads[0] > loads.loads[1]);
}

#[test]
fn test_unreached_population_is_tallied_as_unassigned() {
    // A cutoff above every column sum assigns nobody; the whole band
    // population counts as unassigned.
    let a = school_at(40.000, 9.000);
    let units = [&a];
    let demand = close_demand();
    let matrix = matrix_for(&units, &demand);

    // With a cutoff above every column sum, nobody is assigned.
    let population = demand.population_column(AgeBand::ChildPrimary);
    let loads = split_band_population(&matrix, &population, 10.0);
    assert!(loads.loads.iter().all(|&l| l == 0.0));
    assert_relative_eq!(loads.unassigned, 250.0, max_relative = 1e-12);
}

// ============================================================================
// Correction factor
// ============================================================================

#[test]
fn test_correction_factor_is_reciprocal_of_clipped_ratio() {
    let m = 1.4f64;
    // In-range ratio passes through.
    assert_relative_eq!(correction_factor(1.0, m), 1.0, max_relative = 1e-12);
    assert_relative_eq!(correction_factor(1.2, m), 1.0 / 1.2, max_relative = 1e-12);
    // Overloaded unit clipped at m.
    assert_relative_eq!(correction_factor(3.0, m), 1.0 / m, max_relative = 1e-12);
    // Underloaded unit clipped at 1/m.
    assert_relative_eq!(correction_factor(0.1, m), m, max_relative = 1e-12);
    // 0/0 is zero by rule, then pinned at the lower bound.
    assert_relative_eq!(correction_factor(f64::NAN, m), m, max_relative = 1e-12);
}

#[test]
fn test_correction_factors_stay_in_clip_range() {
    let m = 1.4f64;
    for ratio in [-1.0, 0.0, 0.5, 1.0, 1.4, 2.0, 100.0, f64::NAN] {
        let factor = correction_factor(ratio, m);
        assert!(factor >= 1.0 / m - 1e-12 && factor <= m + 1e-12, "ratio {ratio}");
    }
}

#[test]
fn test_capacity_ratio_used_when_all_capacities_known() {
    let attendance = [140.0f64, 50.0];
    let capacities = [Some(100.0), Some(100.0)];
    let factors = correction_factors(ServiceCategory::School, &attendance, &capacities, 1.4);

    // 140/100 = 1.4 → factor 1/1.4; 50/100 = 0.5 < 1/1.4 → factor 1.4.
    assert_relative_eq!(factors[0], 1.0 / 1.4, max_relative = 1e-12);
    assert_relative_eq!(factors[1], 1.4, max_relative = 1e-12);
}

#[test]
fn test_mean_attendance_fallback_when_any_capacity_missing() {
    let attendance = [150.0f64, 50.0];
    let capacities = [Some(100.0), None];
    let factors = correction_factors(ServiceCategory::School, &attendance, &capacities, 1.4);

    // Mean attendance is 100; ratios 1.5 and 0.5 both clip.
    assert_relative_eq!(factors[0], 1.0 / 1.4, max_relative = 1e-12);
    assert_relative_eq!(factors[1], 1.4, max_relative = 1e-12);
}

#[test]
fn test_zero_attendance_category_pins_at_the_lower_bound() {
    // All-zero attendance with unknown capacities gives 0/0 ratios.
    let attendance = [0.0f64, 0.0];
    let capacities = [None, None];
    let factors = correction_factors(ServiceCategory::Library, &attendance, &capacities, 1.4);
    for factor in factors {
        assert_relative_eq!(factor, 1.4, max_relative = 1e-12);
    }
}

// ============================================================================
// Output rounding
// ============================================================================

#[test]
fn test_round_output_keeps_four_decimals() {
    assert_abs_diff_eq!(round_output(0.123456789f64), 0.1235);
    assert_abs_diff_eq!(round_output(399.99996f64), 400.0);
    assert_abs_diff_eq!(round_output(-0.00005f64), -0.0001);
    assert_eq!(round_output(2.5f64), 2.5);
}
