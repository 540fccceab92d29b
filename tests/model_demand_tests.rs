#![cfg(feature = "dev")]

use approx::assert_relative_eq;
use cityreach::internals::model::age::AgeBand;
use cityreach::internals::model::demand::{DemandLocation, DemandTable};
use cityreach::internals::primitives::errors::ReachError;

fn rows() -> Vec<DemandLocation<f64>> {
    vec![
        DemandLocation::new(2, 40.00, 9.00).with_population(AgeBand::ChildPrimary, 120.0),
        DemandLocation::new(1, 40.01, 9.01).with_population(AgeBand::Over74, 30.0),
        DemandLocation::new(2, 40.02, 9.02)
            .with_population(AgeBand::ChildPrimary, 80.0)
            .with_population(AgeBand::Over74, 10.0),
    ]
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_empty_table_is_rejected() {
    let result = DemandTable::<f64>::new(Vec::new());
    assert!(matches!(result, Err(ReachError::EmptyDemand)));
}

#[test]
fn test_out_of_range_position_names_no_row() {
    let result = DemandTable::new(vec![DemandLocation::new(1, 91.0f64, 9.0)]);
    assert!(matches!(result, Err(ReachError::InvalidPosition { .. })));
}

#[test]
fn test_bad_population_names_the_row() {
    for bad in [-1.0f64, f64::NAN, f64::INFINITY] {
        let result = DemandTable::new(vec![
            DemandLocation::new(1, 40.0, 9.0),
            DemandLocation::new(1, 40.1, 9.1).with_population(AgeBand::Young, bad),
        ]);
        match result {
            Err(ReachError::InvalidDemandRow { row, reason }) => {
                assert_eq!(row, 1);
                assert!(reason.contains("Young"), "reason: {reason}");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}

#[test]
fn test_duplicate_positions_are_rejected() {
    let result = DemandTable::new(vec![
        DemandLocation::new(1, 40.0f64, 9.0),
        DemandLocation::new(2, 40.1, 9.1),
        DemandLocation::new(3, 40.0, 9.0), // same position, different zone
    ]);
    match result {
        Err(ReachError::DuplicatePosition { first, second }) => {
            assert_eq!((first, second), (0, 2));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_oversized_region_is_rejected() {
    let result = DemandTable::new(vec![
        DemandLocation::new(1, 40.0f64, 9.0),
        DemandLocation::new(2, 46.0, 9.0), // 6° of latitude
    ]);
    assert!(matches!(result, Err(ReachError::RegionTooLarge { .. })));
}

#[test]
fn test_zero_population_rows_are_allowed() {
    let table = DemandTable::new(vec![DemandLocation::new(1, 40.0f64, 9.0)]).unwrap();
    assert_eq!(table.total_population(AgeBand::Newborn), 0.0);
}

// ============================================================================
// Indices and accessors
// ============================================================================

#[test]
fn test_coordinate_columns_align_with_rows() {
    let table = DemandTable::new(rows()).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.latitudes(), &[40.00, 40.01, 40.02]);
    assert_eq!(table.longitudes(), &[9.00, 9.01, 9.02]);
    assert_eq!(table.locations()[1].zone, 1);
}

#[test]
fn test_zone_index_is_sorted_and_grouped() {
    let table = DemandTable::new(rows()).unwrap();
    assert_eq!(table.zones().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(table.rows_for_zone(1), &[1]);
    assert_eq!(table.rows_for_zone(2), &[0, 2]);
    assert_eq!(table.rows_for_zone(99), &[] as &[usize]);
}

#[test]
fn test_population_column_and_totals() {
    let table = DemandTable::new(rows()).unwrap();
    assert_eq!(
        table.population_column(AgeBand::ChildPrimary),
        vec![120.0, 0.0, 80.0]
    );
    assert_relative_eq!(
        table.total_population(AgeBand::ChildPrimary),
        200.0,
        max_relative = 1e-12
    );
    assert_relative_eq!(
        table.total_population(AgeBand::Over74),
        40.0,
        max_relative = 1e-12
    );
}

#[test]
fn test_extent_is_the_bounding_box() {
    let table = DemandTable::new(rows()).unwrap();
    let (lat_min, lat_max, lon_min, lon_max) = table.extent();
    assert_eq!((lat_min, lat_max), (40.00, 40.02));
    assert_eq!((lon_min, lon_max), (9.00, 9.02));
}
