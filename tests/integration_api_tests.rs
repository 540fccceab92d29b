use approx::assert_relative_eq;
use cityreach::prelude::*;

// ============================================================================
// Builder validation
// ============================================================================

#[test]
fn test_builder_defaults_build() {
    let model = Reach::new().build().unwrap();
    assert_relative_eq!(model.config().cutoff, 1e-4, max_relative = 1e-12);
    assert_relative_eq!(model.config().clip_level, 1.4, max_relative = 1e-12);
    assert!(model.config().attendance_correction);
    assert!(!model.config().parallel);
}

#[test]
fn test_builder_rejects_bad_configuration() {
    assert!(matches!(
        Reach::new().cutoff(-1e-4).build(),
        Err(ReachError::InvalidCutoff { .. })
    ));
    assert!(matches!(
        Reach::new().correction_clip(0.9).build(),
        Err(ReachError::InvalidClipLevel { .. })
    ));
    assert!(matches!(
        Reach::new().cache_capacity(0).build(),
        Err(ReachError::InvalidCacheCapacity)
    ));
}

// ============================================================================
// Full pipeline
// ============================================================================

fn small_city() -> (Vec<ServiceUnit<f64>>, DemandTable<f64>) {
    let school = ServiceUnitBuilder::new(School)
        .name("Scuola Primaria A. Manzoni")
        .unit_id(1)
        .position(40.0, 9.0)
        .capacity(250.0)
        .catchment(AgeBand::ChildPrimary, Catchment::gaussian(1.2))
        .build()
        .unwrap();
    let pharmacy = ServiceUnitBuilder::new(Pharmacy)
        .name("Farmacia Comunale 1")
        .unit_id(2)
        .position(40.002, 9.001)
        .catchment(AgeBand::ChildPrimary, Catchment::gaussian(0.9))
        .catchment(AgeBand::Over74, Catchment::gaussian(0.9))
        .build()
        .unwrap();

    let demand = DemandTable::new(vec![
        DemandLocation::new(1, 40.001, 9.000)
            .with_population(AgeBand::ChildPrimary, 120.0)
            .with_population(AgeBand::Over74, 40.0),
        DemandLocation::new(1, 40.004, 9.002)
            .with_population(AgeBand::ChildPrimary, 60.0),
        DemandLocation::new(2, 39.998, 9.003)
            .with_population(AgeBand::ChildPrimary, 90.0)
            .with_population(AgeBand::Over74, 55.0),
    ])
    .unwrap();
    (vec![school, pharmacy], demand)
}

#[test]
fn test_evaluate_then_weight() {
    let (mut units, demand) = small_city();
    let model = Reach::new().build().unwrap();

    let evaluation = model.evaluate(&mut units, &demand).unwrap();

    // Both categories ran; every demanded-band score is finite and positive
    // at these distances.
    for &score in evaluation
        .band_scores(School, AgeBand::ChildPrimary)
        .unwrap()
    {
        assert!(score.is_finite() && score > 0.0);
    }
    for &score in evaluation
        .band_scores(Pharmacy, AgeBand::Over74)
        .unwrap()
    {
        assert!(score.is_finite() && score > 0.0);
    }

    // Attendance was written back into the units.
    assert!(units[0].attendance().is_some());
    assert!(units[1].attendance().is_some());
    assert_eq!(evaluation.attendance()[0], units[0].attendance());

    // Everyone lives within reach of both units, so each category conserves
    // its demanded population.
    assert_relative_eq!(units[0].attendance().unwrap(), 270.0, max_relative = 1e-9);

    let kpis = model.weight_by_population(&evaluation, &demand).unwrap();
    assert_eq!(
        kpis.rows(School).unwrap().iter().map(|r| r.zone).collect::<Vec<_>>(),
        vec![1, 2]
    );
    let kpi = kpis.value(School, 1, AgeBand::ChildPrimary).unwrap();
    assert!(kpi.is_finite() && kpi > 0.0);
    assert!(kpis.value(School, 1, AgeBand::Newborn).unwrap().is_nan());
}

#[test]
fn test_pharmacy_scores_use_the_best_unit_rule() {
    // Two pharmacies; the combined score equals the max of the two raw
    // scores, with correction disabled for raw kernel values.
    let near = ServiceUnitBuilder::new(Pharmacy)
        .unit_id(1)
        .position(40.0, 9.0)
        .catchment(AgeBand::Over74, Catchment::gaussian(1.0))
        .build()
        .unwrap();
    let far = ServiceUnitBuilder::new(Pharmacy)
        .unit_id(2)
        .position(40.02, 9.0)
        .catchment(AgeBand::Over74, Catchment::gaussian(1.0))
        .build()
        .unwrap();
    let demand = DemandTable::new(vec![
        DemandLocation::new(1, 40.001, 9.0).with_population(AgeBand::Over74, 10.0),
    ])
    .unwrap();

    let model = Reach::new().attendance_correction(false).build().unwrap();
    let mut units = vec![near, far];
    let evaluation = model.evaluate(&mut units, &demand).unwrap();

    let combined = evaluation.score(Pharmacy, AgeBand::Over74, 0).unwrap();
    // The near pharmacy is ~0.11 km away, the far one ~2.1 km; LInf keeps
    // the near one's score.
    assert!(combined > 0.9);
}

#[test]
fn test_model_is_reusable_across_cities() {
    let model = Reach::new().build().unwrap();
    let (mut first_units, first_demand) = small_city();
    let (mut second_units, second_demand) = small_city();

    let a = model.evaluate(&mut first_units, &first_demand).unwrap();
    let b = model.evaluate(&mut second_units, &second_demand).unwrap();
    assert_eq!(
        a.band_scores(School, AgeBand::ChildPrimary),
        b.band_scores(School, AgeBand::ChildPrimary)
    );
}

#[test]
fn test_pair_budget_surfaces_through_the_api() {
    let (mut units, demand) = small_city();
    let model = Reach::new().pair_budget(Some(1)).build().unwrap();
    let result = model.evaluate(&mut units, &demand);
    assert!(matches!(
        result,
        Err(ReachError::PairBudgetExceeded { budget: 1 })
    ));
}

#[test]
fn test_evaluate_rejects_empty_unit_slice() {
    let (_, demand) = small_city();
    let model = Reach::new().build().unwrap();
    let result = model.evaluate::<f64>(&mut [], &demand);
    assert!(matches!(result, Err(ReachError::NoUnits)));
}

#[test]
fn test_f32_pipeline_runs() {
    let school = ServiceUnitBuilder::new(School)
        .unit_id(1)
        .position(40.0f32, 9.0)
        .catchment(AgeBand::ChildPrimary, Catchment::gaussian(1.0f32))
        .build()
        .unwrap();
    let demand = DemandTable::new(vec![
        DemandLocation::new(1, 40.001f32, 9.0).with_population(AgeBand::ChildPrimary, 50.0),
    ])
    .unwrap();

    let model = Reach::new().build().unwrap();
    let mut units = vec![school];
    let evaluation = model.evaluate(&mut units, &demand).unwrap();
    let score = evaluation.score(School, AgeBand::ChildPrimary, 0).unwrap();
    assert!(score > 0.0f32 && score <= 1.0);
}
