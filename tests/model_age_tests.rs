#![cfg(feature = "dev")]

use cityreach::internals::model::age::{AgeBand, BandMap};

// ============================================================================
// Band catalog
// ============================================================================

#[test]
fn test_bands_partition_the_age_range() {
    // Bands tile [0, MAX_AGE) with no gaps and no overlaps.
    let mut next_expected = 0;
    for band in AgeBand::ALL {
        let (low, high) = band.bounds();
        assert_eq!(low, next_expected, "gap or overlap before {band}");
        assert!(high > low);
        next_expected = high;
    }
    assert_eq!(next_expected, AgeBand::MAX_AGE);
}

#[test]
fn test_classify_agrees_with_bounds() {
    for age in 0..AgeBand::MAX_AGE {
        let band = AgeBand::classify(age).unwrap();
        let (low, high) = band.bounds();
        assert!(age >= low && age < high);
    }
    assert_eq!(AgeBand::classify(AgeBand::MAX_AGE), None);
    assert_eq!(AgeBand::classify(u32::MAX), None);
}

#[test]
fn test_classify_band_edges() {
    assert_eq!(AgeBand::classify(0), Some(AgeBand::Newborn));
    assert_eq!(AgeBand::classify(2), Some(AgeBand::Newborn));
    assert_eq!(AgeBand::classify(3), Some(AgeBand::Kinder));
    assert_eq!(AgeBand::classify(6), Some(AgeBand::ChildPrimary));
    assert_eq!(AgeBand::classify(74), Some(AgeBand::Over74));
    assert_eq!(AgeBand::classify(120), Some(AgeBand::Over74));
}

#[test]
fn test_index_round_trip() {
    for (i, band) in AgeBand::ALL.into_iter().enumerate() {
        assert_eq!(band.index(), i);
        assert_eq!(AgeBand::from_index(i), Some(band));
    }
    assert_eq!(AgeBand::from_index(AgeBand::COUNT), None);
}

#[test]
fn test_labels_are_unique() {
    for a in AgeBand::ALL {
        for b in AgeBand::ALL {
            if a != b {
                assert_ne!(a.label(), b.label());
            }
        }
    }
    assert_eq!(format!("{}", AgeBand::ChildPrimary), "ChildPrimary");
}

// ============================================================================
// BandMap
// ============================================================================

#[test]
fn test_band_map_insert_get() {
    let mut map = BandMap::new();
    assert!(map.is_empty());
    assert_eq!(map.insert(AgeBand::Young, 1.5f64), None);
    assert_eq!(map.insert(AgeBand::Young, 2.5), Some(1.5));
    assert_eq!(map.get(AgeBand::Young), Some(&2.5));
    assert_eq!(map.get(AgeBand::Senior), None);
    assert!(map.contains(AgeBand::Young));
    assert_eq!(map.len(), 1);
}

#[test]
fn test_band_map_iterates_in_band_order() {
    let map = BandMap::from_pairs([
        (AgeBand::Over74, 3.0f64),
        (AgeBand::Newborn, 1.0),
        (AgeBand::Junior, 2.0),
    ]);
    let collected: Vec<_> = map.iter().map(|(band, &v)| (band, v)).collect();
    assert_eq!(
        collected,
        vec![
            (AgeBand::Newborn, 1.0),
            (AgeBand::Junior, 2.0),
            (AgeBand::Over74, 3.0),
        ]
    );
    let bands: Vec<_> = map.bands().collect();
    assert_eq!(
        bands,
        vec![AgeBand::Newborn, AgeBand::Junior, AgeBand::Over74]
    );
}
