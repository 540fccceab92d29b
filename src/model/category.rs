//! Service categories and score-combination rules.
//!
//! ## Purpose
//!
//! Every service unit belongs to one category of the city's service catalog:
//! schools, libraries, transit stops, pharmacies, urban green areas. The
//! category decides which age bands demand the service and how overlapping
//! unit contributions merge into one score at a location. This module defines
//! the catalog as plain data with dispatched behavior, not behavior-bearing
//! enum members.
//!
//! ## Design notes
//!
//! * [`ServiceCategory`] is a closed catalog; per-entry data (area, rule,
//!   demand bands, labels) lives in `match` tables so adding an entry is one
//!   arm per table.
//! * [`CombinationRule`] is a tagged value dispatched in `combine`; the
//!   streaming accumulator form exists so the engine can fold sparse matrix
//!   entries without materializing a per-location slice.
//!
//! ## Invariants
//!
//! * `combine` over an empty slice is 0 for every rule.
//! * The accumulator form equals the slice form for non-negative inputs.

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::model::age::AgeBand;

// ============================================================================
// ServiceArea
// ============================================================================

/// Thematic area a service category belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceArea {
    /// Schools, libraries, cultural venues.
    EducationCulture,
    /// Public transport.
    Transport,
    /// Health services.
    Health,
    /// Green and open spaces.
    Environment,
}

impl ServiceArea {
    /// Human-readable area name.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceArea::EducationCulture => "Educazione e cultura",
            ServiceArea::Transport => "Trasporti",
            ServiceArea::Health => "Salute",
            ServiceArea::Environment => "Ambiente",
        }
    }
}

// ============================================================================
// CombinationRule
// ============================================================================

/// Norm used to merge several units' scores at one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombinationRule {
    /// Sum of absolute values.
    L1,
    /// Euclidean norm.
    #[default]
    L2,
    /// Maximum of absolute values.
    LInf,
}

impl CombinationRule {
    /// Combine a slice of unit scores into one value; empty slices give 0.
    pub fn combine<T: Float>(&self, values: &[T]) -> T {
        let mut acc = self.identity();
        for &v in values {
            acc = self.accumulate(acc, v);
        }
        self.finish(acc)
    }

    /// Neutral element of the streaming form.
    #[inline]
    pub fn identity<T: Float>(&self) -> T {
        T::zero()
    }

    /// Fold one more score into a running accumulator.
    #[inline]
    pub fn accumulate<T: Float>(&self, acc: T, value: T) -> T {
        match self {
            CombinationRule::L1 => acc + value.abs(),
            CombinationRule::L2 => acc + value * value,
            CombinationRule::LInf => acc.max(value.abs()),
        }
    }

    /// Close a running accumulator into the combined score.
    #[inline]
    pub fn finish<T: Float>(&self, acc: T) -> T {
        match self {
            CombinationRule::L1 | CombinationRule::LInf => acc,
            CombinationRule::L2 => acc.sqrt(),
        }
    }
}

// ============================================================================
// ServiceCategory
// ============================================================================

/// One entry of the service catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceCategory {
    /// Primary through high schools.
    School,
    /// Public libraries.
    Library,
    /// Local public transport stops.
    TransitStop,
    /// Pharmacies.
    Pharmacy,
    /// Urban green areas.
    UrbanGreen,
}

/// Bands demanding school service.
const SCHOOL_BANDS: [AgeBand; 3] = [AgeBand::ChildPrimary, AgeBand::ChildMid, AgeBand::ChildHigh];

/// Bands demanding services aimed at residents of school age and above.
const FROM_PRIMARY_BANDS: [AgeBand; 9] = [
    AgeBand::ChildPrimary,
    AgeBand::ChildMid,
    AgeBand::ChildHigh,
    AgeBand::Young,
    AgeBand::Junior,
    AgeBand::Senior,
    AgeBand::Over50,
    AgeBand::Over65,
    AgeBand::Over74,
];

impl ServiceCategory {
    /// Number of catalog entries.
    pub const COUNT: usize = 5;

    /// Every category, ordered by [`ServiceCategory::index`].
    pub const ALL: [ServiceCategory; ServiceCategory::COUNT] = [
        ServiceCategory::School,
        ServiceCategory::Library,
        ServiceCategory::TransitStop,
        ServiceCategory::Pharmacy,
        ServiceCategory::UrbanGreen,
    ];

    /// Stable index of the category, `0..COUNT`.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Thematic area of the category.
    pub fn area(&self) -> ServiceArea {
        match self {
            ServiceCategory::School | ServiceCategory::Library => ServiceArea::EducationCulture,
            ServiceCategory::TransitStop => ServiceArea::Transport,
            ServiceCategory::Pharmacy => ServiceArea::Health,
            ServiceCategory::UrbanGreen => ServiceArea::Environment,
        }
    }

    /// Norm used to merge overlapping unit contributions.
    pub fn rule(&self) -> CombinationRule {
        match self {
            ServiceCategory::Pharmacy => CombinationRule::LInf,
            _ => CombinationRule::L2,
        }
    }

    /// Age bands that demand this service, in band order.
    pub fn demand_bands(&self) -> &'static [AgeBand] {
        match self {
            ServiceCategory::School => &SCHOOL_BANDS,
            ServiceCategory::Library | ServiceCategory::TransitStop => &FROM_PRIMARY_BANDS,
            ServiceCategory::Pharmacy | ServiceCategory::UrbanGreen => &AgeBand::ALL,
        }
    }

    /// Whether the band demands this service.
    pub fn demands(&self, band: AgeBand) -> bool {
        self.demand_bands().contains(&band)
    }

    /// Display label of the category.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceCategory::School => "Scuole",
            ServiceCategory::Library => "Biblioteche",
            ServiceCategory::TransitStop => "Fermate TPL",
            ServiceCategory::Pharmacy => "Farmacie",
            ServiceCategory::UrbanGreen => "Aree Verdi",
        }
    }

    /// Tag of the registry the category's raw data comes from.
    pub fn source(&self) -> &'static str {
        match self {
            ServiceCategory::School => "MIUR",
            ServiceCategory::Library => "MIBACT",
            ServiceCategory::TransitStop => "GTFS",
            ServiceCategory::Pharmacy => "Min. Salute",
            ServiceCategory::UrbanGreen => "Comune",
        }
    }
}

impl core::fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}
