//! Resident age bands and per-band maps.
//!
//! ## Purpose
//!
//! Demand is disaggregated by resident age: a school matters to a
//! ten-year-old, a pharmacy to everyone. This module defines the eleven
//! contiguous [`AgeBand`]s the model works in and [`BandMap`], the fixed-slot
//! map from bands to values used for lengthscales, thresholds, and per-band
//! tallies.
//!
//! ## Design notes
//!
//! * Bands are a closed catalog with stable indices `0..11`; arrays indexed
//!   by [`AgeBand::index`] replace hash maps throughout the engine.
//! * [`BandMap`] stores one `Option<T>` per band: constant-time access,
//!   iteration in band order, no allocation.
//!
//! ## Invariants
//!
//! * Bands are contiguous, non-overlapping, and cover ages 0 through 199:
//!   every age below [`AgeBand::MAX_AGE`] classifies into exactly one band.
//! * [`AgeBand::ALL`] is ordered by [`AgeBand::index`].

// ============================================================================
// AgeBand
// ============================================================================

/// One of the eleven age bands the model disaggregates demand into.
///
/// Each band covers ages from an inclusive lower bound to an exclusive upper
/// bound; `Over74` is open-ended in practice and capped at
/// [`AgeBand::MAX_AGE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgeBand {
    /// Ages 0–2.
    Newborn,
    /// Ages 3–5.
    Kinder,
    /// Ages 6–9.
    ChildPrimary,
    /// Ages 10–14.
    ChildMid,
    /// Ages 15–18.
    ChildHigh,
    /// Ages 19–24.
    Young,
    /// Ages 25–34.
    Junior,
    /// Ages 35–49.
    Senior,
    /// Ages 50–64.
    Over50,
    /// Ages 65–73.
    Over65,
    /// Ages 74 and older.
    Over74,
}

impl AgeBand {
    /// Number of bands in the catalog.
    pub const COUNT: usize = 11;

    /// Exclusive upper age limit of the open-ended last band.
    pub const MAX_AGE: u32 = 200;

    /// Every band, ordered by [`AgeBand::index`].
    pub const ALL: [AgeBand; AgeBand::COUNT] = [
        AgeBand::Newborn,
        AgeBand::Kinder,
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

    /// Stable index of the band, `0..COUNT`.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Band with the given index, if any.
    pub fn from_index(index: usize) -> Option<AgeBand> {
        AgeBand::ALL.get(index).copied()
    }

    /// Inclusive lower and exclusive upper age bound of the band, in years.
    pub fn bounds(self) -> (u32, u32) {
        match self {
            AgeBand::Newborn => (0, 3),
            AgeBand::Kinder => (3, 6),
            AgeBand::ChildPrimary => (6, 10),
            AgeBand::ChildMid => (10, 15),
            AgeBand::ChildHigh => (15, 19),
            AgeBand::Young => (19, 25),
            AgeBand::Junior => (25, 35),
            AgeBand::Senior => (35, 50),
            AgeBand::Over50 => (50, 65),
            AgeBand::Over65 => (65, 74),
            AgeBand::Over74 => (74, AgeBand::MAX_AGE),
        }
    }

    /// Band containing an age in years, or `None` at or above
    /// [`AgeBand::MAX_AGE`].
    pub fn classify(age: u32) -> Option<AgeBand> {
        AgeBand::ALL
            .iter()
            .copied()
            .find(|band| {
                let (low, high) = band.bounds();
                age >= low && age < high
            })
    }

    /// Short name of the band.
    pub fn label(self) -> &'static str {
        match self {
            AgeBand::Newborn => "Newborn",
            AgeBand::Kinder => "Kinder",
            AgeBand::ChildPrimary => "ChildPrimary",
            AgeBand::ChildMid => "ChildMid",
            AgeBand::ChildHigh => "ChildHigh",
            AgeBand::Young => "Young",
            AgeBand::Junior => "Junior",
            AgeBand::Senior => "Senior",
            AgeBand::Over50 => "Over50",
            AgeBand::Over65 => "Over65",
            AgeBand::Over74 => "Over74",
        }
    }
}

impl core::fmt::Display for AgeBand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// BandMap
// ============================================================================

/// Fixed-slot map from [`AgeBand`] to values of type `T`.
///
/// Bands a service does not cover are simply absent; iteration visits present
/// entries in band order.
#[derive(Debug, Clone, PartialEq)]
pub struct BandMap<T> {
    slots: [Option<T>; AgeBand::COUNT],
}

impl<T> BandMap<T> {
    /// Empty map.
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
        }
    }

    /// Build a map from `(band, value)` pairs; later pairs win on
    /// duplicates.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (AgeBand, T)>,
    {
        let mut map = Self::new();
        for (band, value) in pairs {
            map.insert(band, value);
        }
        map
    }

    /// Insert a value, returning the previous one if the band was present.
    pub fn insert(&mut self, band: AgeBand, value: T) -> Option<T> {
        self.slots[band.index()].replace(value)
    }

    /// Value for a band, if present.
    #[inline]
    pub fn get(&self, band: AgeBand) -> Option<&T> {
        self.slots[band.index()].as_ref()
    }

    /// Whether the band is present.
    #[inline]
    pub fn contains(&self, band: AgeBand) -> bool {
        self.slots[band.index()].is_some()
    }

    /// Number of present bands.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether no band is present.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }

    /// Present `(band, value)` entries in band order.
    pub fn iter(&self) -> impl Iterator<Item = (AgeBand, &T)> + '_ {
        AgeBand::ALL
            .iter()
            .filter_map(move |&band| self.get(band).map(|value| (band, value)))
    }

    /// Present bands in band order.
    pub fn bands(&self) -> impl Iterator<Item = AgeBand> + '_ {
        self.iter().map(|(band, _)| band)
    }
}

impl<T> Default for BandMap<T> {
    fn default() -> Self {
        Self::new()
    }
}
