//! Cleaned records and the immutable analysis dataset.

use std::collections::BTreeSet;

use serde::Serialize;

/// Columns the input table must provide. Header matching is
/// case-insensitive; extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "race",
    "gender",
    "age",
    "risk_score",
    "wait_minutes",
    "visit_date",
];

/// Gender value that defines the female treatment indicator.
pub const FEMALE_LITERAL: &str = "Female";

/// Race value that defines the `is_black` confounder in gender units.
pub const BLACK_LITERAL: &str = "Black";

/// Age band over the fixed cut points 0, 18, 35, 50, 65, 120.
///
/// Intervals are right-closed with an inclusive lowest boundary, so every
/// age in [0, 120] maps to exactly one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum AgeBand {
    /// [0, 18]
    Pediatric,
    /// (18, 35]
    YoungAdult,
    /// (35, 50]
    MiddleAge,
    /// (50, 65]
    OlderAdult,
    /// (65, 120]
    Senior,
}

impl AgeBand {
    /// All bands in order.
    pub const ALL: [AgeBand; 5] = [
        AgeBand::Pediatric,
        AgeBand::YoungAdult,
        AgeBand::MiddleAge,
        AgeBand::OlderAdult,
        AgeBand::Senior,
    ];

    /// Display label used in the exported dataset.
    pub fn label(self) -> &'static str {
        match self {
            AgeBand::Pediatric => "0-18",
            AgeBand::YoungAdult => "19-35",
            AgeBand::MiddleAge => "36-50",
            AgeBand::OlderAdult => "51-65",
            AgeBand::Senior => "65+",
        }
    }
}

/// Risk-score quartile band. Cut points are quantiles of the current
/// dataset, computed once per run, not fixed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RiskBand {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl RiskBand {
    /// Bands in quartile order.
    pub const ALL: [RiskBand; 4] = [RiskBand::Q1, RiskBand::Q2, RiskBand::Q3, RiskBand::Q4];

    /// Display label used in the exported dataset.
    pub fn label(self) -> &'static str {
        match self {
            RiskBand::Q1 => "Q1",
            RiskBand::Q2 => "Q2",
            RiskBand::Q3 => "Q3",
            RiskBand::Q4 => "Q4",
        }
    }

    /// Band at the given quartile index (0-based).
    pub fn from_index(index: usize) -> Option<RiskBand> {
        RiskBand::ALL.get(index).copied()
    }
}

/// One validated row. Invariants (enforced by the cleaner, relied on
/// everywhere downstream): wait_minutes in [0, 240], age in [0, 120],
/// risk_score >= 0, year in [2010, 2025], race and gender non-empty.
#[derive(Debug, Clone, Serialize)]
pub struct CleanRecord {
    pub race: String,
    pub gender: String,
    pub age: f64,
    pub risk_score: f64,
    pub wait_minutes: f64,
    pub visit_date: String,
    pub year: i32,
    pub age_band: AgeBand,
    pub is_female: u8,
    pub risk_band: RiskBand,
}

impl CleanRecord {
    /// 1 when the record's race equals `race` (case-insensitive).
    pub fn is_race(&self, race: &str) -> bool {
        self.race.eq_ignore_ascii_case(race)
    }

    /// Black-race indicator used as a confounder in gender units.
    pub fn is_black(&self) -> f64 {
        if self.is_race(BLACK_LITERAL) { 1.0 } else { 0.0 }
    }
}

/// The cleaned dataset: ordered records plus the single set of risk-quartile
/// cut points computed over the whole dataset before any stratification.
///
/// Immutable once built; analysis units only ever borrow it.
#[derive(Debug, Clone)]
pub struct CleanedDataset {
    records: Vec<CleanRecord>,
    risk_cuts: [f64; 5],
}

impl CleanedDataset {
    pub fn new(records: Vec<CleanRecord>, risk_cuts: [f64; 5]) -> Self {
        Self { records, risk_cuts }
    }

    pub fn records(&self) -> &[CleanRecord] {
        &self.records
    }

    pub fn risk_cuts(&self) -> &[f64; 5] {
        &self.risk_cuts
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct race values in sorted order.
    pub fn races(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.records.iter().map(|r| r.race.as_str()).collect();
        set.into_iter().map(String::from).collect()
    }

    /// Distinct years in ascending order.
    pub fn years(&self) -> Vec<i32> {
        let set: BTreeSet<i32> = self.records.iter().map(|r| r.year).collect();
        set.into_iter().collect()
    }
}
