//! Analysis units: the stratifications the estimator is run over.

use serde::Serialize;

use crate::record::FEMALE_LITERAL;

/// Stratification kind, in canonical enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnitKind {
    /// One unit per distinct race over all years.
    OverallRace,
    /// Single female-vs-male unit over all years.
    OverallGender,
    /// One unit per (year, race) pair.
    YearRace,
    /// One female-vs-male unit per year.
    YearGender,
}

/// One stratification of the dataset. Carries the descriptive keys that end
/// up in the result table; the treatment selector and confounder builder for
/// each kind live with the subgroup runner.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisUnit {
    pub kind: UnitKind,
    pub race: Option<String>,
    pub year: Option<i32>,
}

impl AnalysisUnit {
    pub fn overall_race(race: impl Into<String>) -> Self {
        Self {
            kind: UnitKind::OverallRace,
            race: Some(race.into()),
            year: None,
        }
    }

    pub fn overall_gender() -> Self {
        Self {
            kind: UnitKind::OverallGender,
            race: None,
            year: None,
        }
    }

    pub fn year_race(year: i32, race: impl Into<String>) -> Self {
        Self {
            kind: UnitKind::YearRace,
            race: Some(race.into()),
            year: Some(year),
        }
    }

    pub fn year_gender(year: i32) -> Self {
        Self {
            kind: UnitKind::YearGender,
            race: None,
            year: Some(year),
        }
    }

    /// "Race Disparity" or "Gender Disparity".
    pub fn analysis_type(&self) -> &'static str {
        match self.kind {
            UnitKind::OverallRace | UnitKind::YearRace => "Race Disparity",
            UnitKind::OverallGender | UnitKind::YearGender => "Gender Disparity",
        }
    }

    /// "Overall", "Year_Race" or "Year_Gender".
    pub fn subgroup_type(&self) -> &'static str {
        match self.kind {
            UnitKind::OverallRace | UnitKind::OverallGender => "Overall",
            UnitKind::YearRace => "Year_Race",
            UnitKind::YearGender => "Year_Gender",
        }
    }

    /// Subgroup label: the race value for race units, the treated gender for
    /// gender units.
    pub fn subgroup(&self) -> String {
        match &self.race {
            Some(race) => race.clone(),
            None => FEMALE_LITERAL.to_string(),
        }
    }

    /// Year column value: the literal year for yearly units, "All Years"
    /// otherwise.
    pub fn year_label(&self) -> String {
        match self.year {
            Some(year) => year.to_string(),
            None => "All Years".to_string(),
        }
    }

    /// Human-readable comparison string for the result table.
    pub fn group_comparison(&self) -> String {
        match &self.race {
            Some(race) => format!("{race} vs All Others"),
            None => format!("{FEMALE_LITERAL} vs Male"),
        }
    }

    /// Short label for logs and the run summary.
    pub fn label(&self) -> String {
        format!(
            "{} / {} / {}",
            self.analysis_type(),
            self.subgroup(),
            self.year_label()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::AnalysisUnit;

    #[test]
    fn test_overall_race_labels() {
        let unit = AnalysisUnit::overall_race("Black");
        assert_eq!(unit.analysis_type(), "Race Disparity");
        assert_eq!(unit.subgroup_type(), "Overall");
        assert_eq!(unit.subgroup(), "Black");
        assert_eq!(unit.year_label(), "All Years");
        assert_eq!(unit.group_comparison(), "Black vs All Others");
    }

    #[test]
    fn test_year_gender_labels() {
        let unit = AnalysisUnit::year_gender(2022);
        assert_eq!(unit.analysis_type(), "Gender Disparity");
        assert_eq!(unit.subgroup_type(), "Year_Gender");
        assert_eq!(unit.subgroup(), "Female");
        assert_eq!(unit.year_label(), "2022");
        assert_eq!(unit.group_comparison(), "Female vs Male");
    }

    #[test]
    fn test_label_combines_keys() {
        let unit = AnalysisUnit::year_race(2021, "Asian");
        assert_eq!(unit.label(), "Race Disparity / Asian / 2021");
    }
}
