use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const ISO_CODE: &str = "iso_code";
pub const LOCATION: &str = "location";
pub const DATE: &str = "date";
pub const NEW_CASES: &str = "new_cases";
pub const TOTAL_CASES: &str = "total_cases";
pub const NEW_DEATHS: &str = "new_deaths";

/// The columns kept for display, in output order.
pub const DISPLAY_COLUMNS: [&str; 6] = [ISO_CODE, LOCATION, DATE, NEW_CASES, TOTAL_CASES, NEW_DEATHS];

// ---------------------------------------------------------------------------
// Metric – the data-type selector's closed set of choices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    TotalCases,
    NewDeaths,
    NewCases,
}

impl Metric {
    /// All metrics in selector order.
    pub const ALL: [Metric; 3] = [Metric::TotalCases, Metric::NewDeaths, Metric::NewCases];

    /// Column name, which doubles as the selector value.
    pub fn column(self) -> &'static str {
        match self {
            Metric::TotalCases => TOTAL_CASES,
            Metric::NewDeaths => NEW_DEATHS,
            Metric::NewCases => NEW_CASES,
        }
    }

    /// Human label shown next to the radio button.
    pub fn label(self) -> &'static str {
        match self {
            Metric::TotalCases => "Total cases",
            Metric::NewDeaths => "Deaths",
            Metric::NewCases => "New cases",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.column() == s)
            .ok_or_else(|| format!("unknown metric '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Observation – one row of the processed table
// ---------------------------------------------------------------------------

/// One (country, date) observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub iso_code: String,
    pub location: String,
    /// Canonical `YYYY-MM-DD`.
    pub date: String,
    pub new_cases: Option<f64>,
    pub total_cases: Option<f64>,
    pub new_deaths: Option<f64>,
}

impl Observation {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::TotalCases => self.total_cases,
            Metric::NewDeaths => self.new_deaths,
            Metric::NewCases => self.new_cases,
        }
    }
}

// ---------------------------------------------------------------------------
// ProcessedTable – built once at startup, read-only afterwards
// ---------------------------------------------------------------------------

/// Filtered, projected, date-sorted observations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedTable {
    rows: Vec<Observation>,
}

impl ProcessedTable {
    /// Wrap rows that are already in window and sorted by date.
    pub(crate) fn from_sorted(rows: Vec<Observation>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    /// Column names, identical for every row.
    pub fn columns(&self) -> &'static [&'static str] {
        &DISPLAY_COLUMNS
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows for one country, in table order.
    pub fn rows_for<'a>(&'a self, location: &'a str) -> impl Iterator<Item = &'a Observation> + 'a {
        self.rows.iter().filter(move |r| r.location == location)
    }
}

// ---------------------------------------------------------------------------
// CountryOption – one entry of the country selector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryOption {
    pub label: String,
    pub value: String,
}

impl CountryOption {
    pub fn new(name: &str) -> Self {
        Self {
            label: name.to_string(),
            value: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_round_trips_through_its_column_name() {
        for m in Metric::ALL {
            assert_eq!(m.column().parse::<Metric>(), Ok(m));
        }
        assert!("total_deaths".parse::<Metric>().is_err());
    }

    #[test]
    fn metric_serializes_as_column_name() {
        let json = serde_json::to_string(&Metric::NewDeaths).unwrap();
        assert_eq!(json, "\"new_deaths\"");
        let back: Metric = serde_json::from_str("\"new_cases\"").unwrap();
        assert_eq!(back, Metric::NewCases);
    }

    #[test]
    fn default_metric_is_total_cases() {
        assert_eq!(Metric::default(), Metric::TotalCases);
    }

    #[test]
    fn value_picks_the_matching_field() {
        let obs = Observation {
            iso_code: "IRL".into(),
            location: "Ireland".into(),
            date: "2021-01-01".into(),
            new_cases: Some(1.0),
            total_cases: Some(2.0),
            new_deaths: None,
        };
        assert_eq!(obs.value(Metric::NewCases), Some(1.0));
        assert_eq!(obs.value(Metric::TotalCases), Some(2.0));
        assert_eq!(obs.value(Metric::NewDeaths), None);
    }
}
