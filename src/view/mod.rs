//! View layer: pure binders from (metric, countries) to chart descriptions,
//! plus the Plotly translation used by the browser page.

pub mod map;
pub mod plotly;
pub mod spec;
pub mod trend;

pub use map::map_view;
pub use spec::ViewSpec;
pub use trend::trend_view;

#[cfg(test)]
pub(crate) mod testing {
    use crate::data::model::{Observation, ProcessedTable};

    fn obs(date: &str, location: &str, iso: &str, new: Option<f64>, total: f64, deaths: Option<f64>) -> Observation {
        Observation {
            iso_code: iso.to_string(),
            location: location.to_string(),
            date: date.to_string(),
            new_cases: new,
            total_cases: Some(total),
            new_deaths: deaths,
        }
    }

    /// Six rows over four dates, already sorted.
    pub fn sample_table() -> ProcessedTable {
        ProcessedTable::from_sorted(vec![
            obs("2021-01-01", "Ireland", "IRL", Some(10.0), 10.0, Some(0.0)),
            obs("2021-01-01", "France", "FRA", Some(20.0), 20.0, Some(1.0)),
            obs("2021-01-02", "Ireland", "IRL", Some(5.0), 15.0, None),
            obs("2021-01-02", "France", "FRA", None, 20.0, Some(2.0)),
            obs("2021-01-03", "France", "FRA", Some(40.0), 60.0, Some(3.0)),
            obs("2021-01-04", "Ireland", "IRL", Some(7.0), 22.0, Some(0.0)),
        ])
    }
}
