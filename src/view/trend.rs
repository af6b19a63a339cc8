use super::spec::{LinePoint, LineSpec, ViewSpec};
use crate::data::model::{Metric, ProcessedTable, DATE};

pub const SELECT_ONE_COUNTRY: &str = "Please select a single country to view trends.";

/// Line chart of `metric` over time for a single selected country.
///
/// Any other selection size gets the placeholder chart.
pub fn trend_view(table: &ProcessedTable, metric: Metric, countries: &[String]) -> ViewSpec {
    let [country] = countries else {
        log::debug!("trend view: {} countries selected, showing placeholder", countries.len());
        return ViewSpec::Line(placeholder(metric));
    };

    let points: Vec<LinePoint> = table
        .rows_for(country)
        .map(|r| LinePoint {
            x: r.date.clone(),
            y: r.value(metric),
        })
        .collect();
    log::debug!("trend view: {country} {metric} points={}", points.len());

    ViewSpec::Line(LineSpec {
        title: format!("{country}: {metric} over time"),
        x_field: DATE,
        y_field: metric.column(),
        points,
    })
}

fn placeholder(metric: Metric) -> LineSpec {
    LineSpec {
        title: SELECT_ONE_COUNTRY.to_string(),
        x_field: DATE,
        y_field: metric.column(),
        points: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::testing::sample_table;

    fn line(spec: ViewSpec) -> LineSpec {
        match spec {
            ViewSpec::Line(l) => l,
            other => panic!("expected a line chart, got {other:?}"),
        }
    }

    #[test]
    fn single_country_gets_one_point_per_date() {
        let spec = line(trend_view(&sample_table(), Metric::NewCases, &["Ireland".to_string()]));
        assert!(spec.title.contains("Ireland"));
        assert!(spec.title.contains("new_cases"));
        assert_eq!(spec.x_field, "date");
        assert_eq!(spec.y_field, "new_cases");
        let xs: Vec<&str> = spec.points.iter().map(|p| p.x.as_str()).collect();
        assert_eq!(xs, ["2021-01-01", "2021-01-02", "2021-01-04"]);
        assert_eq!(spec.points[1].y, Some(5.0));
    }

    #[test]
    fn missing_values_stay_as_gaps() {
        let spec = line(trend_view(&sample_table(), Metric::NewCases, &["France".to_string()]));
        assert_eq!(spec.points.len(), 3);
        assert_eq!(spec.points[1].y, None);
    }

    #[test]
    fn non_singleton_selection_gets_placeholder() {
        let table = sample_table();
        let two = ["Ireland".to_string(), "France".to_string()];
        for metric in Metric::ALL {
            for selection in [&[][..], &two[..]] {
                let spec = line(trend_view(&table, metric, selection));
                assert_eq!(spec.title, SELECT_ONE_COUNTRY);
                assert!(spec.points.is_empty());
            }
        }
    }

    #[test]
    fn unknown_single_country_is_an_empty_titled_chart() {
        let spec = line(trend_view(&sample_table(), Metric::TotalCases, &["Atlantis".to_string()]));
        assert_eq!(spec.title, "Atlantis: total_cases over time");
        assert!(spec.points.is_empty());
    }
}
