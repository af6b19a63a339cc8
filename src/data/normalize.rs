use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type};
use arrow::record_batch::RecordBatch;

use super::filter::{from_date32, parse_date, CANONICAL_DATE_FORMAT};
use super::model::{Observation, ProcessedTable, DATE, ISO_CODE, LOCATION, NEW_CASES, NEW_DEATHS, TOTAL_CASES};
use crate::error::{LoadError, LoadResult};

/// Re-render one date cell as `YYYY-MM-DD`. Canonical input is returned as is.
pub fn canonical_date(s: &str) -> Option<String> {
    parse_date(s).map(|d| d.format(CANONICAL_DATE_FORMAT).to_string())
}

/// Turn the projected batch into the processed table: dates rendered as
/// canonical text, rows stably sorted by that text.
pub fn normalize(batch: &RecordBatch) -> LoadResult<ProcessedTable> {
    let dates = date_strings(column(batch, DATE)?)?;
    let iso_codes = text_column(column(batch, ISO_CODE)?)?;
    let locations = text_column(column(batch, LOCATION)?)?;
    let new_cases = numeric_column(column(batch, NEW_CASES)?)?;
    let total_cases = numeric_column(column(batch, TOTAL_CASES)?)?;
    let new_deaths = numeric_column(column(batch, NEW_DEATHS)?)?;

    let mut rows: Vec<Observation> = (0..batch.num_rows())
        .map(|i| Observation {
            iso_code: iso_codes[i].clone(),
            location: locations[i].clone(),
            date: dates[i].clone(),
            new_cases: new_cases[i],
            total_cases: total_cases[i],
            new_deaths: new_deaths[i],
        })
        .collect();

    // `sort_by` is stable: same-day rows keep their file order.
    rows.sort_by(|a, b| a.date.cmp(&b.date));

    Ok(ProcessedTable::from_sorted(rows))
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> LoadResult<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| LoadError::MissingColumn {
            column: name.to_string(),
        })
}

fn date_strings(col: &ArrayRef) -> LoadResult<Vec<String>> {
    if let DataType::Date32 = col.data_type() {
        let days = col.as_primitive::<Date32Type>();
        return (0..days.len())
            .map(|row| {
                if days.is_null(row) {
                    Err(LoadError::DateParse {
                        row: row + 1,
                        value: String::new(),
                    })
                } else {
                    Ok(from_date32(days.value(row)).format(CANONICAL_DATE_FORMAT).to_string())
                }
            })
            .collect();
    }

    let text = cast(col, &DataType::Utf8)?;
    let text = text.as_string::<i32>();
    (0..text.len())
        .map(|row| {
            let value = if text.is_null(row) { "" } else { text.value(row) };
            canonical_date(value).ok_or_else(|| LoadError::DateParse {
                row: row + 1,
                value: value.to_string(),
            })
        })
        .collect()
}

fn text_column(col: &ArrayRef) -> LoadResult<Vec<String>> {
    let text = cast(col, &DataType::Utf8)?;
    let text = text.as_string::<i32>();
    Ok(text
        .iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}

fn numeric_column(col: &ArrayRef) -> LoadResult<Vec<Option<f64>>> {
    let values = cast(col, &DataType::Float64)?;
    Ok(values.as_primitive::<Float64Type>().iter().collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use chrono::NaiveDate;

    use super::*;
    use crate::data::filter::to_date32;

    fn projected(dates: ArrayRef, locations: &[&str]) -> RecordBatch {
        let n = locations.len();
        let schema = Schema::new(vec![
            Field::new(ISO_CODE, DataType::Utf8, true),
            Field::new(LOCATION, DataType::Utf8, true),
            Field::new(DATE, dates.data_type().clone(), true),
            Field::new(NEW_CASES, DataType::Int64, true),
            Field::new(TOTAL_CASES, DataType::Float64, true),
            Field::new(NEW_DEATHS, DataType::Float64, true),
        ]);
        let iso: Vec<String> = locations.iter().map(|l| l[..3].to_uppercase()).collect();
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(StringArray::from(iso)),
                Arc::new(StringArray::from(locations.to_vec())),
                dates,
                Arc::new(Int64Array::from_iter_values((0..n as i64).map(|i| i * 10))),
                Arc::new(Float64Array::from(vec![None::<f64>; n])),
                Arc::new(Float64Array::from(vec![Some(1.5); n])),
            ],
        )
        .unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> i32 {
        to_date32(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn canonical_date_is_idempotent() {
        assert_eq!(canonical_date("2021/01/05").as_deref(), Some("2021-01-05"));
        assert_eq!(canonical_date("2021-01-05 00:00:00").as_deref(), Some("2021-01-05"));
        let once = canonical_date("2021-01-05").unwrap();
        assert_eq!(canonical_date(&once), Some(once.clone()));
    }

    #[test]
    fn sorts_by_date_and_keeps_ties_in_file_order() {
        let dates: ArrayRef = Arc::new(Date32Array::from(vec![
            day(2021, 3, 1),
            day(2021, 1, 1),
            day(2021, 3, 1),
            day(2021, 1, 1),
        ]));
        let table = normalize(&projected(dates, &["France", "Spain", "Italy", "Ireland"])).unwrap();
        let order: Vec<(&str, &str)> = table
            .rows()
            .iter()
            .map(|r| (r.location.as_str(), r.date.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Spain", "2021-01-01"),
                ("Ireland", "2021-01-01"),
                ("France", "2021-03-01"),
                ("Italy", "2021-03-01"),
            ]
        );
    }

    #[test]
    fn metrics_become_optional_floats() {
        let dates: ArrayRef = Arc::new(StringArray::from(vec!["2021-01-02", "2021-01-01"]));
        let table = normalize(&projected(dates, &["Ireland", "France"])).unwrap();
        let france = &table.rows()[0];
        assert_eq!(france.location, "France");
        assert_eq!(france.iso_code, "FRA");
        assert_eq!(france.new_cases, Some(10.0));
        assert_eq!(france.total_cases, None);
        assert_eq!(france.new_deaths, Some(1.5));
    }

    #[test]
    fn renormalizing_processed_dates_is_a_no_op() {
        let dates: ArrayRef = Arc::new(StringArray::from(vec!["2021/02/01", "2021-01-01T00:00:00"]));
        let table = normalize(&projected(dates, &["Ireland", "France"])).unwrap();
        for row in table.rows() {
            assert_eq!(canonical_date(&row.date).as_deref(), Some(row.date.as_str()));
        }
    }

    #[test]
    fn unreadable_text_date_is_an_error() {
        let dates: ArrayRef = Arc::new(StringArray::from(vec!["2021-01-01", "soon"]));
        let err = normalize(&projected(dates, &["Ireland", "France"])).unwrap_err();
        assert!(matches!(err, LoadError::DateParse { row: 2, .. }));
    }
}
