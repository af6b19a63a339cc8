use std::fmt;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, Date32Array};
use arrow::compute::{cast, filter_record_batch};
use arrow::datatypes::{DataType, Date32Type, Field, Int64Type, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::model::DATE;
use crate::error::{LoadError, LoadResult};

pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_FORMATS: [&str; 2] = [CANONICAL_DATE_FORMAT, "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
const OFFSET_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];

const MILLIS_PER_DAY: i64 = 86_400_000;

// ---------------------------------------------------------------------------
// Date window
// ---------------------------------------------------------------------------

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> LoadResult<Self> {
        if start > end {
            return Err(LoadError::InvalidWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Default for DateWindow {
    /// Calendar year 2021.
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2021, 12, 31).unwrap_or_default(),
        }
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// What to do with a date cell that cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePolicy {
    /// Abort the load on the first bad cell.
    #[default]
    Fail,
    /// Drop the row and keep going.
    Skip,
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

/// Parse one date cell. Time-of-day, when present, is discarded; a
/// trailing UTC offset (`Z`, `+01:00`) keeps the calendar date as written.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .or_else(|| {
                    OFFSET_DATETIME_FORMATS
                        .iter()
                        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
                })
                .map(|dt| dt.date_naive())
        })
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

pub(crate) fn to_date32(date: NaiveDate) -> i32 {
    date.signed_duration_since(epoch()).num_days() as i32
}

pub(crate) fn from_date32(days: i32) -> NaiveDate {
    epoch() + chrono::Duration::days(i64::from(days))
}

fn ticks_per_day(unit: &TimeUnit) -> i64 {
    match unit {
        TimeUnit::Second => MILLIS_PER_DAY / 1_000,
        TimeUnit::Millisecond => MILLIS_PER_DAY,
        TimeUnit::Microsecond => MILLIS_PER_DAY * 1_000,
        TimeUnit::Nanosecond => MILLIS_PER_DAY * 1_000_000,
    }
}

// ---------------------------------------------------------------------------
// Coercion + filtering
// ---------------------------------------------------------------------------

/// Replace the `date` column with a `Date32` column.
///
/// Under [`DatePolicy::Skip`] unreadable cells become nulls, which
/// [`filter_window`] drops.
pub fn coerce_dates(batch: &RecordBatch, policy: DatePolicy) -> LoadResult<RecordBatch> {
    let schema = batch.schema();
    let idx = schema.index_of(DATE).map_err(|_| LoadError::MissingColumn {
        column: DATE.to_string(),
    })?;
    let column = batch.column(idx);

    // Stored instants are UTC epoch counts whatever the zone tag says.
    let dates = match column.data_type() {
        DataType::Date32 => column.as_primitive::<Date32Type>().clone(),
        DataType::Date64 => instants_to_days(column, MILLIS_PER_DAY, policy)?,
        DataType::Timestamp(unit, _) => instants_to_days(column, ticks_per_day(unit), policy)?,
        _ => {
            let text = cast(column, &DataType::Utf8)?;
            let text = text.as_string::<i32>();
            let cells = (0..text.len()).map(|row| {
                let value = if text.is_null(row) { "" } else { text.value(row) };
                parse_date(value).map(to_date32).ok_or_else(|| value.to_string())
            });
            resolve_days(cells, policy)?
        }
    };

    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(i, f)| {
            if i == idx {
                Field::new(DATE, DataType::Date32, true)
            } else {
                f.as_ref().clone()
            }
        })
        .collect();
    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();
    columns[idx] = Arc::new(dates);

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

fn instants_to_days(column: &ArrayRef, per_day: i64, policy: DatePolicy) -> LoadResult<Date32Array> {
    let ticks = cast(column, &DataType::Int64)?;
    let cells = ticks.as_primitive::<Int64Type>().iter().map(|tick| match tick {
        Some(t) => i32::try_from(t.div_euclid(per_day)).map_err(|_| t.to_string()),
        None => Err(String::new()),
    });
    resolve_days(cells, policy)
}

/// Collect per-row day counts, applying `policy` to the cells that could
/// not be read. `Err` carries the offending cell text.
fn resolve_days<I>(cells: I, policy: DatePolicy) -> LoadResult<Date32Array>
where
    I: Iterator<Item = Result<i32, String>>,
{
    let mut days = Vec::with_capacity(cells.size_hint().0);
    let mut skipped = 0usize;
    for (row, cell) in cells.enumerate() {
        match cell {
            Ok(d) => days.push(Some(d)),
            Err(_) if policy == DatePolicy::Skip => {
                skipped += 1;
                days.push(None);
            }
            Err(value) => return Err(LoadError::DateParse { row: row + 1, value }),
        }
    }
    if skipped > 0 {
        log::warn!("Dropping {skipped} rows with unreadable dates");
    }
    Ok(Date32Array::from(days))
}

/// Keep rows whose date lies inside `window`, preserving row order.
pub fn filter_window(batch: &RecordBatch, window: &DateWindow, policy: DatePolicy) -> LoadResult<RecordBatch> {
    let coerced = coerce_dates(batch, policy)?;
    let idx = coerced.schema().index_of(DATE)?;
    let dates = coerced.column(idx).as_primitive::<Date32Type>();

    let mask: BooleanArray = dates
        .iter()
        .map(|d| Some(d.is_some_and(|days| window.contains(from_date32(days)))))
        .collect();

    let filtered = filter_record_batch(&coerced, &mask)?;
    log::info!(
        "Window {window}: kept {} of {} rows",
        filtered.num_rows(),
        batch.num_rows()
    );
    Ok(filtered)
}
