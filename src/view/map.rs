use std::collections::HashSet;

use super::spec::{ChoroplethSpec, MapFrame, ViewSpec};
use crate::color::ColorScale;
use crate::data::model::{Metric, Observation, ProcessedTable, DATE, ISO_CODE, LOCATION};

/// Build the animated choropleth for `metric`.
///
/// An empty `countries` selection shows every country; otherwise only the
/// selected locations are drawn.
pub fn map_view(table: &ProcessedTable, metric: Metric, countries: &[String]) -> ViewSpec {
    let selected: HashSet<&str> = countries.iter().map(String::as_str).collect();
    let rows = table
        .rows()
        .iter()
        .filter(|r| selected.is_empty() || selected.contains(r.location.as_str()));

    let frames = frames_by_date(rows, metric);
    let color_range = value_range(&frames);
    let scale = ColorScale::plasma();

    let spec = ChoroplethSpec {
        title: format!("Data: {metric}"),
        location_field: ISO_CODE,
        color_field: metric.column(),
        hover_field: LOCATION,
        frame_field: DATE,
        color_scale: scale.stops(scale.anchor_count()),
        color_range,
        frames,
    };
    log::debug!(
        "map view: metric={metric} selected={} rows={} frames={}",
        countries.len(),
        spec.row_count(),
        spec.frames.len()
    );
    ViewSpec::Choropleth(spec)
}

/// Group consecutive rows by date. The table is sorted by date, so each
/// date forms one run.
fn frames_by_date<'a>(rows: impl Iterator<Item = &'a Observation>, metric: Metric) -> Vec<MapFrame> {
    let mut frames: Vec<MapFrame> = Vec::new();
    for row in rows {
        let start_new = frames.last().map_or(true, |f| f.date != row.date);
        if start_new {
            frames.push(MapFrame {
                date: row.date.clone(),
                locations: Vec::new(),
                values: Vec::new(),
                hover: Vec::new(),
            });
        }
        if let Some(frame) = frames.last_mut() {
            frame.locations.push(row.iso_code.clone());
            frame.values.push(row.value(metric));
            frame.hover.push(row.location.clone());
        }
    }
    frames
}

fn value_range(frames: &[MapFrame]) -> Option<(f64, f64)> {
    frames
        .iter()
        .flat_map(|f| f.values.iter().flatten().copied())
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
