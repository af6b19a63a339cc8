use serde::Serialize;

use crate::color::ColorStop;

/// Renderer-independent description of one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewSpec {
    Choropleth(ChoroplethSpec),
    Line(LineSpec),
}

impl ViewSpec {
    pub fn title(&self) -> &str {
        match self {
            ViewSpec::Choropleth(c) => &c.title,
            ViewSpec::Line(l) => &l.title,
        }
    }

    /// Number of data rows behind the chart.
    pub fn row_count(&self) -> usize {
        match self {
            ViewSpec::Choropleth(c) => c.row_count(),
            ViewSpec::Line(l) => l.points.len(),
        }
    }
}

/// Animated world map, one frame per date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethSpec {
    pub title: String,
    /// Column holding ISO-3 codes.
    pub location_field: &'static str,
    pub color_field: &'static str,
    pub hover_field: &'static str,
    pub frame_field: &'static str,
    pub color_scale: Vec<ColorStop>,
    /// `[min, max]` over every non-null value in every frame.
    pub color_range: Option<(f64, f64)>,
    pub frames: Vec<MapFrame>,
}

impl ChoroplethSpec {
    pub fn row_count(&self) -> usize {
        self.frames.iter().map(|f| f.locations.len()).sum()
    }
}

/// All rows sharing one date; the three vectors are parallel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapFrame {
    pub date: String,
    pub locations: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub hover: Vec<String>,
}

/// Single-series line chart. No points means a placeholder chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSpec {
    pub title: String,
    pub x_field: &'static str,
    pub y_field: &'static str,
    pub points: Vec<LinePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub x: String,
    pub y: Option<f64>,
}
