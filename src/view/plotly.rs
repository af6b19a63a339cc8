use serde_json::{json, Value};

use super::spec::{ChoroplethSpec, LineSpec, MapFrame, ViewSpec};

const FRAME_MS: u64 = 500;

/// Translate a view description into a Plotly.js figure
/// (`{"data": .., "layout": .., "frames": ..}`).
pub fn figure(spec: &ViewSpec) -> Value {
    match spec {
        ViewSpec::Choropleth(c) => choropleth_figure(c),
        ViewSpec::Line(l) => line_figure(l),
    }
}

// ---------------------------------------------------------------------------
// Choropleth
// ---------------------------------------------------------------------------

fn choropleth_figure(spec: &ChoroplethSpec) -> Value {
    let mut coloraxis = json!({
        "colorscale": spec.color_scale,
        "colorbar": { "title": { "text": spec.color_field } },
    });
    if let Some((lo, hi)) = spec.color_range {
        coloraxis["cmin"] = json!(lo);
        coloraxis["cmax"] = json!(hi);
    }

    let mut layout = json!({
        "title": { "text": spec.title },
        "geo": { "showframe": false, "showcoastlines": true, "projection": { "type": "equirectangular" } },
        "coloraxis": coloraxis,
        "legend": { "tracegrouporder": "reversed" },
        "margin": { "t": 60 },
    });

    let Some(first) = spec.frames.first() else {
        let empty = json!({
            "type": "choropleth",
            "locationmode": "ISO-3",
            "locations": [],
            "z": [],
            "coloraxis": "coloraxis",
        });
        return json!({ "data": [empty], "layout": layout, "frames": [] });
    };

    let frames: Vec<Value> = spec
        .frames
        .iter()
        .map(|f| json!({ "name": f.date, "data": [choropleth_trace(spec, f)] }))
        .collect();

    layout["sliders"] = json!([date_slider(spec)]);
    layout["updatemenus"] = json!([play_pause_buttons()]);

    json!({
        "data": [choropleth_trace(spec, first)],
        "layout": layout,
        "frames": frames,
    })
}

fn choropleth_trace(spec: &ChoroplethSpec, frame: &MapFrame) -> Value {
    json!({
        "type": "choropleth",
        "name": "",
        "locationmode": "ISO-3",
        "locations": frame.locations,
        "z": frame.values,
        "text": frame.hover,
        "coloraxis": "coloraxis",
        "hovertemplate": format!(
            "<b>%{{text}}</b><br><br>{}={}<br>{}=%{{location}}<br>{}=%{{z}}<extra></extra>",
            spec.frame_field, frame.date, spec.location_field, spec.color_field
        ),
    })
}

fn date_slider(spec: &ChoroplethSpec) -> Value {
    let steps: Vec<Value> = spec
        .frames
        .iter()
        .map(|f| {
            json!({
                "label": f.date,
                "method": "animate",
                "args": [[f.date], {
                    "mode": "immediate",
                    "frame": { "duration": 0, "redraw": true },
                    "transition": { "duration": 0, "easing": "linear" },
                }],
            })
        })
        .collect();

    json!({
        "active": 0,
        "currentvalue": { "prefix": format!("{}=", spec.frame_field) },
        "len": 0.9,
        "x": 0.1,
        "pad": { "b": 10, "t": 60 },
        "steps": steps,
    })
}

fn play_pause_buttons() -> Value {
    json!({
        "type": "buttons",
        "direction": "left",
        "showactive": false,
        "x": 0.1,
        "xanchor": "right",
        "y": 0,
        "yanchor": "top",
        "pad": { "r": 10, "t": 70 },
        "buttons": [
            {
                "label": "&#9654;",
                "method": "animate",
                "args": [null, {
                    "frame": { "duration": FRAME_MS, "redraw": true },
                    "mode": "immediate",
                    "fromcurrent": true,
                    "transition": { "duration": FRAME_MS, "easing": "linear" },
                }],
            },
            {
                "label": "&#9724;",
                "method": "animate",
                "args": [[null], {
                    "frame": { "duration": 0, "redraw": true },
                    "mode": "immediate",
                    "fromcurrent": true,
                    "transition": { "duration": 0, "easing": "linear" },
                }],
            },
        ],
    })
}

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

fn line_figure(spec: &LineSpec) -> Value {
    let layout = json!({
        "title": { "text": spec.title },
        "xaxis": { "title": { "text": spec.x_field } },
        "yaxis": { "title": { "text": spec.y_field } },
        "margin": { "t": 60 },
    });

    if spec.points.is_empty() {
        return json!({ "data": [], "layout": layout });
    }

    let xs: Vec<&str> = spec.points.iter().map(|p| p.x.as_str()).collect();
    let ys: Vec<Option<f64>> = spec.points.iter().map(|p| p.y).collect();
    let trace = json!({
        "type": "scatter",
        "mode": "lines",
        "name": "",
        "x": xs,
        "y": ys,
        "hovertemplate": format!("{}=%{{x}}<br>{}=%{{y}}<extra></extra>", spec.x_field, spec.y_field),
    });

    json!({ "data": [trace], "layout": layout })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Metric;
    use crate::view::testing::sample_table;
    use crate::view::{map_view, trend_view};

    #[test]
    fn choropleth_has_a_frame_and_slider_step_per_date() {
        let fig = figure(&map_view(&sample_table(), Metric::NewCases, &[]));
        let frames = fig["frames"].as_array().unwrap();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0]["name"], "2021-01-01");
        assert_eq!(fig["layout"]["sliders"][0]["steps"].as_array().unwrap().len(), 4);
        assert_eq!(fig["layout"]["title"]["text"], "Data: new_cases");
        assert_eq!(fig["layout"]["coloraxis"]["cmin"], 5.0);
        assert_eq!(fig["layout"]["coloraxis"]["cmax"], 40.0);

        let trace = &fig["data"][0];
        assert_eq!(trace["type"], "choropleth");
        assert_eq!(trace["locationmode"], "ISO-3");
        assert_eq!(trace["locations"], json!(["IRL", "FRA"]));
        assert_eq!(trace["z"], json!([10.0, 20.0]));
    }

    #[test]
    fn missing_values_are_null_in_the_figure() {
        let fig = figure(&map_view(&sample_table(), Metric::NewCases, &[]));
        assert_eq!(fig["frames"][1]["data"][0]["z"], json!([5.0, null]));
    }

    #[test]
    fn empty_choropleth_keeps_its_title() {
        let fig = figure(&map_view(&sample_table(), Metric::TotalCases, &["Atlantis".to_string()]));
        assert_eq!(fig["layout"]["title"]["text"], "Data: total_cases");
        assert_eq!(fig["frames"], json!([]));
        assert!(fig["layout"].get("sliders").is_none());
    }

    #[test]
    fn line_figure_plots_date_against_metric() {
        let fig = figure(&trend_view(&sample_table(), Metric::TotalCases, &["Ireland".to_string()]));
        let trace = &fig["data"][0];
        assert_eq!(trace["mode"], "lines");
        assert_eq!(trace["x"], json!(["2021-01-01", "2021-01-02", "2021-01-04"]));
        assert_eq!(trace["y"], json!([10.0, 15.0, 22.0]));
        assert_eq!(fig["layout"]["yaxis"]["title"]["text"], "total_cases");
    }

    #[test]
    fn placeholder_has_no_traces() {
        let fig = figure(&trend_view(&sample_table(), Metric::TotalCases, &[]));
        assert_eq!(fig["data"], json!([]));
        assert_eq!(fig["layout"]["title"]["text"], crate::view::trend::SELECT_ONE_COUNTRY);
    }
}
