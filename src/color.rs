use palette::{LinSrgb, Srgb};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Sequential colour scale
// ---------------------------------------------------------------------------

/// Anchor colours of the Plasma sequential scale, dark to bright.
const PLASMA: [(u8, u8, u8); 10] = [
    (0x0d, 0x08, 0x87),
    (0x46, 0x03, 0x9f),
    (0x72, 0x01, 0xa8),
    (0x9c, 0x17, 0x9e),
    (0xbd, 0x37, 0x86),
    (0xd8, 0x57, 0x6b),
    (0xed, 0x79, 0x53),
    (0xfb, 0x9f, 0x3a),
    (0xfd, 0xca, 0x26),
    (0xf0, 0xf9, 0x21),
];

/// A continuous scale defined by evenly spaced anchor colours.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    anchors: Vec<Srgb<u8>>,
}

/// One `(position, colour)` stop as Plotly expects it: `[0.5, "#bd3786"]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorStop(pub f64, pub String);

impl ColorScale {
    pub fn plasma() -> Self {
        Self {
            anchors: PLASMA.iter().map(|&(r, g, b)| Srgb::new(r, g, b)).collect(),
        }
    }

    /// Colour at `t` in `[0, 1]`; values outside are clamped.
    ///
    /// Neighbouring anchors are blended in linear RGB.
    pub fn color_at(&self, t: f64) -> Srgb<u8> {
        let n = self.anchors.len();
        if n == 1 {
            return self.anchors[0];
        }
        let pos = t.clamp(0.0, 1.0) * (n - 1) as f64;
        let lo = (pos.floor() as usize).min(n - 2);
        let frac = (pos - lo as f64) as f32;

        let a: LinSrgb = self.anchors[lo].into_format::<f32>().into_linear();
        let b: LinSrgb = self.anchors[lo + 1].into_format::<f32>().into_linear();
        let mixed = LinSrgb::new(
            a.red + (b.red - a.red) * frac,
            a.green + (b.green - a.green) * frac,
            a.blue + (b.blue - a.blue) * frac,
        );
        let encoded: Srgb<f32> = Srgb::from_linear(mixed);
        encoded.into_format::<u8>()
    }

    /// `steps` evenly spaced stops from 0 to 1.
    pub fn stops(&self, steps: usize) -> Vec<ColorStop> {
        let steps = steps.max(2);
        (0..steps)
            .map(|i| {
                let t = i as f64 / (steps - 1) as f64;
                ColorStop(t, to_hex(self.color_at(t)))
            })
            .collect()
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }
}

pub fn to_hex(c: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ends_match_first_and_last_anchor() {
        let scale = ColorScale::plasma();
        assert_eq!(to_hex(scale.color_at(0.0)), "#0d0887");
        assert_eq!(to_hex(scale.color_at(1.0)), "#f0f921");
        assert_eq!(scale.color_at(-3.0), scale.color_at(0.0));
        assert_eq!(scale.color_at(7.0), scale.color_at(1.0));
    }

    #[test]
    fn stops_at_anchor_resolution_reproduce_anchors() {
        let scale = ColorScale::plasma();
        let stops = scale.stops(scale.anchor_count());
        assert_eq!(stops.len(), 10);
        assert_eq!(stops[0], ColorStop(0.0, "#0d0887".into()));
        assert_eq!(stops[4].1, "#bd3786");
        assert_eq!(stops[9], ColorStop(1.0, "#f0f921".into()));
    }

    #[test]
    fn stop_serializes_as_pair() {
        let json = serde_json::to_string(&ColorStop(0.5, "#abcdef".into())).unwrap();
        assert_eq!(json, r##"[0.5,"#abcdef"]"##);
    }
}
