use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Srgb};

use crate::presentation::ColorScale;

pub const DARK_GREEN: Color32 = Color32::from_rgb(0, 100, 0);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

// ---------------------------------------------------------------------------
// Categorical mapping: label → Color32
// ---------------------------------------------------------------------------

/// Maps category labels (provinces, climate metrics) to distinct colours.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Build a colour map from the category labels, in the given order.
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let labels: Vec<&str> = labels.into_iter().collect();
        let palette = generate_palette(labels.len());
        let mapping = labels
            .into_iter()
            .zip(palette)
            .map(|(label, c)| (label.to_string(), c))
            .collect();
        ColorMap { mapping }
    }

    /// Look up the colour for a given label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping.get(label).copied().unwrap_or(Color32::GRAY)
    }
}

// ---------------------------------------------------------------------------
// Continuous scales
// ---------------------------------------------------------------------------

const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

const YLGNBU: [(u8, u8, u8); 5] = [
    (255, 255, 217),
    (199, 233, 180),
    (65, 182, 196),
    (34, 94, 168),
    (8, 29, 88),
];

fn linear(stop: (u8, u8, u8)) -> LinSrgb {
    Srgb::new(
        stop.0 as f32 / 255.0,
        stop.1 as f32 / 255.0,
        stop.2 as f32 / 255.0,
    )
    .into_linear()
}

/// Sample a gradient at `t` in `[0, 1]`, interpolating in linear RGB.
fn sample(stops: &[(u8, u8, u8)], t: f32) -> Color32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let segments = (stops.len() - 1) as f32;
    let pos = t * segments;
    let idx = (pos.floor() as usize).min(stops.len() - 2);
    let local = pos - idx as f32;

    let (a, b) = (linear(stops[idx]), linear(stops[idx + 1]));
    let mixed = LinSrgb::new(
        a.red + (b.red - a.red) * local,
        a.green + (b.green - a.green) * local,
        a.blue + (b.blue - a.blue) * local,
    );
    to_color32(mixed.into_color())
}

/// Colour for `value` on a continuous scale spanning `min..=max`.
/// Non-continuous scales fall back to their single colour.
pub fn scale_color(scale: ColorScale, value: f64, min: f64, max: f64) -> Color32 {
    let t = if max > min {
        ((value - min) / (max - min)) as f32
    } else {
        0.5
    };
    match scale {
        ColorScale::Viridis => sample(&VIRIDIS, t),
        ColorScale::YlGnBu => sample(&YLGNBU, t),
        ColorScale::DarkGreen => DARK_GREEN,
        ColorScale::Categorical => Color32::LIGHT_BLUE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_distinct_colours() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        for i in 0..p.len() {
            for j in (i + 1)..p.len() {
                assert_ne!(p[i], p[j]);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn color_map_falls_back_to_gray() {
        let cm = ColorMap::new(["Punjab", "Sindh"]);
        assert_ne!(cm.color_for("Punjab"), cm.color_for("Sindh"));
        assert_eq!(cm.color_for("Gilgit"), Color32::GRAY);
    }

    #[test]
    fn gradient_endpoints_match_stops() {
        assert_eq!(
            scale_color(ColorScale::Viridis, 0.0, 0.0, 1.0),
            Color32::from_rgb(68, 1, 84)
        );
        assert_eq!(
            scale_color(ColorScale::Viridis, 1.0, 0.0, 1.0),
            Color32::from_rgb(253, 231, 37)
        );
        assert_eq!(
            scale_color(ColorScale::YlGnBu, -1.0, -1.0, 1.0),
            Color32::from_rgb(255, 255, 217)
        );
        // out-of-range values clamp to the ends
        assert_eq!(
            scale_color(ColorScale::YlGnBu, 5.0, -1.0, 1.0),
            Color32::from_rgb(8, 29, 88)
        );
    }

    #[test]
    fn degenerate_range_uses_midpoint() {
        let mid = scale_color(ColorScale::Viridis, 3.0, 3.0, 3.0);
        assert_eq!(mid, scale_color(ColorScale::Viridis, 0.5, 0.0, 1.0));
        assert_eq!(scale_color(ColorScale::DarkGreen, 0.3, 0.0, 1.0), DARK_GREEN);
    }
}
