use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Indicator;

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
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

const GREEN: Color32 = Color32::from_rgb(146, 208, 80);
const YELLOW: Color32 = Color32::from_rgb(255, 255, 0);
const AMBER: Color32 = Color32::from_rgb(255, 192, 0);
const RED: Color32 = Color32::from_rgb(255, 0, 0);
const DARK_RED: Color32 = Color32::from_rgb(192, 0, 0);

/// Fixed colours matching `Indicator::categories`, position for position.
fn indicator_palette(indicator: Indicator) -> &'static [Color32] {
    match indicator {
        Indicator::Fcs => &[GREEN, AMBER, RED],
        Indicator::Rcsi => &[GREEN, YELLOW, RED],
        Indicator::Hhs => &[GREEN, YELLOW, AMBER, RED, DARK_RED],
        Indicator::Lcs => &[GREEN, YELLOW, AMBER, RED],
    }
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps the category labels of one indicator chart to colours.
///
/// Known labels get the indicator's fixed colour; anything else gets a
/// generated hue.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for `indicator` covering the given labels.
    pub fn new<'a>(indicator: Indicator, categories: impl IntoIterator<Item = &'a str>) -> Self {
        let fixed = indicator_palette(indicator);
        let mut mapping: BTreeMap<String, Color32> = indicator
            .categories()
            .iter()
            .zip(fixed.iter())
            .map(|(label, c)| (label.to_string(), *c))
            .collect();

        let unknown: Vec<&str> = categories
            .into_iter()
            .filter(|c| !mapping.contains_key(*c))
            .collect();
        for (label, c) in unknown.iter().zip(generate_palette(unknown.len())) {
            mapping.insert(label.to_string(), c);
        }

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a category label.
    pub fn color_for(&self, category: &str) -> Color32 {
        self.mapping
            .get(category)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_indicator_has_one_colour_per_category() {
        for ind in Indicator::ALL {
            assert_eq!(indicator_palette(ind).len(), ind.categories().len());
        }
    }

    #[test]
    fn known_labels_use_the_fixed_palette() {
        let cm = ColorMap::new(Indicator::Hhs, ["Catastrophe", "None"]);
        assert_eq!(cm.color_for("None"), GREEN);
        assert_eq!(cm.color_for("Catastrophe"), DARK_RED);
    }

    #[test]
    fn unknown_labels_get_generated_colours() {
        let cm = ColorMap::new(Indicator::Fcs, ["Acceptable", "Missing", "Other"]);
        let missing = cm.color_for("Missing");
        let other = cm.color_for("Other");
        assert_ne!(missing, other);
        assert_ne!(missing, Color32::GRAY);
        assert_eq!(cm.color_for("never seen"), Color32::GRAY);
    }

    #[test]
    fn generated_palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(5).len(), 5);
    }
}
