use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Metric;

/// Deep grey-blue from the logo, used for headings.
pub const PRIMARY_COLOR: Color32 = Color32::from_rgb(0x2D, 0x3A, 0x3F);

/// Fixed colour per metric, shades of the logo palette.
pub fn metric_color(metric: Metric) -> Color32 {
    match metric {
        Metric::Wellbeing => PRIMARY_COLOR,
        Metric::Anxiety => Color32::from_rgb(0x5D, 0x6D, 0x74),
        Metric::Loneliness => Color32::from_rgb(0x99, 0xA8, 0xAC),
        Metric::ScreenTime => Color32::from_rgb(0xCC, 0xD4, 0xD6),
        Metric::TeacherRelationship => Color32::from_rgb(0x88, 0x99, 0x9F),
        Metric::SchoolSatisfaction => Color32::from_rgb(0xA9, 0xB8, 0xBB),
    }
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Hue of [`PRIMARY_COLOR`], where the school palette starts.
const LOGO_HUE: f32 = 197.0;

/// Golden-angle hue step; neighbouring schools stay far apart on the wheel.
const HUE_STEP: f32 = 137.5;

/// `n` muted, distinct line colours starting from the logo's grey-blue.
///
/// Lightness alternates between two levels so adjacent entries also differ
/// in brightness when their hues happen to land close together.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (LOGO_HUE + i as f32 * HUE_STEP) % 360.0;
            let lightness = if i % 2 == 0 { 0.42 } else { 0.58 };
            let rgb: Srgb = Hsl::new(hue, 0.45, lightness).into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// School → line colour
// ---------------------------------------------------------------------------

/// Stable colour per school for the trend chart.
#[derive(Debug, Clone, Default)]
pub struct SeriesColors {
    mapping: BTreeMap<String, Color32>,
}

impl SeriesColors {
    pub fn new(schools: &[String]) -> Self {
        let mapping = schools
            .iter()
            .cloned()
            .zip(generate_palette(schools.len()))
            .collect();
        SeriesColors { mapping }
    }

    pub fn color_for(&self, school: &str) -> Color32 {
        self.mapping.get(school).copied().unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_distinct_colours() {
        let palette = generate_palette(5);
        assert_eq!(palette.len(), 5);
        for (i, a) in palette.iter().enumerate() {
            for b in &palette[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn first_school_takes_the_logo_tone() {
        let first = generate_palette(1)[0];
        assert!(first.b() > first.g() && first.g() > first.r());
        // Muted: channels stay within a narrow band.
        assert!(first.b() - first.r() < 0x70);
    }

    #[test]
    fn unknown_school_is_grey() {
        let colors = SeriesColors::new(&["A".to_string(), "B".to_string()]);
        assert_ne!(colors.color_for("A"), colors.color_for("B"));
        assert_eq!(colors.color_for("Z"), Color32::GRAY);
    }
}
