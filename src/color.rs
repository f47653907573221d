use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Continuous colour scale: corresponding density → Color32
// ---------------------------------------------------------------------------

/// Hue at the low end of the scale (violet) and at the high end (yellow).
const HUE_LOW: f32 = 270.0;
const HUE_HIGH: f32 = 60.0;

fn hue_to_color(hue: f32) -> Color32 {
    let hsl = Hsl::new(hue, 0.75, 0.5);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Maps a value range onto a violet → blue → green → yellow gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    min: f64,
    max: f64,
}

impl ColorScale {
    pub fn new(min: f64, max: f64) -> Self {
        ColorScale { min, max }
    }

    /// Position of `value` on the scale, clamped to `[0, 1]`.
    /// A degenerate range maps everything to the middle.
    pub fn normalize(&self, value: f64) -> f32 {
        let range = self.max - self.min;
        if !range.is_finite() || range.abs() < f64::EPSILON {
            return 0.5;
        }
        ((value - self.min) / range).clamp(0.0, 1.0) as f32
    }

    pub fn color_for(&self, value: f64) -> Color32 {
        let t = self.normalize(value);
        hue_to_color(HUE_LOW + (HUE_HIGH - HUE_LOW) * t)
    }

    /// `n` evenly spaced (value label, colour) pairs for the legend.
    pub fn legend_entries(&self, n: usize) -> Vec<(String, Color32)> {
        if n == 0 {
            return Vec::new();
        }
        let steps = (n - 1).max(1) as f64;
        (0..n)
            .map(|i| {
                let v = self.min + (self.max - self.min) * i as f64 / steps;
                (format!("{v:.4}"), self.color_for(v))
            })
            .collect()
    }
}
