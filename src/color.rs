use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

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

/// Fixed colours for the headline regions.
fn fixed_color(region: &str) -> Option<Color32> {
    match region {
        "Spain" => Some(Color32::RED),
        "Germany" => Some(Color32::BLACK),
        "France" => Some(Color32::BLUE),
        "EU27" => Some(Color32::from_rgb(0, 255, 255)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Color mapping: region → Color32
// ---------------------------------------------------------------------------

/// Maps every region of a dataset to a line colour.
#[derive(Debug, Clone, Default)]
pub struct RegionColors {
    mapping: BTreeMap<String, Color32>,
}

impl RegionColors {
    /// Headline regions keep their fixed colour; the rest share a hue wheel.
    pub fn new(regions: &BTreeSet<String>) -> Self {
        let others: Vec<&String> = regions
            .iter()
            .filter(|r| fixed_color(r).is_none())
            .collect();
        let palette = generate_palette(others.len());

        let mut mapping: BTreeMap<String, Color32> = others
            .into_iter()
            .zip(palette)
            .map(|(r, c)| (r.clone(), c))
            .collect();
        for region in regions {
            if let Some(c) = fixed_color(region) {
                mapping.insert(region.clone(), c);
            }
        }

        RegionColors { mapping }
    }

    pub fn color_for(&self, region: &str) -> Color32 {
        self.mapping
            .get(region)
            .copied()
            .or_else(|| fixed_color(region))
            .unwrap_or(Color32::GRAY)
    }
}
