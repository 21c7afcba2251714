use std::collections::BTreeMap;
use std::fmt;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Rgb – renderer-neutral colour carried by chart specs
// ---------------------------------------------------------------------------

/// 8-bit sRGB colour. Serializes as `"#rrggbb"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const GRAY: Rgb = Rgb([160, 160, 160]);

    pub const fn from_hex(hex: u32) -> Self {
        Rgb([(hex >> 16) as u8, (hex >> 8) as u8, hex as u8])
    }

    pub fn to_color32(self) -> Color32 {
        let [r, g, b] = self.0;
        Color32::from_rgb(r, g, b)
    }

    fn to_linear(self) -> LinSrgb<f32> {
        let [r, g, b] = self.0;
        Srgb::new(r, g, b).into_format::<f32>().into_linear()
    }

    fn from_linear(lin: LinSrgb<f32>) -> Self {
        let srgb: Srgb<u8> = Srgb::<f32>::from_linear(lin).into_format();
        Rgb([srgb.red, srgb.green, srgb.blue])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Rgb([
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            ])
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Categorical mapping: label → colour
// ---------------------------------------------------------------------------

/// Maps category labels (country names) to distinct colours.
///
/// Labels are sorted before colours are assigned, so the mapping depends only
/// on the set of labels and not on the order they were seen.
#[derive(Debug, Clone)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Rgb>,
    default_color: Rgb,
}

impl CategoryColors {
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let unique: std::collections::BTreeSet<&str> = labels.into_iter().collect();
        let palette = generate_palette(unique.len());
        let mapping = unique
            .into_iter()
            .zip(palette)
            .map(|(label, c)| (label.to_string(), c))
            .collect();

        CategoryColors {
            mapping,
            default_color: Rgb::GRAY,
        }
    }

    /// Look up the colour for a given label.
    pub fn color_for(&self, label: &str) -> Rgb {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Diverging continuous scale
// ---------------------------------------------------------------------------

/// ColorBrewer RdYlBu, 11 classes, red (low) to blue (high).
const RD_YL_BU: [Rgb; 11] = [
    Rgb::from_hex(0xa50026),
    Rgb::from_hex(0xd73027),
    Rgb::from_hex(0xf46d43),
    Rgb::from_hex(0xfdae61),
    Rgb::from_hex(0xfee090),
    Rgb::from_hex(0xffffbf),
    Rgb::from_hex(0xe0f3f8),
    Rgb::from_hex(0xabd9e9),
    Rgb::from_hex(0x74add1),
    Rgb::from_hex(0x4575b4),
    Rgb::from_hex(0x313695),
];

/// Fixed diverging colour scales a choropleth may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DivergingScale {
    RdYlBu,
}

impl DivergingScale {
    pub fn name(&self) -> &'static str {
        match self {
            DivergingScale::RdYlBu => "RdYlBu",
        }
    }

    fn stops(&self) -> &'static [Rgb] {
        match self {
            DivergingScale::RdYlBu => &RD_YL_BU,
        }
    }

    /// Colour at position `t` in `[0, 1]`, interpolated in linear RGB.
    pub fn sample(&self, t: f64) -> Rgb {
        let stops = self.stops();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
        let pos = t * (stops.len() - 1) as f64;
        let lo = pos.floor() as usize;
        let hi = (lo + 1).min(stops.len() - 1);
        let frac = (pos - lo as f64) as f32;
        if lo == hi || frac == 0.0 {
            return stops[lo];
        }
        Rgb::from_linear(stops[lo].to_linear().mix(stops[hi].to_linear(), frac))
    }

    /// Colour for `value` on the `[min, max]` domain. A degenerate domain maps
    /// to the midpoint.
    pub fn color_for(&self, value: f64, min: f64, max: f64) -> Rgb {
        let span = max - min;
        if !(span.is_finite() && span > 0.0) {
            return self.sample(0.5);
        }
        self.sample((value - min) / span)
    }
}
