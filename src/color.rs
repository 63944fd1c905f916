use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Monochrome gradient for surface values
// ---------------------------------------------------------------------------

/// Light end of the blue ramp (`#f7fbff`).
const LIGHT: (u8, u8, u8) = (0xf7, 0xfb, 0xff);
/// Dark end of the blue ramp (`#08306b`).
const DARK: (u8, u8, u8) = (0x08, 0x30, 0x6b);

/// Maps a value in `[0, 1]` to a shade of blue, light for low values and
/// dark for high ones. Interpolation happens in linear RGB.
#[derive(Debug, Clone, Copy)]
pub struct Gradient {
    low: LinSrgb,
    high: LinSrgb,
}

impl Default for Gradient {
    fn default() -> Self {
        Self::blues()
    }
}

impl Gradient {
    pub fn blues() -> Self {
        Gradient {
            low: to_linear(LIGHT),
            high: to_linear(DARK),
        }
    }

    /// 8-bit sRGB colour for `t`; out-of-range and NaN inputs are clamped.
    pub fn rgb(&self, t: f64) -> [u8; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let t = t as f32;
        let mixed: Srgb<f32> = Srgb::from_linear(self.low.mix(self.high, t));
        let mixed: Srgb<u8> = mixed.into_format();
        [mixed.red, mixed.green, mixed.blue]
    }

    pub fn color32(&self, t: f64) -> Color32 {
        let [r, g, b] = self.rgb(t);
        Color32::from_rgb(r, g, b)
    }

    pub fn rgb_color(&self, t: f64) -> RGBColor {
        let [r, g, b] = self.rgb(t);
        RGBColor(r, g, b)
    }
}

fn to_linear((r, g, b): (u8, u8, u8)) -> LinSrgb {
    Srgb::new(r, g, b).into_format::<f32>().into_linear()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luminance([r, g, b]: [u8; 3]) -> u32 {
        r as u32 * 299 + g as u32 * 587 + b as u32 * 114
    }

    #[test]
    fn endpoints_match_the_ramp() {
        let g = Gradient::blues();
        assert_eq!(g.rgb(0.0), [LIGHT.0, LIGHT.1, LIGHT.2]);
        assert_eq!(g.rgb(1.0), [DARK.0, DARK.1, DARK.2]);
    }

    #[test]
    fn darkens_monotonically() {
        let g = Gradient::blues();
        let shades: Vec<u32> = (0..=10).map(|i| luminance(g.rgb(i as f64 / 10.0))).collect();
        assert!(shades.windows(2).all(|w| w[0] >= w[1]), "{shades:?}");
    }

    #[test]
    fn clamps_out_of_range() {
        let g = Gradient::blues();
        assert_eq!(g.rgb(-3.0), g.rgb(0.0));
        assert_eq!(g.rgb(7.5), g.rgb(1.0));
        assert_eq!(g.rgb(f64::NAN), g.rgb(0.0));
    }
}
