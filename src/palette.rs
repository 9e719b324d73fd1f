//! Fixed color palette shared by every pattern renderer.

use crossterm::style::Color;

/// Immutable RGBA color value. Alpha is on the 0-255 scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Opaque color from a 0xRRGGBB literal
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 255,
        }
    }

    /// Same color with a new alpha
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Same color with alpha taken from a float on the 0-255 scale (clamped)
    pub fn with_alpha_f(self, a: f32) -> Self {
        let a = if a.is_finite() { a.clamp(0.0, 255.0) } else { 0.0 };
        self.with_alpha(a as u8)
    }

    /// Linear interpolation between two colors, `t` clamped to [0, 1].
    /// Alpha is interpolated too.
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// Relative brightness (0-255), used to decide which braille dots are lit
    pub fn luma(self) -> f32 {
        luma([self.r as f32, self.g as f32, self.b as f32])
    }

    pub fn to_color(self) -> Color {
        Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

pub const SUNSET: [Rgba; 4] = [
    Rgba::hex(0xff5e4d),
    Rgba::hex(0xff8c42),
    Rgba::hex(0xffb347),
    Rgba::hex(0xffd670),
];

pub const CYBER: [Rgba; 4] = [
    Rgba::hex(0x00fff9),
    Rgba::hex(0x00d4ff),
    Rgba::hex(0xbd00ff),
    Rgba::hex(0xff00e5),
];

/// Dark background tones (kept for the status line and help overlay)
pub const DARK: [Rgba; 4] = [
    Rgba::hex(0x0a0a0a),
    Rgba::hex(0x1a1a2e),
    Rgba::hex(0x16213e),
    Rgba::hex(0x0f3460),
];

pub const ACCENT: Rgba = Rgba::hex(0xff5e4d);
pub const BACKGROUND: Rgba = Rgba::hex(0x0a0a0a);

/// Rec. 601 luma of an RGB triple on the 0-255 scale
pub fn luma(rgb: [f32; 3]) -> f32 {
    0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2]
}

/// Sunset entry for an index, wrapping
pub fn sunset(i: usize) -> Rgba {
    SUNSET[i % SUNSET.len()]
}

/// Cyber entry for an index, wrapping
pub fn cyber(i: usize) -> Rgba {
    CYBER[i % CYBER.len()]
}

/// Color from the concatenation of the sunset and cyber sequences
pub fn warm_or_cool(i: usize) -> Rgba {
    let i = i % (SUNSET.len() + CYBER.len());
    if i < SUNSET.len() {
        SUNSET[i]
    } else {
        CYBER[i - SUNSET.len()]
    }
}

/// Number of colors `warm_or_cool` draws from
pub const WARM_OR_COOL_LEN: usize = SUNSET.len() + CYBER.len();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_unpacks_channels() {
        let c = Rgba::hex(0xbd00ff);
        assert_eq!((c.r, c.g, c.b, c.a), (0xbd, 0x00, 0xff, 255));
    }

    #[test]
    fn luma_agrees_for_bytes_and_floats() {
        assert_eq!(luma([255.0, 255.0, 255.0]).round(), 255.0);
        assert_eq!(ACCENT.luma(), luma([255.0, 94.0, 77.0]));
        assert!(BACKGROUND.luma() < 11.0);
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = Rgba::hex(0x000000);
        let b = Rgba::hex(0xffffff);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5).r, 128);
    }

    #[test]
    fn lerp_clamps_out_of_range_factor() {
        let a = SUNSET[0];
        let b = CYBER[0];
        assert_eq!(a.lerp(b, -3.0), a);
        assert_eq!(a.lerp(b, 7.5), b);
        assert_eq!(a.lerp(b, f32::NAN), a);
    }

    #[test]
    fn alpha_from_float_is_clamped() {
        assert_eq!(ACCENT.with_alpha_f(300.0).a, 255);
        assert_eq!(ACCENT.with_alpha_f(-4.0).a, 0);
        assert_eq!(ACCENT.with_alpha_f(f32::INFINITY).a, 0);
        // original stays untouched
        assert_eq!(ACCENT.a, 255);
    }

    #[test]
    fn warm_or_cool_spans_both_sequences() {
        assert_eq!(warm_or_cool(0), SUNSET[0]);
        assert_eq!(warm_or_cool(4), CYBER[0]);
        assert_eq!(warm_or_cool(WARM_OR_COOL_LEN), SUNSET[0]);
    }
}
