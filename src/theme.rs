// ── Dual light/dark tab-label theme ───────────────────────────────────────────
//
// Supplies the three title colours a tab label can show and the HSV helper
// used for presence dots.  The controller never reaches for a global style:
// it is handed a `ThemeProvider` and asks it for the colour of each class.
//
// Colour conventions:
//   • All palette entries are written in 0xRRGGBB form via the `rgb!` macro.
//   • `Rgb::to_hex` renders lower-case `#rrggbb`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CotabError;

// ── Colour type ───────────────────────────────────────────────────────────────

/// An sRGB colour with 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

macro_rules! rgb {
    ($r:expr, $g:expr, $b:expr) => {
        Rgb { r: $r, g: $g, b: $b }
    };
}

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = CotabError;

    /// Parse `#rrggbb` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || CotabError::InvalidColor(s.to_owned());
        let hex = s.strip_prefix('#').ok_or_else(bad)?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(bad());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
        Ok(rgb!(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ── HSV ───────────────────────────────────────────────────────────────────────

/// Presence dots use a fixed saturation and value; only the hue varies.
pub const DOT_SATURATION: f64 = 0.6;
pub const DOT_VALUE: f64 = 0.6;

/// Convert HSV to RGB.  `hue_degrees` wraps modulo 360; `s` and `v` are
/// clamped to `[0, 1]`.
pub fn hsv_to_rgb(hue_degrees: f64, s: f64, v: f64) -> Rgb {
    let h = if hue_degrees.is_finite() { hue_degrees.rem_euclid(360.0) } else { 0.0 };
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);

    let sector = h / 60.0;
    let i = (sector.floor() as i64).rem_euclid(6);
    let frac = sector - sector.floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * frac);
    let t = v * (1.0 - s * (1.0 - frac));

    let (r, g, b) = match i {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let to_u8 = |c: f64| (c * 255.0).round() as u8;
    rgb!(to_u8(r), to_u8(g), to_u8(b))
}

/// Colour of the presence dot for a user with the given hue in `[0, 1)`.
pub fn presence_color(hue: f64) -> Rgb {
    hsv_to_rgb(360.0 * hue, DOT_SATURATION, DOT_VALUE)
}

// ── Colour palette ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Title colour of a connected, running, unchanged document.
    pub default_fg: Rgb,
    /// Title colour of a document changed by others while unfocused.
    pub alert_fg: Rgb,
    /// Title colour of a disconnected or not-yet-running document.
    pub dim_fg: Rgb,
}

/// Light desktop palette.
pub const LIGHT: Palette = Palette {
    default_fg: rgb!(0x00, 0x00, 0x00),
    alert_fg: rgb!(0xC0, 0x00, 0x00),
    dim_fg: rgb!(0x60, 0x60, 0x60),
};

/// Dark palette; alert and dim keep the same hue family as the light one.
pub const DARK: Palette = Palette {
    default_fg: rgb!(0xD4, 0xD4, 0xD4),
    alert_fg: rgb!(0xF4, 0x47, 0x47),
    dim_fg: rgb!(0x85, 0x85, 0x85),
};

// ── Provider ──────────────────────────────────────────────────────────────────

/// Source of the title colours.  Injected into every tab label.
pub trait ThemeProvider {
    fn default_foreground(&self) -> Rgb;
    fn alert_foreground(&self) -> Rgb;
    fn dim_foreground(&self) -> Rgb;
}

/// A `ThemeProvider` backed by a fixed palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteTheme {
    palette: Palette,
}

impl PaletteTheme {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    /// The light palette when `dark` is `false`, the dark one otherwise.
    pub fn for_mode(dark: bool) -> Self {
        Self::new(if dark { DARK } else { LIGHT })
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}

impl Default for PaletteTheme {
    fn default() -> Self {
        Self::for_mode(false)
    }
}

impl ThemeProvider for PaletteTheme {
    fn default_foreground(&self) -> Rgb {
        self.palette.default_fg
    }

    fn alert_foreground(&self) -> Rgb {
        self.palette.alert_fg
    }

    fn dim_foreground(&self) -> Rgb {
        self.palette.dim_fg
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
