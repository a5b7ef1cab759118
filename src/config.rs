// ── Configuration file ────────────────────────────────────────────────────────
//
// Reads an optional JSON file that tweaks how tab labels render.  Every field
// has a default, so an empty object (`{}`) is a valid config.  No `unsafe` —
// pure safe Rust + serde_json.

use std::{fs, path::Path, rc::Rc};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{CotabError, Result},
    theme::{Palette, PaletteTheme, Rgb, ThemeProvider, DARK, LIGHT},
    ui::label::DEFAULT_MODIFIED_MARKER,
};

// ── Format version ────────────────────────────────────────────────────────────

const CONFIG_VERSION: u32 = 1;

/// Glyph drawn for each recent editor (U+270E LOWER RIGHT PENCIL).
pub const DEFAULT_DOT_GLYPH: &str = "\u{270E}";

// ── On-disk type ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: u32,
    /// Use the dark palette.
    pub dark_mode: bool,
    /// Prefix for locally modified documents.
    pub modified_marker: String,
    /// Glyph drawn per recent editor.
    pub dot_glyph: String,
    /// Override for the palette's default title colour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_color: Option<Rgb>,
    /// Override for the "changed by others" title colour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_color: Option<Rgb>,
    /// Override for the disconnected / not running title colour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dim_color: Option<Rgb>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            dark_mode: false,
            modified_marker: DEFAULT_MODIFIED_MARKER.to_owned(),
            dot_glyph: DEFAULT_DOT_GLYPH.to_owned(),
            default_color: None,
            alert_color: None,
            dim_color: None,
        }
    }
}

impl Config {
    /// Parse a config from JSON text, rejecting unknown versions.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        if config.version != CONFIG_VERSION {
            return Err(CotabError::UnsupportedVersion {
                what: "config",
                found: config.version,
                expected: CONFIG_VERSION,
            });
        }
        Ok(config)
    }

    /// Read and parse the config file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        debug!(path = %path.display(), dark_mode = config.dark_mode, "config loaded");
        Ok(config)
    }

    /// `load` when a path is given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// The palette selected by `dark_mode` with any colour overrides applied.
    pub fn palette(&self) -> Palette {
        let base = if self.dark_mode { DARK } else { LIGHT };
        Palette {
            default_fg: self.default_color.unwrap_or(base.default_fg),
            alert_fg: self.alert_color.unwrap_or(base.alert_fg),
            dim_fg: self.dim_color.unwrap_or(base.dim_fg),
        }
    }

    pub fn theme(&self) -> Rc<dyn ThemeProvider> {
        Rc::new(PaletteTheme::new(self.palette()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_object_is_all_defaults() {
        let config = Config::from_json("{}").expect("parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.modified_marker, "*");
        assert_eq!(config.dot_glyph, "\u{270E}");
    }

    #[test]
    fn overrides_replace_palette_entries() {
        let config =
            Config::from_json(r##"{"dark_mode":true,"alert_color":"#ff0000"}"##).expect("parse");
        let palette = config.palette();
        assert_eq!(palette.alert_fg.to_hex(), "#ff0000");
        assert_eq!(palette.dim_fg, DARK.dim_fg);
        assert_eq!(config.theme().default_foreground(), DARK.default_fg);
    }

    #[test]
    fn wrong_version_is_rejected() {
        let err = Config::from_json(r#"{"version":2}"#).unwrap_err();
        assert!(matches!(
            err,
            CotabError::UnsupportedVersion { found: 2, expected: 1, .. }
        ));
    }

    #[test]
    fn malformed_colour_is_a_json_error() {
        let err = Config::from_json(r#"{"dim_color":"grey"}"#).unwrap_err();
        assert!(matches!(err, CotabError::Json(_)));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, r#"{{"modified_marker":"+ "}}"#).expect("write");

        let config = Config::load(file.path()).expect("load");
        assert_eq!(config.modified_marker, "+ ");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Config::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, CotabError::Io(_)));
    }

    #[test]
    fn no_path_means_defaults() {
        assert_eq!(Config::load_or_default(None).expect("defaults"), Config::default());
    }

    #[test]
    fn roundtrip_keeps_overrides() {
        let config = Config {
            dim_color: Some("#101010".parse().expect("rgb")),
            ..Config::default()
        };
        let json = serde_json::to_string(&config).expect("serialize");
        assert_eq!(Config::from_json(&json).expect("parse"), config);
    }
}
