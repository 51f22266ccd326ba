//! # Engine Configuration
//!
//! All tunables of the layout resolver and the auto-fit loop, plus the list
//! of words the free-text transposer must leave alone. Configs are plain YAML
//! documents; every key is optional and falls back to the default below.
//!
//! ```yaml
//! layout:
//!   font-size: 18
//!   chord-min-gap: 1.5
//! fit:
//!   min-scale: 0.6
//! never-transpose: [la, mi, Si]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SongError;
use crate::transpose::ExceptionList;

/// Smallest shrink or zoom step a config may ask for.
pub const MIN_FIT_STEP: f64 = 0.001;

/// Sizes used by the line layout resolver.
///
/// Horizontal sizes are derived from the font size in pixels: a lyric glyph
/// is `lyric_char_width * font_px` wide, a chord glyph
/// `chord_char_width * chord_scale * font_px`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LayoutConfig {
    /// Base lyric font size in pixels at scale 1.0
    pub font_size: f64,
    pub lyric_char_width: f64,
    pub chord_char_width: f64,
    /// Chord labels are drawn smaller than lyrics
    pub chord_scale: f64,
    /// Minimum space between two labels on a row, in chord glyph widths
    pub chord_min_gap: f64,
    /// Space after each label on a chords-only line, in chord glyph widths
    pub chords_only_spacing: f64,
    /// Max vertical jump (in font sizes) still counted as the same row
    pub row_tolerance: f64,
    /// Line height of lyric text, in font sizes
    pub line_height: f64,
    /// Height of the band reserved for labels above a lyric row, in font sizes
    pub chord_band: f64,
    /// Height of an empty line, in font sizes
    pub blank_line_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            font_size: 16.0,
            lyric_char_width: 0.55,
            chord_char_width: 0.6,
            chord_scale: 0.9,
            chord_min_gap: 1.0,
            chords_only_spacing: 1.0,
            row_tolerance: 0.5,
            line_height: 1.2,
            chord_band: 1.5,
            blank_line_height: 1.5,
        }
    }
}

/// Bounds and step sizes for the font scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FitConfig {
    pub initial_scale: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Amount the auto-fit loop shrinks per iteration
    pub step: f64,
    /// Amount a manual zoom in/out changes the scale
    pub zoom_step: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        FitConfig {
            initial_scale: 1.0,
            min_scale: 0.5,
            max_scale: 2.0,
            step: 0.05,
            zoom_step: 0.1,
        }
    }
}

impl FitConfig {
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub fit: FitConfig,
    pub never_transpose: ExceptionList,
}

impl Config {
    /// Parse a YAML config document.
    pub fn from_yaml(content: &str) -> Result<Config, SongError> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config =
            serde_yaml::from_str(content).map_err(|e| SongError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML config file.
    pub fn load(path: &Path) -> Result<Config, SongError> {
        let content = fs::read_to_string(path).map_err(|e| SongError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Config::from_yaml(&content)
    }

    fn validate(&self) -> Result<(), SongError> {
        let fit = &self.fit;
        let numbers = [
            fit.initial_scale,
            fit.min_scale,
            fit.max_scale,
            fit.step,
            fit.zoom_step,
            self.layout.font_size,
        ];
        if numbers.iter().any(|n| !n.is_finite()) {
            return Err(SongError::ConfigError(
                "fit scales, steps and font-size must be finite numbers".to_string(),
            ));
        }
        if fit.step < MIN_FIT_STEP || fit.zoom_step < MIN_FIT_STEP {
            return Err(SongError::ConfigError(format!(
                "fit step sizes must be at least {} (got step {}, zoom-step {})",
                MIN_FIT_STEP, fit.step, fit.zoom_step
            )));
        }
        if !(0.0 < fit.min_scale && fit.min_scale <= fit.initial_scale && fit.initial_scale <= fit.max_scale) {
            return Err(SongError::ConfigError(format!(
                "fit scales must satisfy 0 < min-scale <= initial-scale <= max-scale (got {}, {}, {})",
                fit.min_scale, fit.initial_scale, fit.max_scale
            )));
        }
        if self.layout.font_size <= 0.0 {
            return Err(SongError::ConfigError("font-size must be positive".to_string()));
        }
        Ok(())
    }
}
