//! Text measurement used by the layout resolver.
//!
//! The resolver never talks to a real rendering surface. It asks a
//! [`TextMeasurer`] how wide a run of text is, so a browser front end can
//! plug in canvas measurements while tests and the CLI use estimates.

use crate::config::LayoutConfig;

/// Which font a run of text is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Lyric,
    Chord,
}

/// Width measurement hook.
pub trait TextMeasurer: Send + Sync {
    /// Rendered width of `text` in `kind`'s font at `font_px` pixels.
    fn measure(&self, text: &str, kind: TextKind, font_px: f64) -> f64;

    /// Width of one glyph, the unit label gaps are expressed in.
    fn glyph_width(&self, kind: TextKind, font_px: f64) -> f64 {
        self.measure("0", kind, font_px)
    }
}

/// Estimates width as `chars * font_px * factor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatingMeasurer {
    pub lyric_factor: f64,
    pub chord_factor: f64,
}

impl EstimatingMeasurer {
    pub fn from_config(config: &LayoutConfig) -> Self {
        EstimatingMeasurer {
            lyric_factor: config.lyric_char_width,
            chord_factor: config.chord_char_width,
        }
    }
}

impl Default for EstimatingMeasurer {
    fn default() -> Self {
        EstimatingMeasurer::from_config(&LayoutConfig::default())
    }
}

impl TextMeasurer for EstimatingMeasurer {
    fn measure(&self, text: &str, kind: TextKind, font_px: f64) -> f64 {
        let factor = match kind {
            TextKind::Lyric => self.lyric_factor,
            TextKind::Chord => self.chord_factor,
        };
        text.chars().count() as f64 * font_px * factor
    }
}

/// One cell per character regardless of font, for plain-text chord sheets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonospaceMeasurer;

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str, _kind: TextKind, _font_px: f64) -> f64 {
        text.chars().count() as f64
    }
}
