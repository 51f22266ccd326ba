//! # Line Layout Resolver
//!
//! Turns the segments of one lyric line into positioned text runs and chord
//! labels.
//!
//! ## Line Kinds
//! - **Blank** - empty or whitespace-only: a fixed-height spacer
//! - **Chords-only** - chords over whitespace (intros, interludes): labels
//!   flow in one row with fixed spacing, no collision math
//! - **Lyrics** - text without any chord
//! - **Mixed** - text with chords floating above it
//!
//! ## Mixed Lines
//! Segment text flows left to right inside the available width, wrapping to
//! a new row when a segment no longer fits and at spaces when a segment alone
//! is wider than a row. Each chord label is anchored where its segment's
//! text starts, then [`resolve_collisions`] pushes labels right so that no two
//! labels on a row come closer than the minimum gap.
//!
//! ## Sizing
//! All sizes come from [`LayoutConfig`] and the current font scale; widths
//! come from a [`TextMeasurer`]. The content width of a laid-out line feeds the
//! [`auto_fit`] loop.

mod autofit;
mod collision;
mod measure;

pub use autofit::{auto_fit, FitMode, FitOutcome, FitState};
pub use collision::{resolve_collisions, NaturalLabel, ResolvedLabel};
pub use measure::{EstimatingMeasurer, MonospaceMeasurer, TextKind, TextMeasurer};

use serde::Serialize;

use crate::chord_parser::{has_chords, is_chords_only, ChordSegment};
use crate::config::LayoutConfig;
use crate::transpose::transpose;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LineKind {
    Blank,
    ChordsOnly,
    Lyrics,
    Mixed,
}

/// Classify a parsed line.
pub fn classify(segments: &[ChordSegment]) -> LineKind {
    if is_chords_only(segments) {
        LineKind::ChordsOnly
    } else if has_chords(segments) {
        LineKind::Mixed
    } else if segments.iter().all(ChordSegment::is_blank_text) {
        LineKind::Blank
    } else {
        LineKind::Lyrics
    }
}

/// A transposed chord label at its final position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedLabel {
    pub chord: String,
    /// Index of the segment the label belongs to
    pub segment: usize,
    pub row: usize,
    pub natural_x: f64,
    pub x: f64,
    /// `x - natural_x`, the offset a renderer applies relative to the anchor
    pub shift: f64,
    pub width: f64,
}

impl PlacedLabel {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// A piece of lyric text on one visual row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub segment: usize,
    pub row: usize,
    pub x: f64,
    pub width: f64,
    pub text: String,
}

/// Placement instructions for one lyric line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineLayout {
    pub kind: LineKind,
    pub labels: Vec<PlacedLabel>,
    pub runs: Vec<TextRun>,
    pub rows: usize,
    /// Distance between consecutive rows
    pub row_pitch: f64,
    pub height: f64,
    /// Rightmost extent of text or labels; trailing spaces don't count
    pub content_width: f64,
}

#[derive(Debug, Clone, Copy)]
struct FlowCursor {
    x: f64,
    row: usize,
}

impl FlowCursor {
    fn break_row(&mut self) {
        self.x = 0.0;
        self.row += 1;
    }
}

/// Lays out lines at one font scale within one available width.
pub struct LineLayouter<'a> {
    config: &'a LayoutConfig,
    measurer: &'a dyn TextMeasurer,
    font_px: f64,
    available_width: f64,
}

impl<'a> LineLayouter<'a> {
    pub fn new(
        config: &'a LayoutConfig,
        measurer: &'a dyn TextMeasurer,
        font_scale: f64,
        available_width: f64,
    ) -> Self {
        LineLayouter {
            config,
            measurer,
            font_px: config.font_size * font_scale,
            available_width,
        }
    }

    /// Lay out one parsed line with its chords moved by `semitones`.
    ///
    /// # Example
    /// ```
    /// use cancionero::chord_parser::parse_line;
    /// use cancionero::config::LayoutConfig;
    /// use cancionero::layout::{LineKind, LineLayouter, MonospaceMeasurer};
    ///
    /// let config = LayoutConfig::default();
    /// let layouter = LineLayouter::new(&config, &MonospaceMeasurer, 1.0, 80.0);
    ///
    /// // "LA" ends at column 2, so "SOL#m" can't start before column 3
    /// let line = layouter.layout(&parse_line("[LA]a[SOL#m]b"), 0);
    /// assert_eq!(line.kind, LineKind::Mixed);
    /// assert_eq!(line.labels[1].natural_x, 1.0);
    /// assert_eq!(line.labels[1].x, 3.0);
    /// ```
    pub fn layout(&self, segments: &[ChordSegment], semitones: i32) -> LineLayout {
        match classify(segments) {
            LineKind::Blank => self.blank(),
            LineKind::ChordsOnly => self.chords_only(segments, semitones),
            kind => self.flow(segments, semitones, kind),
        }
    }

    fn chord_px(&self) -> f64 {
        self.font_px * self.config.chord_scale
    }

    fn lyric_width(&self, text: &str) -> f64 {
        self.measurer.measure(text, TextKind::Lyric, self.font_px)
    }

    fn chord_width(&self, text: &str) -> f64 {
        self.measurer.measure(text, TextKind::Chord, self.chord_px())
    }

    fn blank(&self) -> LineLayout {
        let height = self.config.blank_line_height * self.font_px;
        LineLayout {
            kind: LineKind::Blank,
            labels: Vec::new(),
            runs: Vec::new(),
            rows: 1,
            row_pitch: height,
            height,
            content_width: 0.0,
        }
    }

    fn chords_only(&self, segments: &[ChordSegment], semitones: i32) -> LineLayout {
        let spacing = self.config.chords_only_spacing * self.measurer.glyph_width(TextKind::Chord, self.chord_px());
        let row_pitch = self.config.chord_band * self.font_px;
        let mut cursor = FlowCursor { x: 0.0, row: 0 };
        let mut labels = Vec::new();
        let mut content_width: f64 = 0.0;

        for (index, segment) in segments.iter().enumerate() {
            let chord = segment.chord.as_deref().map(|c| transpose(c, semitones)).unwrap_or_default();
            let label_width = self.chord_width(&chord);
            if cursor.x > 0.0 && cursor.x + label_width > self.available_width {
                cursor.break_row();
            }

            if segment.has_chord() {
                labels.push(PlacedLabel {
                    chord: chord.clone(),
                    segment: index,
                    row: cursor.row,
                    natural_x: cursor.x,
                    x: cursor.x,
                    shift: 0.0,
                    width: label_width,
                });
                content_width = content_width.max(cursor.x + label_width);
            }

            // The whitespace under each chord keeps the spacing the author typed
            cursor.x += self.chord_width(&format!("{}{}", chord, segment.text)) + spacing;
        }

        let rows = cursor.row + 1;
        LineLayout {
            kind: LineKind::ChordsOnly,
            labels,
            runs: Vec::new(),
            rows,
            row_pitch,
            height: rows as f64 * row_pitch,
            content_width,
        }
    }

    fn flow(&self, segments: &[ChordSegment], semitones: i32, kind: LineKind) -> LineLayout {
        let with_chords = kind == LineKind::Mixed;
        let row_pitch = if with_chords {
            (self.config.chord_band + self.config.line_height) * self.font_px
        } else {
            self.config.line_height * self.font_px
        };

        let mut cursor = FlowCursor { x: 0.0, row: 0 };
        let mut runs = Vec::new();
        let mut anchors = Vec::new();
        let mut content_width: f64 = 0.0;

        for (index, segment) in segments.iter().enumerate() {
            let fitted = self.lyric_width(segment.text.trim_end());
            if cursor.x > 0.0 && cursor.x + fitted > self.available_width {
                cursor.break_row();
            }

            if let Some(chord) = &segment.chord {
                let chord = transpose(chord, semitones);
                let label = NaturalLabel {
                    x: cursor.x,
                    y: cursor.row as f64 * row_pitch,
                    width: self.chord_width(&chord),
                };
                anchors.push((index, cursor.row, chord, label));
            }

            if segment.text.is_empty() {
                continue;
            }
            if fitted > self.available_width {
                self.wrap_words(index, &segment.text, &mut cursor, &mut runs);
            } else {
                let width = self.lyric_width(&segment.text);
                runs.push(TextRun {
                    segment: index,
                    row: cursor.row,
                    x: cursor.x,
                    width,
                    text: segment.text.clone(),
                });
                cursor.x += width;
            }
        }

        for run in &runs {
            content_width = content_width.max(run.x + self.lyric_width(run.text.trim_end()));
        }

        let naturals: Vec<NaturalLabel> = anchors.iter().map(|(_, _, _, label)| *label).collect();
        let min_gap = self.config.chord_min_gap * self.measurer.glyph_width(TextKind::Chord, self.chord_px());
        let tolerance = self.config.row_tolerance * self.font_px;
        let labels: Vec<PlacedLabel> = anchors
            .into_iter()
            .zip(resolve_collisions(&naturals, min_gap, tolerance))
            .map(|((segment, row, chord, _), resolved)| PlacedLabel {
                chord,
                segment,
                row,
                natural_x: resolved.natural_x,
                x: resolved.x,
                shift: resolved.shift(),
                width: resolved.width,
            })
            .collect();
        for label in &labels {
            content_width = content_width.max(label.right());
        }

        let rows = cursor.row + 1;
        LineLayout {
            kind,
            labels,
            runs,
            rows,
            row_pitch,
            height: rows as f64 * row_pitch,
            content_width,
        }
    }

    /// Break a segment that is wider than a whole row at its spaces.
    /// A single word wider than the row stays whole and overflows.
    fn wrap_words(&self, segment: usize, text: &str, cursor: &mut FlowCursor, runs: &mut Vec<TextRun>) {
        let mut piece = String::new();
        for word in text.split_inclusive(' ') {
            let candidate = format!("{}{}", piece, word);
            if !piece.is_empty() && cursor.x + self.lyric_width(candidate.trim_end()) > self.available_width {
                let width = self.lyric_width(&piece);
                runs.push(TextRun {
                    segment,
                    row: cursor.row,
                    x: cursor.x,
                    width,
                    text: std::mem::take(&mut piece),
                });
                cursor.break_row();
                piece.push_str(word);
            } else {
                piece = candidate;
            }
        }

        let width = self.lyric_width(&piece);
        runs.push(TextRun {
            segment,
            row: cursor.row,
            x: cursor.x,
            width,
            text: piece,
        });
        // The wrapped segment fills its last row
        cursor.x = (cursor.x + width).max(self.available_width);
    }
}

/// Widest line of a laid-out block.
pub fn content_width(lines: &[LineLayout]) -> f64 {
    lines.iter().map(|line| line.content_width).fold(0.0, f64::max)
}
