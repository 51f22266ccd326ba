//! # Song View
//!
//! One song on screen: the content, the transposition offset the user picked,
//! the display mode and the font scale.
//!
//! ## State Lifetimes
//! - Loading a song or changing the view mode resets the offset to 0 and
//!   gives font sizing back to auto-fit.
//! - Changing the offset re-runs auto-fit on the next render, but never takes
//!   control back from a user who zoomed or scrolled.
//! - The displayed key is always derived from `(base_key, offset)`.
//!
//! ## Example
//! ```rust
//! use cancionero::{Config, Song, SongView};
//!
//! let song = Song::new("Luz", "Anónimo", "RE", vec!["[RE]Luz [LA7]divina".to_string()]);
//! let mut view = SongView::new(song, Config::default());
//!
//! view.select_key("MI");
//! assert_eq!(view.offset(), 2);
//! assert_eq!(view.current_key(), "MI");
//!
//! let rendered = view.render(600.0);
//! assert_eq!(rendered.lines[0].labels[1].chord, "SI7");
//! ```

use log::{debug, info};
use serde::Serialize;

use crate::chord_parser::{parse_line, ChordSegment};
use crate::config::{Config, LayoutConfig};
use crate::layout::{
    auto_fit, content_width, EstimatingMeasurer, FitMode, FitState, LineLayout, LineLayouter, TextMeasurer,
};
use crate::song::Song;
use crate::transpose::{distance, split_root, transpose, transpose_text, PitchClass};

const WIDTH_EPSILON: f64 = 1e-6;

/// How lyric lines are arranged on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum ViewMode {
    SingleColumn,
    /// Lines flow through `columns` columns separated by `gap` pixels
    MultiColumn { columns: u8, gap: f64 },
}

impl ViewMode {
    /// Width one line may use inside a container of `container_width`.
    pub fn visible_width(&self, container_width: f64) -> f64 {
        match *self {
            ViewMode::SingleColumn => container_width,
            ViewMode::MultiColumn { columns, gap } => {
                let columns = columns.max(1) as f64;
                ((container_width - gap * (columns - 1.0)) / columns).max(0.0)
            }
        }
    }
}

/// One entry of the key picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyChoice {
    pub name: &'static str,
    pub active: bool,
}

/// Everything a renderer needs to draw the song.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSong {
    pub title: String,
    pub author: String,
    pub key: String,
    pub offset: i32,
    pub offset_label: String,
    pub font_scale: f64,
    pub fit_mode: FitMode,
    pub view_mode: ViewMode,
    pub visible_width: f64,
    pub content_width: f64,
    /// Content still wider than the visible width; the renderer should scroll
    pub overflow: bool,
    pub lines: Vec<LineLayout>,
}

pub struct SongView {
    song: Song,
    lines: Vec<Vec<ChordSegment>>,
    offset: i32,
    mode: ViewMode,
    fit: FitState,
    config: Config,
    measurer: Box<dyn TextMeasurer>,
    /// Visible width the current scale was fitted for
    fitted_for: Option<f64>,
}

impl SongView {
    /// A view measuring text with the estimates from `config`.
    pub fn new(song: Song, config: Config) -> Self {
        let measurer = EstimatingMeasurer::from_config(&config.layout);
        SongView::with_measurer(song, config, Box::new(measurer))
    }

    pub fn with_measurer(song: Song, config: Config, measurer: Box<dyn TextMeasurer>) -> Self {
        let lines = song.lyrics.iter().map(|line| parse_line(line)).collect();
        let fit = FitState::new(&config.fit);
        SongView {
            song,
            lines,
            offset: 0,
            mode: ViewMode::SingleColumn,
            fit,
            config,
            measurer,
            fitted_for: None,
        }
    }

    pub fn song(&self) -> &Song {
        &self.song
    }

    pub fn segments(&self) -> &[Vec<ChordSegment>] {
        &self.lines
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Show another song: offset back to 0, sizing back to auto.
    pub fn load(&mut self, song: Song) {
        info!("loading '{}' in {}", song.title, song.base_key);
        self.lines = song.lyrics.iter().map(|line| parse_line(line)).collect();
        self.song = song;
        self.offset = 0;
        self.fit.reset(&self.config.fit);
        self.fitted_for = None;
    }

    pub fn view_mode(&self) -> ViewMode {
        self.mode
    }

    /// Switch between single and multi-column display. Resets offset and sizing.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if mode == self.mode {
            return;
        }
        debug!("view mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        self.offset = 0;
        self.fit.reset(&self.config.fit);
        self.fitted_for = None;
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: i32) {
        if offset != self.offset {
            self.offset = offset;
            self.fitted_for = None;
        }
    }

    /// Move by a number of semitones (the picker's -½ / +½ buttons).
    pub fn step(&mut self, semitones: i32) {
        self.set_offset(self.offset.saturating_add(semitones));
    }

    /// Jump to a target key. The distance is measured from the key currently
    /// displayed and added to the running offset.
    pub fn select_key(&mut self, target: &str) {
        let delta = distance(&self.current_key(), target);
        self.step(delta);
    }

    pub fn reset_key(&mut self) {
        self.set_offset(0);
    }

    /// The key the song is displayed in.
    pub fn current_key(&self) -> String {
        transpose(&self.song.base_key, self.offset)
    }

    /// The twelve keys of the picker, with the displayed one marked.
    pub fn key_choices(&self) -> Vec<KeyChoice> {
        let current = split_root(&self.current_key()).map(|root| root.pitch);
        PitchClass::ALL
            .into_iter()
            .map(|pitch| KeyChoice {
                name: pitch.name(),
                active: current == Some(pitch),
            })
            .collect()
    }

    /// `"+2"`, `"-1"`, or empty when untransposed.
    pub fn offset_label(&self) -> String {
        match self.offset {
            0 => String::new(),
            n if n > 0 => format!("+{}", n),
            n => n.to_string(),
        }
    }

    /// Transpose chords mentioned in free text (notes, capo hints) along with the song.
    pub fn transpose_annotation(&self, text: &str) -> String {
        transpose_text(text, self.offset, &self.config.never_transpose)
    }

    pub fn fit_state(&self) -> FitState {
        self.fit
    }

    pub fn zoom_in(&mut self) {
        self.fit.zoom_in(&self.config.fit);
    }

    pub fn zoom_out(&mut self) {
        self.fit.zoom_out(&self.config.fit);
    }

    pub fn notice_manual_scroll(&mut self) {
        self.fit.notice_manual_scroll();
    }

    /// Lay the song out for a container, auto-fitting the font first if needed.
    pub fn render(&mut self, container_width: f64) -> RenderedSong {
        let visible = self.mode.visible_width(container_width);

        if self.fitted_for != Some(visible) && !self.fit.user_overrode {
            self.fit.font_scale = self.config.fit.clamp(self.config.fit.initial_scale);
            let (lines, layout, measurer, offset) = (&self.lines, &self.config.layout, &*self.measurer, self.offset);
            let outcome = auto_fit(&mut self.fit, &self.config.fit, visible, |scale| {
                content_width(&layout_lines(lines, layout, measurer, offset, scale, visible))
            });
            debug!("auto-fit for width {:.1}: {:?}", visible, outcome);
            self.fitted_for = Some(visible);
        }

        let lines = layout_lines(
            &self.lines,
            &self.config.layout,
            &*self.measurer,
            self.offset,
            self.fit.font_scale,
            visible,
        );
        let content_width = content_width(&lines);

        RenderedSong {
            title: self.song.title.clone(),
            author: self.song.author.clone(),
            key: self.current_key(),
            offset: self.offset,
            offset_label: self.offset_label(),
            font_scale: self.fit.font_scale,
            fit_mode: self.fit.mode(),
            view_mode: self.mode,
            visible_width: visible,
            content_width,
            overflow: content_width > visible + WIDTH_EPSILON,
            lines,
        }
    }
}

fn layout_lines(
    lines: &[Vec<ChordSegment>],
    config: &LayoutConfig,
    measurer: &dyn TextMeasurer,
    offset: i32,
    scale: f64,
    visible_width: f64,
) -> Vec<LineLayout> {
    let layouter = LineLayouter::new(config, measurer, scale, visible_width);
    lines.iter().map(|segments| layouter.layout(segments, offset)).collect()
}
