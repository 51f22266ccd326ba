use cancionero::{Config, Song, SongError, SongView, ViewMode};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize, Debug, PartialEq)]
struct EngineError {
    message: String,
    line: Option<usize>,
}

fn to_engine_error(e: SongError) -> EngineError {
    match e {
        SongError::FormatError { line, message } => EngineError {
            message,
            line: Some(line),
        },
        other => EngineError {
            message: other.to_string(),
            line: None,
        },
    }
}

fn to_js_error(e: SongError) -> JsValue {
    let error = to_engine_error(e);
    let json = serde_json::to_string(&error).unwrap_or_else(|_| error.message.clone());
    JsValue::from_str(&json)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn load_config(config_yaml: Option<String>) -> Result<Config, SongError> {
    match config_yaml {
        Some(yaml) => Config::from_yaml(&yaml),
        None => Ok(Config::default()),
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // A second init from a reloaded module keeps the first logger
    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Info);

    log::info!("Cancionero chord engine initialized");
}

/// Split a lyric line into chord segments
#[wasm_bindgen]
pub fn parse_line(line: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&cancionero::parse_line(line)).map_err(JsValue::from)
}

#[wasm_bindgen]
pub fn transpose_chord(chord: &str, semitones: i32) -> String {
    cancionero::transpose(chord, semitones)
}

/// Transpose chord names found in free text, skipping the configured exceptions
#[wasm_bindgen]
pub fn transpose_text(text: &str, semitones: i32, config_yaml: Option<String>) -> Result<String, JsValue> {
    let config = load_config(config_yaml).map_err(to_js_error)?;
    Ok(cancionero::transpose_text(text, semitones, &config.never_transpose))
}

#[wasm_bindgen]
pub fn key_distance(from: &str, to: &str) -> i32 {
    cancionero::distance(from, to)
}

/// Lay out a whole song document and return the render instructions as JSON
#[wasm_bindgen]
pub fn render_song(source: &str, offset: i32, container_width: f64, config_yaml: Option<String>) -> Result<String, JsValue> {
    let config = load_config(config_yaml).map_err(to_js_error)?;
    let rendered = cancionero::render_song(source, offset, container_width, config).map_err(to_js_error)?;
    to_json(&rendered)
}

/// A song on screen, kept alive across key changes, zooms and resizes
#[wasm_bindgen]
pub struct SongViewer {
    view: SongView,
}

#[wasm_bindgen]
impl SongViewer {
    #[wasm_bindgen(constructor)]
    pub fn new(source: &str, config_yaml: Option<String>) -> Result<SongViewer, JsValue> {
        let config = load_config(config_yaml).map_err(to_js_error)?;
        let song = Song::from_source(source).map_err(to_js_error)?;
        Ok(SongViewer {
            view: SongView::new(song, config),
        })
    }

    /// Replace the song; offset and sizing start over
    pub fn load(&mut self, source: &str) -> Result<(), JsValue> {
        let song = Song::from_source(source).map_err(to_js_error)?;
        self.view.load(song);
        Ok(())
    }

    /// `columns <= 1` means single-column
    pub fn set_columns(&mut self, columns: u8, gap: f64) {
        let mode = if columns <= 1 {
            ViewMode::SingleColumn
        } else {
            ViewMode::MultiColumn { columns, gap }
        };
        self.view.set_view_mode(mode);
    }

    pub fn offset(&self) -> i32 {
        self.view.offset()
    }

    pub fn set_offset(&mut self, offset: i32) {
        self.view.set_offset(offset);
    }

    pub fn step(&mut self, semitones: i32) {
        self.view.step(semitones);
    }

    pub fn select_key(&mut self, key: &str) {
        self.view.select_key(key);
    }

    pub fn reset_key(&mut self) {
        self.view.reset_key();
    }

    pub fn current_key(&self) -> String {
        self.view.current_key()
    }

    pub fn offset_label(&self) -> String {
        self.view.offset_label()
    }

    pub fn key_choices(&self) -> Result<String, JsValue> {
        to_json(&self.view.key_choices())
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out();
    }

    pub fn notice_manual_scroll(&mut self) {
        self.view.notice_manual_scroll();
    }

    pub fn render(&mut self, container_width: f64) -> Result<String, JsValue> {
        to_json(&self.view.render(container_width))
    }
}
