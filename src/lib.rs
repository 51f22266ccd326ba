pub mod chord_parser;
pub mod config;
pub mod error;
pub mod layout;
pub mod sheet;
pub mod song;
pub mod transpose;
pub mod view;

pub use chord_parser::{parse_line, ChordSegment};
pub use config::Config;
pub use error::*;
pub use song::Song;
pub use transpose::{distance, transpose, transpose_text, ExceptionList, PitchClass};
pub use view::{KeyChoice, RenderedSong, SongView, ViewMode};

/// Parse a song document and lay it out at `offset` semitones for a container
/// `container_width` wide.
/// This is the main entry point for the library.
pub fn render_song(source: &str, offset: i32, container_width: f64, config: Config) -> Result<RenderedSong, SongError> {
    let song = Song::from_source(source)?;
    let mut view = SongView::new(song, config);
    view.set_offset(offset);
    Ok(view.render(container_width))
}

/// Parse a song document and render it as a plain-text chord sheet `columns` wide.
pub fn render_text_sheet(source: &str, offset: i32, columns: usize, config: Config) -> Result<String, SongError> {
    let song = Song::from_source(source)?;
    let mut view = SongView::with_measurer(song, config, Box::new(layout::MonospaceMeasurer));
    // Character columns don't shrink with the font
    view.notice_manual_scroll();
    view.set_offset(offset);
    Ok(sheet::render_sheet(&view.render(columns as f64)))
}
