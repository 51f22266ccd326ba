//! Plain-text chord sheets.
//!
//! Renders a [`RenderedSong`] laid out with the
//! [`MonospaceMeasurer`](crate::layout::MonospaceMeasurer), where one layout
//! unit is one character column: each visual row becomes a chord line above a
//! lyric line.

use crate::layout::{LineKind, LineLayout};
use crate::view::RenderedSong;

/// Render the whole song, header first.
///
/// # Example
/// ```
/// use cancionero::layout::MonospaceMeasurer;
/// use cancionero::sheet::render_sheet;
/// use cancionero::{Config, Song, SongView};
///
/// let song = Song::new("Luz", "Anónimo", "RE", vec!["[RE]Luz [LA7]divina".to_string()]);
/// let mut view = SongView::with_measurer(song, Config::default(), Box::new(MonospaceMeasurer));
/// let sheet = render_sheet(&view.render(80.0));
///
/// assert!(sheet.ends_with("RE  LA7\nLuz divina\n"));
/// ```
pub fn render_sheet(song: &RenderedSong) -> String {
    let mut out = String::new();
    out.push_str(&song.title);
    out.push('\n');
    out.push_str(&song.author);
    out.push('\n');
    if song.offset_label.is_empty() {
        out.push_str(&format!("Key: {}\n", song.key));
    } else {
        out.push_str(&format!("Key: {} ({})\n", song.key, song.offset_label));
    }
    out.push('\n');

    for line in &song.lines {
        for row in render_line(line) {
            out.push_str(&row);
            out.push('\n');
        }
    }
    out
}

/// Text rows of one laid-out line.
pub fn render_line(line: &LineLayout) -> Vec<String> {
    if line.kind == LineKind::Blank {
        return vec![String::new()];
    }

    let mut rows = Vec::new();
    for row in 0..line.rows {
        let mut chords = String::new();
        for label in line.labels.iter().filter(|l| l.row == row) {
            place(&mut chords, column(label.x), &label.chord);
        }
        let mut lyrics = String::new();
        for run in line.runs.iter().filter(|r| r.row == row) {
            place(&mut lyrics, column(run.x), &run.text);
        }

        match line.kind {
            LineKind::Lyrics => rows.push(lyrics.trim_end().to_string()),
            LineKind::ChordsOnly => rows.push(chords.trim_end().to_string()),
            _ => {
                rows.push(chords.trim_end().to_string());
                rows.push(lyrics.trim_end().to_string());
            }
        }
    }
    rows
}

fn column(x: f64) -> usize {
    x.round().max(0.0) as usize
}

/// Write `text` starting at `column`, padding with spaces. Text that would
/// start inside what's already there is appended after one space instead.
fn place(buffer: &mut String, column: usize, text: &str) {
    let used = buffer.chars().count();
    if used < column {
        buffer.extend(std::iter::repeat(' ').take(column - used));
    } else if used > column && !buffer.ends_with(' ') {
        buffer.push(' ');
    }
    buffer.push_str(text);
}
