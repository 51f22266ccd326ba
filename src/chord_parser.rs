//! # Chord Notation Parser
//!
//! Splits one raw lyric line into `(chord, text)` segments.
//!
//! Chords are written inline between square brackets, right before the
//! syllable they fall on:
//!
//! ```text
//! [LAm]Amazing [DO]grace, how [SOL]sweet
//! ```
//!
//! Each marker opens a segment whose text runs until the next marker or the
//! end of the line. Text before the first marker becomes a segment without a
//! chord. Chord text is not interpreted here; see [`crate::transpose`].
//!
//! The parser is permissive: an opening `[` that is never closed is kept as
//! plain text in whichever segment it falls into.

use serde::Serialize;

const MARKER_OPEN: char = '[';
const MARKER_CLOSE: char = ']';

/// One run of lyric text, optionally preceded by a chord marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordSegment {
    pub chord: Option<String>,
    pub text: String,
}

impl ChordSegment {
    /// A segment with no chord above it.
    pub fn plain(text: &str) -> Self {
        ChordSegment {
            chord: None,
            text: text.to_string(),
        }
    }

    /// A segment opened by a chord marker.
    pub fn with_chord(chord: &str, text: &str) -> Self {
        ChordSegment {
            chord: Some(chord.to_string()),
            text: text.to_string(),
        }
    }

    pub fn has_chord(&self) -> bool {
        self.chord.is_some()
    }

    /// True if the text under this segment is empty or only whitespace.
    pub fn is_blank_text(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Parse a lyric line into chord segments.
///
/// # Examples
/// ```
/// use cancionero::chord_parser::{parse_line, ChordSegment};
///
/// let segments = parse_line("Oh [LAm]Amazing [DO]grace");
/// assert_eq!(segments, vec![
///     ChordSegment::plain("Oh "),
///     ChordSegment::with_chord("LAm", "Amazing "),
///     ChordSegment::with_chord("DO", "grace"),
/// ]);
///
/// // Lines without markers pass straight through
/// assert_eq!(parse_line("no chords"), vec![ChordSegment::plain("no chords")]);
/// ```
pub fn parse_line(line: &str) -> Vec<ChordSegment> {
    if !line.contains(MARKER_OPEN) {
        return vec![ChordSegment::plain(line)];
    }

    let mut segments = Vec::new();
    let mut current = ChordSegment::plain("");
    let mut rest = line;

    while let Some(open) = rest.find(MARKER_OPEN) {
        let after_open = &rest[open + MARKER_OPEN.len_utf8()..];
        let Some(close) = after_open.find(MARKER_CLOSE) else {
            // Unterminated marker: the remainder is ordinary text
            break;
        };

        current.text.push_str(&rest[..open]);
        if current.has_chord() || !current.text.is_empty() {
            segments.push(current);
        }
        current = ChordSegment::with_chord(&after_open[..close], "");
        rest = &after_open[close + MARKER_CLOSE.len_utf8()..];
    }

    current.text.push_str(rest);
    if current.has_chord() || !current.text.is_empty() || segments.is_empty() {
        segments.push(current);
    }

    segments
}

/// The lyric text of a line with every chord marker removed.
pub fn strip_markers(line: &str) -> String {
    parse_line(line).into_iter().map(|s| s.text).collect()
}

/// Render segments back into bracket notation.
pub fn join_segments(segments: &[ChordSegment]) -> String {
    let mut line = String::new();
    for segment in segments {
        if let Some(chord) = &segment.chord {
            line.push(MARKER_OPEN);
            line.push_str(chord);
            line.push(MARKER_CLOSE);
        }
        line.push_str(&segment.text);
    }
    line
}

/// True if at least one segment carries a chord.
pub fn has_chords(segments: &[ChordSegment]) -> bool {
    segments.iter().any(ChordSegment::has_chord)
}

/// True for lines that have chords but no real lyric text, e.g. an intro
/// line such as `[LA] [RE] [MI]`.
pub fn is_chords_only(segments: &[ChordSegment]) -> bool {
    has_chords(segments) && segments.iter().all(ChordSegment::is_blank_text)
}
