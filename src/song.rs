//! # Song Records
//!
//! A song as handed over by the storage side: title, author, base key and the
//! raw lyric lines with their chord markers.
//!
//! ## File Format
//! Songs on disk use a YAML header between `---` fences followed by the
//! lyric lines verbatim:
//!
//! ```text
//! ---
//! title: Sublime Gracia
//! author: John Newton
//! base-key: SOL
//! number: 12
//! categories: [entrada, comunion]
//! ---
//! [SOL]Sublime [DO]gracia del [SOL]Señor
//! ```

use serde::{Deserialize, Serialize};

use crate::error::SongError;
use crate::transpose::{split_root, transpose, transpose_line};

const HEADER_FENCE: &str = "---";
const DEFAULT_AUTHOR: &str = "Unknown";

/// One song record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub title: String,
    pub author: String,
    /// Key the chords are written in, e.g. `LAm`
    pub base_key: String,
    pub lyrics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// Header fields as they appear in the YAML block.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case")]
struct RawHeader {
    title: Option<String>,
    author: Option<String>,
    base_key: Option<String>,
    number: Option<u32>,
    #[serde(default)]
    categories: Vec<String>,
    video_url: Option<String>,
}

impl Song {
    pub fn new(title: &str, author: &str, base_key: &str, lyrics: Vec<String>) -> Self {
        Song {
            title: title.to_string(),
            author: author.to_string(),
            base_key: base_key.to_string(),
            lyrics,
            number: None,
            categories: Vec::new(),
            video_url: None,
        }
    }

    /// Parse a song document.
    ///
    /// # Example
    /// ```
    /// use cancionero::Song;
    ///
    /// let song = Song::from_source("---\ntitle: Luz\nbase-key: RE\n---\n[RE]Luz [LA]divina\n")?;
    /// assert_eq!(song.title, "Luz");
    /// assert_eq!(song.author, "Unknown");
    /// assert_eq!(song.lyrics, vec!["[RE]Luz [LA]divina"]);
    /// # Ok::<(), cancionero::SongError>(())
    /// ```
    ///
    /// # Errors
    /// `FormatError` if the header fences are missing, `MetadataError` if the
    /// YAML is invalid, the title is empty or the base key is not a note.
    pub fn from_source(source: &str) -> Result<Song, SongError> {
        let mut lines = source.lines().enumerate().skip_while(|(_, l)| l.trim().is_empty());

        match lines.next() {
            Some((_, first)) if first.trim() == HEADER_FENCE => {}
            Some((index, _)) => {
                return Err(SongError::FormatError {
                    line: index + 1,
                    message: format!("expected '{}' to open the song header", HEADER_FENCE),
                })
            }
            None => {
                return Err(SongError::FormatError {
                    line: 1,
                    message: "empty song document".to_string(),
                })
            }
        }

        let mut header = Vec::new();
        let mut closed = false;
        for (_, line) in lines.by_ref() {
            if line.trim() == HEADER_FENCE {
                closed = true;
                break;
            }
            header.push(line);
        }
        if !closed {
            return Err(SongError::FormatError {
                line: source.lines().count(),
                message: format!("song header is never closed with '{}'", HEADER_FENCE),
            });
        }

        let lyrics: Vec<String> = lines.map(|(_, line)| line.to_string()).collect();
        let song = Song::from_header(&header.join("\n"), trim_trailing_blank(lyrics))?;
        log::debug!("loaded song '{}' with {} lines", song.title, song.lyrics.len());
        Ok(song)
    }

    fn from_header(content: &str, lyrics: Vec<String>) -> Result<Song, SongError> {
        let raw: RawHeader = if content.trim().is_empty() {
            RawHeader::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| SongError::MetadataError(e.to_string()))?
        };

        let title = raw.title.map(|t| t.trim().to_string()).unwrap_or_default();
        if title.is_empty() {
            return Err(SongError::MetadataError("title is required".to_string()));
        }

        let base_key = raw
            .base_key
            .map(|k| k.trim().to_string())
            .ok_or_else(|| SongError::MetadataError("base-key is required".to_string()))?;
        if split_root(&base_key).is_none() {
            return Err(SongError::MetadataError(format!(
                "base-key '{}' is not a note of the scale",
                base_key
            )));
        }

        let author = raw
            .author
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

        Ok(Song {
            title,
            author,
            base_key,
            lyrics,
            number: raw.number,
            categories: raw.categories.into_iter().map(|c| c.trim().to_string()).collect(),
            video_url: raw.video_url.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()),
        })
    }

    /// A copy of the song with the base key and every chord moved by `semitones`.
    pub fn transposed(&self, semitones: i32) -> Song {
        Song {
            base_key: transpose(&self.base_key, semitones),
            lyrics: self.lyrics.iter().map(|line| transpose_line(line, semitones)).collect(),
            ..self.clone()
        }
    }

    /// Write the song back in the document format read by [`Song::from_source`].
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        out.push_str(HEADER_FENCE);
        out.push('\n');
        out.push_str(&format!("title: {}\n", yaml_scalar(&self.title)));
        out.push_str(&format!("author: {}\n", yaml_scalar(&self.author)));
        out.push_str(&format!("base-key: {}\n", yaml_scalar(&self.base_key)));
        if let Some(number) = self.number {
            out.push_str(&format!("number: {}\n", number));
        }
        if !self.categories.is_empty() {
            let categories: Vec<String> = self.categories.iter().map(|c| yaml_scalar(c)).collect();
            out.push_str(&format!("categories: [{}]\n", categories.join(", ")));
        }
        if let Some(url) = &self.video_url {
            out.push_str(&format!("video-url: {}\n", yaml_scalar(url)));
        }
        out.push_str(HEADER_FENCE);
        out.push('\n');
        for line in &self.lyrics {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

fn trim_trailing_blank(mut lyrics: Vec<String>) -> Vec<String> {
    while lyrics.last().is_some_and(|l| l.trim().is_empty()) {
        lyrics.pop();
    }
    lyrics
}

/// Quote a header value when plain YAML would misread it (`SOL#`, `a: b`, ...).
fn yaml_scalar(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '.' | '-' | '_' | '\'' | '/'))
        && !value.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | ' ' | '\'' | '.'))
        && !value.ends_with(' ')
        && !matches!(
            value.to_ascii_lowercase().as_str(),
            "true" | "false" | "null" | "yes" | "no" | "on" | "off"
        );
    if plain {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const AMAZING_GRACE: &str = r#"---
title: Sublime Gracia
author: John Newton
base-key: SOL
number: 12
categories: [entrada, comunion]
video-url: https://example.org/sublime
---
[SOL]Sublime [DO]gracia del [SOL]Señor

[SOL]que a un [RE7]infeliz salvó
"#;

    #[test]
    fn test_parse_full_header() {
        let song = Song::from_source(AMAZING_GRACE).unwrap();
        assert_eq!(song.title, "Sublime Gracia");
        assert_eq!(song.author, "John Newton");
        assert_eq!(song.base_key, "SOL");
        assert_eq!(song.number, Some(12));
        assert_eq!(song.categories, vec!["entrada", "comunion"]);
        assert_eq!(song.video_url.as_deref(), Some("https://example.org/sublime"));
        assert_eq!(
            song.lyrics,
            vec![
                "[SOL]Sublime [DO]gracia del [SOL]Señor",
                "",
                "[SOL]que a un [RE7]infeliz salvó",
            ]
        );
    }

    #[test]
    fn test_sharp_key_needs_no_quotes() {
        let song = Song::from_source("---\ntitle: X\nbase-key: FA#m\n---\nla").unwrap();
        assert_eq!(song.base_key, "FA#m");
    }

    #[test]
    fn test_missing_header_is_format_error() {
        let err = Song::from_source("[LA]sin cabecera").unwrap_err();
        assert!(matches!(err, SongError::FormatError { line: 1, .. }));

        let err = Song::from_source("---\ntitle: X\nbase-key: LA\n").unwrap_err();
        assert!(matches!(err, SongError::FormatError { .. }));
    }

    #[test]
    fn test_invalid_metadata() {
        let no_title = Song::from_source("---\nbase-key: LA\n---\n").unwrap_err();
        assert_eq!(no_title, SongError::MetadataError("title is required".to_string()));

        let bad_key = Song::from_source("---\ntitle: X\nbase-key: H\n---\n").unwrap_err();
        assert!(matches!(bad_key, SongError::MetadataError(m) if m.contains("'H'")));

        let bad_yaml = Song::from_source("---\ntitle: [unclosed\n---\n").unwrap_err();
        assert!(matches!(bad_yaml, SongError::MetadataError(_)));
    }

    #[test]
    fn test_transposed_copy() {
        let song = Song::from_source(AMAZING_GRACE).unwrap();
        let up = song.transposed(2);
        assert_eq!(up.base_key, "LA");
        assert_eq!(up.lyrics[0], "[LA]Sublime [RE]gracia del [LA]Señor");
        assert_eq!(up.lyrics[2], "[LA]que a un [MI7]infeliz salvó");
        assert_eq!(up.title, song.title);
        assert_eq!(up.transposed(-2), song);
    }

    #[test]
    fn test_to_source_round_trip() {
        let song = Song::from_source(AMAZING_GRACE).unwrap();
        assert_eq!(Song::from_source(&song.to_source()).unwrap(), song);

        let mut odd = Song::new("Canción: \"nueva\"", "  ", "DO#", vec!["[DO#]hola".to_string()]);
        odd.author = DEFAULT_AUTHOR.to_string();
        assert_eq!(Song::from_source(&odd.to_source()).unwrap(), odd);
    }
}
