//! Integration tests for the chord engine
//!
//! Tests the full pipeline from a song document to positioned chord labels
//! and plain-text sheets.

use cancionero::layout::{FitMode, LineKind};
use cancionero::{render_song, render_text_sheet, Config, Song, SongError, SongView, ViewMode};
use pretty_assertions::assert_eq;

const SONG: &str = r#"---
title: Sublime Gracia
author: John Newton
base-key: SOL
number: 12
---
[SOL] [RE] [SOL]

[SOL]Sublime [DO]gracia del [SOL]Señor
que a un [RE7]infeliz salvó
"#;

#[test]
fn test_render_song_pipeline() {
    let rendered = render_song(SONG, 2, 800.0, Config::default()).unwrap();
    assert_eq!(rendered.title, "Sublime Gracia");
    assert_eq!(rendered.key, "LA");
    assert_eq!(rendered.offset_label, "+2");

    let kinds: Vec<LineKind> = rendered.lines.iter().map(|l| l.kind).collect();
    assert_eq!(
        kinds,
        vec![LineKind::ChordsOnly, LineKind::Blank, LineKind::Mixed, LineKind::Mixed]
    );

    let chords: Vec<&str> = rendered.lines[2].labels.iter().map(|l| l.chord.as_str()).collect();
    assert_eq!(chords, vec!["LA", "RE", "LA"]);
    assert_eq!(rendered.lines[3].labels[0].chord, "MI7");
    assert!(!rendered.overflow);
    assert_eq!(rendered.fit_mode, FitMode::Auto);
}

#[test]
fn test_text_sheet() {
    let sheet = render_text_sheet(SONG, -2, 80, Config::default()).unwrap();
    let expected = "\
Sublime Gracia
John Newton
Key: FA (-2)

FA  DO  FA

FA      LA#        FA
Sublime gracia del Señor
         DO7
que a un infeliz salvó
";
    assert_eq!(sheet, expected);
}

#[test]
fn test_narrow_sheet_wraps_lyrics_under_their_chords() {
    let sheet = render_text_sheet(SONG, 0, 16, Config::default()).unwrap();
    let lines: Vec<&str> = sheet.lines().skip(6).collect();
    assert_eq!(
        lines,
        vec![
            "SOL",
            "Sublime",
            "DO         SOL",
            "gracia del Señor",
            "",
            "que a un",
            "RE7",
            "infeliz salvó",
        ]
    );
}

#[test]
fn test_view_offset_round_trip() {
    let song = Song::from_source(SONG).unwrap();
    let mut view = SongView::new(song.clone(), Config::default());

    for key in ["DO", "FA#", "SI", "SOL"] {
        view.select_key(key);
        assert_eq!(view.current_key(), key);
    }
    assert_eq!(view.offset() % 12, 0);
    assert_eq!(view.song().transposed(view.offset()), song);
}

#[test]
fn test_view_mode_change_resets() {
    let song = Song::from_source(SONG).unwrap();
    let mut view = SongView::new(song, Config::default());
    view.step(3);
    view.zoom_in();
    view.set_view_mode(ViewMode::MultiColumn { columns: 3, gap: 10.0 });

    let rendered = view.render(620.0);
    assert_eq!(rendered.offset, 0);
    assert_eq!(rendered.visible_width, 200.0);
    assert_eq!(rendered.fit_mode, FitMode::Auto);
    assert!(rendered.content_width <= rendered.visible_width);
}

#[test]
fn test_export_transposed_source() {
    let song = Song::from_source(SONG).unwrap();
    let exported = song.transposed(5).to_source();
    assert!(exported.contains("base-key: DO\n"));
    assert!(exported.contains("[DO]Sublime [FA]gracia del [DO]Señor\n"));
    assert!(exported.contains("[DO] [SOL] [DO]\n"));
    assert_eq!(Song::from_source(&exported).unwrap(), song.transposed(5));
}

#[test]
fn test_errors_surface_from_pipeline() {
    let err = render_song("no header here", 0, 400.0, Config::default()).unwrap_err();
    assert_eq!(err.to_string(), "Format error at line 1: expected '---' to open the song header");

    let err = render_song("---\ntitle: X\nbase-key: K\n---\n", 0, 400.0, Config::default()).unwrap_err();
    assert!(matches!(err, SongError::MetadataError(_)));
}

#[test]
fn test_custom_config_applies() {
    let config = Config::from_yaml("layout:\n  chord-min-gap: 3\nnever-transpose: []\n").unwrap();
    let sheet = render_text_sheet("---\ntitle: X\nbase-key: LA\n---\n[LA]a[MI]b\n", 0, 80, config).unwrap();
    assert!(sheet.ends_with("LA   MI\nab\n"));
}
