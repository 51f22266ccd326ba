//! # Transposition Engine
//!
//! Moves chord names around the fixed chromatic scale
//!
//! ```text
//! DO DO# RE RE# MI FA FA# SOL SOL# LA LA# SI
//! ```
//!
//! Only sharps are used. A chord token is a root (the longest scale name the
//! token starts with, compared case-insensitively) followed by a suffix that
//! is kept verbatim. A slash bass (`/RE`) in the suffix is moved by the same
//! interval as the root.
//!
//! Anything that does not start with a scale name is returned untouched, so
//! section labels such as `Coro` or `x2` survive transposition.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::chord_parser::{join_segments, parse_line};

pub const SCALE_LEN: i32 = 12;

const SCALE: [&str; SCALE_LEN as usize] = [
    "DO", "DO#", "RE", "RE#", "MI", "FA", "FA#", "SOL", "SOL#", "LA", "LA#", "SI",
];

/// Scale names ordered longest first, so `SOL#` is tried before `SOL`.
static NAMES_LONGEST_FIRST: Lazy<Vec<PitchClass>> = Lazy::new(|| {
    let mut pitches = PitchClass::ALL.to_vec();
    pitches.sort_by(|a, b| b.name().len().cmp(&a.name().len()));
    pitches
});

/// Chord candidates inside free text: root, sharp, suffix and optional bass.
static CHORD_IN_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(SOL|DO|RE|MI|FA|LA|SI)(#?)([0-9A-Za-z#+()°ø-]*)(?:/(SOL|DO|RE|MI|FA|LA|SI)(#?))?")
        .expect("chord pattern compiles")
});

/// Pieces a chord suffix may be built from.
const SUFFIX_VOCABULARY: [&str; 16] = [
    "maj", "min", "sus", "dim", "aug", "add", "m", "M", "°", "ø", "+", "-", "b", "#", "(", ")",
];

/// One of the twelve notes of the scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PitchClass(u8);

impl PitchClass {
    pub const ALL: [PitchClass; SCALE_LEN as usize] = [
        PitchClass(0),
        PitchClass(1),
        PitchClass(2),
        PitchClass(3),
        PitchClass(4),
        PitchClass(5),
        PitchClass(6),
        PitchClass(7),
        PitchClass(8),
        PitchClass(9),
        PitchClass(10),
        PitchClass(11),
    ];

    /// Pitch at a scale index, wrapping in both directions.
    pub fn from_index(index: i32) -> Self {
        PitchClass(index.rem_euclid(SCALE_LEN) as u8)
    }

    /// Exact (case-insensitive) lookup of a scale name.
    pub fn from_name(name: &str) -> Option<Self> {
        PitchClass::ALL
            .into_iter()
            .find(|pitch| pitch.name().eq_ignore_ascii_case(name))
    }

    pub fn index(self) -> i32 {
        self.0 as i32
    }

    pub fn name(self) -> &'static str {
        SCALE[self.0 as usize]
    }

    pub fn transpose(self, semitones: i32) -> Self {
        PitchClass::from_index(self.index() + semitones.rem_euclid(SCALE_LEN))
    }
}

/// A token split into its root and the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordRoot<'a> {
    pub pitch: PitchClass,
    /// The root exactly as written, e.g. `Sol#`
    pub written: &'a str,
    pub suffix: &'a str,
}

/// Split a token into root and suffix using the longest matching scale name.
///
/// ```
/// use cancionero::transpose::split_root;
///
/// let root = split_root("sol#7").unwrap();
/// assert_eq!(root.pitch.name(), "SOL#");
/// assert_eq!(root.written, "sol#");
/// assert_eq!(root.suffix, "7");
///
/// assert!(split_root("Coro").is_none());
/// ```
pub fn split_root(token: &str) -> Option<ChordRoot<'_>> {
    NAMES_LONGEST_FIRST.iter().find_map(|&pitch| {
        let len = pitch.name().len();
        let prefix = token.get(..len)?;
        prefix.eq_ignore_ascii_case(pitch.name()).then(|| ChordRoot {
            pitch,
            written: prefix,
            suffix: &token[len..],
        })
    })
}

/// Letter case a root was written in. Transposed roots are rendered the same
/// way; any mixed casing other than title case comes out as title case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootCase {
    Upper,
    Lower,
    Title,
}

fn root_case(written: &str) -> RootCase {
    let letters = || written.chars().filter(|c| c.is_alphabetic());
    if letters().all(char::is_uppercase) {
        RootCase::Upper
    } else if letters().all(char::is_lowercase) {
        RootCase::Lower
    } else {
        RootCase::Title
    }
}

fn render_root(pitch: PitchClass, case: RootCase) -> String {
    let name = pitch.name();
    match case {
        RootCase::Upper => name.to_string(),
        RootCase::Lower => name.to_ascii_lowercase(),
        RootCase::Title => {
            let (first, rest) = name.split_at(1);
            format!("{}{}", first, rest.to_ascii_lowercase())
        }
    }
}

fn shift(root: &ChordRoot<'_>, semitones: i32) -> String {
    render_root(root.pitch.transpose(semitones), root_case(root.written))
}

/// Transpose a chord token by a number of semitones.
///
/// The suffix is preserved character for character; only the root, and the
/// bass of a slash chord, change.
///
/// # Examples
/// ```
/// use cancionero::transpose::transpose;
///
/// assert_eq!(transpose("LAm", 3), "DOm");
/// assert_eq!(transpose("SOL#7/RE", 2), "LA#7/MI");
/// assert_eq!(transpose("DO", -1), "SI");
/// assert_eq!(transpose("Coro", 5), "Coro");
/// ```
pub fn transpose(token: &str, semitones: i32) -> String {
    if semitones == 0 {
        return token.to_string();
    }
    let Some(root) = split_root(token) else {
        return token.to_string();
    };

    let mut result = shift(&root, semitones);
    result.push_str(&transpose_bass(root.suffix, semitones));
    result
}

fn transpose_bass(suffix: &str, semitones: i32) -> String {
    if let Some(slash) = suffix.rfind('/') {
        if let Some(bass) = split_root(&suffix[slash + 1..]) {
            return format!("{}/{}{}", &suffix[..slash], shift(&bass, semitones), bass.suffix);
        }
    }
    suffix.to_string()
}

/// Signed semitone difference between the roots of two tokens.
///
/// The result is a plain `to - from` on scale indices, not the shortest way
/// around the circle: going from `DO` to `SI` is `11`, and back is `-11`.
/// Returns 0 when either root is not a scale name.
///
/// ```
/// use cancionero::transpose::distance;
///
/// assert_eq!(distance("DO", "RE"), 2);
/// assert_eq!(distance("LAm", "DO"), -9);
/// assert_eq!(distance("H", "DO"), 0);
/// ```
pub fn distance(from: &str, to: &str) -> i32 {
    match (split_root(from), split_root(to)) {
        (Some(from), Some(to)) => to.pitch.index() - from.pitch.index(),
        _ => 0,
    }
}

/// Transpose every chord marker of a raw lyric line, leaving the lyrics alone.
pub fn transpose_line(line: &str, semitones: i32) -> String {
    if semitones == 0 {
        return line.to_string();
    }
    let segments: Vec<_> = parse_line(line)
        .into_iter()
        .map(|mut segment| {
            segment.chord = segment.chord.map(|chord| transpose(&chord, semitones));
            segment
        })
        .collect();
    join_segments(&segments)
}

/// Words that look like chords but must never be transposed.
///
/// The defaults are the solfège syllables as they appear in ordinary Spanish
/// prose (`la`, `mi`, `Si`, ...). Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExceptionList {
    tokens: HashSet<String>,
}

impl ExceptionList {
    pub fn empty() -> Self {
        ExceptionList {
            tokens: HashSet::new(),
        }
    }

    pub fn with(mut self, token: &str) -> Self {
        self.tokens.insert(token.to_string());
        self
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for ExceptionList {
    fn default() -> Self {
        ["do", "re", "mi", "fa", "sol", "la", "si"]
            .into_iter()
            .flat_map(|word| {
                let (first, rest) = word.split_at(1);
                [word.to_string(), format!("{}{}", first.to_ascii_uppercase(), rest)]
            })
            .fold(ExceptionList::empty(), |list, word| list.with(&word))
    }
}

/// Transpose chord names embedded in free text, e.g. `"Capo: SOL#7/RE"`.
///
/// Candidates are anchored at word boundaries. A candidate is left as is when
/// its suffix is not made of chord-suffix pieces (it is really a word such as
/// `Lado`), when a letter follows it, or when it is in `exceptions`.
///
/// ```
/// use cancionero::transpose::{transpose_text, ExceptionList};
///
/// let exceptions = ExceptionList::default();
/// assert_eq!(transpose_text("Capo: SOL#7/RE", 2, &exceptions), "Capo: LA#7/MI");
/// assert_eq!(transpose_text("Al otro Lado", 2, &exceptions), "Al otro Lado");
/// assert_eq!(transpose_text("canta la LAm", 2, &exceptions), "canta la SIm");
/// ```
pub fn transpose_text(text: &str, semitones: i32, exceptions: &ExceptionList) -> String {
    if semitones == 0 {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut last = 0;
    for caps in CHORD_IN_TEXT.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        result.push_str(&text[last..whole.start()]);
        match transpose_candidate(text, &caps, semitones, exceptions) {
            Some(chord) => result.push_str(&chord),
            None => result.push_str(whole.as_str()),
        }
        last = whole.end();
    }
    result.push_str(&text[last..]);
    result
}

fn transpose_candidate(
    text: &str,
    caps: &Captures<'_>,
    semitones: i32,
    exceptions: &ExceptionList,
) -> Option<String> {
    let whole = caps.get(0)?;
    if exceptions.contains(whole.as_str()) {
        return None;
    }
    let followed_by_word = text[whole.end()..]
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_');
    if followed_by_word {
        return None;
    }

    let suffix = caps.get(3).map_or("", |m| m.as_str());
    if !is_chord_suffix(suffix) {
        return None;
    }

    let mut chord = shift_captured(caps, 1, 2, semitones)?;
    chord.push_str(suffix);
    if caps.get(4).is_some() {
        chord.push('/');
        chord.push_str(&shift_captured(caps, 4, 5, semitones)?);
    }
    Some(chord)
}

fn shift_captured(caps: &Captures<'_>, letters: usize, sharp: usize, semitones: i32) -> Option<String> {
    let letters = caps.get(letters)?.as_str();
    let sharp = caps.get(sharp).map_or("", |m| m.as_str());
    let pitch = PitchClass::from_name(&format!("{}{}", letters, sharp))?;
    Some(render_root(pitch.transpose(semitones), root_case(letters)))
}

/// True if the suffix is built entirely from chord-suffix pieces and digits.
fn is_chord_suffix(suffix: &str) -> bool {
    let mut rest = suffix;
    while let Some(c) = rest.chars().next() {
        if c.is_ascii_digit() {
            rest = &rest[1..];
            continue;
        }
        match SUFFIX_VOCABULARY.iter().find(|piece| rest.starts_with(*piece)) {
            Some(piece) => rest = &rest[piece.len()..],
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_zero_offset_is_identity() {
        for token in ["LAm", "sol#7/re", "Coro", "", "x2", "[raro"] {
            assert_eq!(transpose(token, 0), token);
        }
    }

    #[test]
    fn test_basic_transposition() {
        assert_eq!(transpose("LAm", 3), "DOm");
        assert_eq!(transpose("LAm", 4), "DO#m");
        assert_eq!(transpose("DO", 2), "RE");
        assert_eq!(transpose("SI7", 1), "DO7");
        assert_eq!(transpose("DO", -1), "SI");
        assert_eq!(transpose("MI", 12), "MI");
        assert_eq!(transpose("MI", -25), "RE#");
    }

    #[test]
    fn test_longest_match_wins() {
        assert_eq!(transpose("SOL#m", 1), "LAm");
        assert_eq!(transpose("SOL", 1), "SOL#");
        assert_eq!(transpose("DO#7", -1), "DO7");
    }

    #[test]
    fn test_suffix_preserved_verbatim() {
        assert_eq!(transpose("REmaj7(9)", 2), "MImaj7(9)");
        assert_eq!(transpose("FAsus4 (x2)", 1), "FA#sus4 (x2)");
    }

    #[test]
    fn test_slash_chord_moves_both_roots() {
        assert_eq!(transpose("SOL#7/RE", 2), "LA#7/MI");
        assert_eq!(transpose("DO/MI", -2), "LA#/RE");
        assert_eq!(transpose("LA7/9", 2), "SI7/9");
    }

    #[test]
    fn test_case_is_preserved() {
        assert_eq!(transpose("lam", 2), "sim");
        assert_eq!(transpose("Sol", 1), "Sol#");
        assert_eq!(transpose("La#", 1), "Si");
        assert_eq!(transpose("do/mi", 1), "do#/fa");
    }

    #[test]
    fn test_odd_case_is_normalised_to_title_case() {
        assert_eq!(transpose("sOL", 1), "Sol#");
        assert_eq!(transpose("dO#m", 1), "Rem");
        assert_eq!(transpose(&transpose("lA7", 1), -1), "La7");
    }

    #[test]
    fn test_unknown_root_passes_through() {
        assert_eq!(transpose("Coro:", 3), "Coro:");
        assert_eq!(transpose("N.C.", 3), "N.C.");
        assert_eq!(transpose("", 3), "");
    }

    #[test]
    fn test_round_trip_law() {
        let tokens = ["LAm", "SOL#7/RE", "do#m7b5", "Fa", "SIsus4/FA#", "MI"];
        for token in tokens {
            for n in -30..=30 {
                assert_eq!(transpose(&transpose(token, n), -n), token, "{} by {}", token, n);
            }
        }
    }

    #[test]
    fn test_scale_arithmetic_wraps() {
        for pitch in PitchClass::ALL {
            assert_eq!(pitch.transpose(12), pitch);
            assert_eq!(pitch.transpose(-12), pitch);
            assert_eq!(pitch.transpose(i32::MIN), pitch.transpose(4));
            assert_eq!(pitch.transpose(i32::MAX), pitch.transpose(7));
        }
        assert_eq!(PitchClass::from_index(-1).name(), "SI");
        assert_eq!(PitchClass::from_name("sol#").map(PitchClass::index), Some(8));
    }

    #[test]
    fn test_distance() {
        assert_eq!(distance("DO", "SI"), 11);
        assert_eq!(distance("SI", "DO"), -11);
        assert_eq!(distance("LAm", "DO#7"), -8);
        assert_eq!(distance("Coro", "DO"), 0);
        for a in PitchClass::ALL {
            for b in PitchClass::ALL {
                assert_eq!(distance(a.name(), b.name()), -distance(b.name(), a.name()));
                assert_eq!(transpose(a.name(), distance(a.name(), b.name())), b.name());
            }
        }
    }

    #[test]
    fn test_transpose_line() {
        assert_eq!(
            transpose_line("Oh [SOL]gracia [RE7/FA#]plena", 2),
            "Oh [LA]gracia [MI7/SOL#]plena"
        );
        assert_eq!(transpose_line("sin acordes", 5), "sin acordes");
    }

    #[test]
    fn test_transpose_text_free_prose() {
        let exceptions = ExceptionList::default();
        assert_eq!(transpose_text("Capo: SOL#7/RE", 2, &exceptions), "Capo: LA#7/MI");
        assert_eq!(transpose_text("(Tono original DOm)", 1, &exceptions), "(Tono original DO#m)");
        assert_eq!(transpose_text("Solo de guitarra", 1, &exceptions), "Solo de guitarra");
        assert_eq!(transpose_text("Dame la mano", 1, &exceptions), "Dame la mano");
        assert_eq!(transpose_text("Misa criolla", 1, &exceptions), "Misa criolla");
        assert_eq!(transpose_text("LA/MIlagro", 1, &exceptions), "LA/MIlagro");
    }

    #[test]
    fn test_exception_list_is_configurable() {
        assert_eq!(transpose_text("Mi casa", 2, &ExceptionList::default()), "Mi casa");
        assert_eq!(transpose_text("Mi casa", 2, &ExceptionList::empty()), "Fa# casa");
        let custom = ExceptionList::empty().with("LAm");
        assert_eq!(transpose_text("LAm LAm7", 2, &custom), "LAm SIm7");
    }

    #[test]
    fn test_chord_suffix_vocabulary() {
        for suffix in ["", "m", "7", "maj7", "m7b5", "sus4", "add9", "°", "7(b9)", "dim7", "M7"] {
            assert!(is_chord_suffix(suffix), "{}", suffix);
        }
        for suffix in ["do", "sa", "s", "rgo", "nto"] {
            assert!(!is_chord_suffix(suffix), "{}", suffix);
        }
    }
}
