//! Key Signature
//!
//! Static catalog of the fifteen conventional major keys and their relative
//! natural minors, with diatonic membership and key-aware respelling.

use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

use crate::note::{Accidental, Letter, Note, PitchClass, DEFAULT_OCTAVE};
use crate::spelling::{self, Spelling};

/// Number of diatonic degrees in every key
pub const DEGREES: usize = 7;

/// Semitones above the tonic for each degree of the major scale
const MAJOR_STEPS: [u8; DEGREES] = [0, 2, 4, 5, 7, 9, 11];

/// Semitones above the tonic for each degree of the natural minor scale
const MINOR_STEPS: [u8; DEGREES] = [0, 2, 3, 5, 7, 8, 10];

const fn key(letter: Letter, accidental: Accidental, mode: Mode) -> KeySignature {
    KeySignature {
        letter,
        accidental,
        mode,
    }
}

use Accidental::{Flat, Natural, Sharp};
use Letter::{A, B, C, D, E, F, G};

/// Major keys in circle-of-fifths order, followed by their relative minors
const KEY_SIGNATURES: [KeySignature; 30] = [
    key(C, Natural, Mode::Major),
    key(G, Natural, Mode::Major),
    key(D, Natural, Mode::Major),
    key(A, Natural, Mode::Major),
    key(E, Natural, Mode::Major),
    key(B, Natural, Mode::Major),
    key(F, Sharp, Mode::Major),
    key(C, Sharp, Mode::Major),
    key(F, Natural, Mode::Major),
    key(B, Flat, Mode::Major),
    key(E, Flat, Mode::Major),
    key(A, Flat, Mode::Major),
    key(D, Flat, Mode::Major),
    key(G, Flat, Mode::Major),
    key(C, Flat, Mode::Major),
    key(A, Natural, Mode::Minor),
    key(E, Natural, Mode::Minor),
    key(B, Natural, Mode::Minor),
    key(F, Sharp, Mode::Minor),
    key(C, Sharp, Mode::Minor),
    key(G, Sharp, Mode::Minor),
    key(D, Sharp, Mode::Minor),
    key(A, Sharp, Mode::Minor),
    key(D, Natural, Mode::Minor),
    key(G, Natural, Mode::Minor),
    key(C, Natural, Mode::Minor),
    key(F, Natural, Mode::Minor),
    key(B, Flat, Mode::Minor),
    key(E, Flat, Mode::Minor),
    key(A, Flat, Mode::Minor),
];

/// Errors when looking up key signatures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeySignatureError {
    /// The name does not match any catalogued key.
    #[error("unknown key signature `{name}`")]
    UnknownKey {
        /// The name that was looked up.
        name: String,
    },
}

/// Major or (natural) minor
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Major (Ionian)
    Major,
    /// Natural minor (Aeolian)
    Minor,
}

impl Mode {
    const fn steps(self) -> &'static [u8; DEGREES] {
        match self {
            Mode::Major => &MAJOR_STEPS,
            Mode::Minor => &MINOR_STEPS,
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Major => f.write_str("major"),
            Mode::Minor => f.write_str("minor"),
        }
    }
}

/// A named key: tonic spelling plus mode
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct KeySignature {
    letter: Letter,
    accidental: Accidental,
    mode: Mode,
}

impl KeySignature {
    /// Look up a key by name: `"D major"`, `"D"`, `"B minor"`, `"Bm"`, `"bb min"`.
    pub fn named(name: &str) -> Result<KeySignature, KeySignatureError> {
        parse_key_name(name).ok_or_else(|| KeySignatureError::UnknownKey {
            name: name.to_string(),
        })
    }

    /// Every catalogued key.
    pub fn all() -> impl Iterator<Item = KeySignature> {
        KEY_SIGNATURES.iter().copied()
    }

    /// Tonic pitch class.
    pub fn tonic(&self) -> PitchClass {
        PitchClass::of(self.letter, self.accidental)
    }

    /// Major or minor.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Full name, e.g. `"D major"`.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Spelling of each scale degree, tonic first.
    pub fn spellings(&self) -> [(Letter, Accidental); DEGREES] {
        std::array::from_fn(|degree| self.degree(degree))
    }

    /// Pitch class of each scale degree, tonic first.
    pub fn pitch_classes(&self) -> [PitchClass; DEGREES] {
        let tonic = self.tonic().index();
        let steps = self.mode.steps();
        std::array::from_fn(|degree| PitchClass::from_index(tonic + steps[degree] as usize))
    }

    /// The seven diatonic notes in ascending order, voiced upward from the
    /// tonic in octave 4. Compare them by name or pitch class.
    pub fn notes(&self) -> [Note; DEGREES] {
        let tonic = self.tonic_midi();
        let steps = self.mode.steps();
        std::array::from_fn(|degree| {
            let (letter, accidental) = self.degree(degree);
            Note::spelled_from_midi(tonic + steps[degree], letter, accidental)
        })
    }

    /// Whether `pitch_class` is one of the seven diatonic pitch classes.
    pub fn contains(&self, pitch_class: PitchClass) -> bool {
        self.pitch_classes().contains(&pitch_class)
    }

    /// Whether the note's pitch class belongs to the key, octave ignored.
    pub fn is_in_key(&self, note: &Note) -> bool {
        self.contains(note.pitch_class())
    }

    /// The key's spelling of `pitch_class`, or `None` if it is chromatic here.
    pub fn spelling_of(&self, pitch_class: PitchClass) -> Option<(Letter, Accidental)> {
        self.pitch_classes()
            .iter()
            .position(|&pc| pc == pitch_class)
            .map(|degree| self.degree(degree))
    }

    /// Respell `note` for this key.
    ///
    /// In-key pitch classes take the key's spelling (`Gb` becomes `F#` in
    /// D major). Chromatic pitch classes are spelled in the key's
    /// [`chromatic_spelling`](Self::chromatic_spelling) direction.
    pub fn normalize(&self, note: &Note) -> Note {
        spelling::respell(note, Some(self), self.chromatic_spelling())
    }

    /// Number of sharps in the signature.
    pub fn sharps(&self) -> usize {
        self.count_accidentals(Accidental::Sharp)
    }

    /// Number of flats in the signature.
    pub fn flats(&self) -> usize {
        self.count_accidentals(Accidental::Flat)
    }

    /// Flats for flat keys, sharps for everything else.
    pub fn chromatic_spelling(&self) -> Spelling {
        if self.flats() > 0 {
            Spelling::Flats
        } else {
            Spelling::Sharps
        }
    }

    /// The relative minor of a major key, or relative major of a minor key.
    pub fn relative(&self) -> KeySignature {
        let (degree, mode) = match self.mode {
            Mode::Major => (5, Mode::Minor),
            Mode::Minor => (2, Mode::Major),
        };
        let (letter, accidental) = self.degree(degree);
        key(letter, accidental, mode)
    }

    fn degree(&self, degree: usize) -> (Letter, Accidental) {
        let letter = self.letter.offset_by(degree);
        let pitch_class = self.pitch_classes()[degree];
        let natural = letter.semitone() as i32;
        Accidental::from_offset(pitch_class.index() as i32 - natural)
            .map(|accidental| (letter, accidental))
            .unwrap_or_else(|| Spelling::Sharps.spell(pitch_class))
    }

    fn count_accidentals(&self, accidental: Accidental) -> usize {
        self.spellings()
            .iter()
            .filter(|(_, a)| *a == accidental)
            .count()
    }

    fn tonic_midi(&self) -> u8 {
        let octave_base = (DEFAULT_OCTAVE as i32 + 1) * 12;
        (octave_base + self.letter.semitone() as i32 + self.accidental.offset() as i32) as u8
    }
}

impl Display for KeySignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{} {}", self.letter, self.accidental, self.mode)
    }
}

impl FromStr for KeySignature {
    type Err = KeySignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeySignature::named(s)
    }
}

impl TryFrom<String> for KeySignature {
    type Error = KeySignatureError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        KeySignature::named(&value)
    }
}

impl From<KeySignature> for String {
    fn from(key: KeySignature) -> Self {
        key.name()
    }
}

fn parse_key_name(name: &str) -> Option<KeySignature> {
    let mut words = name.split_whitespace();
    let tonic = words.next()?;
    let mode_word = words.next();
    if words.next().is_some() {
        return None;
    }

    let mut chars = tonic.chars();
    let letter = chars.next().and_then(Letter::from_char)?;
    let rest = chars.as_str();
    let (accidental, suffix) = if let Some(tail) = rest.strip_prefix('#') {
        (Accidental::Sharp, tail)
    } else if let Some(tail) = rest.strip_prefix('b') {
        (Accidental::Flat, tail)
    } else {
        (Accidental::Natural, rest)
    };

    let mode = match (suffix, mode_word.map(str::to_ascii_lowercase).as_deref()) {
        ("", None | Some("major" | "maj")) => Mode::Major,
        ("", Some("minor" | "min")) | ("m", None) => Mode::Minor,
        _ => return None,
    };

    KEY_SIGNATURES
        .iter()
        .copied()
        .find(|k| k.letter == letter && k.accidental == accidental && k.mode == mode)
}
