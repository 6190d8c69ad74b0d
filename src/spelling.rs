//! Spelling
//!
//! The one policy that decides how a pitch class is written. Chord names and
//! key-signature normalization both go through [`canonical_spelling`]:
//! a pitch class inside the key context takes the key's diatonic spelling,
//! anything else is spelled in the fallback direction.

use crate::key_signature::KeySignature;
use crate::note::{Accidental, Letter, Note, PitchClass, SEMITONES};

const SHARP_SPELLINGS: [(Letter, Accidental); SEMITONES] = [
    (Letter::C, Accidental::Natural),
    (Letter::C, Accidental::Sharp),
    (Letter::D, Accidental::Natural),
    (Letter::D, Accidental::Sharp),
    (Letter::E, Accidental::Natural),
    (Letter::F, Accidental::Natural),
    (Letter::F, Accidental::Sharp),
    (Letter::G, Accidental::Natural),
    (Letter::G, Accidental::Sharp),
    (Letter::A, Accidental::Natural),
    (Letter::A, Accidental::Sharp),
    (Letter::B, Accidental::Natural),
];

const FLAT_SPELLINGS: [(Letter, Accidental); SEMITONES] = [
    (Letter::C, Accidental::Natural),
    (Letter::D, Accidental::Flat),
    (Letter::D, Accidental::Natural),
    (Letter::E, Accidental::Flat),
    (Letter::E, Accidental::Natural),
    (Letter::F, Accidental::Natural),
    (Letter::G, Accidental::Flat),
    (Letter::G, Accidental::Natural),
    (Letter::A, Accidental::Flat),
    (Letter::A, Accidental::Natural),
    (Letter::B, Accidental::Flat),
    (Letter::B, Accidental::Natural),
];

/// Direction used to spell black-key pitch classes
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Spelling {
    /// C#, D#, F#, G#, A#
    #[default]
    Sharps,
    /// Db, Eb, Gb, Ab, Bb
    Flats,
}

impl Spelling {
    /// Spell `pitch_class` in this direction. Naturals are always natural.
    pub fn spell(self, pitch_class: PitchClass) -> (Letter, Accidental) {
        match self {
            Spelling::Sharps => SHARP_SPELLINGS[pitch_class.index()],
            Spelling::Flats => FLAT_SPELLINGS[pitch_class.index()],
        }
    }
}

/// Spelling of `pitch_class` in the context of an optional key.
pub fn canonical_spelling(
    pitch_class: PitchClass,
    key: Option<&KeySignature>,
    fallback: Spelling,
) -> (Letter, Accidental) {
    key.and_then(|k| k.spelling_of(pitch_class))
        .unwrap_or_else(|| fallback.spell(pitch_class))
}

/// `note` rewritten with its [`canonical_spelling`]; pitch is unchanged.
pub fn respell(note: &Note, key: Option<&KeySignature>, fallback: Spelling) -> Note {
    let (letter, accidental) = canonical_spelling(note.pitch_class(), key, fallback);
    note.respelled(letter, accidental).unwrap_or(*note)
}
