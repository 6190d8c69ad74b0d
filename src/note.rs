//! Note
//!
//! Single pitches in scientific pitch notation, convertible to and from MIDI
//! note numbers (MIDI 60 = C4) with equal-temperament frequencies (A4 = 440 Hz).

use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

use crate::spelling::Spelling;

pub(crate) const SEMITONES: usize = 12;

/// Lowest representable MIDI note number.
pub const MIDI_MIN: i32 = 0;

/// Highest representable MIDI note number.
pub const MIDI_MAX: i32 = 127;

/// Octave assumed when a note name is given without one (e.g. `"C"` in `"C E G"`).
pub const DEFAULT_OCTAVE: i8 = 4;

const A4_MIDI: f64 = 69.0;
const A4_FREQUENCY: f64 = 440.0;

/// Errors when constructing notes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteError {
    /// The note text was not of the form `<Letter>[#|b]<octave>`.
    #[error("invalid note name `{input}`: {reason}")]
    Parse {
        /// The text that failed to parse.
        input: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A MIDI note number outside `0..=127`.
    #[error("MIDI value {value} is outside the representable range 0..=127")]
    OutOfRange {
        /// The rejected value.
        value: i32,
    },
}

/// The seven natural note letters
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Letter {
    /// C
    C,
    /// D
    D,
    /// E
    E,
    /// F
    F,
    /// G
    G,
    /// A
    A,
    /// B
    B,
}

const LETTERS: [Letter; 7] = [
    Letter::C,
    Letter::D,
    Letter::E,
    Letter::F,
    Letter::G,
    Letter::A,
    Letter::B,
];

impl Letter {
    /// Parse a letter, ignoring case.
    pub fn from_char(c: char) -> Option<Letter> {
        match c.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    /// Semitone offset of the natural note above C.
    pub const fn semitone(self) -> u8 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    /// The letter `steps` scale degrees above this one, wrapping G to A.
    pub fn offset_by(self, steps: usize) -> Letter {
        LETTERS[(self as usize + steps) % LETTERS.len()]
    }
}

impl Display for Letter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Single accidentals
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Accidental {
    /// No accidental
    #[default]
    Natural,
    /// Raised by one semitone (`#`)
    Sharp,
    /// Lowered by one semitone (`b`)
    Flat,
}

impl Accidental {
    /// Signed semitone adjustment.
    pub const fn offset(self) -> i8 {
        match self {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }

    /// Accidental that moves a natural by `semitones` (mod 12), if a single one does.
    pub fn from_offset(semitones: i32) -> Option<Accidental> {
        match semitones.rem_euclid(SEMITONES as i32) {
            0 => Some(Accidental::Natural),
            1 => Some(Accidental::Sharp),
            11 => Some(Accidental::Flat),
            _ => None,
        }
    }

    /// Text used in note names.
    pub const fn symbol(self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        }
    }
}

impl Display for Accidental {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Twelve chromatic pitch classes
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PitchClass {
    /// C
    C,
    /// C sharp / D flat
    Cs,
    /// D
    D,
    /// D sharp / E flat
    Ds,
    /// E
    E,
    /// F
    F,
    /// F sharp / G flat
    Fs,
    /// G
    G,
    /// G sharp / A flat
    Gs,
    /// A
    A,
    /// A sharp / B flat
    As,
    /// B
    B,
}

const PITCH_CLASSES: [PitchClass; SEMITONES] = [
    PitchClass::C,
    PitchClass::Cs,
    PitchClass::D,
    PitchClass::Ds,
    PitchClass::E,
    PitchClass::F,
    PitchClass::Fs,
    PitchClass::G,
    PitchClass::Gs,
    PitchClass::A,
    PitchClass::As,
    PitchClass::B,
];

impl PitchClass {
    /// Pitch class `idx` semitones above C, wrapping every octave.
    pub const fn from_index(idx: usize) -> PitchClass {
        PITCH_CLASSES[idx % SEMITONES]
    }

    /// Semitones above C (`0..12`).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Pitch class of a spelled note name.
    pub fn of(letter: Letter, accidental: Accidental) -> PitchClass {
        let idx = (letter.semitone() as i32 + accidental.offset() as i32)
            .rem_euclid(SEMITONES as i32);
        PitchClass::from_index(idx as usize)
    }

    /// Ascending semitone distance from `root` to this pitch class.
    pub const fn interval_from(self, root: PitchClass) -> usize {
        (self.index() + SEMITONES - root.index()) % SEMITONES
    }

    /// All twelve pitch classes, starting from C.
    pub fn all() -> impl Iterator<Item = PitchClass> {
        PITCH_CLASSES.iter().copied()
    }
}

/// A single pitch: spelled letter and accidental plus an octave.
///
/// Two notes compare equal only when spelled identically in the same octave;
/// use [`Note::is_enharmonic`] to compare sounding pitch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Note {
    letter: Letter,
    accidental: Accidental,
    octave: i8,
}

impl Note {
    /// Build a note from its spelling, rejecting pitches outside MIDI `0..=127`.
    pub fn new(letter: Letter, accidental: Accidental, octave: i8) -> Result<Note, NoteError> {
        let value = midi_of(letter, accidental, octave);
        if !(MIDI_MIN..=MIDI_MAX).contains(&value) {
            return Err(NoteError::OutOfRange { value });
        }
        Ok(Note {
            letter,
            accidental,
            octave,
        })
    }

    /// Note for a MIDI number, spelled with sharps.
    pub fn from_midi(midi: i32) -> Result<Note, NoteError> {
        Self::from_midi_with(midi, Spelling::Sharps)
    }

    /// Note for a MIDI number, with black keys spelled per `spelling`.
    pub fn from_midi_with(midi: i32, spelling: Spelling) -> Result<Note, NoteError> {
        if !(MIDI_MIN..=MIDI_MAX).contains(&midi) {
            return Err(NoteError::OutOfRange { value: midi });
        }
        let (letter, accidental) = spelling.spell(PitchClass::from_index(midi as usize));
        Ok(Self::spelled_from_midi(midi as u8, letter, accidental))
    }

    /// Parse strict scientific pitch notation such as `"Eb4"` or `"C-1"`.
    pub fn from_scientific_name(text: &str) -> Result<Note, NoteError> {
        parse(text, None)
    }

    /// Parse a note name whose octave is optional, defaulting to [`DEFAULT_OCTAVE`].
    pub fn from_name(text: &str) -> Result<Note, NoteError> {
        parse(text, Some(DEFAULT_OCTAVE))
    }

    /// `midi` spelled as `letter` + `accidental`; the spelling must belong to
    /// the pitch class of `midi`.
    pub(crate) fn spelled_from_midi(midi: u8, letter: Letter, accidental: Accidental) -> Note {
        debug_assert_eq!(
            PitchClass::of(letter, accidental),
            PitchClass::from_index(midi as usize)
        );
        let base = midi as i32 - letter.semitone() as i32 - accidental.offset() as i32;
        Note {
            letter,
            accidental,
            octave: (base.div_euclid(SEMITONES as i32) - 1) as i8,
        }
    }

    /// The same pitch spelled differently, or `None` if the spelling names
    /// another pitch class. The octave follows the pitch, so `B#3` and `C4`
    /// are respellings of each other.
    pub fn respelled(&self, letter: Letter, accidental: Accidental) -> Option<Note> {
        if PitchClass::of(letter, accidental) != self.pitch_class() {
            return None;
        }
        Some(Self::spelled_from_midi(self.midi(), letter, accidental))
    }

    /// Letter of the spelling.
    pub fn letter(&self) -> Letter {
        self.letter
    }

    /// Accidental of the spelling.
    pub fn accidental(&self) -> Accidental {
        self.accidental
    }

    /// Octave number (C4 is middle C).
    pub fn octave(&self) -> i8 {
        self.octave
    }

    /// Pitch class, independent of spelling and octave.
    pub fn pitch_class(&self) -> PitchClass {
        PitchClass::of(self.letter, self.accidental)
    }

    /// MIDI note number.
    pub fn midi(&self) -> u8 {
        // in range by construction
        midi_of(self.letter, self.accidental, self.octave) as u8
    }

    /// Equal-temperament frequency in Hz.
    pub fn frequency(&self) -> f64 {
        A4_FREQUENCY * 2f64.powf((f64::from(self.midi()) - A4_MIDI) / SEMITONES as f64)
    }

    /// Letter and accidental without the octave, e.g. `"Eb"`.
    pub fn name(&self) -> String {
        format!("{}{}", self.letter, self.accidental)
    }

    /// Letter, accidental and octave, e.g. `"Eb4"`.
    pub fn scientific_name(&self) -> String {
        self.to_string()
    }

    /// Whether both notes sound the same pitch, whatever their spelling.
    pub fn is_enharmonic(&self, other: &Note) -> bool {
        self.midi() == other.midi()
    }
}

impl Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.letter, self.accidental, self.octave)
    }
}

impl FromStr for Note {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Note::from_name(s)
    }
}

impl TryFrom<String> for Note {
    type Error = NoteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Note::from_scientific_name(&value)
    }
}

impl From<Note> for String {
    fn from(note: Note) -> Self {
        note.scientific_name()
    }
}

fn midi_of(letter: Letter, accidental: Accidental, octave: i8) -> i32 {
    (octave as i32 + 1) * SEMITONES as i32 + letter.semitone() as i32 + accidental.offset() as i32
}

fn parse(text: &str, default_octave: Option<i8>) -> Result<Note, NoteError> {
    let err = |reason| NoteError::Parse {
        input: text.to_string(),
        reason,
    };

    let mut chars = text.trim().chars();
    let letter = chars
        .next()
        .and_then(Letter::from_char)
        .ok_or_else(|| err("expected a note letter A-G"))?;

    let rest = chars.as_str();
    let (accidental, rest) = if let Some(tail) = rest.strip_prefix('#') {
        (Accidental::Sharp, tail)
    } else if let Some(tail) = rest.strip_prefix('b') {
        (Accidental::Flat, tail)
    } else {
        (Accidental::Natural, rest)
    };
    if rest.starts_with(|c: char| c == '#' || c == 'b') {
        return Err(err("conflicting or repeated accidental"));
    }

    let octave = if rest.is_empty() {
        default_octave.ok_or_else(|| err("missing octave"))?
    } else {
        rest.parse::<i8>()
            .map_err(|_| err("octave is not an integer"))?
    };

    Note::new(letter, accidental, octave).map_err(|_| err("octave is out of range"))
}

/// Anything accepted as a single note by chord recognition.
pub trait IntoNote {
    /// Convert into a [`Note`], failing on malformed text or MIDI values.
    fn into_note(self) -> Result<Note, NoteError>;
}

impl IntoNote for Note {
    fn into_note(self) -> Result<Note, NoteError> {
        Ok(self)
    }
}

impl IntoNote for &Note {
    fn into_note(self) -> Result<Note, NoteError> {
        Ok(*self)
    }
}

impl IntoNote for u8 {
    fn into_note(self) -> Result<Note, NoteError> {
        Note::from_midi(i32::from(self))
    }
}

impl IntoNote for i32 {
    fn into_note(self) -> Result<Note, NoteError> {
        Note::from_midi(self)
    }
}

impl IntoNote for &str {
    fn into_note(self) -> Result<Note, NoteError> {
        Note::from_name(self)
    }
}

impl IntoNote for String {
    fn into_note(self) -> Result<Note, NoteError> {
        Note::from_name(&self)
    }
}

impl IntoNote for &String {
    fn into_note(self) -> Result<Note, NoteError> {
        Note::from_name(self)
    }
}

/// One note in any supported representation, for mixing kinds in one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteInput {
    /// A MIDI note number.
    Midi(i32),
    /// A note name, octave optional.
    Name(String),
    /// An already-built note.
    Note(Note),
}

impl IntoNote for NoteInput {
    fn into_note(self) -> Result<Note, NoteError> {
        match self {
            NoteInput::Midi(midi) => Note::from_midi(midi),
            NoteInput::Name(name) => Note::from_name(&name),
            NoteInput::Note(note) => Ok(note),
        }
    }
}

impl From<i32> for NoteInput {
    fn from(midi: i32) -> Self {
        NoteInput::Midi(midi)
    }
}

impl From<u8> for NoteInput {
    fn from(midi: u8) -> Self {
        NoteInput::Midi(i32::from(midi))
    }
}

impl From<&str> for NoteInput {
    fn from(name: &str) -> Self {
        NoteInput::Name(name.to_string())
    }
}

impl From<String> for NoteInput {
    fn from(name: String) -> Self {
        NoteInput::Name(name)
    }
}

impl From<Note> for NoteInput {
    fn from(note: Note) -> Self {
        NoteInput::Note(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(text: &str) -> Note {
        Note::from_scientific_name(text).unwrap()
    }

    #[test]
    fn middle_c_is_midi_60() {
        assert_eq!(note("C4").midi(), 60);
        assert_eq!(Note::from_midi(60).unwrap(), note("C4"));
    }

    #[test]
    fn a4_is_440_hz() {
        assert!((note("A4").frequency() - 440.0).abs() < 1e-9);
        assert!((note("A5").frequency() - 880.0).abs() < 1e-9);
        assert!((note("C4").frequency() - 261.625_565).abs() < 1e-4);
    }

    #[test]
    fn names_with_and_without_octave() {
        let eb = note("Eb4");
        assert_eq!(eb.name(), "Eb");
        assert_eq!(eb.scientific_name(), "Eb4");
        assert_eq!(eb.midi(), 63);
    }

    #[test]
    fn midi_spelling_follows_policy() {
        assert_eq!(Note::from_midi(61).unwrap().scientific_name(), "C#4");
        assert_eq!(
            Note::from_midi_with(61, Spelling::Flats).unwrap().scientific_name(),
            "Db4"
        );
        assert_eq!(Note::from_midi(0).unwrap().scientific_name(), "C-1");
        assert_eq!(Note::from_midi(127).unwrap().scientific_name(), "G9");
    }

    #[test]
    fn midi_out_of_range() {
        assert_eq!(
            Note::from_midi(128),
            Err(NoteError::OutOfRange { value: 128 })
        );
        assert_eq!(Note::from_midi(-1), Err(NoteError::OutOfRange { value: -1 }));
    }

    #[test]
    fn octave_boundary_spellings() {
        assert_eq!(note("B#3").midi(), 60);
        assert_eq!(note("Cb4").midi(), 59);
        assert!(note("B#3").is_enharmonic(&note("C4")));
        assert_ne!(note("B#3"), note("C4"));
    }

    #[test]
    fn respelling_keeps_pitch() {
        let cs = note("C#4");
        assert_eq!(cs.respelled(Letter::D, Accidental::Flat), Some(note("Db4")));
        assert_eq!(cs.respelled(Letter::D, Accidental::Natural), None);
        assert_eq!(
            note("C4").respelled(Letter::B, Accidental::Sharp),
            Some(note("B#3"))
        );
    }

    #[test]
    fn malformed_names_are_parse_errors() {
        for bad in ["", "H4", "C#b4", "Cbb4", "C##4", "Cx", "C4.5", "4C", "C"] {
            match Note::from_scientific_name(bad) {
                Err(NoteError::Parse { input, .. }) => assert_eq!(input, bad),
                other => panic!("`{bad}` parsed as {other:?}"),
            }
        }
    }

    #[test]
    fn octave_out_of_range_is_parse_error() {
        assert!(matches!(
            Note::from_scientific_name("Cb-1"),
            Err(NoteError::Parse { .. })
        ));
        assert!(matches!(
            Note::from_scientific_name("A9"),
            Err(NoteError::Parse { .. })
        ));
    }

    #[test]
    fn lenient_names_default_to_octave_four() {
        assert_eq!(Note::from_name("G").unwrap(), note("G4"));
        assert_eq!("f#".parse::<Note>().unwrap(), note("F#4"));
        assert_eq!(Note::from_name(" Bb2 ").unwrap(), note("Bb2"));
    }

    #[test]
    fn mixed_inputs_convert() {
        let inputs: Vec<NoteInput> = vec![60i32.into(), "E4".into(), note("G4").into()];
        let notes: Vec<Note> = inputs
            .into_iter()
            .map(IntoNote::into_note)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(notes, vec![note("C4"), note("E4"), note("G4")]);
    }

    #[test]
    fn pitch_class_intervals() {
        assert_eq!(PitchClass::G.interval_from(PitchClass::C), 7);
        assert_eq!(PitchClass::C.interval_from(PitchClass::G), 5);
        assert_eq!(PitchClass::of(Letter::C, Accidental::Flat), PitchClass::B);
    }
}
