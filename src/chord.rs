//! Chord
//!
//! Recognition of chord shapes from unordered sets of notes.
//!
//! Notes are collapsed to their pitch classes, so voicing, inversion,
//! doubling and enharmonic spelling never change the result. Every distinct
//! pitch class is tried as a root; the interval set above it must equal a
//! catalogued shape exactly.
//!
//! When several (root, kind) pairs match the same notes, the kind listed
//! earlier in [`ChordKind`] wins, and between equal kinds (the symmetric
//! augmented and diminished-seventh shapes) the root nearest above C wins.
//! So `C E G A` reads as `Am7` rather than `C6`, and `C D G` as `Csus2`
//! rather than `Gsus4`.

use std::fmt::Display;

use log::{debug, trace};

use crate::key_signature::KeySignature;
use crate::note::{IntoNote, Note, NoteError, PitchClass, SEMITONES};
use crate::spelling::{self, Spelling};

/// Fewest distinct pitch classes that can form a chord
pub const MIN_DISTINCT_PITCH_CLASSES: usize = 3;

/// Number of chord kinds in the catalog
const NUM_CHORD_KINDS: usize = 26;

/// Catalogued chord kinds, in tie-break precedence order
const CHORD_KINDS: [ChordKind; NUM_CHORD_KINDS] = [
    ChordKind::Major,
    ChordKind::Minor,
    ChordKind::Diminished,
    ChordKind::Augmented,
    ChordKind::SuspendedSecond,
    ChordKind::SuspendedFourth,
    ChordKind::DominantSeventh,
    ChordKind::MajorSeventh,
    ChordKind::MinorSeventh,
    ChordKind::HalfDiminishedSeventh,
    ChordKind::DiminishedSeventh,
    ChordKind::MinorMajorSeventh,
    ChordKind::AugmentedSeventh,
    ChordKind::AugmentedMajorSeventh,
    ChordKind::DominantSeventhFlatFifth,
    ChordKind::DominantSeventhSuspendedFourth,
    ChordKind::MajorSixth,
    ChordKind::MinorSixth,
    ChordKind::AddNinth,
    ChordKind::MinorAddNinth,
    ChordKind::DominantNinth,
    ChordKind::MajorNinth,
    ChordKind::MinorNinth,
    ChordKind::SixNine,
    ChordKind::DominantEleventh,
    ChordKind::DominantThirteenth,
];

/// Intervals (in semitones) matching `CHORD_KINDS` order
const CHORD_INTERVALS: [&[u8]; NUM_CHORD_KINDS] = [
    &[0, 4, 7],
    &[0, 3, 7],
    &[0, 3, 6],
    &[0, 4, 8],
    &[0, 2, 7],
    &[0, 5, 7],
    &[0, 4, 7, 10],
    &[0, 4, 7, 11],
    &[0, 3, 7, 10],
    &[0, 3, 6, 10],
    &[0, 3, 6, 9],
    &[0, 3, 7, 11],
    &[0, 4, 8, 10],
    &[0, 4, 8, 11],
    &[0, 4, 6, 10],
    &[0, 5, 7, 10],
    &[0, 4, 7, 9],
    &[0, 3, 7, 9],
    &[0, 2, 4, 7],
    &[0, 2, 3, 7],
    &[0, 2, 4, 7, 10],
    &[0, 2, 4, 7, 11],
    &[0, 2, 3, 7, 10],
    &[0, 2, 4, 7, 9],
    &[0, 2, 4, 5, 7, 10],
    &[0, 2, 4, 7, 9, 10],
];

/// Name suffixes matching `CHORD_KINDS` order
const CHORD_SUFFIXES: [&str; NUM_CHORD_KINDS] = [
    "", "m", "dim", "aug", "sus2", "sus4", "7", "maj7", "m7", "m7b5", "dim7", "mMaj7", "aug7",
    "augMaj7", "7b5", "7sus4", "6", "m6", "add9", "madd9", "9", "maj9", "m9", "6/9", "11", "13",
];

/// `CHORD_INTERVALS` as pitch-class bit sets relative to the root
const CHORD_SHAPES: [PitchClassSet; NUM_CHORD_KINDS] = make_chord_shapes();

/// Supported chord kinds
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChordKind {
    /// Major triad (e.g., C-E-G)
    Major,
    /// Minor triad (e.g., C-Eb-G)
    Minor,
    /// Diminished triad (e.g., C-Eb-Gb)
    Diminished,
    /// Augmented triad (e.g., C-E-G#)
    Augmented,
    /// Suspended second (e.g., C-D-G)
    SuspendedSecond,
    /// Suspended fourth (e.g., C-F-G)
    SuspendedFourth,
    /// Dominant seventh (e.g., C-E-G-Bb)
    DominantSeventh,
    /// Major seventh (e.g., C-E-G-B)
    MajorSeventh,
    /// Minor seventh (e.g., C-Eb-G-Bb)
    MinorSeventh,
    /// Half-diminished seventh (e.g., C-Eb-Gb-Bb)
    HalfDiminishedSeventh,
    /// Diminished seventh (e.g., C-Eb-Gb-A)
    DiminishedSeventh,
    /// Minor triad with major seventh (e.g., C-Eb-G-B)
    MinorMajorSeventh,
    /// Augmented triad with minor seventh (e.g., C-E-G#-Bb)
    AugmentedSeventh,
    /// Augmented triad with major seventh (e.g., C-E-G#-B)
    AugmentedMajorSeventh,
    /// Dominant seventh with lowered fifth (e.g., C-E-Gb-Bb)
    DominantSeventhFlatFifth,
    /// Dominant seventh with suspended fourth (e.g., C-F-G-Bb)
    DominantSeventhSuspendedFourth,
    /// Major sixth (e.g., C-E-G-A)
    MajorSixth,
    /// Minor sixth (e.g., C-Eb-G-A)
    MinorSixth,
    /// Major triad with added ninth (e.g., C-D-E-G)
    AddNinth,
    /// Minor triad with added ninth (e.g., C-D-Eb-G)
    MinorAddNinth,
    /// Dominant ninth (e.g., C-D-E-G-Bb)
    DominantNinth,
    /// Major ninth (e.g., C-D-E-G-B)
    MajorNinth,
    /// Minor ninth (e.g., C-D-Eb-G-Bb)
    MinorNinth,
    /// Major sixth with added ninth (e.g., C-D-E-G-A)
    SixNine,
    /// Dominant eleventh (e.g., C-D-E-F-G-Bb)
    DominantEleventh,
    /// Dominant thirteenth without the eleventh (e.g., C-D-E-G-A-Bb)
    DominantThirteenth,
}

impl ChordKind {
    /// Every catalogued kind, in tie-break precedence order.
    pub fn all() -> impl Iterator<Item = ChordKind> {
        CHORD_KINDS.iter().copied()
    }

    /// Semitone intervals above the root, root (0) included.
    pub fn intervals(self) -> &'static [u8] {
        CHORD_INTERVALS[self as usize]
    }

    /// Suffix appended to the root in chord names (`""` for major, `"m"` for minor, ...).
    pub fn suffix(self) -> &'static str {
        CHORD_SUFFIXES[self as usize]
    }
}

impl Display for ChordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Twelve-bit set of pitch classes
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
struct PitchClassSet(u16);

impl PitchClassSet {
    fn insert(&mut self, pitch_class: PitchClass) {
        self.0 |= 1 << pitch_class.index();
    }

    fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// The same set with every member re-expressed as an interval above `root`.
    fn relative_to(self, root: PitchClass) -> PitchClassSet {
        let shift = root.index() as u32;
        let full = (1u16 << SEMITONES) - 1;
        let wide = u32::from(self.0);
        let rotated = (wide >> shift) | (wide << (SEMITONES as u32 - shift));
        PitchClassSet(rotated as u16 & full)
    }
}

/// Compile-time interval bit sets.
const fn make_chord_shapes() -> [PitchClassSet; NUM_CHORD_KINDS] {
    let mut shapes = [PitchClassSet(0); NUM_CHORD_KINDS];
    let mut kind = 0;
    while kind < NUM_CHORD_KINDS {
        let intervals = CHORD_INTERVALS[kind];
        let mut i = 0;
        while i < intervals.len() {
            shapes[kind].0 |= 1 << intervals[i];
            i += 1;
        }
        kind += 1;
    }
    shapes
}

/// A recognized chord.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Chord {
    root: Note,
    kind: ChordKind,
    notes: Vec<Note>,
}

impl Chord {
    /// Recognize a chord from any notes, using the default recognizer.
    ///
    /// Returns `Ok(None)` for fewer than three distinct pitch classes or an
    /// uncatalogued shape; malformed notes are errors.
    pub fn from_notes<I>(notes: I) -> Result<Option<Chord>, NoteError>
    where
        I: IntoIterator,
        I::Item: IntoNote,
    {
        ChordRecognizer::default().recognize(notes)
    }

    /// Recognize whitespace-separated note names such as `"C E G"` or `"Eb4 G4 Bb4"`.
    pub fn parse(text: &str) -> Result<Option<Chord>, NoteError> {
        ChordRecognizer::default().parse(text)
    }

    /// Root note: the lowest input note of the root pitch class, respelled
    /// by the recognizer's spelling policy.
    pub fn root(&self) -> Note {
        self.root
    }

    /// Chord kind.
    pub fn kind(&self) -> ChordKind {
        self.kind
    }

    /// The notes the chord was recognized from, as given.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Chord pitch classes in interval order from the root.
    pub fn pitch_classes(&self) -> Vec<PitchClass> {
        let root = self.root.pitch_class().index();
        self.kind
            .intervals()
            .iter()
            .map(|&interval| PitchClass::from_index(root + interval as usize))
            .collect()
    }

    /// Display name: root name plus kind suffix, e.g. `"C"`, `"Dm"`, `"G7"`.
    pub fn name(&self) -> String {
        format!("{}{}", self.root.name(), self.kind.suffix())
    }
}

impl Display for Chord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

/// Outcome of classifying a note selection.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Recognition {
    /// The notes form a catalogued chord.
    Chord(Chord),
    /// Fewer than [`MIN_DISTINCT_PITCH_CLASSES`] distinct pitch classes.
    TooFewNotes {
        /// How many distinct pitch classes were given.
        distinct: usize,
    },
    /// Enough notes, but no catalogued shape matches.
    Unrecognized,
}

impl Recognition {
    /// The chord, if one was recognized.
    pub fn chord(&self) -> Option<&Chord> {
        match self {
            Recognition::Chord(chord) => Some(chord),
            _ => None,
        }
    }

    /// Consume into the chord, if one was recognized.
    pub fn into_chord(self) -> Option<Chord> {
        match self {
            Recognition::Chord(chord) => Some(chord),
            _ => None,
        }
    }
}

impl Display for Recognition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recognition::Chord(chord) => write!(f, "{chord}"),
            Recognition::TooFewNotes { .. } => f.write_str("Not a chord yet"),
            Recognition::Unrecognized => f.write_str("Invalid chord"),
        }
    }
}

/// Builder for `ChordRecognizer` to customize root spelling
pub struct ChordRecognizerBuilder {
    spelling: Spelling,
    key: Option<KeySignature>,
}

impl ChordRecognizerBuilder {
    /// Create a new builder spelling roots with sharps and no key context
    pub fn new() -> Self {
        ChordRecognizerBuilder {
            spelling: Spelling::Sharps,
            key: None,
        }
    }

    /// Set the spelling for black-key roots when no key context applies
    pub fn spelling(mut self, value: Spelling) -> Self {
        self.spelling = value;
        self
    }

    /// Spell roots for this key: diatonic roots take the key's spelling,
    /// chromatic roots its sharp or flat direction
    pub fn key(mut self, value: KeySignature) -> Self {
        self.key = Some(value);
        self
    }

    /// Build the `ChordRecognizer`
    pub fn build(self) -> ChordRecognizer {
        ChordRecognizer {
            spelling: self.spelling,
            key: self.key,
        }
    }
}

impl Default for ChordRecognizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Stateless chord recognizer; safe to share between threads.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChordRecognizer {
    spelling: Spelling,
    key: Option<KeySignature>,
}

impl ChordRecognizer {
    /// Return a builder to customize spelling and key context
    pub fn builder() -> ChordRecognizerBuilder {
        ChordRecognizerBuilder::new()
    }

    /// Create a recognizer spelling roots with sharps
    pub fn new() -> Self {
        ChordRecognizerBuilder::new().build()
    }

    /// Recognize the chord formed by `notes`, if any.
    pub fn recognize<I>(&self, notes: I) -> Result<Option<Chord>, NoteError>
    where
        I: IntoIterator,
        I::Item: IntoNote,
    {
        Ok(self.classify(notes)?.into_chord())
    }

    /// Recognize whitespace-separated note names.
    pub fn parse(&self, text: &str) -> Result<Option<Chord>, NoteError> {
        self.recognize(text.split_whitespace())
    }

    /// Classify `notes`, telling "too few notes" apart from "no match".
    pub fn classify<I>(&self, notes: I) -> Result<Recognition, NoteError>
    where
        I: IntoIterator,
        I::Item: IntoNote,
    {
        let notes = collect_notes(notes)?;
        let selection = Selection::new(&notes);
        let distinct = selection.set.len();
        if distinct < MIN_DISTINCT_PITCH_CLASSES {
            return Ok(Recognition::TooFewNotes { distinct });
        }

        let candidates = selection.candidates();
        let Some(&(root, kind)) = candidates.first() else {
            debug!("no chord shape matches {:#05x}", selection.set.0);
            return Ok(Recognition::Unrecognized);
        };
        if candidates.len() > 1 {
            debug!(
                "{} readings of {:#05x}, choosing {:?} {:?}",
                candidates.len(),
                selection.set.0,
                root.pitch_class(),
                kind
            );
        }

        let fallback = self.key.map_or(self.spelling, |k| k.chromatic_spelling());
        Ok(Recognition::Chord(Chord {
            root: spelling::respell(&root, self.key.as_ref(), fallback),
            kind,
            notes,
        }))
    }

    /// Every (root, kind) reading of `notes`, best first.
    pub fn candidates<I>(&self, notes: I) -> Result<Vec<(PitchClass, ChordKind)>, NoteError>
    where
        I: IntoIterator,
        I::Item: IntoNote,
    {
        let notes = collect_notes(notes)?;
        let selection = Selection::new(&notes);
        if selection.set.len() < MIN_DISTINCT_PITCH_CLASSES {
            return Ok(Vec::new());
        }
        Ok(selection
            .candidates()
            .into_iter()
            .map(|(root, kind)| (root.pitch_class(), kind))
            .collect())
    }
}

impl Default for ChordRecognizer {
    fn default() -> Self {
        ChordRecognizer::new()
    }
}

fn collect_notes<I>(notes: I) -> Result<Vec<Note>, NoteError>
where
    I: IntoIterator,
    I::Item: IntoNote,
{
    notes.into_iter().map(IntoNote::into_note).collect()
}

/// Input notes keyed by pitch class: the lowest note of each.
struct Selection {
    set: PitchClassSet,
    lowest: [Option<Note>; SEMITONES],
}

impl Selection {
    fn new(notes: &[Note]) -> Self {
        let mut set = PitchClassSet::default();
        let mut lowest: [Option<Note>; SEMITONES] = [None; SEMITONES];
        for note in notes {
            let pc = note.pitch_class();
            set.insert(pc);
            let slot = &mut lowest[pc.index()];
            match *slot {
                Some(held) if held.midi() <= note.midi() => {}
                _ => *slot = Some(*note),
            }
        }
        Selection { set, lowest }
    }

    /// Matching (root note, kind) pairs in tie-break order.
    fn candidates(&self) -> Vec<(Note, ChordKind)> {
        let mut found = Vec::new();
        // ascending pitch class, so equal kinds stay ordered by root
        for root in self.lowest.iter().flatten() {
            let shape = self.set.relative_to(root.pitch_class());
            trace!("root {:?}: intervals {:#05x}", root.pitch_class(), shape.0);
            for (kind_idx, candidate) in CHORD_SHAPES.iter().enumerate() {
                if *candidate == shape {
                    found.push((*root, CHORD_KINDS[kind_idx]));
                }
            }
        }
        found.sort_by_key(|(_, kind)| *kind);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(text: &str) -> Option<String> {
        Chord::parse(text).unwrap().map(|c| c.name())
    }

    #[test]
    fn catalog_tables_line_up() {
        for (idx, kind) in ChordKind::all().enumerate() {
            assert_eq!(kind as usize, idx);
            assert_eq!(kind.intervals()[0], 0);
            assert!(kind.intervals().len() >= MIN_DISTINCT_PITCH_CLASSES);
            assert_eq!(CHORD_SHAPES[idx].len(), kind.intervals().len());
        }
        // every shape is distinct
        for a in 0..NUM_CHORD_KINDS {
            for b in (a + 1)..NUM_CHORD_KINDS {
                assert_ne!(CHORD_SHAPES[a], CHORD_SHAPES[b]);
            }
        }
    }

    #[test]
    fn rotation_expresses_intervals_from_root() {
        let mut set = PitchClassSet::default();
        for pc in [PitchClass::G, PitchClass::B, PitchClass::D] {
            set.insert(pc);
        }
        assert_eq!(set.relative_to(PitchClass::G), CHORD_SHAPES[0]);
        assert_eq!(set.relative_to(PitchClass::C), set);
    }

    #[test]
    fn triads() {
        assert_eq!(name("C E G").as_deref(), Some("C"));
        assert_eq!(name("D F A").as_deref(), Some("Dm"));
        assert_eq!(name("B D F").as_deref(), Some("Bdim"));
        // C F G is also F G C, and sus2 outranks sus4
        assert_eq!(name("C F G").as_deref(), Some("Fsus2"));
        assert_eq!(name("C F G Bb").as_deref(), Some("C7sus4"));
    }

    #[test]
    fn sevenths_and_extensions() {
        assert_eq!(name("G B D F").as_deref(), Some("G7"));
        assert_eq!(name("C E G B").as_deref(), Some("Cmaj7"));
        assert_eq!(name("B D F A").as_deref(), Some("Bm7b5"));
        assert_eq!(name("C D E G Bb").as_deref(), Some("C9"));
        assert_eq!(name("C D E F G Bb").as_deref(), Some("C11"));
    }

    #[test]
    fn tie_break_prefers_earlier_kind_then_lower_root() {
        assert_eq!(name("C E G A").as_deref(), Some("Am7"));
        assert_eq!(name("C D G").as_deref(), Some("Csus2"));
        assert_eq!(name("G C D").as_deref(), Some("Csus2"));
        assert_eq!(name("E G# C").as_deref(), Some("Caug"));
        assert_eq!(name("A C Eb Gb").as_deref(), Some("Cdim7"));
    }

    #[test]
    fn candidates_list_every_reading() {
        let readings = ChordRecognizer::new().candidates(["C", "E", "G", "A"]).unwrap();
        assert_eq!(
            readings,
            vec![
                (PitchClass::A, ChordKind::MinorSeventh),
                (PitchClass::C, ChordKind::MajorSixth),
            ]
        );
        let augmented = ChordRecognizer::new().candidates(["C", "E", "G#"]).unwrap();
        assert_eq!(augmented.len(), 3);
    }

    #[test]
    fn classify_distinguishes_outcomes() {
        let recognizer = ChordRecognizer::new();
        assert_eq!(
            recognizer.classify(["C4", "E4", "C5"]).unwrap(),
            Recognition::TooFewNotes { distinct: 2 }
        );
        assert_eq!(
            recognizer.classify(["C", "D", "E"]).unwrap(),
            Recognition::Unrecognized
        );
        assert_eq!(recognizer.classify(["C", "D", "E"]).unwrap().to_string(), "Invalid chord");
        assert_eq!(
            recognizer.classify(Vec::<Note>::new()).unwrap().to_string(),
            "Not a chord yet"
        );
        assert_eq!(recognizer.classify([60, 64, 67]).unwrap().to_string(), "C");
    }

    #[test]
    fn root_keeps_lowest_octave_of_root() {
        let chord = Chord::parse("E4 G4 C5 C3").unwrap().unwrap();
        assert_eq!(chord.root().scientific_name(), "C3");
        assert_eq!(chord.notes().len(), 4);
        assert_eq!(
            chord.pitch_classes(),
            vec![PitchClass::C, PitchClass::E, PitchClass::G]
        );
    }

    #[test]
    fn spelling_and_key_context() {
        let flats = ChordRecognizer::builder().spelling(Spelling::Flats).build();
        assert_eq!(flats.parse("C# F G#").unwrap().unwrap().name(), "Db");

        let a_flat_major = KeySignature::named("Ab major").unwrap();
        let in_key = ChordRecognizer::builder().key(a_flat_major).build();
        assert_eq!(in_key.parse("G# C D#").unwrap().unwrap().name(), "Ab");

        let d_major = KeySignature::named("D major").unwrap();
        let sharp_key = ChordRecognizer::builder()
            .spelling(Spelling::Flats)
            .key(d_major)
            .build();
        // Bb is chromatic in D major; the key's sharp direction applies
        assert_eq!(sharp_key.parse("Bb D F").unwrap().unwrap().name(), "A#");
    }

    #[test]
    fn malformed_note_propagates() {
        assert!(matches!(
            Chord::parse("C E Q"),
            Err(NoteError::Parse { .. })
        ));
        assert!(matches!(
            Chord::from_notes([60, 64, 200]),
            Err(NoteError::OutOfRange { value: 200 })
        ));
    }
}
