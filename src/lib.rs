//! # chord_finder
//!
//! Name the chord under your fingers: model notes and key signatures, and
//! recognize chord shapes from any set of pressed keys, whatever their order,
//! octave or spelling.
//!
//! ## Example
//! ```rust
//! use chord_finder::{Chord, ChordRecognizer, KeySignature, Note, Spelling};
//!
//! fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1) Notes from text or MIDI
//!     let a4 = Note::from_scientific_name("A4")?;
//!     assert!((a4.frequency() - 440.0).abs() < 1e-9);
//!     assert_eq!(Note::from_midi(63)?.name(), "D#");
//!
//!     // 2) Chords from any mix of inputs, in any inversion
//!     let chord = Chord::parse("E G C")?.expect("C major");
//!     assert_eq!(chord.name(), "C");
//!     assert_eq!(Chord::from_notes([55, 59, 62, 65])?.map(|c| c.name()), Some("G7".into()));
//!     assert!(Chord::parse("C D E")?.is_none());
//!
//!     // 3) Key-aware spelling
//!     let d_major = KeySignature::named("D major")?;
//!     assert!(d_major.is_in_key(&Note::from_scientific_name("F#4")?));
//!     let recognizer = ChordRecognizer::builder()
//!         .spelling(Spelling::Flats)
//!         .key(d_major)
//!         .build();
//!     assert_eq!(recognizer.parse("Gb Bb Db")?.map(|c| c.name()), Some("F#".into()));
//!
//!     Ok(())
//! }
//! # run().unwrap();
//! ```
//!
//! ## Features
//! - `serde`: `Serialize`/`Deserialize` for notes, keys and chord kinds

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rust_2018_idioms)]
#![deny(clippy::all)]

/// Chord recognition API.
pub use chord::{
    Chord, ChordKind, ChordRecognizer, ChordRecognizerBuilder, Recognition,
    MIN_DISTINCT_PITCH_CLASSES,
};

/// Key-signature catalog.
pub use key_signature::{KeySignature, KeySignatureError, Mode};

/// Notes and pitch classes.
pub use note::{
    Accidental, IntoNote, Letter, Note, NoteError, NoteInput, PitchClass, DEFAULT_OCTAVE,
    MIDI_MAX, MIDI_MIN,
};

/// Spelling policy.
pub use spelling::{canonical_spelling, Spelling};

/// Chord recognition module.
pub mod chord;

/// Key-signature module.
pub mod key_signature;

/// Note module.
pub mod note;

/// Enharmonic spelling module.
pub mod spelling;
