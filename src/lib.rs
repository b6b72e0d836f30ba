//! Standard MIDI File builder
//!
//! Accumulates musical events (notes, tempo, time signatures, program and
//! controller changes, system-exclusive messages, note tunings) per track and
//! renders them into the byte layout of a Standard MIDI File.
//!
//! The pipeline runs in one direction:
//! events → deinterleave (expand notes, order by tick) → track encoding → file framing.
//!
//! ```rust
//! use smf_builder::MidiFile;
//!
//! let mut midi = MidiFile::new(1)?;
//! midi.add_tempo(0, 0.0, 120.0)?;
//! midi.add_note(0, 0, 60, 0.0, 1.0, 100)?;
//! midi.close()?;
//! let bytes = midi.bytes()?;
//! assert_eq!(&bytes[0..4], b"MThd");
//! # Ok::<(), smf_builder::SmfError>(())
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod file;
pub mod track;
pub mod tuning;
pub mod vlq;

// Re-export commonly used types
pub use config::{FileConfig, SmfFormat, DEFAULT_TICKS_PER_QUARTERNOTE};
pub use error::{Result, SmfError};
pub use events::{Event, EventKind, KeyMode};
pub use file::{MidiFile, RenderedFile};
pub use track::{ClosedTrack, MidiEvent, MidiEventKind, Track};
pub use tuning::{frequency_to_tuning, tuning_to_frequency, Tuning};
