//! Low-level MIDI events on an absolute tick timeline
//!
//! Produced only by the deinterleaver. Each kind maps to exactly one
//! message in the track chunk.

use serde::Serialize;

use crate::events::KeyMode;

/// Ordering of kinds sharing a tick (lower first)
pub(crate) mod priority {
    pub const HEADER_META: u8 = 0;
    pub const META: u8 = 1;
    pub const CHANNEL: u8 = 2;
    pub const NOTE_OFF: u8 = 3;
    /// Also taken by the Note-Off of a zero-length note
    pub const NOTE_ON: u8 = 4;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum MidiEventKind {
    NoteOn { channel: u8, pitch: u8, velocity: u8 },
    NoteOff { channel: u8, pitch: u8, velocity: u8 },
    Controller { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    /// 14-bit value, 0x2000 is centre
    PitchWheel { channel: u8, value: u16 },
    ChannelPressure { channel: u8, pressure: u8 },
    Tempo { micros_per_quarter: u32 },
    TimeSignature { numerator: u8, denominator_power: u8, clocks_per_tick: u8 },
    KeySignature { accidentals: i8, mode: KeyMode },
    TrackName(String),
    Text(String),
    Copyright(String),
    SysEx { manufacturer: u8, payload: Vec<u8> },
    UniversalSysEx { real_time: bool, code: u8, subcode: u8, payload: Vec<u8> },
}

impl MidiEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            MidiEventKind::NoteOn { .. } => "NoteOn",
            MidiEventKind::NoteOff { .. } => "NoteOff",
            MidiEventKind::Controller { .. } => "ControllerEvent",
            MidiEventKind::ProgramChange { .. } => "ProgramChange",
            MidiEventKind::PitchWheel { .. } => "PitchWheelEvent",
            MidiEventKind::ChannelPressure { .. } => "ChannelPressure",
            MidiEventKind::Tempo { .. } => "Tempo",
            MidiEventKind::TimeSignature { .. } => "TimeSignature",
            MidiEventKind::KeySignature { .. } => "KeySignature",
            MidiEventKind::TrackName(_) => "TrackName",
            MidiEventKind::Text(_) => "Text",
            MidiEventKind::Copyright(_) => "Copyright",
            MidiEventKind::SysEx { .. } => "SysEx",
            MidiEventKind::UniversalSysEx { .. } => "UniversalSysEx",
        }
    }

    pub(crate) fn default_priority(&self) -> u8 {
        match self {
            MidiEventKind::TrackName(_) | MidiEventKind::TimeSignature { .. } | MidiEventKind::Copyright(_) => {
                priority::HEADER_META
            }
            MidiEventKind::Tempo { .. } | MidiEventKind::KeySignature { .. } | MidiEventKind::Text(_) => {
                priority::META
            }
            MidiEventKind::Controller { .. }
            | MidiEventKind::ProgramChange { .. }
            | MidiEventKind::PitchWheel { .. }
            | MidiEventKind::ChannelPressure { .. }
            | MidiEventKind::SysEx { .. }
            | MidiEventKind::UniversalSysEx { .. } => priority::CHANNEL,
            MidiEventKind::NoteOff { .. } => priority::NOTE_OFF,
            MidiEventKind::NoteOn { .. } => priority::NOTE_ON,
        }
    }

    /// (channel, pitch) of a note event
    pub(crate) fn note_key(&self) -> Option<(u8, u8)> {
        match *self {
            MidiEventKind::NoteOn { channel, pitch, .. } | MidiEventKind::NoteOff { channel, pitch, .. } => {
                Some((channel, pitch))
            }
            _ => None,
        }
    }
}

/// A low-level event at an absolute tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MidiEvent {
    pub tick: u64,
    pub kind: MidiEventKind,
    #[serde(skip)]
    pub(crate) priority: u8,
}

impl MidiEvent {
    pub fn new(tick: u64, kind: MidiEventKind) -> Self {
        let priority = kind.default_priority();
        Self { tick, kind, priority }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub(crate) fn sort_key(&self) -> (u64, u8) {
        (self.tick, self.priority)
    }
}
