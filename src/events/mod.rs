//! Musical events as the caller authors them
//!
//! Times are in beats (quarter notes) unless the file is configured for tick
//! times. Every constructor validates its fields, so an [`Event`] that exists
//! can always be rendered.

pub mod composite;

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::error::{check_range, Result, SmfError};

pub use composite::{note_tuning, nrpn_call, tuning_bank_change, tuning_program_change};

/// Highest data byte value (7 bits)
pub const MAX_DATA: u8 = 0x7F;

/// Highest channel number (16 channels, zero-based)
pub const MAX_CHANNEL: u8 = 0x0F;

/// Largest tempo value the 3-byte Set Tempo meta event can hold
pub const MAX_MICROS_PER_QUARTER: u32 = 0x00FF_FFFF;

/// Major or minor key, as written into the key signature meta event
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
pub enum KeyMode {
    Major = 0,
    Minor = 1,
}

/// A single event on a track, positioned at `time`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub time: f64,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// A sounding note; expands into Note-On and Note-Off on close
    Note {
        channel: u8,
        pitch: u8,
        duration: f64,
        volume: u8,
        annotation: Option<String>,
    },

    Tempo {
        bpm: f64,
    },

    /// `denominator` is the written denominator (4 for 3/4), a power of two
    TimeSignature {
        numerator: u8,
        denominator: u8,
        clocks_per_tick: u8,
    },

    /// Negative `accidentals` count flats, positive count sharps
    KeySignature {
        accidentals: i8,
        mode: KeyMode,
    },

    ProgramChange {
        channel: u8,
        program: u8,
    },

    TrackName(String),

    Text(String),

    Copyright(String),

    Controller {
        channel: u8,
        controller: u8,
        value: u8,
    },

    /// Bend relative to centre, -8192..=8191
    PitchWheel {
        channel: u8,
        value: i16,
    },

    ChannelPressure {
        channel: u8,
        pressure: u8,
    },

    /// Manufacturer-specific system exclusive message
    SysEx {
        manufacturer: u8,
        payload: Vec<u8>,
    },

    /// Universal (standardised) system exclusive message, addressed to all devices
    UniversalSysEx {
        real_time: bool,
        code: u8,
        subcode: u8,
        payload: Vec<u8>,
    },
}

fn check_finite(what: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(SmfError::NotFinite(what));
    }
    Ok(value)
}

fn check_channel(channel: u8) -> Result<u8> {
    check_range("channel", channel, 0, MAX_CHANNEL)
}

fn check_data(what: &'static str, value: u8) -> Result<u8> {
    check_range(what, value, 0, MAX_DATA)
}

fn check_payload(what: &'static str, payload: &[u8]) -> Result<()> {
    if payload.is_empty() {
        return Err(SmfError::EmptyPayload(what));
    }
    Ok(())
}

/// Microseconds per quarter note for a tempo in beats per minute
///
/// Fails unless the result fits the three bytes of a Set Tempo event.
pub fn tempo_to_micros(bpm: f64) -> Result<u32> {
    let bpm = check_finite("tempo", bpm)?;
    let micros = if bpm > 0.0 { (60_000_000.0 / bpm).round() } else { 0.0 };
    if micros < 1.0 || micros > f64::from(MAX_MICROS_PER_QUARTER) {
        return Err(SmfError::InvalidRange {
            what: "tempo",
            value: bpm as i64,
        });
    }
    Ok(micros as u32)
}

impl Event {
    /// Build an event, checking every field against the limits of the format
    pub fn new(time: f64, kind: EventKind) -> Result<Self> {
        let event = Event { time, kind };
        event.validate()?;
        Ok(event)
    }

    /// Check the fields of an event that may have been built or deserialized directly
    pub fn validate(&self) -> Result<()> {
        check_finite("event time", self.time)?;
        match &self.kind {
            EventKind::Note {
                channel,
                pitch,
                duration,
                volume,
                ..
            } => {
                check_channel(*channel)?;
                check_data("pitch", *pitch)?;
                check_data("volume", *volume)?;
                if check_finite("duration", *duration)? < 0.0 {
                    return Err(SmfError::InvalidRange {
                        what: "duration",
                        value: *duration as i64,
                    });
                }
            }
            EventKind::Tempo { bpm } => {
                tempo_to_micros(*bpm)?;
            }
            EventKind::TimeSignature {
                numerator, denominator, ..
            } => {
                check_range("time signature numerator", *numerator, 1, u8::MAX)?;
                if !denominator.is_power_of_two() {
                    return Err(SmfError::InvalidRange {
                        what: "time signature denominator",
                        value: (*denominator).into(),
                    });
                }
            }
            EventKind::KeySignature { accidentals, .. } => {
                check_range("key signature accidentals", *accidentals, -7, 7)?;
            }
            EventKind::ProgramChange { channel, program } => {
                check_channel(*channel)?;
                check_data("program", *program)?;
            }
            EventKind::TrackName(_) | EventKind::Text(_) | EventKind::Copyright(_) => {}
            EventKind::Controller {
                channel,
                controller,
                value,
            } => {
                check_channel(*channel)?;
                check_data("controller number", *controller)?;
                check_data("controller value", *value)?;
            }
            EventKind::PitchWheel { channel, value } => {
                check_channel(*channel)?;
                check_range("pitch wheel value", *value, -8192, 8191)?;
            }
            EventKind::ChannelPressure { channel, pressure } => {
                check_channel(*channel)?;
                check_data("channel pressure", *pressure)?;
            }
            EventKind::SysEx { manufacturer, payload } => {
                check_payload("sysex", payload)?;
                check_data("manufacturer id", *manufacturer)?;
            }
            EventKind::UniversalSysEx {
                code, subcode, payload, ..
            } => {
                check_payload("universal sysex", payload)?;
                check_data("sysex code", *code)?;
                check_data("sysex subcode", *subcode)?;
            }
        }
        Ok(())
    }

    pub fn note(time: f64, channel: u8, pitch: u8, duration: f64, volume: u8) -> Result<Self> {
        Event::new(
            time,
            EventKind::Note {
                channel,
                pitch,
                duration,
                volume,
                annotation: None,
            },
        )
    }

    /// Attach free text to a note; other kinds are returned unchanged
    pub fn with_annotation(mut self, text: impl Into<String>) -> Self {
        if let EventKind::Note { annotation, .. } = &mut self.kind {
            *annotation = Some(text.into());
        }
        self
    }

    pub fn tempo(time: f64, bpm: f64) -> Result<Self> {
        Event::new(time, EventKind::Tempo { bpm })
    }

    pub fn time_signature(time: f64, numerator: u8, denominator: u8, clocks_per_tick: u8) -> Result<Self> {
        Event::new(
            time,
            EventKind::TimeSignature {
                numerator,
                denominator,
                clocks_per_tick,
            },
        )
    }

    pub fn key_signature(time: f64, accidentals: i8, mode: KeyMode) -> Result<Self> {
        Event::new(time, EventKind::KeySignature { accidentals, mode })
    }

    pub fn program_change(time: f64, channel: u8, program: u8) -> Result<Self> {
        Event::new(time, EventKind::ProgramChange { channel, program })
    }

    pub fn track_name(time: f64, name: impl Into<String>) -> Result<Self> {
        Event::new(time, EventKind::TrackName(name.into()))
    }

    pub fn text(time: f64, text: impl Into<String>) -> Result<Self> {
        Event::new(time, EventKind::Text(text.into()))
    }

    pub fn copyright(time: f64, notice: impl Into<String>) -> Result<Self> {
        Event::new(time, EventKind::Copyright(notice.into()))
    }

    pub fn controller(time: f64, channel: u8, controller: u8, value: u8) -> Result<Self> {
        Event::new(
            time,
            EventKind::Controller {
                channel,
                controller,
                value,
            },
        )
    }

    pub fn pitch_wheel(time: f64, channel: u8, value: i16) -> Result<Self> {
        Event::new(time, EventKind::PitchWheel { channel, value })
    }

    pub fn channel_pressure(time: f64, channel: u8, pressure: u8) -> Result<Self> {
        Event::new(time, EventKind::ChannelPressure { channel, pressure })
    }

    pub fn sys_ex(time: f64, manufacturer: u8, payload: impl Into<Vec<u8>>) -> Result<Self> {
        Event::new(
            time,
            EventKind::SysEx {
                manufacturer,
                payload: payload.into(),
            },
        )
    }

    pub fn universal_sys_ex(
        time: f64,
        code: u8,
        subcode: u8,
        payload: impl Into<Vec<u8>>,
        real_time: bool,
    ) -> Result<Self> {
        Event::new(
            time,
            EventKind::UniversalSysEx {
                real_time,
                code,
                subcode,
                payload: payload.into(),
            },
        )
    }

    /// Short name of the event kind
    pub fn name(&self) -> &'static str {
        match self.kind {
            EventKind::Note { .. } => "Note",
            EventKind::Tempo { .. } => "Tempo",
            EventKind::TimeSignature { .. } => "TimeSignature",
            EventKind::KeySignature { .. } => "KeySignature",
            EventKind::ProgramChange { .. } => "ProgramChange",
            EventKind::TrackName(_) => "TrackName",
            EventKind::Text(_) => "Text",
            EventKind::Copyright(_) => "Copyright",
            EventKind::Controller { .. } => "ControllerEvent",
            EventKind::PitchWheel { .. } => "PitchWheelEvent",
            EventKind::ChannelPressure { .. } => "ChannelPressure",
            EventKind::SysEx { .. } => "SysEx",
            EventKind::UniversalSysEx { .. } => "UniversalSysEx",
        }
    }
}
