//! Track chunk payload encoding
//!
//! Writes each event as a delta-time followed by its message bytes. The
//! encoder never reorders or drops events; ordering is the deinterleaver's job.

use super::midi_event::{MidiEvent, MidiEventKind};
use crate::vlq::write_vlq;

pub const STATUS_NOTE_OFF: u8 = 0x80;
pub const STATUS_NOTE_ON: u8 = 0x90;
pub const STATUS_CONTROLLER: u8 = 0xB0;
pub const STATUS_PROGRAM_CHANGE: u8 = 0xC0;
pub const STATUS_CHANNEL_PRESSURE: u8 = 0xD0;
pub const STATUS_PITCH_WHEEL: u8 = 0xE0;

pub const SYSEX_START: u8 = 0xF0;
pub const SYSEX_END: u8 = 0xF7;
pub const SYSEX_NON_REAL_TIME: u8 = 0x7E;
pub const SYSEX_REAL_TIME: u8 = 0x7F;
/// Universal sysex device id addressing every device
pub const SYSEX_ALL_CALL: u8 = 0x7F;

pub const META: u8 = 0xFF;
pub const META_TEXT: u8 = 0x01;
pub const META_COPYRIGHT: u8 = 0x02;
pub const META_TRACK_NAME: u8 = 0x03;
pub const META_END_OF_TRACK: u8 = 0x2F;
pub const META_TEMPO: u8 = 0x51;
pub const META_TIME_SIGNATURE: u8 = 0x58;
pub const META_KEY_SIGNATURE: u8 = 0x59;

/// 32nd notes per MIDI quarter note, written into every time signature
const THIRTY_SECONDS_PER_QUARTER: u8 = 0x08;

/// Render time-ordered events into a track chunk payload
///
/// Delta-times are measured from tick 0 for the first event. The
/// End-of-Track meta event is appended with a delta of 0.
pub fn render(events: &[MidiEvent]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(events.len() * 4 + 4);
    let mut previous = 0u64;

    for event in events {
        write_vlq(event.tick.saturating_sub(previous), &mut buffer);
        write_event(&event.kind, &mut buffer);
        previous = event.tick;
    }

    write_vlq(0, &mut buffer);
    buffer.extend_from_slice(&[META, META_END_OF_TRACK, 0x00]);
    buffer
}

/// Write a single event to the buffer (without delta-time)
pub fn write_event(kind: &MidiEventKind, buffer: &mut Vec<u8>) {
    match kind {
        MidiEventKind::NoteOn {
            channel,
            pitch,
            velocity,
        } => buffer.extend_from_slice(&[STATUS_NOTE_ON | channel, *pitch, *velocity]),
        MidiEventKind::NoteOff {
            channel,
            pitch,
            velocity,
        } => buffer.extend_from_slice(&[STATUS_NOTE_OFF | channel, *pitch, *velocity]),
        MidiEventKind::Controller {
            channel,
            controller,
            value,
        } => buffer.extend_from_slice(&[STATUS_CONTROLLER | channel, *controller, *value]),
        MidiEventKind::ProgramChange { channel, program } => {
            buffer.extend_from_slice(&[STATUS_PROGRAM_CHANGE | channel, *program])
        }
        MidiEventKind::ChannelPressure { channel, pressure } => {
            buffer.extend_from_slice(&[STATUS_CHANNEL_PRESSURE | channel, *pressure])
        }
        MidiEventKind::PitchWheel { channel, value } => buffer.extend_from_slice(&[
            STATUS_PITCH_WHEEL | channel,
            (value & 0x7F) as u8,
            ((value >> 7) & 0x7F) as u8,
        ]),
        MidiEventKind::Tempo { micros_per_quarter } => {
            buffer.extend_from_slice(&[META, META_TEMPO, 0x03]);
            // Low three bytes, big-endian
            buffer.extend_from_slice(&micros_per_quarter.to_be_bytes()[1..]);
        }
        MidiEventKind::TimeSignature {
            numerator,
            denominator_power,
            clocks_per_tick,
        } => buffer.extend_from_slice(&[
            META,
            META_TIME_SIGNATURE,
            0x04,
            *numerator,
            *denominator_power,
            *clocks_per_tick,
            THIRTY_SECONDS_PER_QUARTER,
        ]),
        MidiEventKind::KeySignature { accidentals, mode } => {
            buffer.extend_from_slice(&[META, META_KEY_SIGNATURE, 0x02, *accidentals as u8, *mode as u8])
        }
        MidiEventKind::TrackName(text) => write_text(META_TRACK_NAME, text, buffer),
        MidiEventKind::Text(text) => write_text(META_TEXT, text, buffer),
        MidiEventKind::Copyright(text) => write_text(META_COPYRIGHT, text, buffer),
        MidiEventKind::SysEx { manufacturer, payload } => {
            buffer.push(SYSEX_START);
            // manufacturer id + payload + terminator
            write_vlq(payload.len() as u64 + 2, buffer);
            buffer.push(*manufacturer);
            buffer.extend_from_slice(payload);
            buffer.push(SYSEX_END);
        }
        MidiEventKind::UniversalSysEx {
            real_time,
            code,
            subcode,
            payload,
        } => {
            buffer.push(SYSEX_START);
            // realtime flag + device id + code + subcode + payload + terminator
            write_vlq(payload.len() as u64 + 5, buffer);
            buffer.push(if *real_time { SYSEX_REAL_TIME } else { SYSEX_NON_REAL_TIME });
            buffer.push(SYSEX_ALL_CALL);
            buffer.push(*code);
            buffer.push(*subcode);
            buffer.extend_from_slice(payload);
            buffer.push(SYSEX_END);
        }
    }
}

fn write_text(meta_type: u8, text: &str, buffer: &mut Vec<u8>) {
    buffer.push(META);
    buffer.push(meta_type);
    write_vlq(text.len() as u64, buffer);
    buffer.extend_from_slice(text.as_bytes());
}
