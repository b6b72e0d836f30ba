//! Note expansion and event ordering
//!
//! Turns a track's authored events into the time-ordered low-level stream
//! the encoder writes:
//! 1. every note becomes a Note-On at its start and a Note-Off at start + duration
//! 2. all times are converted to ticks and moved by the file-wide offset
//! 3. events are ordered by tick, then by kind, then by insertion order

use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::mem;

use super::midi_event::{priority, MidiEvent, MidiEventKind};
use crate::config::{FileConfig, MAX_TICK};
use crate::error::{Result, SmfError};
use crate::events::{tempo_to_micros, Event, EventKind};

/// Earliest start tick among `events`, before any shift
pub fn earliest_tick(events: &[Event], config: &FileConfig) -> Result<Option<i64>> {
    let mut earliest: Option<i64> = None;
    for event in events {
        let tick = config.to_ticks(event.time)?;
        earliest = Some(earliest.map_or(tick, |current| current.min(tick)));
    }
    Ok(earliest)
}

/// Expand and order `events`, subtracting `offset` ticks from every time
///
/// Fails when a shifted tick falls outside `0..=MAX_TICK`.
pub fn deinterleave(events: &[Event], config: &FileConfig, offset: i64) -> Result<Vec<MidiEvent>> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(events.len() * 2);
    for event in events {
        if config.remove_duplicates && !seen.insert(Identity(event)) {
            log::trace!("Dropping duplicate {} at {}", event.name(), event.time);
            continue;
        }
        expand_event(event, config, offset, &mut out)?;
    }

    // Stable: equal keys keep insertion order
    out.sort_by_key(MidiEvent::sort_key);

    if config.deinterleave {
        truncate_overlapping_notes(&mut out);
        out.sort_by_key(MidiEvent::sort_key);
    }

    Ok(out)
}

/// Equality of authored events, hashable for duplicate detection
struct Identity<'a>(&'a Event);

impl PartialEq for Identity<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Identity<'_> {}

impl Hash for Identity<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        float_bits(self.0.time).hash(state);
        mem::discriminant(&self.0.kind).hash(state);
        match &self.0.kind {
            EventKind::Note {
                channel,
                pitch,
                duration,
                volume,
                ..
            } => {
                (channel, pitch, volume).hash(state);
                float_bits(*duration).hash(state);
            }
            EventKind::Tempo { bpm } => float_bits(*bpm).hash(state),
            EventKind::Controller {
                channel,
                controller,
                value,
            } => (channel, controller, value).hash(state),
            _ => {}
        }
    }
}

/// Bits of a float with both zeros mapped to `+0.0`, so `==` implies equal hashes
fn float_bits(value: f64) -> u64 {
    (value + 0.0).to_bits()
}

fn shifted(ticks: i64, offset: i64) -> Result<u64> {
    match ticks.checked_sub(offset) {
        Some(tick) if (0..=MAX_TICK).contains(&tick) => Ok(tick as u64),
        _ => Err(SmfError::InvalidRange {
            what: "tick",
            value: ticks,
        }),
    }
}

fn expand_event(event: &Event, config: &FileConfig, offset: i64, out: &mut Vec<MidiEvent>) -> Result<()> {
    let start = config.to_ticks(event.time)?;
    let tick = shifted(start, offset)?;

    let kind = match &event.kind {
        EventKind::Note {
            channel,
            pitch,
            duration,
            volume,
            ..
        } => {
            let length = config.to_ticks(*duration)?;
            let end = start.checked_add(length).ok_or(SmfError::InvalidRange {
                what: "tick",
                value: start,
            })?;
            let off_tick = shifted(end, offset)?;
            log::trace!("Note {} on channel {}: ticks {}..{}", pitch, channel, tick, off_tick);

            out.push(MidiEvent::new(
                tick,
                MidiEventKind::NoteOn {
                    channel: *channel,
                    pitch: *pitch,
                    velocity: *volume,
                },
            ));

            let mut note_off = MidiEvent::new(
                off_tick,
                MidiEventKind::NoteOff {
                    channel: *channel,
                    pitch: *pitch,
                    velocity: *volume,
                },
            );
            // A zero-length Note-Off sorts with the Note-Ons, right behind its own
            if length == 0 {
                note_off.priority = priority::NOTE_ON;
            }
            out.push(note_off);
            return Ok(());
        }
        EventKind::Tempo { bpm } => MidiEventKind::Tempo {
            micros_per_quarter: tempo_to_micros(*bpm)?,
        },
        EventKind::TimeSignature {
            numerator,
            denominator,
            clocks_per_tick,
        } => MidiEventKind::TimeSignature {
            numerator: *numerator,
            denominator_power: denominator.trailing_zeros() as u8,
            clocks_per_tick: *clocks_per_tick,
        },
        EventKind::KeySignature { accidentals, mode } => MidiEventKind::KeySignature {
            accidentals: *accidentals,
            mode: *mode,
        },
        EventKind::ProgramChange { channel, program } => MidiEventKind::ProgramChange {
            channel: *channel,
            program: *program,
        },
        EventKind::TrackName(name) => MidiEventKind::TrackName(name.clone()),
        EventKind::Text(text) => MidiEventKind::Text(text.clone()),
        EventKind::Copyright(notice) => MidiEventKind::Copyright(notice.clone()),
        EventKind::Controller {
            channel,
            controller,
            value,
        } => MidiEventKind::Controller {
            channel: *channel,
            controller: *controller,
            value: *value,
        },
        EventKind::PitchWheel { channel, value } => MidiEventKind::PitchWheel {
            channel: *channel,
            value: (i32::from(*value) + 0x2000) as u16,
        },
        EventKind::ChannelPressure { channel, pressure } => MidiEventKind::ChannelPressure {
            channel: *channel,
            pressure: *pressure,
        },
        EventKind::SysEx { manufacturer, payload } => MidiEventKind::SysEx {
            manufacturer: *manufacturer,
            payload: payload.clone(),
        },
        EventKind::UniversalSysEx {
            real_time,
            code,
            subcode,
            payload,
        } => MidiEventKind::UniversalSysEx {
            real_time: *real_time,
            code: *code,
            subcode: *subcode,
            payload: payload.clone(),
        },
    };

    out.push(MidiEvent::new(tick, kind));
    Ok(())
}

/// When a (channel, pitch) is struck while still sounding, end the sounding
/// note where the new one starts
///
/// `events` must already be in tick order.
fn truncate_overlapping_notes(events: &mut [MidiEvent]) {
    let mut sounding: HashMap<(u8, u8), Vec<u64>> = HashMap::new();

    for event in events.iter_mut() {
        let key = match event.kind.note_key() {
            Some(key) => key,
            None => continue,
        };
        let starts = sounding.entry(key).or_default();

        match event.kind {
            MidiEventKind::NoteOn { .. } => starts.push(event.tick),
            MidiEventKind::NoteOff { .. } => {
                if starts.len() > 1 {
                    if let Some(restart) = starts.pop() {
                        log::debug!(
                            "Note {} on channel {} cut short: tick {} -> {}",
                            key.1,
                            key.0,
                            event.tick,
                            restart
                        );
                        event.tick = restart;
                    }
                } else {
                    starts.pop();
                }
            }
            _ => {}
        }
    }
}
