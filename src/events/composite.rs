//! Multi-message idioms built from the primitive events
//!
//! Tuning bank/program selection and NRPN calls are four controller messages
//! sent back to back; a note-tuning change is one universal sysex message.

use super::Event;
use crate::error::{check_range, Result, SmfError};
use crate::tuning::frequency_to_tuning;

/// Non-registered parameter number, most significant byte
pub const NRPN_MSB: u8 = 99;
/// Non-registered parameter number, least significant byte
pub const NRPN_LSB: u8 = 98;
/// Registered parameter number, most significant byte
pub const RPN_MSB: u8 = 0x65;
/// Registered parameter number, least significant byte
pub const RPN_LSB: u8 = 0x64;
pub const DATA_ENTRY_MSB: u8 = 0x06;
pub const DATA_ENTRY_LSB: u8 = 0x26;

/// Registered parameter: tuning program select
pub const RPN_TUNING_PROGRAM: u8 = 0x03;
/// Registered parameter: tuning bank select
pub const RPN_TUNING_BANK: u8 = 0x04;

/// Universal sysex sub-ID #1: MIDI Tuning Standard
pub const SYSEX_MIDI_TUNING: u8 = 0x08;
/// Universal sysex sub-ID #2: single note tuning change
pub const SYSEX_NOTE_TUNING_CHANGE: u8 = 0x02;

fn parameter_call(
    time: f64,
    channel: u8,
    (select_msb, select_lsb): (u8, u8),
    parameter: (u8, u8),
    data: (u8, u8),
) -> Result<[Event; 4]> {
    Ok([
        Event::controller(time, channel, select_msb, parameter.0)?,
        Event::controller(time, channel, select_lsb, parameter.1)?,
        Event::controller(time, channel, DATA_ENTRY_MSB, data.0)?,
        Event::controller(time, channel, DATA_ENTRY_LSB, data.1)?,
    ])
}

/// Select tuning bank `bank` on `channel`
pub fn tuning_bank_change(time: f64, channel: u8, bank: u8) -> Result<[Event; 4]> {
    parameter_call(time, channel, (RPN_MSB, RPN_LSB), (0x00, RPN_TUNING_BANK), (0x00, bank))
}

/// Select tuning program `program` on `channel`
pub fn tuning_program_change(time: f64, channel: u8, program: u8) -> Result<[Event; 4]> {
    parameter_call(
        time,
        channel,
        (RPN_MSB, RPN_LSB),
        (0x00, RPN_TUNING_PROGRAM),
        (0x00, program),
    )
}

/// Set non-registered parameter (`msb`, `lsb`) to (`data_msb`, `data_lsb`)
pub fn nrpn_call(time: f64, channel: u8, msb: u8, lsb: u8, data_msb: u8, data_lsb: u8) -> Result<[Event; 4]> {
    parameter_call(time, channel, (NRPN_MSB, NRPN_LSB), (msb, lsb), (data_msb, data_lsb))
}

/// Retune individual notes of tuning program `program`
///
/// Each entry of `tunings` is a (MIDI note, frequency in Hz) pair.
pub fn note_tuning(time: f64, tunings: &[(u8, f64)], program: u8, real_time: bool) -> Result<Event> {
    if tunings.is_empty() {
        return Err(SmfError::EmptyPayload("note tuning"));
    }
    let count = check_range("note tuning count", tunings.len() as i64, 1, 127)?;
    let program = check_range("tuning program", program, 0, 127)?;

    let mut payload = Vec::with_capacity(2 + tunings.len() * 4);
    payload.push(program);
    payload.push(count as u8);
    for &(pitch, hz) in tunings {
        payload.push(check_range("pitch", pitch, 0, 127)?);
        if !hz.is_finite() {
            return Err(SmfError::NotFinite("frequency"));
        }
        if hz <= 0.0 {
            return Err(SmfError::InvalidRange {
                what: "frequency",
                value: hz as i64,
            });
        }
        payload.extend_from_slice(&frequency_to_tuning(hz).to_bytes());
    }

    Event::universal_sys_ex(time, SYSEX_MIDI_TUNING, SYSEX_NOTE_TUNING_CHANGE, payload, real_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    fn controllers(events: &[Event]) -> Vec<(u8, u8)> {
        events
            .iter()
            .map(|event| match event.kind {
                EventKind::Controller { controller, value, .. } => (controller, value),
                ref other => panic!("expected a controller event, got {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_tuning_bank_change() {
        let events = tuning_bank_change(0.0, 0, 1).unwrap();
        assert_eq!(controllers(&events), vec![(0x65, 0x00), (0x64, 0x04), (0x06, 0x00), (0x26, 1)]);
    }

    #[test]
    fn test_tuning_program_change() {
        let events = tuning_program_change(0.0, 0, 10).unwrap();
        assert_eq!(controllers(&events), vec![(0x65, 0x00), (0x64, 0x03), (0x06, 0x00), (0x26, 10)]);
    }

    #[test]
    fn test_nrpn_call() {
        let events = nrpn_call(2.0, 5, 1, 2, 3, 4).unwrap();
        assert_eq!(controllers(&events), vec![(99, 1), (98, 2), (0x06, 3), (0x26, 4)]);
        assert!(events.iter().all(|e| e.time == 2.0));
    }

    #[test]
    fn test_nrpn_call_rejects_wide_data() {
        assert!(nrpn_call(0.0, 0, 1, 2, 128, 4).is_err());
    }

    #[test]
    fn test_note_tuning_payload() {
        let event = note_tuning(0.0, &[(1, 440.0), (2, 880.0)], 0, true).unwrap();
        match event.kind {
            EventKind::UniversalSysEx { real_time, code, subcode, payload } => {
                assert!(real_time);
                assert_eq!(code, 0x08);
                assert_eq!(subcode, 0x02);
                assert_eq!(payload, vec![0x00, 0x02, 0x01, 69, 0, 0, 0x02, 81, 0, 0]);
            }
            other => panic!("expected universal sysex, got {:?}", other),
        }
    }

    #[test]
    fn test_note_tuning_empty() {
        assert!(matches!(note_tuning(0.0, &[], 0, true), Err(SmfError::EmptyPayload(_))));
    }

    #[test]
    fn test_note_tuning_bad_frequency() {
        assert!(note_tuning(0.0, &[(60, 0.0)], 0, true).is_err());
        assert!(note_tuning(0.0, &[(128, 440.0)], 0, true).is_err());
        assert!(matches!(
            note_tuning(0.0, &[(60, f64::NAN)], 0, true),
            Err(SmfError::NotFinite("frequency"))
        ));
    }
}
