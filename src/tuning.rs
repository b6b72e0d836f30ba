//! Frequency ↔ MIDI Tuning Standard conversion
//!
//! A tuning is a semitone (MIDI note number) plus a 14-bit fraction of a
//! semitone split across two 7-bit data bytes.

use serde::{Deserialize, Serialize};

/// Fraction resolution: 2^14 steps per semitone
const RESOLUTION: f64 = 16384.0;

const CONCERT_A_HZ: f64 = 440.0;
const CONCERT_A_NOTE: f64 = 69.0;

/// (0x7F, 0x7F, 0x7F) means "no change" in the tuning standard, so the
/// highest representable tuning stops one step short of it
const HIGHEST: Tuning = Tuning {
    semitone: 0x7F,
    msb: 0x7F,
    lsb: 0x7E,
};

/// Three-byte MIDI fine-tuning value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tuning {
    pub semitone: u8,
    pub msb: u8,
    pub lsb: u8,
}

impl Tuning {
    pub fn to_bytes(self) -> [u8; 3] {
        [self.semitone, self.msb, self.lsb]
    }

    /// The 14-bit fraction of a semitone above `semitone`
    pub fn fraction(self) -> u16 {
        (u16::from(self.msb) << 7) | u16::from(self.lsb)
    }
}

/// Continuous MIDI note number for a frequency (A4 = 440 Hz = 69)
fn note_number(hz: f64) -> f64 {
    CONCERT_A_NOTE + 12.0 * (hz / CONCERT_A_HZ).log2()
}

/// Convert a frequency in Hz to a three-byte tuning value
///
/// Frequencies below MIDI note 0 clamp to (0, 0, 0); frequencies at or above
/// the top of the range clamp to (0x7F, 0x7F, 0x7E).
pub fn frequency_to_tuning(hz: f64) -> Tuning {
    let n = note_number(hz);
    if n.is_nan() || n < 0.0 {
        log::warn!("Frequency {} Hz is below MIDI note 0, clamping", hz);
        return Tuning {
            semitone: 0,
            msb: 0,
            lsb: 0,
        };
    }

    let mut semitone = n.floor();
    let mut fraction = ((n - semitone) * RESOLUTION).round();

    // Rounding up to a whole semitone carries into the next note
    if fraction >= RESOLUTION {
        semitone += 1.0;
        fraction = 0.0;
    }

    if semitone > 127.0 {
        log::warn!("Frequency {} Hz is above the MIDI tuning range, clamping", hz);
        return HIGHEST;
    }

    let fraction = fraction as u16;
    let tuning = Tuning {
        semitone: semitone as u8,
        msb: (fraction >> 7) as u8,
        lsb: (fraction & 0x7F) as u8,
    };

    if tuning.to_bytes() == [0x7F, 0x7F, 0x7F] {
        return HIGHEST;
    }
    tuning
}

/// Convert a three-byte tuning value back to a frequency in Hz
pub fn tuning_to_frequency(tuning: Tuning) -> f64 {
    let n = f64::from(tuning.semitone) + f64::from(tuning.fraction()) / RESOLUTION;
    CONCERT_A_HZ * 2f64.powf((n - CONCERT_A_NOTE) / 12.0)
}
