//! Error types for MIDI file construction
//!
//! Every validation failure is reported at the call that introduced the bad
//! value. Rendering itself cannot fail once events have been accepted.

use thiserror::Error;

/// Top-level error type
#[derive(Debug, Error)]
pub enum SmfError {
    /// A channel, pitch, volume, controller, program, track index or similar
    /// value lies outside what the format can carry
    #[error("{what} out of range: {value}")]
    InvalidRange { what: &'static str, value: i64 },

    /// A time, duration, tempo or frequency that is NaN or infinite
    #[error("{0} is not a finite number")]
    NotFinite(&'static str),

    /// Variable-length quantity ended before a terminating byte
    #[error("malformed variable-length quantity")]
    MalformedVlq,

    /// System-exclusive message without any payload bytes
    #[error("empty payload for {0}")]
    EmptyPayload(&'static str),

    /// Bytes were requested before the file was closed
    #[error("midi file has not been closed")]
    NotClosed,

    /// Events were added after the file was closed
    #[error("midi file is already closed")]
    AlreadyClosed,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SmfError>;

/// Check that `value` lies in `min..=max`
pub(crate) fn check_range<T>(what: &'static str, value: T, min: T, max: T) -> Result<T>
where
    T: PartialOrd + Copy + Into<i64>,
{
    if value < min || value > max {
        return Err(SmfError::InvalidRange {
            what,
            value: value.into(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range_accepts_bounds() {
        assert_eq!(check_range("pitch", 0u8, 0, 127).unwrap(), 0);
        assert_eq!(check_range("pitch", 127u8, 0, 127).unwrap(), 127);
    }

    #[test]
    fn test_check_range_rejects_outside() {
        let err = check_range("channel", 16u8, 0, 15).unwrap_err();
        assert!(matches!(err, SmfError::InvalidRange { what: "channel", value: 16 }));
        assert_eq!(err.to_string(), "channel out of range: 16");
    }

    #[test]
    fn test_not_finite_message() {
        assert_eq!(SmfError::NotFinite("event time").to_string(), "event time is not a finite number");
    }
}
