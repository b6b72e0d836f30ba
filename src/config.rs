//! File-level configuration
//!
//! Passed explicitly when a [`MidiFile`](crate::MidiFile) is constructed;
//! nothing here is process-wide state.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::error::{Result, SmfError};

/// Default ticks per quarter note (MIDI resolution)
pub const DEFAULT_TICKS_PER_QUARTERNOTE: u16 = 960;

/// Highest metrical division; bit 15 selects SMPTE timing
pub const MAX_TICKS_PER_QUARTERNOTE: u16 = 0x7FFF;

/// Latest absolute tick a track may hold, so every delta-time fits in four
/// VLQ bytes
pub const MAX_TICK: i64 = 0x0FFF_FFFF;

/// SMF header format word
#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
pub enum SmfFormat {
    /// One track holding everything
    SingleTrack = 0,

    /// Several tracks played simultaneously
    Parallel = 1,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Ticks per quarter note written to the header
    pub ticks_per_quarternote: u16,

    /// Move the earliest event of the file to tick 0 on close
    pub adjust_origin: bool,

    /// Cut a sounding note short when the same channel and pitch is struck again
    pub deinterleave: bool,

    /// Collapse exactly identical events before rendering
    pub remove_duplicates: bool,

    /// Event times and durations are ticks instead of beats
    pub eventtime_is_ticks: bool,

    /// Header format; `None` picks one from the track count
    pub format: Option<SmfFormat>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            ticks_per_quarternote: DEFAULT_TICKS_PER_QUARTERNOTE,
            adjust_origin: true,
            deinterleave: false,
            remove_duplicates: false,
            eventtime_is_ticks: false,
            format: None,
        }
    }
}

impl FileConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: FileConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ticks_per_quarternote == 0 || self.ticks_per_quarternote > MAX_TICKS_PER_QUARTERNOTE {
            return Err(SmfError::InvalidRange {
                what: "ticks per quarter note",
                value: self.ticks_per_quarternote.into(),
            });
        }
        Ok(())
    }

    /// Header format for a file with `num_tracks` tracks
    pub fn format_for(&self, num_tracks: usize) -> Result<SmfFormat> {
        match self.format {
            Some(SmfFormat::SingleTrack) if num_tracks != 1 => Err(SmfError::InvalidRange {
                what: "track count for format 0",
                value: num_tracks as i64,
            }),
            Some(format) => Ok(format),
            None if num_tracks == 1 => Ok(SmfFormat::SingleTrack),
            None => Ok(SmfFormat::Parallel),
        }
    }

    /// Convert an event time (beats, or ticks when configured) to ticks
    ///
    /// The result lies in `-MAX_TICK..=MAX_TICK`.
    pub fn to_ticks(&self, time: f64) -> Result<i64> {
        let ticks = if self.eventtime_is_ticks {
            time
        } else {
            time * f64::from(self.ticks_per_quarternote)
        }
        .round();

        if !ticks.is_finite() {
            return Err(SmfError::NotFinite("event time"));
        }
        if ticks.abs() > MAX_TICK as f64 {
            return Err(SmfError::InvalidRange {
                what: "tick",
                value: ticks as i64,
            });
        }
        Ok(ticks as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FileConfig::default();
        assert_eq!(config.ticks_per_quarternote, 960);
        assert!(config.adjust_origin);
        assert!(!config.deinterleave);
        assert!(!config.remove_duplicates);
        assert_eq!(config.format, None);
    }

    #[test]
    fn test_from_json_partial() {
        let config = FileConfig::from_json(r#"{"ticks_per_quarternote": 480, "format": 1}"#).unwrap();
        assert_eq!(config.ticks_per_quarternote, 480);
        assert_eq!(config.format, Some(SmfFormat::Parallel));
        assert!(config.adjust_origin);
    }

    #[test]
    fn test_from_json_rejects_smpte_division() {
        let err = FileConfig::from_json(r#"{"ticks_per_quarternote": 40000}"#).unwrap_err();
        assert!(matches!(err, SmfError::InvalidRange { .. }));
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(FileConfig::from_json("{"), Err(SmfError::Config(_))));
    }

    #[test]
    fn test_format_for() {
        let config = FileConfig::default();
        assert_eq!(config.format_for(1).unwrap(), SmfFormat::SingleTrack);
        assert_eq!(config.format_for(3).unwrap(), SmfFormat::Parallel);

        let single = FileConfig {
            format: Some(SmfFormat::SingleTrack),
            ..FileConfig::default()
        };
        assert!(single.format_for(2).is_err());
    }

    #[test]
    fn test_to_ticks() {
        let config = FileConfig::default();
        assert_eq!(config.to_ticks(1.0).unwrap(), 960);
        assert_eq!(config.to_ticks(-5.0).unwrap(), -4800);
        assert_eq!(config.to_ticks(0.0005).unwrap(), 0);

        let ticks = FileConfig {
            eventtime_is_ticks: true,
            ..FileConfig::default()
        };
        assert_eq!(ticks.to_ticks(37.0).unwrap(), 37);
    }

    #[test]
    fn test_to_ticks_limits() {
        let ticks = FileConfig {
            eventtime_is_ticks: true,
            ..FileConfig::default()
        };
        assert_eq!(ticks.to_ticks(MAX_TICK as f64).unwrap(), MAX_TICK);
        assert_eq!(ticks.to_ticks(-(MAX_TICK as f64)).unwrap(), -MAX_TICK);
        assert!(matches!(
            ticks.to_ticks(MAX_TICK as f64 + 1.0),
            Err(SmfError::InvalidRange { what: "tick", .. })
        ));

        let config = FileConfig::default();
        // 300000 beats at 960 ticks per beat is past the four-byte delta range
        assert!(config.to_ticks(300_000.0).is_err());
        assert!(config.to_ticks(1e18).is_err());
        assert!(matches!(config.to_ticks(f64::MAX), Err(SmfError::NotFinite(_))));
    }
}
