//! The MIDI file builder
//!
//! [`MidiFile`] is open while events are added. [`MidiFile::close`] is a
//! whole-file step: it finds the earliest event across every track, shifts all
//! tracks by that one offset so they stay in sync, then renders each track.
//! After close the file is frozen and its bytes can be read any number of times.

pub mod assemble;

use std::io::Write;

use crate::config::{FileConfig, SmfFormat};
use crate::error::{Result, SmfError};
use crate::events::{composite, Event, KeyMode};
use crate::track::{earliest_tick, ClosedTrack, Track};

pub use assemble::assemble;

#[derive(Debug, Clone)]
pub struct MidiFile {
    config: FileConfig,
    format: SmfFormat,
    tracks: Vec<Track>,
    rendered: Option<RenderedFile>,
}

impl MidiFile {
    /// A file with `num_tracks` tracks and the default configuration
    pub fn new(num_tracks: usize) -> Result<Self> {
        Self::with_config(num_tracks, FileConfig::default())
    }

    pub fn with_config(num_tracks: usize, config: FileConfig) -> Result<Self> {
        if num_tracks == 0 || num_tracks > usize::from(u16::MAX) {
            return Err(SmfError::InvalidRange {
                what: "track count",
                value: num_tracks as i64,
            });
        }
        config.validate()?;
        let format = config.format_for(num_tracks)?;

        Ok(Self {
            config,
            format,
            tracks: vec![Track::new(); num_tracks],
            rendered: None,
        })
    }

    pub fn config(&self) -> &FileConfig {
        &self.config
    }

    pub fn format(&self) -> SmfFormat {
        self.format
    }

    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_closed(&self) -> bool {
        self.rendered.is_some()
    }

    /// Authored events of a track
    pub fn track(&self, index: usize) -> Result<&Track> {
        self.tracks.get(index).ok_or(SmfError::InvalidRange {
            what: "track index",
            value: index as i64,
        })
    }

    fn track_mut(&mut self, index: usize) -> Result<&mut Track> {
        if self.is_closed() {
            return Err(SmfError::AlreadyClosed);
        }
        self.tracks.get_mut(index).ok_or(SmfError::InvalidRange {
            what: "track index",
            value: index as i64,
        })
    }

    fn push_all<I>(&mut self, track: usize, events: I) -> Result<()>
    where
        I: IntoIterator<Item = Event>,
    {
        let track = self.track_mut(track)?;
        for event in events {
            track.push(event);
        }
        Ok(())
    }

    /// Append an already built event, checking its fields first
    pub fn add_event(&mut self, track: usize, event: Event) -> Result<()> {
        event.validate()?;
        self.track_mut(track)?.push(event);
        Ok(())
    }

    pub fn add_note(
        &mut self,
        track: usize,
        channel: u8,
        pitch: u8,
        time: f64,
        duration: f64,
        volume: u8,
    ) -> Result<()> {
        let event = Event::note(time, channel, pitch, duration, volume)?;
        self.add_event(track, event)
    }

    pub fn add_tempo(&mut self, track: usize, time: f64, bpm: f64) -> Result<()> {
        let event = Event::tempo(time, bpm)?;
        self.add_event(track, event)
    }

    /// `denominator` is the written denominator (2, 4, 8, ...)
    pub fn add_time_signature(
        &mut self,
        track: usize,
        time: f64,
        numerator: u8,
        denominator: u8,
        clocks_per_tick: u8,
    ) -> Result<()> {
        let event = Event::time_signature(time, numerator, denominator, clocks_per_tick)?;
        self.add_event(track, event)
    }

    pub fn add_key_signature(&mut self, track: usize, time: f64, accidentals: i8, mode: KeyMode) -> Result<()> {
        let event = Event::key_signature(time, accidentals, mode)?;
        self.add_event(track, event)
    }

    pub fn add_program_change(&mut self, track: usize, channel: u8, time: f64, program: u8) -> Result<()> {
        let event = Event::program_change(time, channel, program)?;
        self.add_event(track, event)
    }

    pub fn add_track_name(&mut self, track: usize, time: f64, name: &str) -> Result<()> {
        let event = Event::track_name(time, name)?;
        self.add_event(track, event)
    }

    pub fn add_text(&mut self, track: usize, time: f64, text: &str) -> Result<()> {
        let event = Event::text(time, text)?;
        self.add_event(track, event)
    }

    pub fn add_copyright(&mut self, track: usize, time: f64, notice: &str) -> Result<()> {
        let event = Event::copyright(time, notice)?;
        self.add_event(track, event)
    }

    pub fn add_controller_event(
        &mut self,
        track: usize,
        channel: u8,
        time: f64,
        controller: u8,
        value: u8,
    ) -> Result<()> {
        let event = Event::controller(time, channel, controller, value)?;
        self.add_event(track, event)
    }

    pub fn add_pitch_wheel_event(&mut self, track: usize, channel: u8, time: f64, value: i16) -> Result<()> {
        let event = Event::pitch_wheel(time, channel, value)?;
        self.add_event(track, event)
    }

    pub fn add_channel_pressure(&mut self, track: usize, channel: u8, time: f64, pressure: u8) -> Result<()> {
        let event = Event::channel_pressure(time, channel, pressure)?;
        self.add_event(track, event)
    }

    pub fn add_sys_ex(&mut self, track: usize, time: f64, manufacturer: u8, payload: &[u8]) -> Result<()> {
        let event = Event::sys_ex(time, manufacturer, payload)?;
        self.add_event(track, event)
    }

    pub fn add_universal_sys_ex(
        &mut self,
        track: usize,
        time: f64,
        code: u8,
        subcode: u8,
        payload: &[u8],
        real_time: bool,
    ) -> Result<()> {
        let event = Event::universal_sys_ex(time, code, subcode, payload, real_time)?;
        self.add_event(track, event)
    }

    pub fn change_tuning_bank(&mut self, track: usize, channel: u8, time: f64, bank: u8) -> Result<()> {
        let events = composite::tuning_bank_change(time, channel, bank)?;
        self.push_all(track, events)
    }

    pub fn change_tuning_program(&mut self, track: usize, channel: u8, time: f64, program: u8) -> Result<()> {
        let events = composite::tuning_program_change(time, channel, program)?;
        self.push_all(track, events)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn make_nrpn_call(
        &mut self,
        track: usize,
        channel: u8,
        time: f64,
        controller_msb: u8,
        controller_lsb: u8,
        data_msb: u8,
        data_lsb: u8,
    ) -> Result<()> {
        let events = composite::nrpn_call(time, channel, controller_msb, controller_lsb, data_msb, data_lsb)?;
        self.push_all(track, events)
    }

    /// Retune notes of tuning program `program`; `tunings` holds (note, Hz) pairs
    pub fn change_note_tuning(
        &mut self,
        track: usize,
        time: f64,
        tunings: &[(u8, f64)],
        program: u8,
        real_time: bool,
    ) -> Result<()> {
        let event = composite::note_tuning(time, tunings, program, real_time)?;
        self.add_event(track, event)
    }

    /// Move every authored event by the same amount
    ///
    /// With `None` the earliest event across all tracks moves to time 0, so
    /// calling it again changes nothing. With `Some(delta)` every time gets
    /// `delta` added.
    pub fn shift_tracks(&mut self, offset: Option<f64>) -> Result<()> {
        if self.is_closed() {
            return Err(SmfError::AlreadyClosed);
        }

        let delta = match offset {
            Some(delta) if !delta.is_finite() => return Err(SmfError::NotFinite("track shift")),
            Some(delta) => delta,
            None => match self.tracks.iter().filter_map(Track::earliest_time).reduce(f64::min) {
                Some(origin) => -origin,
                None => return Ok(()),
            },
        };

        log::debug!("Shifting {} tracks by {}", self.tracks.len(), delta);
        for track in &mut self.tracks {
            track.shift(delta);
        }
        Ok(())
    }

    /// Tick offset applied to every track on close
    fn origin_offset(&self) -> Result<i64> {
        let mut earliest: Option<i64> = None;
        for track in &self.tracks {
            if let Some(tick) = earliest_tick(track.events(), &self.config)? {
                earliest = Some(earliest.map_or(tick, |current| current.min(tick)));
            }
        }

        Ok(match earliest {
            Some(tick) if self.config.adjust_origin || tick < 0 => tick,
            _ => 0,
        })
    }

    /// Render every track and the file bytes; closing twice is a no-op
    ///
    /// A tick outside the representable range fails the close and leaves the
    /// file open.
    pub fn close(&mut self) -> Result<()> {
        if self.is_closed() {
            log::debug!("MIDI file already closed");
            return Ok(());
        }

        let offset = self.origin_offset()?;
        log::debug!("Closing MIDI file: {} tracks, origin offset {} ticks", self.tracks.len(), offset);

        let tracks = self
            .tracks
            .iter()
            .map(|track| track.close(&self.config, offset))
            .collect::<Result<Vec<ClosedTrack>>>()?;
        let bytes = assemble(self.format, self.config.ticks_per_quarternote, &tracks);

        self.rendered = Some(RenderedFile {
            format: self.format,
            ticks_per_quarternote: self.config.ticks_per_quarternote,
            tracks,
            bytes,
        });
        Ok(())
    }

    /// Close and keep only the rendered result
    pub fn render(mut self) -> Result<RenderedFile> {
        self.close()?;
        self.rendered.ok_or(SmfError::NotClosed)
    }

    fn rendered(&self) -> Result<&RenderedFile> {
        self.rendered.as_ref().ok_or(SmfError::NotClosed)
    }

    /// A track after close
    pub fn closed_track(&self, index: usize) -> Result<&ClosedTrack> {
        self.rendered()?.track(index)
    }

    /// Complete file bytes
    pub fn bytes(&self) -> Result<&[u8]> {
        Ok(self.rendered()?.bytes())
    }

    pub fn write_to<W: Write>(&self, out: W) -> Result<()> {
        self.rendered()?.write_to(out)
    }
}

/// A closed file: immutable track renderings and the complete byte stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    format: SmfFormat,
    ticks_per_quarternote: u16,
    tracks: Vec<ClosedTrack>,
    bytes: Vec<u8>,
}

impl RenderedFile {
    pub fn format(&self) -> SmfFormat {
        self.format
    }

    pub fn ticks_per_quarternote(&self) -> u16 {
        self.ticks_per_quarternote
    }

    pub fn tracks(&self) -> &[ClosedTrack] {
        &self.tracks
    }

    pub fn track(&self, index: usize) -> Result<&ClosedTrack> {
        self.tracks.get(index).ok_or(SmfError::InvalidRange {
            what: "track index",
            value: index as i64,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn write_to<W: Write>(&self, mut out: W) -> Result<()> {
        out.write_all(&self.bytes)?;
        out.flush()?;
        Ok(())
    }
}
