//! Tracks in their two phases
//!
//! A [`Track`] collects authored events while the file is open. Closing the
//! file turns it into a [`ClosedTrack`]: the ordered low-level events plus the
//! rendered chunk payload, both immutable from then on.

pub mod deinterleave;
pub mod encoder;
pub mod midi_event;

pub use deinterleave::{deinterleave, earliest_tick};
pub use encoder::render;
pub use midi_event::{MidiEvent, MidiEventKind};

use crate::config::FileConfig;
use crate::error::Result;
use crate::events::Event;

/// Authored events of one track, in insertion order
#[derive(Debug, Clone, Default)]
pub struct Track {
    events: Vec<Event>,
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Earliest event time, in the units events were authored in
    pub fn earliest_time(&self) -> Option<f64> {
        self.events.iter().map(|event| event.time).reduce(f64::min)
    }

    /// Add `delta` to the time of every event
    pub fn shift(&mut self, delta: f64) {
        for event in &mut self.events {
            event.time += delta;
        }
    }

    /// Expand, order and encode this track, moving every event `offset` ticks earlier
    pub fn close(&self, config: &FileConfig, offset: i64) -> Result<ClosedTrack> {
        let events = deinterleave(&self.events, config, offset)?;
        let data = render(&events);
        log::debug!(
            "Closed track: {} authored events, {} midi events, {} bytes",
            self.events.len(),
            events.len(),
            data.len()
        );
        Ok(ClosedTrack { events, data })
    }
}

/// A track after close: ordered low-level events and the chunk payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedTrack {
    events: Vec<MidiEvent>,
    data: Vec<u8>,
}

impl ClosedTrack {
    pub fn events(&self) -> &[MidiEvent] {
        &self.events
    }

    /// Chunk payload, End-of-Track included
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
