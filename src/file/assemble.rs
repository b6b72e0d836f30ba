//! Chunk framing
//!
//! A Standard MIDI File is an `MThd` header chunk followed by one `MTrk`
//! chunk per track. Every chunk is a 4-byte ASCII tag, a 4-byte big-endian
//! length and the payload.

use crate::config::SmfFormat;
use crate::track::ClosedTrack;

pub const HEADER_TAG: &[u8; 4] = b"MThd";
pub const TRACK_TAG: &[u8; 4] = b"MTrk";

/// Header payload length: format, track count and division, two bytes each
const HEADER_LENGTH: u32 = 6;

fn write_chunk(tag: &[u8; 4], payload: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(tag);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
}

/// Write the `MThd` chunk
pub fn write_header(format: SmfFormat, num_tracks: u16, ticks_per_quarternote: u16, out: &mut Vec<u8>) {
    out.extend_from_slice(HEADER_TAG);
    out.extend_from_slice(&HEADER_LENGTH.to_be_bytes());
    out.extend_from_slice(&(format as u16).to_be_bytes());
    out.extend_from_slice(&num_tracks.to_be_bytes());
    out.extend_from_slice(&ticks_per_quarternote.to_be_bytes());
}

/// Write one `MTrk` chunk around a rendered track payload
pub fn write_track_chunk(payload: &[u8], out: &mut Vec<u8>) {
    write_chunk(TRACK_TAG, payload, out);
}

/// Frame the header and every track into the complete file
pub fn assemble(format: SmfFormat, ticks_per_quarternote: u16, tracks: &[ClosedTrack]) -> Vec<u8> {
    let size = 14 + tracks.iter().map(|t| 8 + t.data().len()).sum::<usize>();
    let mut out = Vec::with_capacity(size);

    write_header(format, tracks.len() as u16, ticks_per_quarternote, &mut out);
    for track in tracks {
        write_track_chunk(track.data(), &mut out);
    }
    out
}
