// Rendered files must parse cleanly with an independent SMF reader

use midly::{Format, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use smf_builder::{FileConfig, KeyMode, MidiFile};

fn build_song() -> MidiFile {
    let mut midi = MidiFile::new(2).expect("two-track file");
    midi.add_track_name(0, 0.0, "Piano").unwrap();
    midi.add_tempo(0, 0.0, 120.0).unwrap();
    midi.add_time_signature(0, 0.0, 3, 4, 24).unwrap();
    midi.add_key_signature(0, 0.0, -2, KeyMode::Major).unwrap();
    midi.add_program_change(0, 0, 0.0, 0).unwrap();
    for (i, pitch) in [60u8, 64, 67].iter().enumerate() {
        midi.add_note(0, 0, *pitch, i as f64, 1.0, 90).unwrap();
    }

    midi.add_track_name(1, 0.0, "Bass").unwrap();
    midi.add_controller_event(1, 1, 0.0, 7, 100).unwrap();
    midi.add_pitch_wheel_event(1, 1, 0.5, 4096).unwrap();
    midi.add_note(1, 1, 36, 0.0, 3.0, 110).unwrap();
    midi.add_sys_ex(1, 2.0, 0x00, &[0x01, 0x02]).unwrap();
    midi
}

fn ticks_per_quarternote(smf: &Smf) -> u16 {
    match &smf.header.timing {
        Timing::Metrical(tpq) => tpq.as_int(),
        other => panic!("expected metrical timing, got {:?}", other),
    }
}

#[test]
fn test_midly_parses_rendered_file() {
    let mut midi = build_song();
    midi.close().expect("close should succeed");
    let bytes = midi.bytes().unwrap();

    let smf = Smf::parse(bytes).expect("midly should parse the rendered file");
    assert_eq!(smf.header.format, Format::Parallel);
    assert_eq!(ticks_per_quarternote(&smf), 960);
    assert_eq!(smf.tracks.len(), 2);

    for track in &smf.tracks {
        let last = track.last().expect("track should not be empty");
        assert_eq!(last.kind, TrackEventKind::Meta(MetaMessage::EndOfTrack));
    }
}

#[test]
fn test_midly_sees_meta_events_first() {
    let mut midi = build_song();
    midi.close().unwrap();
    let smf = Smf::parse(midi.bytes().unwrap()).unwrap();
    let piano = &smf.tracks[0];

    assert_eq!(piano[0].kind, TrackEventKind::Meta(MetaMessage::TrackName(b"Piano")));
    assert_eq!(piano[1].kind, TrackEventKind::Meta(MetaMessage::TimeSignature(3, 2, 24, 8)));
    match &piano[2].kind {
        TrackEventKind::Meta(MetaMessage::Tempo(micros)) => assert_eq!(micros.as_int(), 500_000),
        other => panic!("expected tempo, got {:?}", other),
    }
    assert_eq!(piano[3].kind, TrackEventKind::Meta(MetaMessage::KeySignature(-2, false)));
    assert!(piano[..5].iter().all(|e| e.delta.as_int() == 0));
}

#[test]
fn test_midly_note_timing() {
    let mut midi = build_song();
    midi.close().unwrap();
    let smf = Smf::parse(midi.bytes().unwrap()).unwrap();

    // Absolute ticks of every note-on in the piano track
    let mut tick = 0u32;
    let mut starts = Vec::new();
    for event in &smf.tracks[0] {
        tick += event.delta.as_int();
        if let TrackEventKind::Midi {
            message: MidiMessage::NoteOn { key, .. },
            ..
        } = &event.kind
        {
            starts.push((key.as_int(), tick));
        }
    }
    assert_eq!(starts, vec![(60, 0), (64, 960), (67, 1920)]);
}

#[test]
fn test_midly_channel_messages() {
    let mut midi = build_song();
    midi.close().unwrap();
    let smf = Smf::parse(midi.bytes().unwrap()).unwrap();
    let bass = &smf.tracks[1];

    let mut saw_controller = false;
    let mut saw_bend = false;
    let mut saw_sysex = false;
    for event in bass {
        match &event.kind {
            TrackEventKind::Midi { channel, message } => {
                assert_eq!(channel.as_int(), 1);
                match message {
                    MidiMessage::Controller { controller, value } => {
                        assert_eq!((controller.as_int(), value.as_int()), (7, 100));
                        saw_controller = true;
                    }
                    MidiMessage::PitchBend { bend } => {
                        // +4096 above centre
                        assert_eq!(bend.0.as_int(), 0x3000);
                        saw_bend = true;
                    }
                    _ => {}
                }
            }
            TrackEventKind::SysEx(data) => {
                assert_eq!(&data[..3], &[0x00, 0x01, 0x02]);
                saw_sysex = true;
            }
            _ => {}
        }
    }
    assert!(saw_controller && saw_bend && saw_sysex);
}

#[test]
fn test_midly_single_track_format() {
    let config = FileConfig {
        ticks_per_quarternote: 480,
        ..FileConfig::default()
    };
    let mut midi = MidiFile::with_config(1, config).unwrap();
    midi.add_note(0, 0, 60, 0.0, 0.5, 64).unwrap();
    let rendered = midi.render().unwrap();

    let smf = Smf::parse(rendered.bytes()).unwrap();
    assert_eq!(smf.header.format, Format::SingleTrack);
    assert_eq!(ticks_per_quarternote(&smf), 480);
    assert_eq!(smf.tracks[0][1].delta.as_int(), 240);
}
