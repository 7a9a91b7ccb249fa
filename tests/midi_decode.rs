mod common;

use common::*;
use pretty_assertions::assert_eq;
use scorestream::{prelude::*, storage::MemoryStorage};

const END_OF_TRACK: &[u8] = &[0x00, 0xFF, 0x2F, 0x00];

fn track(events: &[u8]) -> Vec<u8> {
    [events, END_OF_TRACK].concat()
}

#[test]
fn rejects_non_midi_header() {
    let mut bytes = smf(0, 96, &[&track(&[])]);
    bytes[..4].copy_from_slice(b"RIFF");
    let (_, catalog) = catalog_one("bad.mid", bytes);
    assert!(catalog.is_empty());
    assert_eq!(catalog.skipped().len(), 1);
    assert!(catalog.skipped()[0].reader_error().is_parse_error());
}

#[test]
fn rejects_smpte_division() {
    let (_, catalog) = catalog_one("smpte.mid", smf(0, 0xE728, &[&track(&[])]));
    assert!(catalog.is_empty());
    let err = catalog.skipped()[0].reader_error();
    assert!(matches!(
        err.error_kind(),
        ReaderErrorKind::ParseError(ParseError::Header(HeaderError::SmpteTiming(_)))
    ));
}

#[test]
fn running_status_notes_share_channel() {
    let body = track(&[0x00, 0x93, 0x60, 0x64, 0x00, 0x3E, 0x46]);
    let (storage, catalog) = catalog_one("run.mid", smf(0, 96, &[&body]));
    let events = play(&storage, &catalog.entries()[0]);

    assert_eq!(events[0], Event::new(0, EventKind::TempoChange(Tempo::DEFAULT)));
    assert_eq!(events[1], Event::note_on(0, note(0x60), 0x64, Channel::Four));
    assert_eq!(events[2], Event::note_on(0, note(0x3E), 0x46, Channel::Four));
}

#[test]
fn every_note_on_is_released_before_end() {
    let body = track(&[
        0x00, 0x90, 0x3C, 0x50, //
        0x30, 0x90, 0x40, 0x50, //
        0x30, 0x80, 0x3C, 0x00,
    ]);
    let (storage, catalog) = catalog_one("hang.mid", smf(0, 96, &[&body]));
    let events = play(&storage, &catalog.entries()[0]);

    let ons = events.iter().filter(|e| e.is_note_on()).count();
    let offs = events.iter().filter(|e| e.is_note_off()).count();
    assert_eq!(ons, offs);
    assert_eq!(events[events.len() - 2].note(), Some(note(0x40)));
    assert!(events.last().unwrap().is_end());
}

#[test]
fn pure_conductor_track_is_elided() {
    let conductor = track(&[0x00, 0xFF, 0x51, 0x03, 0x0F, 0x42, 0x40]);
    let melody = track(&[0x00, 0x90, 0x3C, 0x40, 0x60, 0x80, 0x3C, 0x00]);
    let (storage, catalog) = catalog_one("song.mid", smf(1, 480, &[&conductor, &melody]));

    assert_eq!(catalog.len(), 1);
    let entry = &catalog.entries()[0];
    assert_eq!(entry.title(), "song_T2");
    assert_eq!(entry.track_index(), 1);
    assert_eq!(entry.ticks_per_quarter(), 480);
    assert_eq!(entry.tempo(), Tempo::new(1_000_000));

    let events = play(&storage, entry);
    assert_eq!(events[0].tempo(), Some(Tempo::new(1_000_000)));

    let conductor = catalog.conductor(entry.path()).unwrap();
    assert!(!conductor.has_notes());
    assert!(conductor.meta_events().is_empty());
}

#[test]
fn conductor_with_notes_stays() {
    let conductor = track(&[
        0x00, 0xFF, 0x51, 0x03, 0x0F, 0x42, 0x40, //
        0x00, 0x90, 0x30, 0x40, //
        0x60, 0x80, 0x30, 0x00, //
        0x10, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20,
    ]);
    let melody = track(&[0x00, 0x90, 0x3C, 0x40, 0x60, 0x80, 0x3C, 0x00]);
    let (_, catalog) = catalog_one("duet.mid", smf(1, 96, &[&conductor, &melody]));

    let titles: Vec<&str> = catalog.entries().iter().map(|e| e.title()).collect();
    assert_eq!(titles, ["duet_T1", "duet_T2"]);
    assert!(catalog.entries().iter().all(|e| e.tempo() == Tempo::new(1_000_000)));

    let conductor = &catalog.conductors()[0];
    assert_eq!(
        conductor.meta_events(),
        [(0x70, Event::new(0x10, EventKind::TempoChange(Tempo::DEFAULT)))]
    );
}

#[test]
fn single_track_file_has_no_conductor() {
    let body = track(&[0x00, 0xFF, 0x51, 0x03, 0x0F, 0x42, 0x40]);
    let (_, catalog) = catalog_one("solo.mid", smf(0, 96, &[&body]));
    assert_eq!(catalog.len(), 1);
    assert!(catalog.conductors().is_empty());
    assert_eq!(catalog.entries()[0].tempo(), Tempo::DEFAULT);
}

#[test]
fn end_is_idempotent() {
    let body = track(&[0x00, 0x90, 0x3C, 0x40, 0x60, 0x80, 0x3C, 0x00]);
    let (storage, catalog) = catalog_one("end.mid", smf(0, 96, &[&body]));
    let mut player = Player::with_storage(storage);
    player.load(&catalog.entries()[0]).unwrap();

    let played: Vec<Event> = player.events().map(Result::unwrap).collect();
    assert!(played.last().unwrap().is_end());
    assert!(player.is_ended());
    for _ in 0..5 {
        assert_eq!(player.next_event().unwrap(), Event::end(0));
    }
}

#[test]
fn unsupported_events_are_invalid_not_fatal() {
    let body = track(&[
        0x00, 0xF0, 0x02, 0x43, 0xF7, // sysex
        0x00, 0xFF, 0x01, 0x02, b'h', b'i', // text meta
        0x00, 0xE0, 0x00, 0x40, // pitch bend
        0x00, 0xD0, 0x10, // channel pressure
        0x05, 0x90, 0x3C, 0x40,
    ]);
    let (storage, catalog) = catalog_one("misc.mid", smf(0, 96, &[&body]));
    let kinds: Vec<EventKind> = play(&storage, &catalog.entries()[0])
        .iter()
        .map(|e| *e.kind())
        .collect();
    assert_eq!(
        kinds,
        [
            EventKind::TempoChange(Tempo::DEFAULT),
            EventKind::Invalid,
            EventKind::Invalid,
            EventKind::Invalid,
            EventKind::Invalid,
            EventKind::NoteOn {
                note: note(0x3C),
                velocity: 0x40,
                channel: Channel::One
            },
            EventKind::NoteOff {
                note: note(0x3C),
                channel: Channel::One
            },
            EventKind::ScoreEnd,
        ]
    );
}

#[test]
fn missing_end_of_track_is_premature_end() {
    let body: [u8; 8] = [0x00, 0x90, 0x3C, 0x40, 0x60, 0x80, 0x3C, 0x00];
    let (storage, catalog) = catalog_one("cut.mid", smf(0, 96, &[&body]));
    let events = play(&storage, &catalog.entries()[0]);
    assert_eq!(events.len(), 4);
    assert!(events[3].is_end());
}

#[test]
fn tracks_stop_at_their_own_end() {
    let first = track(&[0x00, 0x90, 0x3C, 0x40, 0x60, 0x80, 0x3C, 0x00]);
    let second = track(&[0x00, 0x91, 0x43, 0x40, 0x30, 0x81, 0x43, 0x00]);
    let (storage, catalog) = catalog_one("pair.mid", smf(1, 96, &[&first, &second]));
    assert_eq!(catalog.len(), 2);

    let notes: Vec<Note> = play(&storage, &catalog.entries()[1])
        .iter()
        .filter_map(Event::note)
        .collect();
    assert_eq!(notes, [note(0x43), note(0x43)]);
}

#[test]
fn next_event_before_load() {
    let mut player = Player::with_storage(MemoryStorage::new());
    let err = player.next_event().unwrap_err();
    assert!(matches!(err.error_kind(), ReaderErrorKind::NotLoaded));
    assert!(player.entry().is_none());
}

#[test]
fn timestamps_follow_tempo_changes() {
    // 96 ticks at 120 bpm, then the tempo halves
    let body = track(&[
        0x00, 0x90, 0x3C, 0x40, //
        0x60, 0xFF, 0x51, 0x03, 0x0F, 0x42, 0x40, //
        0x60, 0x80, 0x3C, 0x00,
    ]);
    let (storage, catalog) = catalog_one("slow.mid", smf(0, 96, &[&body]));
    let mut player = Player::with_storage(storage);
    player.load(&catalog.entries()[0]).unwrap();

    let millis: Vec<u64> = player
        .timed_events()
        .map(|timed| timed.unwrap().timestamp.as_millis())
        .collect();
    assert_eq!(millis, [0, 0, 500, 1_500, 1_500]);
}
