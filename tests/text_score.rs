mod common;

use common::*;
use pretty_assertions::assert_eq;
use scorestream::prelude::*;

const Q: u32 = 96;

fn on(delta: u32, number: u8) -> Event {
    Event::note_on(delta, note(number), 64, Channel::One)
}

fn off(delta: u32, number: u8) -> Event {
    Event::note_off(delta, note(number), Channel::One)
}

fn tempo(delta: u32, bpm: u32) -> Event {
    Event::new(delta, EventKind::TempoChange(Tempo::from_bpm(bpm)))
}

/// Decode the first block of `score`
fn decode(score: &str) -> Vec<Event> {
    decode_with(score, DecoderConfig::default())
}

fn decode_with(score: &str, config: DecoderConfig) -> Vec<Event> {
    let (storage, catalog) = catalog_one("score.txt", score.as_bytes().to_vec());
    play_with(&storage, &catalog.entries()[0], config)
}

#[test]
fn tie_restarts_sounding_note() {
    assert_eq!(
        decode("#MUSIC_START\n60,,-,;\n#MUSIC_END\n"),
        [
            tempo(0, 120),
            on(0, 60),
            off(2 * Q, 60),
            on(0, 60),
            off(2 * Q, 60),
            Event::end(0),
        ]
    );
}

#[test]
fn tie_without_sounding_note_is_rest() {
    assert_eq!(
        decode("#MUSIC_START\n-,-,62,\n"),
        [tempo(0, 120), on(2 * Q, 62), off(Q, 62), Event::end(0)]
    );
}

#[test]
fn rests_delay_the_next_note() {
    assert_eq!(
        decode("#MUSIC_START\n,,,60;\n"),
        [tempo(0, 120), on(3 * Q, 60), off(Q, 60), Event::end(0)]
    );
}

#[test]
fn new_note_releases_previous() {
    assert_eq!(
        decode("#MUSIC_START\n60,62;64,\n"),
        [
            tempo(0, 120),
            on(0, 60),
            off(Q, 60),
            on(0, 62),
            off(Q, 62),
            on(0, 64),
            off(Q, 64),
            Event::end(0),
        ]
    );
}

#[test]
fn token_boundaries() {
    // whitespace, line breaks and comments inside and between tokens
    let spaced = decode("#MUSIC_START\n 6 0 ,\n , / rest\n- ,\n6\n2;\n");
    let packed = decode("#MUSIC_START\n60,,-,62;\n");
    assert_eq!(spaced, packed);
    assert_eq!(
        packed,
        [
            tempo(0, 120),
            on(0, 60),
            off(2 * Q, 60),
            on(0, 60),
            off(Q, 60),
            on(0, 62),
            off(Q, 62),
            Event::end(0),
        ]
    );
}

#[test]
fn consecutive_ties_while_sounding() {
    assert_eq!(
        decode("#MUSIC_START\n60,-,-,;\n"),
        [
            tempo(0, 120),
            on(0, 60),
            off(Q, 60),
            on(0, 60),
            off(Q, 60),
            on(0, 60),
            off(2 * Q, 60),
            Event::end(0),
        ]
    );
}

#[test]
fn tie_then_rest_then_note() {
    assert_eq!(
        decode("#MUSIC_START\n60,-,,62,-;\n"),
        [
            tempo(0, 120),
            on(0, 60),
            off(Q, 60),
            on(0, 60),
            off(2 * Q, 60),
            on(0, 62),
            off(Q, 62),
            on(0, 62),
            off(Q, 62),
            Event::end(0),
        ]
    );
}

#[test]
fn unterminated_token_is_dropped() {
    assert_eq!(
        decode("#MUSIC_START\n60,62\n#MUSIC_END\n"),
        [tempo(0, 120), on(0, 60), off(Q, 60), Event::end(0)]
    );
}

#[test]
fn out_of_range_pitch_is_rest() {
    assert_eq!(
        decode("#MUSIC_START\n128,60,\n"),
        [tempo(0, 120), on(Q, 60), off(Q, 60), Event::end(0)]
    );
}

#[test]
fn bpm_change_emits_tempo() {
    assert_eq!(
        decode("#MUSIC_BPM:100\n#MUSIC_START\n60,\n#BPMCHANGE 150\n#BPMCHANGE 0\n62,\n"),
        [
            tempo(0, 100),
            on(0, 60),
            tempo(Q, 150),
            tempo(0, 150),
            off(0, 60),
            on(0, 62),
            off(Q, 62),
            Event::end(0),
        ]
    );
}

#[test]
fn rhythm_change_sets_token_length() {
    assert_eq!(
        decode("#MUSIC_START\n#RHYTHMCHANGE 6\n60,,\n#RHYTHMCHANGE 9\n,\n"),
        [tempo(0, 120), on(0, 60), off(16 * 3, 60), Event::end(0)]
    );
}

#[test]
fn header_rhythm_applies_from_start() {
    assert_eq!(
        decode("#MUSIC_RHYTHM:1\n#MUSIC_START\n60,;\n"),
        [tempo(0, 120), on(0, 60), off(Q, 60), Event::end(0)]
    );
}

#[test]
fn delay_adds_ticks() {
    // 500 ms at 120 bpm is one quarter note
    assert_eq!(
        decode("#MUSIC_START\n#DELAY 500\n60,\n"),
        [tempo(0, 120), on(Q, 60), off(Q, 60), Event::end(0)]
    );
}

#[test]
fn music_end_releases_then_ends() {
    let events = decode("#MUSIC_START\n60,\n#MUSIC_END\n62,\n");
    assert_eq!(
        events,
        [tempo(0, 120), on(0, 60), off(Q, 60), Event::end(0)]
    );
}

#[test]
fn unknown_control_lines_are_ignored() {
    assert_eq!(
        decode("#MUSIC_START\n#VOLUME 3\n#BPMCHANGE\n60,\n"),
        [tempo(0, 120), on(0, 60), off(Q, 60), Event::end(0)]
    );
}

#[test]
fn state_changes_as_events() {
    let config = DecoderConfig::new().with_text(TextConfig::new().with_state_changes(true));
    assert_eq!(
        decode_with(
            "#MUSIC_START\n#TONECHANGE -3\n#RHYTHMCHANGE 1\n#DELAY 250\n60,\n",
            config
        ),
        [
            tempo(0, 120),
            Event::new(0, EventKind::ToneChange(-3)),
            Event::new(0, EventKind::RhythmChange(Rhythm::Eighth)),
            Event::new(Q / 2, EventKind::Delay { millis: 250 }),
            on(0, 60),
            off(Q / 2, 60),
            Event::end(0),
        ]
    );
}

#[test]
fn delay_uses_the_exact_header_bpm() {
    let score = "#MUSIC_BPM:70000\n#MUSIC_START\n#DELAY 1000\n60,\n";
    let (_, catalog) = catalog_one("score.txt", score.as_bytes().to_vec());
    assert_eq!(catalog.entries()[0].bpm(), 70000);

    let config = DecoderConfig::new().with_text(TextConfig::new().with_state_changes(true));
    assert_eq!(
        decode_with(score, config),
        [
            tempo(0, 70000),
            Event::new(112_000, EventKind::Delay { millis: 1000 }),
            on(0, 60),
            off(Q, 60),
            Event::end(0),
        ]
    );
}

#[test]
fn configured_velocity_and_channel() {
    let config = DecoderConfig::new().with_text(
        TextConfig::new()
            .with_velocity(100)
            .with_channel(Channel::Ten),
    );
    let events = decode_with("#MUSIC_START\n60,\n", config);
    assert_eq!(
        events[1],
        Event::note_on(0, note(60), 100, Channel::Ten)
    );
    assert_eq!(events[2], Event::note_off(Q, note(60), Channel::Ten));
}

#[test]
fn blocks_play_independently() {
    let score = "#MUSIC_TITLE: A\n#MUSIC_START\n60,\n#MUSIC_END\n#MUSIC_TITLE: B\n#MUSIC_TONE: 4\n#MUSIC_BPM: 60\n#MUSIC_START\n70,\n#MUSIC_END\n";
    let (storage, catalog) = catalog_one("two.txt", score.as_bytes().to_vec());
    assert_eq!(catalog.len(), 2);

    let second = &catalog.entries()[1];
    assert_eq!(second.title(), "B");
    assert_eq!(second.tone(), 4);
    assert_eq!(second.track_index(), 1);
    assert_eq!(
        play(&storage, second),
        [tempo(0, 60), on(0, 70), off(Q, 70), Event::end(0)]
    );

    let mut player = Player::with_storage(storage);
    player.load(second).unwrap();
    assert_eq!(player.tone(), Some(4));
}

#[test]
fn reload_resets_state() {
    let (storage, catalog) = catalog_one("again.txt", b"#MUSIC_START\n60,62,\n".to_vec());
    let entry = &catalog.entries()[0];
    let mut player = Player::with_storage(storage);

    player.load(entry).unwrap();
    let first: Vec<Event> = player.events().take(3).map(Result::unwrap).collect();
    player.load(entry).unwrap();
    let second: Vec<Event> = player.events().map(Result::unwrap).collect();
    assert_eq!(first[..], second[..3]);
    assert!(second.last().unwrap().is_end());
}
