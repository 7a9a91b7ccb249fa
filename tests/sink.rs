mod common;

use common::*;
use pretty_assertions::assert_eq;
use scorestream::{
    prelude::*,
    sink::{ChannelFilter, ParamId, Recorder, Transpose},
};

#[test]
fn player_drives_the_chain() {
    let body = [
        0x00, 0x90, 0x3C, 0x40, // C4 on channel 1
        0x00, 0x91, 0x40, 0x40, // E4 on channel 2
        0x60, 0xFF, 0x51, 0x03, 0x0F, 0x42, 0x40, // 60 bpm
        0x60, 0x80, 0x3C, 0x00, //
        0x00, 0x81, 0x40, 0x00, //
        0x00, 0xFF, 0x2F, 0x00,
    ];
    let (storage, catalog) = catalog_one("duo.mid", smf(0, 96, &[body]));
    let entry = &catalog.entries()[0];

    let recorder = Recorder::new();
    let mut chain = FilterChain::new()
        .with(ChannelFilter::new())
        .with(Transpose::new())
        .with(recorder.clone());
    assert!(chain.begin());
    assert!(chain.set_param(ParamId::DisableChannel, 1));
    assert!(chain.set_param(ParamId::OctaveShift, 1));
    chain.prepare(entry);

    let mut player = Player::with_storage(storage);
    player.load(entry).unwrap();
    let mut elapsed = 0;
    for event in player.events() {
        let event = event.unwrap();
        elapsed += chain.delay_millis(&event);
        chain.deliver(&event);
        chain.update();
    }

    // 96 ticks at 120 bpm, then 96 ticks at 60 bpm
    assert_eq!(elapsed, 1_500);
    assert_eq!(chain.tempo(), Tempo::from_bpm(60));
    assert_eq!(
        recorder.messages(),
        [
            Message::NoteOn {
                note: note(72),
                velocity: 0x40,
                channel: Channel::One
            },
            Message::NoteOff {
                note: note(72),
                velocity: 0,
                channel: Channel::One
            },
        ]
    );
}

#[test]
fn text_tone_feeds_transpose() {
    let score = "#MUSIC_TONE: -2\n#MUSIC_START\n60,\n";
    let (storage, catalog) = catalog_one("tone.txt", score.as_bytes().to_vec());
    let mut player = Player::with_storage(storage);
    player.load(&catalog.entries()[0]).unwrap();

    let recorder = Recorder::new();
    let mut chain = FilterChain::new()
        .with(Transpose::new())
        .with(recorder.clone());
    let tone = player.tone().unwrap();
    assert!(chain.set_param(ParamId::Tone, tone as i64));
    assert_eq!(chain.get_param(ParamId::Tone), Some(-2));

    for event in player.events() {
        chain.deliver(&event.unwrap());
    }
    let notes: Vec<Note> = recorder.messages().iter().filter_map(Message::note).collect();
    assert_eq!(notes, [note(58), note(58)]);
}

#[test]
fn output_level_is_bounded() {
    let mut chain = FilterChain::new().with(Recorder::new());
    assert_eq!(chain.get_param(ParamId::OutputLevel), Some(100));
    assert!(!chain.set_param(ParamId::OutputLevel, 101));
    assert!(chain.set_param(ParamId::OutputLevel, 30));
    assert_eq!(chain.get_param(ParamId::OutputLevel), Some(30));
    assert!(!chain.set_param(ParamId::Tone, 3));
}
