#![allow(dead_code)]

use scorestream::{prelude::*, storage::MemoryStorage};

/// A Standard MIDI File with the given track bodies
pub fn smf<T: AsRef<[u8]>>(format: u16, division: u16, tracks: &[T]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"MThd");
    bytes.extend_from_slice(&6u32.to_be_bytes());
    bytes.extend_from_slice(&format.to_be_bytes());
    bytes.extend_from_slice(&(tracks.len() as u16).to_be_bytes());
    bytes.extend_from_slice(&division.to_be_bytes());
    for body in tracks {
        let body = body.as_ref();
        bytes.extend_from_slice(b"MTrk");
        bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        bytes.extend_from_slice(body);
    }
    bytes
}

/// Catalog a single in-memory file
pub fn catalog_one(path: &str, bytes: Vec<u8>) -> (MemoryStorage, Catalog) {
    let mut storage = MemoryStorage::new();
    storage.insert(path, bytes);
    let catalog = Catalog::scan_with(&storage, path, &DecoderConfig::default()).unwrap();
    (storage, catalog)
}

/// Every event of `entry`, up to and including the end
pub fn play(storage: &MemoryStorage, entry: &ScoreEntry) -> Vec<Event> {
    play_with(storage, entry, DecoderConfig::default())
}

pub fn play_with(storage: &MemoryStorage, entry: &ScoreEntry, config: DecoderConfig) -> Vec<Event> {
    let mut player = Player::with_storage(storage.clone()).with_config(config);
    player.load(entry).unwrap();
    player.events().map(|event| event.unwrap()).collect()
}

pub fn note(number: u8) -> Note {
    Note::new(number).unwrap()
}
