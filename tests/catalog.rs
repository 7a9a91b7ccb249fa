mod common;

use std::{fs, path::Path};

use common::*;
use pretty_assertions::assert_eq;
use scorestream::{prelude::*, storage::MemoryStorage};

fn melody() -> Vec<u8> {
    smf(
        0,
        96,
        &[[0x00, 0x90, 0x3C, 0x40, 0x60, 0x80, 0x3C, 0x00, 0x00, 0xFF, 0x2F, 0x00]],
    )
}

const TWO_BLOCKS: &str =
    "#MUSIC_TITLE: One\n#MUSIC_START\n60,\n#MUSIC_END\n#MUSIC_TITLE: Two\n#MUSIC_START\n62,\n";

#[test]
fn directory_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b_score.txt"), TWO_BLOCKS).unwrap();
    fs::write(dir.path().join("a_song.mid"), melody()).unwrap();
    fs::write(dir.path().join("c_loud.MIDI"), melody()).unwrap();

    let catalog = Catalog::scan(dir.path()).unwrap();
    assert_eq!(catalog.root(), dir.path());
    let listed: Vec<(&str, ScoreFormat)> = catalog
        .entries()
        .iter()
        .map(|entry| (entry.title(), entry.format()))
        .collect();
    assert_eq!(
        listed,
        [
            ("a_song_T1", ScoreFormat::Midi),
            ("One", ScoreFormat::Text),
            ("Two", ScoreFormat::Text),
            ("c_loud_T1", ScoreFormat::Midi),
        ]
    );
    assert!(catalog.skipped().is_empty());
    assert_eq!(catalog.get(1).map(ScoreEntry::track_index), Some(0));
    assert!(catalog.get(4).is_none());
}

#[test]
fn hidden_files_and_subdirectories_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".hidden.mid"), melody()).unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested").join("deep.txt"), TWO_BLOCKS).unwrap();
    fs::write(dir.path().join("top.txt"), TWO_BLOCKS).unwrap();

    let catalog = Catalog::scan(dir.path()).unwrap();
    assert_eq!(catalog.len(), 2);
    assert!(catalog.entries().iter().all(|e| e.path().ends_with("top.txt")));
    assert!(catalog.skipped().is_empty());
}

#[test]
fn broken_file_does_not_stop_the_scan() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.mid"), b"hello").unwrap();
    fs::write(dir.path().join("fine.mid"), melody()).unwrap();

    let catalog = Catalog::scan(dir.path()).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.entries()[0].title(), "fine_T1");

    let [skipped] = catalog.skipped() else {
        panic!("expected one skipped file, got {:?}", catalog.skipped());
    };
    assert!(skipped.path().ends_with("broken.mid"));
    assert!(skipped.reader_error().is_parse_error());
}

#[test]
fn missing_root_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nowhere");
    let err = Catalog::scan(&missing).unwrap_err();
    assert_eq!(err.path(), missing);
    assert!(matches!(err.reader_error().error_kind(), ReaderErrorKind::Io(_)));
}

#[test]
fn single_file_root() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alone.txt");
    fs::write(&path, TWO_BLOCKS).unwrap();

    let catalog = Catalog::scan(&path).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.entries()[1].start_byte(), 64);
    assert_eq!(catalog.entries()[1].end_marker(), TWO_BLOCKS.len() as u64);
}

#[test]
fn player_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("song.mid"), melody()).unwrap();
    let catalog = Catalog::scan(dir.path()).unwrap();

    let mut player = Player::new();
    player.load(&catalog.entries()[0]).unwrap();
    let events: Vec<Event> = player.events().map(Result::unwrap).collect();
    assert_eq!(
        events,
        [
            Event::new(0, EventKind::TempoChange(Tempo::DEFAULT)),
            Event::note_on(0, note(60), 0x40, Channel::One),
            Event::note_off(0x60, note(60), Channel::One),
            Event::end(0),
        ]
    );

    // the file vanishing after the scan only fails the load
    fs::remove_file(dir.path().join("song.mid")).unwrap();
    let err = player.load(&catalog.entries()[0]).unwrap_err();
    assert!(err.path().ends_with("song.mid"));
    assert!(player.entry().is_none());
}

#[test]
fn empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Catalog::scan(dir.path()).unwrap();
    assert!(catalog.is_empty());
    assert!(catalog.skipped().is_empty());
}

#[test]
fn playlist_root_lists_scores() {
    let mut storage = MemoryStorage::new();
    storage.insert("SCORE/a.txt", b"#MUSIC_TITLE: Solo\n#MUSIC_START\n60,;\n".to_vec());
    storage.insert("list.m3u", b"SCORE/a.txt\n".to_vec());

    let catalog = Catalog::scan_with(&storage, "list.m3u", &DecoderConfig::default()).unwrap();
    assert!(catalog.skipped().is_empty());
    let [entry] = catalog.entries() else {
        panic!("expected one entry, got {:?}", catalog.entries());
    };
    assert_eq!(entry.title(), "Solo");
    assert_eq!(entry.path(), Path::new("SCORE/a.txt"));
    assert_eq!(play(&storage, entry).len(), 4);
}

#[test]
fn playlist_paths_are_relative_to_its_folder() {
    let mut storage = MemoryStorage::new();
    storage.insert("SCORE/a.txt", TWO_BLOCKS.as_bytes().to_vec());
    storage.insert("SCORE/b.mid", melody());
    storage.insert("SCORE/.secret.txt", TWO_BLOCKS.as_bytes().to_vec());
    storage.insert("lists/other.M3U", b"../SCORE/a.txt\n".to_vec());
    storage.insert(
        "lists/evening.m3u",
        b"# evening set\n\n../SCORE/b.mid\r\n  ../SCORE/a.txt  \n./missing.txt\n../SCORE/.secret.txt\nother.M3U\n"
            .to_vec(),
    );

    let catalog =
        Catalog::scan_with(&storage, "lists/evening.m3u", &DecoderConfig::default()).unwrap();
    let listed: Vec<(&str, &Path)> = catalog
        .entries()
        .iter()
        .map(|entry| (entry.title(), entry.path()))
        .collect();
    assert_eq!(
        listed,
        [
            ("b_T1", Path::new("SCORE/b.mid")),
            ("One", Path::new("SCORE/a.txt")),
            ("Two", Path::new("SCORE/a.txt")),
        ]
    );
    assert_eq!(catalog.entries()[2].track_index(), 1);

    let [missing, nested] = catalog.skipped() else {
        panic!("expected two skipped files, got {:?}", catalog.skipped());
    };
    assert_eq!(missing.path(), Path::new("lists/missing.txt"));
    assert!(matches!(missing.reader_error().error_kind(), ReaderErrorKind::Io(_)));
    assert_eq!(nested.path(), Path::new("lists/other.M3U"));
    assert!(matches!(
        nested.reader_error().error_kind(),
        ReaderErrorKind::ParseError(ParseError::NestedPlaylist)
    ));
}

#[test]
fn playlists_in_a_directory_are_not_followed() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), TWO_BLOCKS).unwrap();
    fs::write(dir.path().join("all.m3u"), "a.txt\na.txt\n").unwrap();

    let catalog = Catalog::scan(dir.path()).unwrap();
    assert_eq!(catalog.len(), 2);
    assert!(catalog.skipped().is_empty());
}
