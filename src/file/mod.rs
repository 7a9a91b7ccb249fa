#![doc = r#"
Standard MIDI File decoding

Nothing here reads a whole file. [`MidiFile::index`] walks the chunk framing once to
find where every track body starts and ends. [`TrackDecoder`] then decodes one track body
an event at a time from wherever the reader was seeked to.

```rust
# use scorestream::{file::*, reader::BufferedReader};
use std::io::Cursor;

let bytes = [
    b"MThd".as_slice(), &[0, 0, 0, 6, 0, 0, 0, 1, 0, 96],
    b"MTrk", &[0, 0, 0, 8, 0x00, 0x90, 0x3C, 0x40, 0x60, 0x80, 0x3C, 0x00],
].concat();
let mut reader = BufferedReader::new(Cursor::new(bytes)).unwrap();

let file = MidiFile::index(&mut reader, 32).unwrap();
assert_eq!(file.header().ticks_per_quarter_note(), 96);

let track = &file.tracks()[0];
reader.seek(track.start_byte()).unwrap();
let mut decoder = TrackDecoder::new(track.end_marker(), None);

assert!(decoder.next_event(&mut reader).unwrap().is_note_on());
assert_eq!(decoder.next_event(&mut reader).unwrap().delta_ticks(), 0x60);
assert!(decoder.next_event(&mut reader).unwrap().is_end());
```
"#]

mod chunk;
pub use chunk::{MTHD, MTRK};

mod conductor;
pub use conductor::*;

mod format;
pub use format::*;

mod header;
pub use header::*;

mod timing;
pub use timing::*;

mod track;
pub use track::*;

use std::io::{Read, Seek};

use crate::reader::{BufferedReader, ReadResult, ReaderError};

/// Where one track body lives in its file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackSegment {
    index: usize,
    start_byte: u64,
    end_marker: u64,
}

impl TrackSegment {
    /// Zero-based track number
    pub const fn index(&self) -> usize {
        self.index
    }
    /// Offset of the first event
    pub const fn start_byte(&self) -> u64 {
        self.start_byte
    }
    /// Offset one past the last byte of the body
    pub const fn end_marker(&self) -> u64 {
        self.end_marker
    }
}

/// The header and track layout of a MIDI file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiFile {
    header: MidiHeader,
    tracks: Vec<TrackSegment>,
}

impl MidiFile {
    /// Read the header and locate up to `max_tracks` track bodies.
    ///
    /// A chunk that is not `MTrk` where a track is expected fails the whole file. A file
    /// that ends cleanly before the announced track count keeps the tracks found so far.
    pub fn index<R: Read + Seek>(
        reader: &mut BufferedReader<R>,
        max_tracks: usize,
    ) -> ReadResult<Self> {
        reader.seek(0).map_err(|e| ReaderError::io(0, e))?;
        let header = MidiHeader::read(reader)?;

        let count = (header.track_count() as usize).min(max_tracks);
        let mut tracks = Vec::with_capacity(count);
        for index in 0..count {
            if reader.remaining() == 0 {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    "header announces {} tracks, file holds {index}",
                    header.track_count()
                );
                break;
            }
            let len = chunk::read_chunk_header(reader, MTRK)?;
            let start_byte = reader.position();
            let end_marker = start_byte + len as u64;
            tracks.push(TrackSegment {
                index,
                start_byte,
                end_marker,
            });
            reader
                .seek(end_marker)
                .map_err(|e| ReaderError::io(start_byte, e))?;
        }
        Ok(Self { header, tracks })
    }

    /// The parsed `MThd` chunk
    pub fn header(&self) -> &MidiHeader {
        &self.header
    }

    /// Track bodies in file order
    pub fn tracks(&self) -> &[TrackSegment] {
        &self.tracks
    }
}

#[cfg(test)]
fn two_tracks() -> Vec<u8> {
    [
        b"MThd".as_slice(),
        &[0, 0, 0, 6, 0, 1, 0, 2, 1, 0xE0],
        b"MTrk",
        &[0, 0, 0, 4, 0x00, 0xFF, 0x2F, 0x00],
        b"MTrk",
        &[0, 0, 0, 3, 0x00, 0xC0, 0x01],
    ]
    .concat()
}

#[test]
fn indexes_track_bodies() {
    use pretty_assertions::assert_eq;
    let mut reader = BufferedReader::new(std::io::Cursor::new(two_tracks())).unwrap();
    let file = MidiFile::index(&mut reader, 32).unwrap();
    assert_eq!(file.header().format(), FormatType::Simultaneous);
    assert_eq!(file.header().ticks_per_quarter_note(), 480);
    let bounds: Vec<(u64, u64)> = file
        .tracks()
        .iter()
        .map(|t| (t.start_byte(), t.end_marker()))
        .collect();
    assert_eq!(bounds, vec![(22, 26), (34, 37)]);
}

#[test]
fn track_limit() {
    let mut reader = BufferedReader::new(std::io::Cursor::new(two_tracks())).unwrap();
    let file = MidiFile::index(&mut reader, 1).unwrap();
    assert_eq!(file.tracks().len(), 1);
}

#[test]
fn bad_track_id_fails_file() {
    let mut bytes = two_tracks();
    bytes[26..30].copy_from_slice(b"XTrk");
    let mut reader = BufferedReader::new(std::io::Cursor::new(bytes)).unwrap();
    assert!(MidiFile::index(&mut reader, 32).unwrap_err().is_parse_error());
}
