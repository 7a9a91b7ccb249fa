#![doc = r#"
Chunk framing

A MIDI file is a sequence of chunks, each a 4-byte ASCII id and a big-endian 32-bit
length followed by that many bytes of body:
```text
[MThd][len = 6][format][ntrks][division]
[MTrk][len    ][events ...              ]
[MTrk][len    ][events ...              ]
```
"#]

use std::io::{Read, Seek};

use crate::{
    ChunkError,
    reader::{BufferedReader, ReadResult, ReaderError},
};

/// Id of the header chunk
pub const MTHD: [u8; 4] = *b"MThd";
/// Id of a track chunk
pub const MTRK: [u8; 4] = *b"MTrk";

/// Read a chunk id and length, failing if the id is not `expected`.
///
/// On success the reader sits at the start of the chunk body.
pub(crate) fn read_chunk_header<R: Read + Seek>(
    reader: &mut BufferedReader<R>,
    expected: [u8; 4],
) -> ReadResult<u32> {
    let at = reader.position();
    let found: [u8; 4] = reader.read_exact_size()?;
    if found != expected {
        return Err(ReaderError::chunk(at, ChunkError::UnexpectedId { expected, found }));
    }
    reader.read_u32_be()
}

#[test]
fn rejects_wrong_id() {
    use std::io::Cursor;
    let mut reader = BufferedReader::new(Cursor::new(b"RIFF\x00\x00\x00\x06".to_vec())).unwrap();
    let err = read_chunk_header(&mut reader, MTHD).unwrap_err();
    assert!(err.is_parse_error());
    assert_eq!(err.position(), 0);
}

#[test]
fn reads_length_after_id() {
    use std::io::Cursor;
    let mut reader = BufferedReader::new(Cursor::new(b"MTrk\x00\x00\x01\x00".to_vec())).unwrap();
    assert_eq!(read_chunk_header(&mut reader, MTRK).unwrap(), 256);
    assert_eq!(reader.position(), 8);
}
