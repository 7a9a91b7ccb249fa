use std::io::{Read, Seek};

use super::{FormatType, MTHD, Timing, chunk::read_chunk_header};
use crate::{
    ChunkError, HeaderError,
    reader::{BufferedReader, ReadResult, ReaderError},
};

#[doc = r#"
The `MThd` chunk of a MIDI file.

Only files timed in ticks per quarter note are accepted. A declared length above 6 is
allowed and the extra bytes are skipped.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiHeader {
    header_len: u32,
    format: FormatType,
    track_count: u16,
    ticks_per_quarter_note: u16,
}

impl MidiHeader {
    /// Read and validate the header at the current position (normally 0).
    ///
    /// Leaves the reader at the first byte after the header chunk.
    pub fn read<R: Read + Seek>(reader: &mut BufferedReader<R>) -> ReadResult<Self> {
        let header_len = read_chunk_header(reader, MTHD)?;
        let body = reader.position();
        if header_len < 6 {
            return Err(ReaderError::chunk(body - 4, ChunkError::ShortHeader(header_len)));
        }
        let format = FormatType::from(reader.read_u16_be()?);
        let track_count = reader.read_u16_be()?;
        let division_at = reader.position();
        let ticks_per_quarter_note = match Timing::from_division(reader.read_u16_be()?) {
            Timing::TicksPerQuarterNote(tpqn) => tpqn,
            Timing::Smpte(smpte) => {
                return Err(ReaderError::header(division_at, HeaderError::SmpteTiming(smpte)));
            }
        };
        if header_len > 6 {
            reader
                .seek(body + header_len as u64)
                .map_err(|e| ReaderError::io(body, e))?;
        }
        Ok(Self {
            header_len,
            format,
            track_count,
            ticks_per_quarter_note,
        })
    }

    /// Always `MThd`
    pub const fn chunk_id(&self) -> [u8; 4] {
        MTHD
    }
    /// Declared length of the header body
    pub const fn header_len(&self) -> u32 {
        self.header_len
    }
    /// File format
    pub const fn format(&self) -> FormatType {
        self.format
    }
    /// Number of tracks the header announces
    pub const fn track_count(&self) -> u16 {
        self.track_count
    }
    /// Tick resolution of every track in the file
    pub const fn ticks_per_quarter_note(&self) -> u16 {
        self.ticks_per_quarter_note
    }
    /// The header's timing
    pub const fn timing(&self) -> Timing {
        Timing::TicksPerQuarterNote(self.ticks_per_quarter_note)
    }
}

#[cfg(test)]
fn header_bytes(len: u32, division: u16, extra: &[u8]) -> Vec<u8> {
    let mut bytes = b"MThd".to_vec();
    bytes.extend(len.to_be_bytes());
    bytes.extend(1u16.to_be_bytes());
    bytes.extend(2u16.to_be_bytes());
    bytes.extend(division.to_be_bytes());
    bytes.extend(extra);
    bytes
}

#[test]
fn reads_standard_header() {
    use std::io::Cursor;
    let mut reader = BufferedReader::new(Cursor::new(header_bytes(6, 480, &[]))).unwrap();
    let header = MidiHeader::read(&mut reader).unwrap();
    assert_eq!(header.format(), FormatType::Simultaneous);
    assert_eq!(header.track_count(), 2);
    assert_eq!(header.ticks_per_quarter_note(), 480);
    assert_eq!(reader.position(), 14);
}

#[test]
fn skips_long_header() {
    use std::io::Cursor;
    let mut reader =
        BufferedReader::new(Cursor::new(header_bytes(8, 96, &[0xAA, 0xBB, b'M']))).unwrap();
    let header = MidiHeader::read(&mut reader).unwrap();
    assert_eq!(header.header_len(), 8);
    assert_eq!(reader.read_u8().unwrap(), Some(b'M'));
}

#[test]
fn rejects_smpte_division() {
    use std::io::Cursor;
    let mut reader = BufferedReader::new(Cursor::new(header_bytes(6, 0xE250, &[]))).unwrap();
    let err = MidiHeader::read(&mut reader).unwrap_err();
    assert!(matches!(
        err.error_kind(),
        crate::reader::ReaderErrorKind::ParseError(crate::ParseError::Header(HeaderError::SmpteTiming(_)))
    ));
    assert_eq!(err.position(), 12);
}

#[test]
fn rejects_short_header() {
    use std::io::Cursor;
    let mut reader = BufferedReader::new(Cursor::new(header_bytes(4, 96, &[]))).unwrap();
    let err = MidiHeader::read(&mut reader).unwrap_err();
    assert!(matches!(
        err.error_kind(),
        crate::reader::ReaderErrorKind::ParseError(crate::ParseError::Chunk(ChunkError::ShortHeader(4)))
    ));
}
