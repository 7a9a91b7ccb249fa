#![doc = r#"
Structural errors for score files.

Only problems that make a file impossible to index are errors. Unsupported MIDI events and
malformed text directives are consumed and skipped by the decoders instead.
"#]

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::reader::ReaderError;

/// A structural mismatch that aborts parsing a file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A chunk did not have the expected shape
    #[error("Chunk: {0}")]
    Chunk(#[from] ChunkError),
    /// The header chunk carries values this decoder cannot play
    #[error("Header: {0}")]
    Header(#[from] HeaderError),
    /// A playlist names another playlist
    #[error("Playlists cannot list other playlists")]
    NestedPlaylist,
}

/// Errors found while reading chunk framing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChunkError {
    /// The four byte chunk id did not match.
    #[error("Expected chunk {}, found {}", show_id(expected), show_id(found))]
    UnexpectedId {
        /// The id the decoder was looking for
        expected: [u8; 4],
        /// The bytes actually read
        found: [u8; 4],
    },
    /// The header chunk declared fewer than 6 bytes of data.
    #[error("Header length {0} is shorter than 6 bytes")]
    ShortHeader(u32),
}

/// Errors in the values of the `MThd` chunk.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// The division field uses SMPTE time code
    #[error("SMPTE timing ({0}) is not supported")]
    SmpteTiming(SmpteDivision),
}

/// The raw SMPTE division of a rejected header, kept for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmpteDivision {
    /// Frames per second, if the value is one of the four SMPTE rates
    pub fps: Option<crate::file::SmpteFps>,
    /// Ticks per frame
    pub ticks_per_frame: u8,
}

impl core::fmt::Display for SmpteDivision {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.fps {
            Some(fps) => write!(f, "{} fps, {} ticks/frame", fps.as_f64(), self.ticks_per_frame),
            None => write!(f, "unknown fps, {} ticks/frame", self.ticks_per_frame),
        }
    }
}

fn show_id(id: &[u8; 4]) -> String {
    id.iter()
        .map(|&b| {
            if b.is_ascii_graphic() {
                (b as char).to_string()
            } else {
                format!("\\x{b:02X}")
            }
        })
        .collect()
}

#[doc = r#"
An error tied to a specific score file.

Produced when a file cannot be opened, read, or indexed during a
[`Catalog`](crate::catalog::Catalog) scan or a [`Player::load`](crate::player::Player::load).
"#]
#[derive(Debug, Error)]
#[error("{}: {source}", path.display())]
pub struct FileError {
    path: PathBuf,
    #[source]
    source: ReaderError,
}

impl FileError {
    /// Create a file error from a path and the underlying reader error
    pub fn new(path: impl Into<PathBuf>, source: ReaderError) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
    /// The file the error happened in
    pub fn path(&self) -> &Path {
        &self.path
    }
    /// The underlying reader error
    pub fn reader_error(&self) -> &ReaderError {
        &self.source
    }
}

#[test]
fn chunk_error_shows_ascii_ids() {
    let err = ChunkError::UnexpectedId {
        expected: *b"MThd",
        found: [b'R', b'I', 0x00, b'F'],
    };
    assert_eq!(err.to_string(), "Expected chunk MThd, found RI\\x00F");
}
