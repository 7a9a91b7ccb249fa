use std::io;

use crate::{ChunkError, HeaderError, ParseError};
use thiserror::Error;

#[doc = r#"
Anything that stops a score from being read, with the byte offset it happened at.

The offset is the position in the file, not in the reader's window, so it can be
reported against the file as it sits on disk.
"#]
#[derive(Debug, Error)]
#[error("at byte {position}: {kind}")]
pub struct ReaderError {
    position: u64,
    kind: ReaderErrorKind,
}

/// What went wrong
#[derive(Debug, Error)]
pub enum ReaderErrorKind {
    /// The bytes are not a score this crate understands
    #[error("malformed score: {0}")]
    ParseError(#[from] ParseError),
    /// The file ended inside a field
    #[error("unexpected end of data")]
    OutOfBounds,
    /// The storage failed
    #[error("{0}")]
    Io(#[from] io::Error),
    /// [`Player::next_event`](crate::player::Player::next_event) before any load
    #[error("no score loaded")]
    NotLoaded,
}

impl ReaderError {
    /// An error of `kind` at `position`
    pub const fn new(position: u64, kind: ReaderErrorKind) -> Self {
        Self { position, kind }
    }

    /// A chunk that is not what the file layout calls for
    pub(crate) const fn chunk(position: u64, error: ChunkError) -> Self {
        Self::new(position, ReaderErrorKind::ParseError(ParseError::Chunk(error)))
    }

    /// A header field this crate cannot play
    pub(crate) const fn header(position: u64, error: HeaderError) -> Self {
        Self::new(position, ReaderErrorKind::ParseError(ParseError::Header(error)))
    }

    /// The data ran out at `position`
    pub const fn oob(position: u64) -> Self {
        Self::new(position, ReaderErrorKind::OutOfBounds)
    }

    /// The storage failed at `position`
    pub fn io(position: u64, error: io::Error) -> Self {
        Self::new(position, ReaderErrorKind::Io(error))
    }

    /// True if the data ended early
    pub const fn is_out_of_bounds(&self) -> bool {
        matches!(self.kind, ReaderErrorKind::OutOfBounds)
    }

    /// True if the file is not a score this crate can decode
    pub const fn is_parse_error(&self) -> bool {
        matches!(self.kind, ReaderErrorKind::ParseError(_))
    }

    /// What went wrong
    pub fn error_kind(&self) -> &ReaderErrorKind {
        &self.kind
    }

    /// Byte offset in the file
    pub fn position(&self) -> u64 {
        self.position
    }
}

/// Result of every read in this crate
pub type ReadResult<T> = Result<T, ReaderError>;

#[test]
fn display_names_the_offset() {
    let err = ReaderError::chunk(
        14,
        ChunkError::UnexpectedId {
            expected: *b"MTrk",
            found: *b"JUNK",
        },
    );
    assert!(err.is_parse_error());
    assert_eq!(
        err.to_string(),
        "at byte 14: malformed score: Chunk: Expected chunk MTrk, found JUNK"
    );
    assert_eq!(ReaderError::oob(3).to_string(), "at byte 3: unexpected end of data");
}
