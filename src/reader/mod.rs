#![doc = r#"
Buffered random-access reading for score files.

[`BufferedReader`] keeps one forward window of the source in memory. Seeking inside the
window only moves a pointer; seeking outside drops it. Reads copy out of the window and
refill it from the source with one I/O call at a time, so decoding a file from removable
storage touches the device in large, sequential blocks.

# Example
```rust
# use scorestream::reader::BufferedReader;
use std::io::Cursor;

let mut reader = BufferedReader::with_capacity(4, Cursor::new(b"MThd\x00\x00\x00\x06".to_vec())).unwrap();

let mut id = [0; 4];
assert_eq!(reader.read(&mut id).unwrap(), 4);
assert_eq!(&id, b"MThd");
assert_eq!(reader.read_u32_be().unwrap(), 6);
assert_eq!(reader.position(), reader.size());
```
"#]

mod error;
pub use error::*;

pub mod vlq;

use std::io::{self, Read, Seek, SeekFrom};

/// Window size used by [`BufferedReader::new`]
pub const DEFAULT_CAPACITY: usize = 10 * 1024;

/// A windowed read/seek cache over a random-access byte source.
///
/// The declared size is taken from the source once, at construction. Reads never go
/// past it.
pub struct BufferedReader<R> {
    inner: R,
    buf: Box<[u8]>,
    /// Source position of `buf[0]`. The inner source sits at `start + len`.
    start: u64,
    len: usize,
    offset: usize,
    size: u64,
}

impl<R: Read + Seek> BufferedReader<R> {
    /// Wrap `inner` with the default window size.
    pub fn new(inner: R) -> io::Result<Self> {
        Self::with_capacity(DEFAULT_CAPACITY, inner)
    }

    /// Wrap `inner` with a window of `capacity` bytes (at least one).
    pub fn with_capacity(capacity: usize, mut inner: R) -> io::Result<Self> {
        let size = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self {
            inner,
            buf: vec![0; capacity.max(1)].into_boxed_slice(),
            start: 0,
            len: 0,
            offset: 0,
            size,
        })
    }

    /// Absolute read position
    #[inline]
    pub fn position(&self) -> u64 {
        self.start + self.offset as u64
    }

    /// Declared size of the source
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Bytes left before the declared size
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.size.saturating_sub(self.position())
    }

    /// Window size in bytes
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Move the read position to `pos`.
    ///
    /// Inside the cached window this is pointer arithmetic only. Anywhere else the window is
    /// dropped and the source is repositioned.
    pub fn seek(&mut self, pos: u64) -> io::Result<()> {
        if self.start <= pos && pos < self.start + self.len as u64 {
            self.offset = (pos - self.start) as usize;
            return Ok(());
        }
        self.inner.seek(SeekFrom::Start(pos))?;
        self.start = pos;
        self.len = 0;
        self.offset = 0;
        Ok(())
    }

    /// Move the read position forward by `n` bytes.
    pub fn skip(&mut self, n: u64) -> io::Result<()> {
        self.seek(self.position().saturating_add(n))
    }

    /// Read up to `dst.len()` bytes.
    ///
    /// The count is short only at the end of the source. If the source fails after some
    /// bytes were already copied, those bytes are returned and the failure shows up on the
    /// next call.
    pub fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        let want = (dst.len() as u64).min(self.remaining()) as usize;
        let mut done = 0;
        while done < want {
            if self.offset == self.len {
                match self.refill() {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) if done == 0 => return Err(e),
                    Err(_) => break,
                }
            }
            let n = (self.len - self.offset).min(want - done);
            dst[done..done + n].copy_from_slice(&self.buf[self.offset..self.offset + n]);
            self.offset += n;
            done += n;
        }
        Ok(done)
    }

    /// Slide the window to the current position and fill it with one source read.
    fn refill(&mut self) -> io::Result<usize> {
        self.start += self.len as u64;
        self.len = 0;
        self.offset = 0;
        let to_read = (self.buf.len() as u64).min(self.size.saturating_sub(self.start)) as usize;
        if to_read == 0 {
            return Ok(0);
        }
        let n = loop {
            match self.inner.read(&mut self.buf[..to_read]) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => break other?,
            }
        };
        self.len = n;
        Ok(n)
    }

    /// Read one byte, `None` at the end of the source.
    pub fn read_u8(&mut self) -> ReadResult<Option<u8>> {
        if self.offset < self.len && self.position() < self.size {
            let byte = self.buf[self.offset];
            self.offset += 1;
            return Ok(Some(byte));
        }
        let mut byte = [0];
        match self.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) => Err(ReaderError::io(self.position(), e)),
        }
    }

    /// Read exactly `N` bytes or fail with [`ReaderErrorKind::OutOfBounds`].
    pub fn read_exact_size<const N: usize>(&mut self) -> ReadResult<[u8; N]> {
        let mut bytes = [0; N];
        let n = self
            .read(&mut bytes)
            .map_err(|e| ReaderError::io(self.position(), e))?;
        if n < N {
            return Err(ReaderError::oob(self.position()));
        }
        Ok(bytes)
    }

    /// Read a big-endian `u16`
    pub fn read_u16_be(&mut self) -> ReadResult<u16> {
        self.read_exact_size().map(u16::from_be_bytes)
    }

    /// Read a big-endian `u32`
    pub fn read_u32_be(&mut self) -> ReadResult<u32> {
        self.read_exact_size().map(u32::from_be_bytes)
    }

    /// Read bytes up to and excluding `terminator`, consuming it.
    ///
    /// At most `limit` bytes are kept. The rest of a longer line is consumed and dropped.
    /// Returns `None` if the source was already exhausted.
    pub fn read_until(&mut self, terminator: u8, limit: usize) -> ReadResult<Option<Vec<u8>>> {
        let mut line = Vec::new();
        let mut any = false;
        while let Some(byte) = self.read_u8()? {
            any = true;
            if byte == terminator {
                break;
            }
            if line.len() < limit {
                line.push(byte);
            }
        }
        Ok(any.then_some(line))
    }

    /// Give back the wrapped source
    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(test)]
struct CountingSource {
    inner: io::Cursor<Vec<u8>>,
    reads: usize,
}

#[cfg(test)]
impl Read for CountingSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        self.inner.read(buf)
    }
}

#[cfg(test)]
impl Seek for CountingSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

#[cfg(test)]
fn counting(len: usize) -> CountingSource {
    CountingSource {
        inner: io::Cursor::new((0..len).map(|i| i as u8).collect()),
        reads: 0,
    }
}

#[test]
fn reads_across_window_boundary() {
    use pretty_assertions::assert_eq;
    let mut reader = BufferedReader::with_capacity(8, counting(20)).unwrap();
    let mut dst = [0; 12];
    assert_eq!(reader.read(&mut dst).unwrap(), 12);
    assert_eq!(dst.to_vec(), (0..12).collect::<Vec<u8>>());
    assert_eq!(reader.position(), 12);
    assert_eq!(reader.into_inner().reads, 2);
}

#[test]
fn seek_inside_window_does_not_touch_source() {
    let mut reader = BufferedReader::with_capacity(8, counting(20)).unwrap();
    assert_eq!(reader.read_u8().unwrap(), Some(0));
    reader.seek(6).unwrap();
    assert_eq!(reader.read_u8().unwrap(), Some(6));
    reader.seek(1).unwrap();
    assert_eq!(reader.read_u8().unwrap(), Some(1));
    assert_eq!(reader.into_inner().reads, 1);
}

#[test]
fn seek_outside_window_refetches() {
    let mut reader = BufferedReader::with_capacity(8, counting(20)).unwrap();
    assert_eq!(reader.read_u8().unwrap(), Some(0));
    reader.seek(15).unwrap();
    assert_eq!(reader.read_u8().unwrap(), Some(15));
    // the window now starts at 15, so 8 is outside it
    reader.seek(8).unwrap();
    assert_eq!(reader.read_u8().unwrap(), Some(8));
    assert_eq!(reader.into_inner().reads, 3);
}

#[test]
fn short_read_at_end() {
    let mut reader = BufferedReader::with_capacity(4, counting(6)).unwrap();
    reader.seek(3).unwrap();
    let mut dst = [0xAA; 8];
    assert_eq!(reader.read(&mut dst).unwrap(), 3);
    assert_eq!(&dst[..4], &[3, 4, 5, 0xAA]);
    assert_eq!(reader.read(&mut dst).unwrap(), 0);
    assert_eq!(reader.read_u8().unwrap(), None);
    assert!(reader.read_u16_be().unwrap_err().is_out_of_bounds());
}

#[test]
fn read_until_splits_lines() {
    let mut reader = BufferedReader::with_capacity(3, io::Cursor::new(b"ab\n\ncd".to_vec())).unwrap();
    assert_eq!(reader.read_until(b'\n', 8).unwrap(), Some(b"ab".to_vec()));
    assert_eq!(reader.read_until(b'\n', 8).unwrap(), Some(vec![]));
    assert_eq!(reader.read_until(b'\n', 8).unwrap(), Some(b"cd".to_vec()));
    assert_eq!(reader.read_until(b'\n', 8).unwrap(), None);
}

#[test]
fn read_until_drops_the_tail_of_long_lines() {
    let mut reader =
        BufferedReader::with_capacity(4, io::Cursor::new(b"abcdefgh\nxy".to_vec())).unwrap();
    assert_eq!(reader.read_until(b'\n', 4).unwrap(), Some(b"abcd".to_vec()));
    assert_eq!(reader.position(), 9);
    assert_eq!(reader.read_until(b'\n', 4).unwrap(), Some(b"xy".to_vec()));
}
