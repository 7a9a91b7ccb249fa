#![doc = r#"
MIDI variable-length quantities.

Each byte contributes its low seven bits, most significant group first. A set high bit
means another byte follows. Standard MIDI Files never use more than four bytes, which caps
the value at `0x0FFF_FFFF`.
"#]

use std::io::{Read, Seek};

use super::{BufferedReader, ReadResult, ReaderError};

/// Largest value a four byte quantity can hold
pub const VLQ_MAX: u32 = 0x0FFF_FFFF;

impl<R: Read + Seek> BufferedReader<R> {
    /// Read a variable-length quantity.
    ///
    /// Fails with [`ReaderErrorKind::OutOfBounds`](super::ReaderErrorKind::OutOfBounds)
    /// if the source ends before a byte with a clear high bit.
    pub fn read_vlq(&mut self) -> ReadResult<u32> {
        let mut acc: u32 = 0;
        loop {
            let Some(byte) = self.read_u8()? else {
                return Err(ReaderError::oob(self.position()));
            };
            acc = (acc << 7) | (byte & 0x7F) as u32;
            if byte & 0x80 == 0 {
                return Ok(acc);
            }
        }
    }
}

/// Decode a quantity from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed, or `None` if `bytes` ends
/// mid-sequence.
pub fn decode_vlq(bytes: &[u8]) -> Option<(u32, usize)> {
    let mut acc: u32 = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        acc = (acc << 7) | (byte & 0x7F) as u32;
        if byte & 0x80 == 0 {
            return Some((acc, i + 1));
        }
    }
    None
}

/// Encode `value` (masked to 28 bits) into `out`, returning the encoded slice.
pub fn encode_vlq(value: u32, out: &mut [u8; 4]) -> &[u8] {
    let value = value & VLQ_MAX;
    let mut len = 1;
    while len < 4 && value >> (7 * len) != 0 {
        len += 1;
    }
    for i in 0..len {
        let shift = 7 * (len - 1 - i);
        let group = ((value >> shift) & 0x7F) as u8;
        out[i] = if i + 1 < len { group | 0x80 } else { group };
    }
    &out[..len]
}

#[test]
fn known_encodings() {
    use pretty_assertions::assert_eq;
    let cases: [(u32, &[u8]); 8] = [
        (0x00, &[0x00]),
        (0x40, &[0x40]),
        (0x7F, &[0x7F]),
        (0x80, &[0x81, 0x00]),
        (0x2000, &[0xC0, 0x00]),
        (0x3FFF, &[0xFF, 0x7F]),
        (0x10_0000, &[0xC0, 0x80, 0x00]),
        (VLQ_MAX, &[0xFF, 0xFF, 0xFF, 0x7F]),
    ];
    for (value, bytes) in cases {
        let mut out = [0; 4];
        assert_eq!(encode_vlq(value, &mut out), bytes);
        assert_eq!(decode_vlq(bytes), Some((value, bytes.len())));
    }
}

#[test]
fn round_trip_consumes_exact_length() {
    // every length boundary plus a stride through the whole range
    let mut values = vec![0, 1, 0x7F, 0x80, 0x3FFF, 0x4000, 0x1F_FFFF, 0x20_0000, VLQ_MAX];
    values.extend((0..=VLQ_MAX).step_by(0x1_0001));
    for value in values {
        let mut out = [0; 4];
        let encoded = encode_vlq(value, &mut out).to_vec();
        let mut padded = encoded.clone();
        padded.push(0x55);
        assert_eq!(decode_vlq(&padded), Some((value, encoded.len())), "{value:#X}");
    }
}

#[test]
fn truncated_sequence() {
    assert_eq!(decode_vlq(&[]), None);
    assert_eq!(decode_vlq(&[0x81]), None);
    assert_eq!(decode_vlq(&[0xFF, 0xFF, 0xFF]), None);
}

#[test]
fn buffered_read_reports_premature_end() {
    let mut reader = BufferedReader::new(std::io::Cursor::new(vec![0x83, 0x60, 0x81])).unwrap();
    assert_eq!(reader.read_vlq().unwrap(), 0x1E0);
    let err = reader.read_vlq().unwrap_err();
    assert!(err.is_out_of_bounds());
    assert_eq!(err.position(), 3);
}
