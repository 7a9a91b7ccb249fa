use std::io::{self, Cursor, Read, Seek, SeekFrom};

use pretty_assertions::assert_eq;
use scorestream::reader::{BufferedReader, vlq};

/// Small deterministic generator so failures are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

fn data(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + i / 13) as u8).collect()
}

#[test]
fn matches_unbuffered_baseline() {
    let bytes = data(1_000);
    for capacity in [1, 3, 64, 333, 1_000, 4_096] {
        let mut rng = Lcg(capacity as u64);
        let mut reader = BufferedReader::with_capacity(capacity, Cursor::new(bytes.clone())).unwrap();
        let mut baseline = Cursor::new(bytes.clone());

        for _ in 0..2_000 {
            if rng.below(4) == 0 {
                let pos = rng.below(bytes.len() as u64 + 10);
                reader.seek(pos).unwrap();
                baseline.seek(SeekFrom::Start(pos)).unwrap();
            }
            let want = rng.below(80) as usize;
            let mut got = vec![0; want];
            let mut expected = vec![0; want];
            let n = reader.read(&mut got).unwrap();
            let m = baseline.read(&mut expected).unwrap();
            assert_eq!(n, m, "capacity {capacity}");
            assert_eq!(got[..n], expected[..m]);
            assert_eq!(reader.position(), baseline.position());
        }
    }
}

#[test]
fn reads_exactly_at_window_boundary() {
    let bytes = data(64);
    let mut reader = BufferedReader::with_capacity(16, Cursor::new(bytes.clone())).unwrap();
    let mut first = [0; 16];
    assert_eq!(reader.read(&mut first).unwrap(), 16);
    assert_eq!(first.as_slice(), &bytes[..16]);

    // one byte short of the boundary, then across it
    reader.seek(31).unwrap();
    let mut across = [0; 2];
    assert_eq!(reader.read(&mut across).unwrap(), 2);
    assert_eq!(across.as_slice(), &bytes[31..33]);

    reader.seek(63).unwrap();
    let mut tail = [0; 4];
    assert_eq!(reader.read(&mut tail).unwrap(), 1);
    assert_eq!(tail[0], bytes[63]);
    assert_eq!(reader.read(&mut tail).unwrap(), 0);
}

/// Serves `ok` bytes, then fails every read
struct Failing {
    inner: Cursor<Vec<u8>>,
    ok: u64,
}

impl Read for Failing {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.inner.position() >= self.ok {
            return Err(io::Error::other("card removed"));
        }
        let room = (self.ok - self.inner.position()) as usize;
        let len = buf.len().min(room);
        self.inner.read(&mut buf[..len])
    }
}

impl Seek for Failing {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

#[test]
fn io_error_after_partial_read_surfaces_next_call() {
    let source = Failing {
        inner: Cursor::new(data(32)),
        ok: 8,
    };
    let mut reader = BufferedReader::with_capacity(8, source).unwrap();
    let mut dst = [0; 12];
    assert_eq!(reader.read(&mut dst).unwrap(), 8);
    assert_eq!(reader.read(&mut dst).unwrap_err().to_string(), "card removed");
    assert_eq!(reader.position(), 8);
}

#[test]
fn vlq_round_trip_over_range() {
    let mut rng = Lcg(42);
    let values = (0..2_000)
        .map(|_| rng.below(vlq::VLQ_MAX as u64 + 1) as u32)
        .chain([0, 0x7F, 0x80, 0x3FFF, 0x4000, 0x1F_FFFF, 0x20_0000, vlq::VLQ_MAX]);
    for value in values {
        let mut out = [0; 4];
        let encoded = vlq::encode_vlq(value, &mut out).to_vec();
        let mut stream = encoded.clone();
        stream.push(0x55);

        let mut reader = BufferedReader::new(Cursor::new(stream)).unwrap();
        assert_eq!(reader.read_vlq().unwrap(), value);
        assert_eq!(reader.position(), encoded.len() as u64);
        assert_eq!(vlq::decode_vlq(&encoded), Some((value, encoded.len())));
    }
}
