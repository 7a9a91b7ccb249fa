use num_enum::{IntoPrimitive, TryFromPrimitive};

#[doc = r#"
The note length one score token occupies.

Text scores select a rhythm by id with `#MUSIC_RHYTHM:` or `#RHYTHMCHANGE`. Lengths are
relative to the quarter note, so the tick count depends on the resolution in use.

```rust
# use scorestream::text::Rhythm;
assert_eq!(Rhythm::try_from(1u8).unwrap(), Rhythm::Eighth);
assert_eq!(Rhythm::Eighth.ticks(96), 48);
assert_eq!(Rhythm::WholeTriplet.ticks(96), 128);
assert!(Rhythm::try_from(7u8).is_err());
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Rhythm {
    /// One quarter note
    Quarter = 0,
    /// Half a quarter
    Eighth = 1,
    /// A quarter of a quarter
    Sixteenth = 2,
    /// A third of a whole note, 4/3 quarter
    WholeTriplet = 3,
    /// A third of a half note, 2/3 quarter
    HalfTriplet = 4,
    /// A third of a quarter
    QuarterTriplet = 5,
    /// A third of an eighth, 1/6 quarter
    EighthTriplet = 6,
}

impl Default for Rhythm {
    fn default() -> Self {
        Self::Quarter
    }
}

impl Rhythm {
    /// Ticks taken by one token, given the ticks per quarter note
    pub const fn ticks(self, ticks_per_quarter: u16) -> u32 {
        let base = ticks_per_quarter as u32;
        match self {
            Self::Quarter => base,
            Self::Eighth => base / 2,
            Self::Sixteenth => base / 4,
            Self::WholeTriplet => base * 4 / 3,
            Self::HalfTriplet => base * 2 / 3,
            Self::QuarterTriplet => base / 3,
            Self::EighthTriplet => base / 6,
        }
    }

    /// Parse a rhythm id as written in a score
    pub fn parse(text: &str) -> Option<Self> {
        let id: i64 = text.trim().parse().ok()?;
        u8::try_from(id).ok().and_then(|id| Self::try_from(id).ok())
    }
}

#[test]
fn ticks_at_text_resolution() {
    let ticks: Vec<u32> = (0..=6u8)
        .map(|id| Rhythm::try_from(id).unwrap().ticks(96))
        .collect();
    assert_eq!(ticks, vec![96, 48, 24, 128, 64, 32, 16]);
}

#[test]
fn parse_rejects_out_of_range() {
    assert_eq!(Rhythm::parse(" 5 "), Some(Rhythm::QuarterTriplet));
    assert_eq!(Rhythm::parse("-1"), None);
    assert_eq!(Rhythm::parse("300"), None);
    assert_eq!(Rhythm::parse("x"), None);
}
