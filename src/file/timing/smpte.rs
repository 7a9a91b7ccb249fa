#![doc = r#"
SMPTE frame rates

A division word with its top bit set holds a negative SMPTE frame rate in the high byte
and a tick count per frame in the low byte. Such files time events in absolute frames
instead of musical beats. The decoder rejects them, but keeps the rate for the error
report.
"#]

/// The four frame rates a MIDI division word can name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SmpteFps {
    /// 24 frames per second
    TwentyFour,
    /// 25 frames per second
    TwentyFive,
    /// 29.97 frames per second, drop-frame
    TwentyNine,
    /// 30 frames per second
    Thirty,
}

impl SmpteFps {
    /// Read the high byte of a division word (`-24`, `-25`, `-29` or `-30`)
    pub const fn from_division_byte(byte: u8) -> Option<Self> {
        match byte as i8 {
            -24 => Some(Self::TwentyFour),
            -25 => Some(Self::TwentyFive),
            -29 => Some(Self::TwentyNine),
            -30 => Some(Self::Thirty),
            _ => None,
        }
    }

    /// Nominal rate. Drop-frame reports 30.
    pub const fn as_division(&self) -> u8 {
        match self {
            Self::TwentyFour => 24,
            Self::TwentyFive => 25,
            Self::TwentyNine | Self::Thirty => 30,
        }
    }

    /// Actual rate, `30000 / 1001` for drop-frame
    pub const fn as_f64(&self) -> f64 {
        match self {
            Self::TwentyFour => 24.,
            Self::TwentyFive => 25.,
            Self::TwentyNine => 30_000. / 1001.,
            Self::Thirty => 30.,
        }
    }
}

#[test]
fn frame_rates_from_high_byte() {
    assert_eq!(SmpteFps::from_division_byte(0xE7), Some(SmpteFps::TwentyFive));
    assert_eq!(SmpteFps::from_division_byte(0xE3).map(|f| f.as_division()), Some(30));
    assert_eq!(SmpteFps::from_division_byte(0xE0), None);
}
