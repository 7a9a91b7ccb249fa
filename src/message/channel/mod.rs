#![doc = r#"
MIDI channels

Channels travel in the low nibble of a status byte (`0..=15`) and are shown to people as
`1..=16`.
"#]

use core::fmt;

use num_enum::{FromPrimitive, IntoPrimitive};

/// One of the sixteen MIDI channels.
///
/// Converting from a `u8` only looks at values `0..=15`. Anything else maps to
/// [`Channel::One`].
///
/// ```rust
/// # use scorestream::prelude::*;
/// assert_eq!(Channel::from_status(0x93), Channel::Four);
/// assert_eq!(Channel::Four.number(), 4);
/// assert_eq!(u8::from(Channel::Four), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Channel {
    /// 0bxxxx0000
    #[num_enum(default)]
    One = 0,
    /// 0bxxxx0001
    Two,
    /// 0bxxxx0010
    Three,
    /// 0bxxxx0011
    Four,
    /// 0bxxxx0100
    Five,
    /// 0bxxxx0101
    Six,
    /// 0bxxxx0110
    Seven,
    /// 0bxxxx0111
    Eight,
    /// 0bxxxx1000
    Nine,
    /// 0bxxxx1001
    Ten,
    /// 0bxxxx1010
    Eleven,
    /// 0bxxxx1011
    Twelve,
    /// 0bxxxx1100
    Thirteen,
    /// 0bxxxx1101
    Fourteen,
    /// 0bxxxx1110
    Fifteen,
    /// 0bxxxx1111
    Sixteen,
}

impl Default for Channel {
    fn default() -> Self {
        Self::One
    }
}

impl Channel {
    /// Take the channel from the low nibble of a status byte
    pub fn from_status(status: u8) -> Self {
        Self::from(status & 0x0F)
    }

    /// Channel number as printed on devices, `1..=16`
    pub fn number(self) -> u8 {
        u8::from(self) + 1
    }

    /// Look up a channel by its printed number, `1..=16`
    pub fn from_number(number: u8) -> Option<Self> {
        (1..=16).contains(&number).then(|| Self::from(number - 1))
    }

    /// The bit for this channel in a 16-bit channel mask
    pub fn mask_bit(self) -> u16 {
        1 << u8::from(self)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch{}", self.number())
    }
}

#[test]
fn status_nibble() {
    assert_eq!(Channel::from_status(0x80), Channel::One);
    assert_eq!(Channel::from_status(0x9F), Channel::Sixteen);
    assert_eq!(Channel::from(200), Channel::One);
    assert_eq!(Channel::from_number(16), Some(Channel::Sixteen));
    assert_eq!(Channel::from_number(0), None);
    assert_eq!(Channel::Ten.mask_bit(), 0b10_0000_0000);
}
