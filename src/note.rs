use core::fmt;
use core::ops::{Add, Sub};

#[doc = r#"
A MIDI note number, `0..=127`.

Note `0` is `C-1`, note `60` is middle C (`C4`) and note `127` is `G9`.

# Example
```rust
# use scorestream::Note;
let note = Note::new(61).unwrap();
assert_eq!(note.to_string(), "C#4");

// transposition saturates at the ends of the range
assert_eq!((note + 100).byte(), 127);
assert_eq!((note - 100).byte(), 0);

assert!(Note::new(128).is_none());
```
"#]
#[derive(Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Note(u8);

const NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

impl Note {
    /// Lowest note
    pub const MIN: Self = Self(0);
    /// Highest note
    pub const MAX: Self = Self(127);

    /// Create a new note. `None` if the leading bit is set.
    pub const fn new(byte: u8) -> Option<Self> {
        if byte > 127 { None } else { Some(Self(byte)) }
    }

    /// Create a note from a data byte, dropping the leading bit.
    pub const fn from_data_byte(byte: u8) -> Self {
        Self(byte & 0x7F)
    }

    /// Returns the underlying byte of the note
    pub const fn byte(&self) -> u8 {
        self.0
    }

    /// Shift by `semitones`, clamped to `0..=127`
    pub const fn transpose(self, semitones: i32) -> Self {
        let shifted = (self.0 as i32).saturating_add(semitones);
        if shifted < 0 {
            Self(0)
        } else if shifted > 127 {
            Self(127)
        } else {
            Self(shifted as u8)
        }
    }

    /// The octave, where middle C starts octave 4
    pub const fn octave(&self) -> i8 {
        (self.0 / 12) as i8 - 1
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", NAMES[(self.0 % 12) as usize], self.octave())
    }
}

impl Add<u8> for Note {
    type Output = Note;
    fn add(self, rhs: u8) -> Self::Output {
        self.transpose(rhs as i32)
    }
}

impl Sub<u8> for Note {
    type Output = Note;
    fn sub(self, rhs: u8) -> Self::Output {
        self.transpose(-(rhs as i32))
    }
}

#[test]
fn note_names() {
    assert_eq!(Note::MIN.to_string(), "C-1");
    assert_eq!(Note::new(60).unwrap().to_string(), "C4");
    assert_eq!(Note::new(69).unwrap().to_string(), "A4");
    assert_eq!(Note::MAX.to_string(), "G9");
}

#[test]
fn transpose_clamps() {
    let note = Note::new(120).unwrap();
    assert_eq!(note.transpose(12), Note::MAX);
    assert_eq!(note.transpose(-12).byte(), 108);
    assert_eq!(Note::new(5).unwrap().transpose(-12), Note::MIN);
}

#[test]
fn data_byte_drops_leading_bit() {
    assert_eq!(Note::from_data_byte(0xBC).byte(), 0x3C);
}
