use core::fmt;

use crate::UMicros;

#[doc = r#"
Playback speed, as microseconds per quarter note.

This is the unit of the MIDI `Set Tempo` meta event (`FF 51 03 tt tt tt`). Text scores
state tempo in beats per minute; [`Tempo::from_bpm`] converts.

# Example
```rust
# use scorestream::Tempo;
let tempo = Tempo::from_bpm(120);
assert_eq!(tempo.micros_per_quarter_note(), 500_000);

// 480 ticks at 96 ticks per quarter note is 5 quarter notes
assert_eq!(tempo.ticks_to_millis(480, 96), 2_500);
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tempo(u32);

impl Default for Tempo {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Tempo {
    /// 120 beats per minute, the MIDI default when a file sets no tempo
    pub const DEFAULT: Self = Self(500_000);

    /// Create a tempo from microseconds per quarter note. Zero is raised to one.
    pub const fn new(micros_per_quarter_note: u32) -> Self {
        if micros_per_quarter_note == 0 {
            Self(1)
        } else {
            Self(micros_per_quarter_note)
        }
    }

    /// Create a tempo from the three data bytes of a `Set Tempo` event
    pub const fn new_from_bytes(bytes: [u8; 3]) -> Self {
        Self::new(u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]))
    }

    /// Create a tempo from beats per minute. Zero is raised to one.
    pub const fn from_bpm(bpm: u32) -> Self {
        let bpm = if bpm == 0 { 1 } else { bpm };
        Self::new(60_000_000 / bpm)
    }

    /// Microseconds per quarter note
    pub const fn micros_per_quarter_note(&self) -> u32 {
        self.0
    }

    /// Beats per minute, rounded down
    pub const fn bpm(&self) -> u32 {
        60_000_000 / self.0
    }

    /// The three data bytes of a `Set Tempo` event
    pub const fn to_bytes(&self) -> [u8; 3] {
        let b = self.0.to_be_bytes();
        [b[1], b[2], b[3]]
    }

    /// Real time taken by `ticks` at this tempo.
    pub const fn ticks_to_micros(&self, ticks: u32, ticks_per_quarter_note: u16) -> UMicros {
        let tpqn = if ticks_per_quarter_note == 0 {
            1
        } else {
            ticks_per_quarter_note as u64
        };
        UMicros::new(ticks as u64 * self.0 as u64 / tpqn)
    }

    /// `ms = ticks × µs_per_quarter / ticks_per_quarter / 1000`
    pub const fn ticks_to_millis(&self, ticks: u32, ticks_per_quarter_note: u16) -> u64 {
        self.ticks_to_micros(ticks, ticks_per_quarter_note).as_millis()
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} µs/qn", self.0)
    }
}

#[test]
fn bpm_round_trip() {
    for bpm in [1, 7, 60, 96, 120, 133, 240, 999] {
        assert_eq!(Tempo::from_bpm(bpm).bpm(), bpm);
    }
    assert_eq!(Tempo::from_bpm(240).micros_per_quarter_note(), 250_000);
}

#[test]
fn set_tempo_bytes() {
    let tempo = Tempo::new_from_bytes([0x07, 0xA1, 0x20]);
    assert_eq!(tempo, Tempo::DEFAULT);
    assert_eq!(tempo.to_bytes(), [0x07, 0xA1, 0x20]);
}

#[test]
fn tick_conversion() {
    let tempo = Tempo::new(123_456);
    assert_eq!(tempo.ticks_to_micros(480, 480), UMicros::new(123_456));
    assert_eq!(tempo.ticks_to_millis(960, 480), 246);
    assert_eq!(Tempo::DEFAULT.ticks_to_micros(0, 0), UMicros::ZERO);
}
