mod smpte;
pub use smpte::*;

use crate::SmpteDivision;

/// The division word of a MIDI header.
///
/// Either a tick rate per quarter note, or the SMPTE form (top bit set) that this crate
/// recognizes only to reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    /// Delta times count fractions of a quarter note
    TicksPerQuarterNote(u16),
    /// Delta times count fractions of an SMPTE frame
    Smpte(SmpteDivision),
}

impl Timing {
    /// Split a raw big-endian division word
    pub const fn from_division(division: u16) -> Self {
        if division & 0x8000 == 0 {
            Self::TicksPerQuarterNote(division)
        } else {
            let [hi, lo] = division.to_be_bytes();
            Self::Smpte(SmpteDivision {
                fps: SmpteFps::from_division_byte(hi),
                ticks_per_frame: lo,
            })
        }
    }

    /// Returns Some if the file counts ticks per quarter note
    pub const fn ticks_per_quarter_note(&self) -> Option<u16> {
        match self {
            Self::TicksPerQuarterNote(t) => Some(*t),
            Self::Smpte(_) => None,
        }
    }
}

#[test]
fn division_word() {
    assert_eq!(
        Timing::from_division(480).ticks_per_quarter_note(),
        Some(480)
    );
    // -25 fps, 40 ticks per frame
    let Timing::Smpte(smpte) = Timing::from_division(0xE728) else {
        panic!("expected smpte");
    };
    assert_eq!(smpte.fps, Some(SmpteFps::TwentyFive));
    assert_eq!(smpte.ticks_per_frame, 40);
}
