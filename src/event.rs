#![doc = r#"
The canonical performance event produced by every decoder.

An [`Event`] is a delta time plus one [`EventKind`]. Delta times are in the ticks of the
entry being played ([`ScoreEntry::ticks_per_quarter`](crate::catalog::ScoreEntry::ticks_per_quarter)),
relative to the previous event of the same session.
"#]

use crate::{Note, Tempo, message::channel::Channel, text::Rhythm};

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// A note starts. MIDI files may use velocity 0 to mean note off.
    NoteOn {
        /// pitch
        note: Note,
        /// velocity
        velocity: u8,
        /// channel
        channel: Channel,
    },
    /// A note ends. Velocity is always 0.
    NoteOff {
        /// pitch
        note: Note,
        /// channel
        channel: Channel,
    },
    /// Tempo changes from this point on
    TempoChange(Tempo),
    /// Text scores: transposition changed (only with `emit_state_changes`)
    ToneChange(i32),
    /// Text scores: rhythm changed (only with `emit_state_changes`)
    RhythmChange(Rhythm),
    /// Text scores: a `DELAY` command was applied (only with `emit_state_changes`)
    Delay {
        /// the requested delay
        millis: u32,
    },
    /// The score is over. Repeats on every further pull.
    ScoreEnd,
    /// An event that was consumed but has no meaning for playback
    Invalid,
}

#[doc = r#"
One decoded event.

```rust
# use scorestream::prelude::*;
let on = Event::note_on(0, Note::new(60).unwrap(), 100, Channel::One);
assert!(on.is_note_on());
assert_eq!(on.note(), Note::new(60));

let end = Event::new(96, EventKind::ScoreEnd);
assert!(end.is_end());
assert_eq!(end.delta_ticks(), 96);
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    delta_ticks: u32,
    kind: EventKind,
}

impl Event {
    /// Create an event
    pub const fn new(delta_ticks: u32, kind: EventKind) -> Self {
        Self { delta_ticks, kind }
    }

    /// A note on event
    pub const fn note_on(delta_ticks: u32, note: Note, velocity: u8, channel: Channel) -> Self {
        Self::new(
            delta_ticks,
            EventKind::NoteOn {
                note,
                velocity,
                channel,
            },
        )
    }

    /// A note off event
    pub const fn note_off(delta_ticks: u32, note: Note, channel: Channel) -> Self {
        Self::new(delta_ticks, EventKind::NoteOff { note, channel })
    }

    /// A score end event
    pub const fn end(delta_ticks: u32) -> Self {
        Self::new(delta_ticks, EventKind::ScoreEnd)
    }

    /// Ticks since the previous event
    pub const fn delta_ticks(&self) -> u32 {
        self.delta_ticks
    }

    /// The event payload
    pub const fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// The note of a note event
    pub const fn note(&self) -> Option<Note> {
        match self.kind {
            EventKind::NoteOn { note, .. } | EventKind::NoteOff { note, .. } => Some(note),
            _ => None,
        }
    }

    /// The channel of a note event
    pub const fn channel(&self) -> Option<Channel> {
        match self.kind {
            EventKind::NoteOn { channel, .. } | EventKind::NoteOff { channel, .. } => {
                Some(channel)
            }
            _ => None,
        }
    }

    /// True for [`EventKind::NoteOn`], whatever the velocity
    pub const fn is_note_on(&self) -> bool {
        matches!(self.kind, EventKind::NoteOn { .. })
    }

    /// True for [`EventKind::NoteOff`]
    pub const fn is_note_off(&self) -> bool {
        matches!(self.kind, EventKind::NoteOff { .. })
    }

    /// True for [`EventKind::ScoreEnd`]
    pub const fn is_end(&self) -> bool {
        matches!(self.kind, EventKind::ScoreEnd)
    }

    /// The tempo of a tempo change
    pub const fn tempo(&self) -> Option<Tempo> {
        match self.kind {
            EventKind::TempoChange(tempo) => Some(tempo),
            _ => None,
        }
    }
}
