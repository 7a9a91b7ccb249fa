#![doc = r#"
Messages delivered to a [`FilterChain`](crate::sink::FilterChain)

# Hierarchy
```text
                     |---------|
                     | Message |
                     |---------|
                    /           \
|-----------------------|   |-----------------------|
| Channel Voice Message |   | System Common Message |
|-----------------------|   |-----------------------|
  note on / note off          song position
  control change              song select
  program change
```
"#]

pub mod channel;

use channel::Channel;

use crate::Note;

/// The set of messages a sink link can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Message {
    /// Start a note
    NoteOn {
        /// pitch
        note: Note,
        /// `1..=127`
        velocity: u8,
        /// channel
        channel: Channel,
    },
    /// Release a note
    NoteOff {
        /// pitch
        note: Note,
        /// release velocity
        velocity: u8,
        /// channel
        channel: Channel,
    },
    /// Set a controller value
    ControlChange {
        /// controller number
        controller: u8,
        /// value
        value: u8,
        /// channel
        channel: Channel,
    },
    /// Select an instrument
    ProgramChange {
        /// program number
        program: u8,
        /// channel
        channel: Channel,
    },
    /// Song position pointer, in sixteenth notes from the start
    SongPosition(u16),
    /// Select a song by number
    SongSelect(u8),
}

impl Message {
    /// The channel of a channel voice message
    pub const fn channel(&self) -> Option<Channel> {
        match self {
            Self::NoteOn { channel, .. }
            | Self::NoteOff { channel, .. }
            | Self::ControlChange { channel, .. }
            | Self::ProgramChange { channel, .. } => Some(*channel),
            Self::SongPosition(_) | Self::SongSelect(_) => None,
        }
    }

    /// The note of a note message
    pub const fn note(&self) -> Option<Note> {
        match self {
            Self::NoteOn { note, .. } | Self::NoteOff { note, .. } => Some(*note),
            _ => None,
        }
    }
}
