#![doc = r#"
Decoder configuration

Every knob has the value the instrument firmware ships with, so `DecoderConfig::default()`
is what [`Player::new`](crate::player::Player::new) and
[`Catalog::scan`](crate::catalog::Catalog::scan) use.

```rust
# use scorestream::prelude::*;
let config = DecoderConfig::new()
    .with_buffer_capacity(512)
    .with_text(TextConfig::new().with_velocity(100).with_state_changes(true));

assert_eq!(config.buffer_capacity(), 512);
assert_eq!(config.max_tracks(), 32);
assert_eq!(config.text().velocity(), 100);
assert_eq!(config.text().ticks_per_quarter(), 96);
```
"#]

use crate::{message::channel::Channel, reader::DEFAULT_CAPACITY};

/// Settings shared by the catalog scan and the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecoderConfig {
    buffer_capacity: usize,
    max_tracks: usize,
    text: TextConfig,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderConfig {
    /// Tracks indexed per MIDI file when nothing else is configured
    pub const DEFAULT_MAX_TRACKS: usize = 32;

    /// The default configuration
    pub const fn new() -> Self {
        Self {
            buffer_capacity: DEFAULT_CAPACITY,
            max_tracks: Self::DEFAULT_MAX_TRACKS,
            text: TextConfig::new(),
        }
    }

    /// Size of the read window kept per open file
    pub const fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Tracks past this count are not indexed
    pub const fn with_max_tracks(mut self, max_tracks: usize) -> Self {
        self.max_tracks = max_tracks;
        self
    }

    /// Replace the text score settings
    pub const fn with_text(mut self, text: TextConfig) -> Self {
        self.text = text;
        self
    }

    /// Read window size in bytes
    pub const fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }

    /// Maximum tracks indexed per MIDI file
    pub const fn max_tracks(&self) -> usize {
        self.max_tracks
    }

    /// Text score settings
    pub const fn text(&self) -> &TextConfig {
        &self.text
    }
}

/// Settings for plaintext scores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextConfig {
    ticks_per_quarter: u16,
    velocity: u8,
    channel: Channel,
    emit_state_changes: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TextConfig {
    /// 96 ticks per quarter note, velocity 64, channel 1, silent state changes
    pub const fn new() -> Self {
        Self {
            ticks_per_quarter: 96,
            velocity: 64,
            channel: Channel::One,
            emit_state_changes: false,
        }
    }

    /// Set the tick resolution. Zero is raised to one.
    pub const fn with_ticks_per_quarter(mut self, ticks: u16) -> Self {
        self.ticks_per_quarter = if ticks == 0 { 1 } else { ticks };
        self
    }

    /// Velocity of every note on. Clamped to `1..=127`.
    pub const fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = if velocity == 0 {
            1
        } else if velocity > 127 {
            127
        } else {
            velocity
        };
        self
    }

    /// Channel of every note event
    pub const fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    /// Report `TONECHANGE`, `RHYTHMCHANGE` and `DELAY` as events
    pub const fn with_state_changes(mut self, emit: bool) -> Self {
        self.emit_state_changes = emit;
        self
    }

    /// Ticks per quarter note
    pub const fn ticks_per_quarter(&self) -> u16 {
        self.ticks_per_quarter
    }

    /// Note on velocity
    pub const fn velocity(&self) -> u8 {
        self.velocity
    }

    /// Note channel
    pub const fn channel(&self) -> Channel {
        self.channel
    }

    /// Whether state changes are reported as events
    pub const fn emit_state_changes(&self) -> bool {
        self.emit_state_changes
    }
}
