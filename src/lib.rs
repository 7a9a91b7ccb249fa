#![doc = r#"
Streaming score decoding for small instrument controllers.

`scorestream` turns Standard MIDI Files and a line-oriented plaintext score notation into
one stream of time-tagged performance [`Event`](event::Event)s. Nothing is read into
memory up front: a [`Catalog`](catalog::Catalog) indexes where every playable unit starts,
and a [`Player`](player::Player) seeks there and decodes one event per pull.

# Overview
```text
  Catalog::scan(dir) ──► [ScoreEntry, ScoreEntry, ...]
                                  │
                     Player::load(&entry)
                                  │
          Player::next_event() ──► Event { delta_ticks, kind }
                                  │
                 FilterChain::deliver(&event)
```

# Example
```rust,no_run
use scorestream::prelude::*;

let catalog = Catalog::scan("SCORE").unwrap();
let mut player = Player::new();

player.load(&catalog.entries()[0]).unwrap();
for event in player.events() {
    let event = event.unwrap();
    println!("{:>6} {:?}", event.delta_ticks(), event.kind());
}
```
"#]
#![warn(missing_docs)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod event;
pub mod file;
pub mod message;
pub mod player;
pub mod reader;
pub mod sink;
pub mod storage;
pub mod text;

mod micros;
pub use micros::*;

mod note;
pub use note::*;

mod tempo;
pub use tempo::*;

pub use error::*;

/// Commonly used types
pub mod prelude {
    pub use crate::{
        catalog::{Catalog, ScoreEntry, ScoreFormat},
        config::{DecoderConfig, TextConfig},
        error::*,
        event::{Event, EventKind},
        message::{Message, channel::Channel},
        micros::UMicros,
        note::Note,
        player::{Player, Timed},
        reader::{BufferedReader, ReadResult, ReaderError, ReaderErrorKind},
        sink::{Filter, FilterChain},
        storage::{FsStorage, Storage},
        tempo::Tempo,
        text::Rhythm,
    };
}
