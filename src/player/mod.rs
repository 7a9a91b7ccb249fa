#![doc = r##"
The playback session

A [`Player`] owns at most one open score. [`Player::load`] drops whatever was loaded
before, opens the entry's file and seeks to it. Every [`Player::next_event`] then decodes
exactly one event, whatever the format of the entry.

```rust
# use scorestream::{prelude::*, storage::MemoryStorage};
let mut storage = MemoryStorage::new();
storage.insert("song.txt", b"#MUSIC_BPM:60\n#MUSIC_START\n60,62,;\n#MUSIC_END\n".to_vec());

let catalog = Catalog::scan_with(&storage, "song.txt", &DecoderConfig::default()).unwrap();
let mut player = Player::with_storage(storage);
player.load(&catalog.entries()[0]).unwrap();

let timestamps: Vec<u64> = player
    .timed_events()
    .map(|timed| timed.unwrap().timestamp.as_millis())
    .collect();
// tempo, C4 on, C4 off and D4 on one beat later, D4 off, end
assert_eq!(timestamps, [0, 0, 1_000, 1_000, 3_000, 3_000]);
```
"##]

mod timed;
pub use timed::*;

use crate::{
    FileError,
    catalog::{ScoreEntry, ScoreFormat},
    config::DecoderConfig,
    event::Event,
    file::TrackDecoder,
    reader::{BufferedReader, ReadResult, ReaderError, ReaderErrorKind},
    storage::{FsStorage, Storage},
    text::TextDecoder,
};

#[derive(Debug)]
enum Decoder {
    Midi(TrackDecoder),
    Text(TextDecoder),
}

struct Session<R> {
    entry: ScoreEntry,
    reader: BufferedReader<R>,
    decoder: Decoder,
}

/// A cursor over one [`ScoreEntry`] at a time
pub struct Player<S: Storage = FsStorage> {
    storage: S,
    config: DecoderConfig,
    session: Option<Session<S::Source>>,
}

impl Player<FsStorage> {
    /// A player reading from the host filesystem
    pub fn new() -> Self {
        Self::with_storage(FsStorage)
    }
}

impl Default for Player<FsStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Storage> Player<S> {
    /// A player reading from `storage`
    pub fn with_storage(storage: S) -> Self {
        Self {
            storage,
            config: DecoderConfig::default(),
            session: None,
        }
    }

    /// Use `config` for every following [`Player::load`]
    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    /// The storage scores are read from
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Open `entry` and reset all decode state.
    ///
    /// Anything loaded before is closed first, even if opening `entry` fails.
    pub fn load(&mut self, entry: &ScoreEntry) -> Result<(), FileError> {
        self.session = None;
        let path = entry.path();
        let source = self
            .storage
            .open(path)
            .map_err(|e| FileError::new(path, ReaderError::io(0, e)))?;
        let mut reader = BufferedReader::with_capacity(self.config.buffer_capacity(), source)
            .map_err(|e| FileError::new(path, ReaderError::io(0, e)))?;
        reader
            .seek(entry.start_byte())
            .map_err(|e| FileError::new(path, ReaderError::io(entry.start_byte(), e)))?;

        let decoder = match entry.format() {
            ScoreFormat::Midi => {
                Decoder::Midi(TrackDecoder::new(entry.end_marker(), Some(entry.tempo())))
            }
            ScoreFormat::Text => Decoder::Text(TextDecoder::new(
                *self.config.text(),
                entry.end_marker(),
                entry.bpm(),
                entry.tone(),
                entry.rhythm(),
            )),
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "loaded `{}` from {} at {}",
            entry.title(),
            path.display(),
            entry.start_byte()
        );
        self.session = Some(Session {
            entry: entry.clone(),
            reader,
            decoder,
        });
        Ok(())
    }

    /// Close the loaded entry, if any
    pub fn unload(&mut self) {
        self.session = None;
    }

    /// The loaded entry
    pub fn entry(&self) -> Option<&ScoreEntry> {
        self.session.as_ref().map(|session| &session.entry)
    }

    /// Current transposition of the loaded entry in semitones.
    ///
    /// Text scores can change it while playing with `#TONECHANGE`.
    pub fn tone(&self) -> Option<i32> {
        self.session.as_ref().map(|session| match &session.decoder {
            Decoder::Midi(_) => session.entry.tone(),
            Decoder::Text(text) => text.tone(),
        })
    }

    /// True once the loaded entry has returned its end event
    pub fn is_ended(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| match &session.decoder {
                Decoder::Midi(midi) => midi.is_ended(),
                Decoder::Text(text) => text.is_ended(),
            })
    }

    /// Decode the next event.
    ///
    /// After the end event every call returns it again. Before any successful load this
    /// fails with [`ReaderErrorKind::NotLoaded`].
    pub fn next_event(&mut self) -> ReadResult<Event> {
        let Some(session) = self.session.as_mut() else {
            return Err(ReaderError::new(0, ReaderErrorKind::NotLoaded));
        };
        match &mut session.decoder {
            Decoder::Midi(midi) => midi.next_event(&mut session.reader),
            Decoder::Text(text) => text.next_event(&mut session.reader),
        }
    }

    /// The remaining events of the loaded entry, up to and including the end event.
    ///
    /// Stops after the first error.
    pub fn events(&mut self) -> Events<'_, S> {
        Events {
            player: self,
            done: false,
        }
    }

    /// Like [`Player::events`], with each event placed at its absolute time.
    ///
    /// The clock starts at zero from the current position, at the entry's tempo.
    pub fn timed_events(&mut self) -> TimedEvents<'_, S> {
        TimedEvents::new(self)
    }
}

/// See [`Player::events`]
pub struct Events<'p, S: Storage> {
    player: &'p mut Player<S>,
    done: bool,
}

impl<S: Storage> Iterator for Events<'_, S> {
    type Item = ReadResult<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = self.player.next_event();
        self.done = match &next {
            Ok(event) => event.is_end(),
            Err(_) => true,
        };
        Some(next)
    }
}
