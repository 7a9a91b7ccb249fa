#![doc = r#"
Plaintext score decoding

A text score is a line-oriented file holding one or more blocks:
```text
#MUSIC_TITLE: Twinkle
#MUSIC_BPM: 100
#MUSIC_RHYTHM: 0
#MUSIC_START
60,60,67,67,69,69,67,-,   / a comment
#BPMCHANGE 80
65,65,64,64,62,62,60,;
#MUSIC_END
```
Inside a block every `,` or `;` closes one token, and each token lasts one rhythm length:
- an empty token is a rest;
- a number is a note (MIDI note number);
- a token starting with `-` ties: the sounding note is released and struck again.

Lines starting with `#` inside a block are commands (`BPMCHANGE n`, `TONECHANGE n`,
`RHYTHMCHANGE n`, `DELAY msec`, `MUSIC_START`, `MUSIC_END`). Anything after `/` on a line is
a comment.

[`scan_blocks`] finds the blocks of a file. [`TextDecoder`] turns one block into
[`Event`]s.
"#]

mod header;
pub use header::*;

mod rhythm;
pub use rhythm::*;

use std::io::{Read, Seek};

use crate::{
    Note, Tempo,
    config::TextConfig,
    event::{Event, EventKind},
    reader::{BufferedReader, ReadResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextState {
    Scanning,
    Releasing,
    Ended,
}

#[doc = r##"
The decode state of one text score block.

```rust
# use scorestream::{prelude::*, text::TextDecoder};
use std::io::Cursor;

let score = b"#MUSIC_START\n60,,-,;\n".to_vec();
let mut reader = BufferedReader::new(Cursor::new(score)).unwrap();
let mut decoder = TextDecoder::new(TextConfig::new(), 21, 120, 0, Rhythm::Quarter);

let kinds: Vec<_> = (0..6).map(|_| *decoder.next_event(&mut reader).unwrap().kind()).collect();
let c4 = Note::new(60).unwrap();
assert_eq!(kinds, [
    EventKind::TempoChange(Tempo::from_bpm(120)),
    EventKind::NoteOn { note: c4, velocity: 64, channel: Channel::One },
    EventKind::NoteOff { note: c4, channel: Channel::One },
    EventKind::NoteOn { note: c4, velocity: 64, channel: Channel::One },
    EventKind::NoteOff { note: c4, channel: Channel::One },
    EventKind::ScoreEnd,
]);
```
"##]
#[derive(Debug, Clone)]
pub struct TextDecoder {
    config: TextConfig,
    end: u64,
    bpm: u32,
    tone: i32,
    rhythm: Rhythm,
    token: Vec<u8>,
    sounding: Option<Note>,
    duration: u32,
    pending: Option<Event>,
    state: TextState,
}

impl TextDecoder {
    /// Start a block that ends at `end_marker`, with the block's header values.
    ///
    /// The reader should be at the block's `#MUSIC_START` line.
    pub fn new(config: TextConfig, end_marker: u64, bpm: u32, tone: i32, rhythm: Rhythm) -> Self {
        Self {
            config,
            end: end_marker,
            bpm: bpm.max(1),
            tone,
            rhythm,
            token: Vec::new(),
            sounding: None,
            duration: 0,
            pending: None,
            state: TextState::Scanning,
        }
    }

    /// Tempo in beats per minute
    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    /// Current transposition in semitones
    pub fn tone(&self) -> i32 {
        self.tone
    }

    /// Current token length
    pub fn rhythm(&self) -> Rhythm {
        self.rhythm
    }

    /// True once [`EventKind::ScoreEnd`] has been returned
    pub fn is_ended(&self) -> bool {
        self.state == TextState::Ended
    }

    /// Scan forward to the next event.
    pub fn next_event<R: Read + Seek>(
        &mut self,
        reader: &mut BufferedReader<R>,
    ) -> ReadResult<Event> {
        if let Some(event) = self.pending.take() {
            return Ok(event);
        }
        match self.state {
            TextState::Scanning => {}
            TextState::Releasing => {
                self.state = TextState::Ended;
                return Ok(self.emit(EventKind::ScoreEnd));
            }
            TextState::Ended => return Ok(Event::end(0)),
        }

        loop {
            if reader.position() >= self.end {
                return Ok(self.finish());
            }
            let Some(byte) = reader.read_u8()? else {
                return Ok(self.finish());
            };
            match byte {
                b'/' => {
                    reader.read_until(b'\n', MAX_LINE_LEN)?;
                }
                b'#' => {
                    let line = reader.read_until(b'\n', MAX_LINE_LEN)?.unwrap_or_default();
                    if let Some(event) = self.command(&String::from_utf8_lossy(&line)) {
                        return Ok(event);
                    }
                }
                b'0'..=b'9' | b'-' => self.token.push(byte),
                b',' | b';' => {
                    if let Some(event) = self.close_token() {
                        return Ok(event);
                    }
                }
                _ => {}
            }
        }
    }

    fn tick(&self) -> u32 {
        self.rhythm.ticks(self.config.ticks_per_quarter())
    }

    /// Build an event carrying the accumulated duration, and clear it.
    fn emit(&mut self, kind: EventKind) -> Event {
        Event::new(core::mem::take(&mut self.duration), kind)
    }

    fn rest(&mut self) {
        self.duration = self.duration.saturating_add(self.tick());
    }

    fn note_on(&self, delta: u32, note: Note) -> Event {
        Event::note_on(delta, note, self.config.velocity(), self.config.channel())
    }

    fn note_off(&mut self, note: Note) -> Event {
        self.emit(EventKind::NoteOff {
            note,
            channel: self.config.channel(),
        })
    }

    fn close_token(&mut self) -> Option<Event> {
        let token = core::mem::take(&mut self.token);
        if token.first() == Some(&b'-') {
            let Some(note) = self.sounding else {
                self.rest();
                return None;
            };
            let off = self.note_off(note);
            self.pending = Some(self.note_on(0, note));
            self.duration = self.tick();
            return Some(off);
        }

        let Some(note) = parse_pitch(&token) else {
            if !token.is_empty() {
                #[cfg(feature = "tracing")]
                tracing::trace!(
                    "treating `{}` as a rest",
                    String::from_utf8_lossy(&token)
                );
            }
            self.rest();
            return None;
        };
        let event = match self.sounding.replace(note) {
            Some(previous) => {
                let off = self.note_off(previous);
                self.pending = Some(self.note_on(0, note));
                off
            }
            None => {
                let delta = core::mem::take(&mut self.duration);
                self.note_on(delta, note)
            }
        };
        self.duration = self.tick();
        Some(event)
    }

    fn command(&mut self, line: &str) -> Option<Event> {
        let line = line.trim();
        let emit = self.config.emit_state_changes();
        if line.starts_with("BPMCHANGE ") {
            if let Some(bpm) = directive_value(line, "BPMCHANGE ")
                .and_then(|v| u32::try_from(v).ok())
                .filter(|&bpm| bpm > 0)
            {
                self.bpm = bpm;
            }
            Some(self.emit(EventKind::TempoChange(Tempo::from_bpm(self.bpm))))
        } else if line.starts_with("TONECHANGE ") {
            let tone = directive_value(line, "TONECHANGE ").and_then(|v| i32::try_from(v).ok())?;
            self.tone = tone;
            emit.then(|| self.emit(EventKind::ToneChange(tone)))
        } else if let Some(id) = line.strip_prefix("RHYTHMCHANGE ") {
            let rhythm = Rhythm::parse(id)?;
            self.rhythm = rhythm;
            emit.then(|| self.emit(EventKind::RhythmChange(rhythm)))
        } else if line.starts_with("DELAY ") {
            let millis = directive_value(line, "DELAY ").and_then(|v| u32::try_from(v).ok())?;
            // ticks = ms × ticks/beat × beats/minute / ms/minute
            let ticks = millis as u64 * self.config.ticks_per_quarter() as u64 * self.bpm as u64
                / 60_000;
            self.duration = self
                .duration
                .saturating_add(u32::try_from(ticks).unwrap_or(u32::MAX));
            emit.then(|| self.emit(EventKind::Delay { millis }))
        } else if line == "MUSIC_START" {
            Some(self.emit(EventKind::TempoChange(Tempo::from_bpm(self.bpm))))
        } else if line == "MUSIC_END" {
            Some(self.finish())
        } else {
            #[cfg(feature = "tracing")]
            tracing::trace!("ignoring control line `#{line}`");
            None
        }
    }

    /// End of block: release the sounding note first, if any.
    fn finish(&mut self) -> Event {
        self.token.clear();
        match self.sounding.take() {
            Some(note) => {
                self.state = TextState::Releasing;
                self.note_off(note)
            }
            None => {
                self.state = TextState::Ended;
                self.emit(EventKind::ScoreEnd)
            }
        }
    }
}

/// A token of digits naming a note `0..=127`
fn parse_pitch(token: &[u8]) -> Option<Note> {
    if token.is_empty() || !token.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let pitch = token.iter().try_fold(0u32, |acc, &b| {
        acc.checked_mul(10)?.checked_add((b - b'0') as u32)
    })?;
    Note::new(u8::try_from(pitch).ok()?)
}

#[test]
fn pitch_tokens() {
    assert_eq!(parse_pitch(b"60"), Note::new(60));
    assert_eq!(parse_pitch(b"007"), Note::new(7));
    assert_eq!(parse_pitch(b"128"), None);
    assert_eq!(parse_pitch(b"99999999999"), None);
    assert_eq!(parse_pitch(b"6-0"), None);
    assert_eq!(parse_pitch(b""), None);
}
