#![doc = r#"
Delivering events to the output side

The consumer of decoded events is an ordered chain of links that all speak the same
[`Filter`] interface. Each link either passes a [`Message`] on (possibly changed) or
consumes it. A [`FilterChain`] also keeps the tempo, so it can say how long to wait
before each event.

```rust
# use scorestream::{prelude::*, sink::{ParamId, Recorder, Transpose}};
let recorder = Recorder::new();
let mut chain = FilterChain::new()
    .with(Transpose::new())
    .with(recorder.clone());
chain.set_param(ParamId::OctaveShift, 1);

let c4 = Note::new(60).unwrap();
let event = Event::note_on(96, c4, 64, Channel::One);
assert_eq!(chain.delay_millis(&event), 500);
chain.deliver(&event);

assert_eq!(
    recorder.messages(),
    [Message::NoteOn { note: Note::new(72).unwrap(), velocity: 64, channel: Channel::One }]
);
```
"#]

mod channel_filter;
pub use channel_filter::*;

mod recorder;
pub use recorder::*;

mod transpose;
pub use transpose::*;

use crate::{
    Note, Tempo,
    catalog::ScoreEntry,
    event::{Event, EventKind},
    message::{Message, channel::Channel},
};

/// Parameters a link may expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamId {
    /// Output level of the terminal
    OutputLevel,
    /// Let a channel (`0..=15`) through
    EnableChannel,
    /// Block a channel (`0..=15`)
    DisableChannel,
    /// All sixteen channel bits at once
    ChannelMask,
    /// Transposition in octaves
    OctaveShift,
    /// Transposition in semitones
    Tone,
}

#[doc = r#"
One link of the output chain.

Every method has a default, which is the behavior of a link that does nothing: it starts,
has no parameters and passes every message through unchanged.
"#]
pub trait Filter {
    /// Prepare for output. `false` if the link cannot run.
    fn begin(&mut self) -> bool {
        true
    }

    /// Periodic work, called from the playback loop
    fn update(&mut self) {}

    /// True if this link handles `param`
    fn is_available(&self, _param: ParamId) -> bool {
        false
    }

    /// Read a parameter
    fn get_param(&self, _param: ParamId) -> Option<i64> {
        None
    }

    /// Write a parameter. `false` if the link does not handle it or refuses the value.
    fn set_param(&mut self, _param: ParamId, _value: i64) -> bool {
        false
    }

    /// Handle a message. `None` consumes it.
    fn send(&mut self, message: Message) -> Option<Message> {
        Some(message)
    }
}

/// An ordered list of [`Filter`] links plus the tempo channel
pub struct FilterChain {
    links: Vec<Box<dyn Filter>>,
    tempo: Tempo,
    ticks_per_quarter: u16,
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterChain {
    /// An empty chain at 120 BPM and 96 ticks per quarter note
    pub fn new() -> Self {
        Self {
            links: Vec::new(),
            tempo: Tempo::DEFAULT,
            ticks_per_quarter: 96,
        }
    }

    /// Append a link
    pub fn with(mut self, link: impl Filter + 'static) -> Self {
        self.push(link);
        self
    }

    /// Append a link
    pub fn push(&mut self, link: impl Filter + 'static) {
        self.links.push(Box::new(link));
    }

    /// Number of links
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// True if the chain has no links
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Start every link. `false` if any link failed.
    pub fn begin(&mut self) -> bool {
        self.links
            .iter_mut()
            .fold(true, |ok, link| link.begin() && ok)
    }

    /// Run every link's periodic work
    pub fn update(&mut self) {
        self.links.iter_mut().for_each(|link| link.update());
    }

    /// True if any link handles `param`
    pub fn is_available(&self, param: ParamId) -> bool {
        self.links.iter().any(|link| link.is_available(param))
    }

    /// The value of `param` from the first link that handles it
    pub fn get_param(&self, param: ParamId) -> Option<i64> {
        self.links
            .iter()
            .find(|link| link.is_available(param))
            .and_then(|link| link.get_param(param))
    }

    /// Set `param` on every link that handles it. `true` if any accepted the value.
    pub fn set_param(&mut self, param: ParamId, value: i64) -> bool {
        self.links
            .iter_mut()
            .filter(|link| link.is_available(param))
            .fold(false, |accepted, link| link.set_param(param, value) || accepted)
    }

    /// Pass `message` down the chain. Returns what came out of the last link.
    pub fn send(&mut self, message: Message) -> Option<Message> {
        self.links
            .iter_mut()
            .try_fold(message, |message, link| link.send(message))
    }

    /// Send a note on
    pub fn note_on(&mut self, note: Note, velocity: u8, channel: Channel) -> Option<Message> {
        self.send(Message::NoteOn {
            note,
            velocity,
            channel,
        })
    }

    /// Send a note off
    pub fn note_off(&mut self, note: Note, velocity: u8, channel: Channel) -> Option<Message> {
        self.send(Message::NoteOff {
            note,
            velocity,
            channel,
        })
    }

    /// Send a control change
    pub fn control_change(&mut self, controller: u8, value: u8, channel: Channel) -> Option<Message> {
        self.send(Message::ControlChange {
            controller,
            value,
            channel,
        })
    }

    /// Send a program change
    pub fn program_change(&mut self, program: u8, channel: Channel) -> Option<Message> {
        self.send(Message::ProgramChange { program, channel })
    }

    /// Send a song position pointer
    pub fn song_position(&mut self, sixteenths: u16) -> Option<Message> {
        self.send(Message::SongPosition(sixteenths))
    }

    /// Send a song select
    pub fn song_select(&mut self, song: u8) -> Option<Message> {
        self.send(Message::SongSelect(song))
    }

    /// Take tempo and resolution from the entry about to play
    pub fn prepare(&mut self, entry: &ScoreEntry) {
        self.tempo = entry.tempo();
        self.ticks_per_quarter = entry.ticks_per_quarter();
    }

    /// Current tempo
    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    /// How long to wait before `event`, at the tempo in force before it
    pub fn delay_millis(&self, event: &Event) -> u64 {
        self.tempo
            .ticks_to_millis(event.delta_ticks(), self.ticks_per_quarter)
    }

    /// Act on one decoded event.
    ///
    /// Notes are sent down the chain, with a zero-velocity note on sent as a note off.
    /// A tempo change updates the tempo for every later [`FilterChain::delay_millis`].
    /// Other events send nothing.
    pub fn deliver(&mut self, event: &Event) -> Option<Message> {
        match *event.kind() {
            EventKind::NoteOn {
                note,
                velocity: 0,
                channel,
            }
            | EventKind::NoteOff { note, channel } => self.note_off(note, 0, channel),
            EventKind::NoteOn {
                note,
                velocity,
                channel,
            } => self.note_on(note, velocity, channel),
            EventKind::TempoChange(tempo) => {
                self.tempo = tempo;
                None
            }
            _ => None,
        }
    }
}

#[test]
fn velocity_zero_is_note_off() {
    let recorder = Recorder::new();
    let mut chain = FilterChain::new().with(recorder.clone());
    let note = Note::new(64).unwrap();
    chain.deliver(&Event::note_on(0, note, 0, Channel::Two));
    assert_eq!(
        recorder.messages(),
        vec![Message::NoteOff {
            note,
            velocity: 0,
            channel: Channel::Two
        }]
    );
}

#[test]
fn tempo_applies_after_its_event() {
    let mut chain = FilterChain::new();
    let change = Event::new(96, EventKind::TempoChange(Tempo::from_bpm(60)));
    assert_eq!(chain.delay_millis(&change), 500);
    assert_eq!(chain.deliver(&change), None);
    assert_eq!(chain.delay_millis(&Event::end(96)), 1_000);
}

#[test]
fn consumed_messages_stop_the_chain() {
    let recorder = Recorder::new();
    let mut chain = FilterChain::new()
        .with(ChannelFilter::new())
        .with(recorder.clone());
    assert!(chain.set_param(ParamId::DisableChannel, 0));
    let note = Note::new(60).unwrap();
    assert_eq!(chain.note_on(note, 10, Channel::One), None);
    chain.note_on(note, 10, Channel::Two);
    assert_eq!(recorder.len(), 1);
    assert_eq!(chain.get_param(ParamId::ChannelMask), Some(0xFFFE));
    assert!(!chain.is_available(ParamId::OctaveShift));
}
