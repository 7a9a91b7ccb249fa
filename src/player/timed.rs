use super::Player;
use crate::{Tempo, UMicros, event::Event, reader::ReadResult, storage::Storage};

/// An event placed at an absolute time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timed<T> {
    /// Time since the start of the entry
    pub timestamp: UMicros,
    /// The event
    pub event: T,
}

impl<T> Timed<T> {
    /// Place `event` at `timestamp`
    pub const fn new(timestamp: UMicros, event: T) -> Self {
        Self { timestamp, event }
    }
}

#[doc = r#"
Timestamps the events of a [`Player`].

The delay before an event is measured at the tempo in force before it; a tempo change
applies from the event that carries it onward. Time is counted from the last tempo
change in whole ticks, so rounding never accumulates.
"#]
pub struct TimedEvents<'p, S: Storage> {
    player: &'p mut Player<S>,
    ticks_per_quarter: u16,
    tempo: Tempo,
    /// Time of the last tempo change
    base: UMicros,
    ticks_since_base: u64,
    done: bool,
}

impl<'p, S: Storage> TimedEvents<'p, S> {
    pub(super) fn new(player: &'p mut Player<S>) -> Self {
        let (ticks_per_quarter, tempo) = player
            .entry()
            .map(|entry| (entry.ticks_per_quarter(), entry.tempo()))
            .unwrap_or((96, Tempo::DEFAULT));
        Self {
            player,
            ticks_per_quarter,
            tempo,
            base: UMicros::ZERO,
            ticks_since_base: 0,
            done: false,
        }
    }

    fn now(&self) -> UMicros {
        let tpqn = self.ticks_per_quarter.max(1) as u64;
        let micros = self.ticks_since_base * self.tempo.micros_per_quarter_note() as u64 / tpqn;
        self.base + UMicros::new(micros)
    }
}

impl<S: Storage> Iterator for TimedEvents<'_, S> {
    type Item = ReadResult<Timed<Event>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let event = match self.player.next_event() {
            Ok(event) => event,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        self.ticks_since_base += event.delta_ticks() as u64;
        let timestamp = self.now();
        if let Some(tempo) = event.tempo() {
            self.base = timestamp;
            self.ticks_since_base = 0;
            self.tempo = tempo;
        }
        self.done = event.is_end();
        Some(Ok(Timed::new(timestamp, event)))
    }
}
