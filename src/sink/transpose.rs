use std::collections::HashMap;

use super::{Filter, ParamId};
use crate::{
    Note,
    message::{Message, channel::Channel},
};

#[doc = r#"
Shifts notes by whole octaves plus a number of semitones.

Results are clamped to `0..=127`. A note off is shifted by the amount its note on was
shifted by, so changing the shift while notes sound never leaves a note hanging.
"#]
#[derive(Debug, Clone, Default)]
pub struct Transpose {
    octaves: i32,
    semitones: i32,
    held: HashMap<(Channel, Note), Note>,
}

impl Transpose {
    /// No shift
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift by `octaves` and `semitones`
    pub fn with_shift(octaves: i32, semitones: i32) -> Self {
        Self {
            octaves,
            semitones,
            held: HashMap::new(),
        }
    }

    /// Total shift in semitones
    pub fn shift(&self) -> i32 {
        self.octaves.saturating_mul(12).saturating_add(self.semitones)
    }
}

impl Filter for Transpose {
    fn is_available(&self, param: ParamId) -> bool {
        matches!(param, ParamId::OctaveShift | ParamId::Tone)
    }

    fn get_param(&self, param: ParamId) -> Option<i64> {
        match param {
            ParamId::OctaveShift => Some(self.octaves as i64),
            ParamId::Tone => Some(self.semitones as i64),
            _ => None,
        }
    }

    fn set_param(&mut self, param: ParamId, value: i64) -> bool {
        let Ok(value) = i32::try_from(value) else {
            return false;
        };
        match param {
            ParamId::OctaveShift => self.octaves = value,
            ParamId::Tone => self.semitones = value,
            _ => return false,
        }
        true
    }

    fn send(&mut self, message: Message) -> Option<Message> {
        let message = match message {
            Message::NoteOn {
                note,
                velocity,
                channel,
            } => {
                let shifted = note.transpose(self.shift());
                self.held.insert((channel, note), shifted);
                Message::NoteOn {
                    note: shifted,
                    velocity,
                    channel,
                }
            }
            Message::NoteOff {
                note,
                velocity,
                channel,
            } => Message::NoteOff {
                note: self
                    .held
                    .remove(&(channel, note))
                    .unwrap_or_else(|| note.transpose(self.shift())),
                velocity,
                channel,
            },
            other => other,
        };
        Some(message)
    }
}

#[test]
fn note_off_follows_its_note_on() {
    let mut transpose = Transpose::with_shift(0, 2);
    let note = Note::new(60).unwrap();
    transpose.send(Message::NoteOn {
        note,
        velocity: 1,
        channel: Channel::One,
    });
    transpose.set_param(ParamId::OctaveShift, -1);
    let off = transpose.send(Message::NoteOff {
        note,
        velocity: 0,
        channel: Channel::One,
    });
    assert_eq!(off.and_then(|m| m.note()), Note::new(62));
    assert_eq!(transpose.shift(), -10);
}

#[test]
fn clamps_to_note_range() {
    let mut transpose = Transpose::with_shift(5, 0);
    let on = transpose.send(Message::NoteOn {
        note: Note::new(100).unwrap(),
        velocity: 1,
        channel: Channel::One,
    });
    assert_eq!(on.and_then(|m| m.note()), Some(Note::MAX));
}
