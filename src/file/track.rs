#![doc = r#"
Per-event decoding of an `MTrk` body

Every event is a variable-length delta time followed by one of:
```text
FF type len data     meta event      (0x51 set tempo, 0x2F end of track)
F0 len data          sysex
F7 len data          sysex escape
8n/9n/An/Bn/En a b   channel event, two data bytes
Cn/Dn a              channel event, one data byte
a b                  channel event under running status
```
Only note on, note off, set tempo and end of track mean anything for playback. Every
other event is read in full and reported as [`EventKind::Invalid`].
"#]

use std::io::{Read, Seek};

use crate::{
    Note, Tempo,
    event::{Event, EventKind},
    message::channel::Channel,
    reader::{BufferedReader, ReadResult, ReaderError},
};

const META: u8 = 0xFF;
const SYSEX: u8 = 0xF0;
const SYSEX_ESCAPE: u8 = 0xF7;

const META_SET_TEMPO: u8 = 0x51;
const META_END_OF_TRACK: u8 = 0x2F;

/// Decode one event from a track body ending at `end`.
///
/// `running_status` is the last channel status seen in this track; it is updated by
/// genuine channel status bytes only. At or past `end` this returns
/// [`EventKind::ScoreEnd`] without reading.
pub fn read_event<R: Read + Seek>(
    reader: &mut BufferedReader<R>,
    running_status: &mut Option<u8>,
    end: u64,
) -> ReadResult<Event> {
    if reader.position() >= end {
        return Ok(Event::end(0));
    }
    let delta = reader.read_vlq()?;
    let status = next_byte(reader)?;
    let kind = match status {
        META => read_meta(reader)?,
        SYSEX | SYSEX_ESCAPE => {
            let len = reader.read_vlq()?;
            skip(reader, len as u64)?;
            EventKind::Invalid
        }
        0x80..=0xEF => {
            *running_status = Some(status);
            read_channel(reader, status, None)?
        }
        0xF1..=0xFE => {
            #[cfg(feature = "tracing")]
            tracing::trace!("system status {status:#04X} in track body");
            EventKind::Invalid
        }
        data => match *running_status {
            Some(running) => read_channel(reader, running, Some(data))?,
            None => {
                #[cfg(feature = "tracing")]
                tracing::trace!("data byte {data:#04X} without running status");
                EventKind::Invalid
            }
        },
    };
    Ok(Event::new(delta, kind))
}

fn next_byte<R: Read + Seek>(reader: &mut BufferedReader<R>) -> ReadResult<u8> {
    reader
        .read_u8()?
        .ok_or_else(|| ReaderError::oob(reader.position()))
}

fn skip<R: Read + Seek>(reader: &mut BufferedReader<R>, len: u64) -> ReadResult<()> {
    let at = reader.position();
    reader.skip(len).map_err(|e| ReaderError::io(at, e))
}

fn read_meta<R: Read + Seek>(reader: &mut BufferedReader<R>) -> ReadResult<EventKind> {
    let kind = next_byte(reader)?;
    if kind >= 0x80 {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            "meta type {kind:#04X} at {} is not valid, ending track",
            reader.position()
        );
        return Ok(EventKind::ScoreEnd);
    }
    let len = reader.read_vlq()? as u64;
    match kind {
        META_SET_TEMPO if len >= 3 => {
            let bytes = reader.read_exact_size::<3>()?;
            skip(reader, len - 3)?;
            Ok(EventKind::TempoChange(Tempo::new_from_bytes(bytes)))
        }
        META_END_OF_TRACK => {
            skip(reader, len)?;
            Ok(EventKind::ScoreEnd)
        }
        _ => {
            skip(reader, len)?;
            Ok(EventKind::Invalid)
        }
    }
}

fn read_channel<R: Read + Seek>(
    reader: &mut BufferedReader<R>,
    status: u8,
    first: Option<u8>,
) -> ReadResult<EventKind> {
    let channel = Channel::from_status(status);
    let first = match first {
        Some(byte) => byte,
        None => next_byte(reader)?,
    };
    let kind = match status & 0xF0 {
        0xC0 | 0xD0 => EventKind::Invalid,
        0x80 => {
            next_byte(reader)?;
            EventKind::NoteOff {
                note: Note::from_data_byte(first),
                channel,
            }
        }
        0x90 => EventKind::NoteOn {
            note: Note::from_data_byte(first),
            velocity: next_byte(reader)? & 0x7F,
            channel,
        },
        _ => {
            next_byte(reader)?;
            EventKind::Invalid
        }
    };
    Ok(kind)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackState {
    Playing,
    Releasing { delta: u32 },
    Ended,
}

#[doc = r#"
The playback state of one MIDI track.

Wraps [`read_event`] with the rules of a playback session:
- an optional first event (the entry's tempo) is returned before anything is read;
- a premature end of the body reads as the end of the track;
- notes still sounding when the track ends are released, one note off per pull, and
  the end event follows;
- once ended, every pull returns [`EventKind::ScoreEnd`] with no delta.
"#]
#[derive(Debug, Clone)]
pub struct TrackDecoder {
    end: u64,
    running_status: Option<u8>,
    pending: Option<Event>,
    sounding: [u128; 16],
    state: TrackState,
}

impl TrackDecoder {
    /// Start decoding a body that ends at `end_marker`.
    pub fn new(end_marker: u64, initial_tempo: Option<Tempo>) -> Self {
        Self {
            end: end_marker,
            running_status: None,
            pending: initial_tempo.map(|tempo| Event::new(0, EventKind::TempoChange(tempo))),
            sounding: [0; 16],
            state: TrackState::Playing,
        }
    }

    /// True once [`EventKind::ScoreEnd`] has been returned
    pub fn is_ended(&self) -> bool {
        self.state == TrackState::Ended
    }

    /// Decode the next event. The reader must be where the previous call left it.
    pub fn next_event<R: Read + Seek>(
        &mut self,
        reader: &mut BufferedReader<R>,
    ) -> ReadResult<Event> {
        if let Some(event) = self.pending.take() {
            return Ok(event);
        }
        match self.state {
            TrackState::Playing => {}
            TrackState::Releasing { .. } => return Ok(self.release_next()),
            TrackState::Ended => return Ok(Event::end(0)),
        }

        let event = match read_event(reader, &mut self.running_status, self.end) {
            Ok(event) => event,
            Err(e) if e.is_out_of_bounds() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("track ended early at {}", e.position());
                Event::end(0)
            }
            Err(e) => return Err(e),
        };

        match *event.kind() {
            EventKind::ScoreEnd => {
                self.state = TrackState::Releasing {
                    delta: event.delta_ticks(),
                };
                return Ok(self.release_next());
            }
            EventKind::NoteOn {
                note,
                velocity,
                channel,
            } if velocity > 0 => {
                self.sounding[u8::from(channel) as usize] |= 1u128 << note.byte();
            }
            EventKind::NoteOn { note, channel, .. } | EventKind::NoteOff { note, channel } => {
                self.sounding[u8::from(channel) as usize] &= !(1u128 << note.byte());
            }
            _ => {}
        }
        Ok(event)
    }

    fn release_next(&mut self) -> Event {
        let TrackState::Releasing { delta } = &mut self.state else {
            return Event::end(0);
        };
        let delta = core::mem::take(delta);
        match self.take_sounding() {
            Some((channel, note)) => Event::note_off(delta, note, channel),
            None => {
                self.state = TrackState::Ended;
                Event::end(delta)
            }
        }
    }

    fn take_sounding(&mut self) -> Option<(Channel, Note)> {
        let (index, bits) = self
            .sounding
            .iter_mut()
            .enumerate()
            .find(|(_, bits)| **bits != 0)?;
        let key = bits.trailing_zeros() as u8;
        *bits &= !(1u128 << key);
        Some((Channel::from(index as u8), Note::from_data_byte(key)))
    }
}

#[cfg(test)]
fn body(bytes: &[u8]) -> (BufferedReader<std::io::Cursor<Vec<u8>>>, u64) {
    let reader = BufferedReader::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
    (reader, bytes.len() as u64)
}

#[cfg(test)]
fn drain(bytes: &[u8]) -> Vec<Event> {
    let (mut reader, end) = body(bytes);
    let mut decoder = TrackDecoder::new(end, None);
    let mut events = Vec::new();
    loop {
        let event = decoder.next_event(&mut reader).unwrap();
        events.push(event);
        if event.is_end() {
            return events;
        }
    }
}

#[test]
fn running_status_reuses_last_channel_status() {
    use pretty_assertions::assert_eq;
    let (mut reader, end) = body(&[0x00, 0x92, 0x60, 0x64, 0x10, 0x3E, 0x46]);
    let mut running = None;
    let first = read_event(&mut reader, &mut running, end).unwrap();
    let second = read_event(&mut reader, &mut running, end).unwrap();
    assert_eq!(
        first,
        Event::note_on(0, Note::from_data_byte(0x60), 0x64, Channel::Three)
    );
    assert_eq!(
        second,
        Event::note_on(0x10, Note::from_data_byte(0x3E), 0x46, Channel::Three)
    );
    assert_eq!(running, Some(0x92));
}

#[test]
fn data_byte_without_status_is_consumed_alone() {
    let (mut reader, end) = body(&[0x00, 0x40, 0x00, 0x80, 0x40, 0x00]);
    let mut running = None;
    let stray = read_event(&mut reader, &mut running, end).unwrap();
    assert_eq!(stray.kind(), &EventKind::Invalid);
    assert_eq!(reader.position(), 2);
    let off = read_event(&mut reader, &mut running, end).unwrap();
    assert!(off.is_note_off());
}

#[test]
fn meta_and_sysex_are_skipped() {
    use pretty_assertions::assert_eq;
    let events = drain(&[
        0x00, 0xFF, 0x03, 0x04, b'l', b'e', b'a', b'd', // track name
        0x00, 0xF0, 0x03, 0x7E, 0x7F, 0xF7, // sysex
        0x00, 0xC0, 0x05, // program change
        0x00, 0xB0, 0x07, 0x64, // control change
        0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, // set tempo
        0x00, 0xFF, 0x2F, 0x00,
    ]);
    let kinds: Vec<EventKind> = events.iter().map(|e| *e.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::Invalid,
            EventKind::Invalid,
            EventKind::Invalid,
            EventKind::Invalid,
            EventKind::TempoChange(Tempo::DEFAULT),
            EventKind::ScoreEnd,
        ]
    );
}

#[test]
fn short_tempo_is_invalid() {
    let events = drain(&[0x00, 0xFF, 0x51, 0x02, 0x07, 0xA1, 0x00, 0xFF, 0x2F, 0x00]);
    assert_eq!(events[0].kind(), &EventKind::Invalid);
    assert!(events[1].is_end());
}

#[test]
fn sounding_notes_are_released_before_end() {
    use pretty_assertions::assert_eq;
    let events = drain(&[
        0x00, 0x90, 0x3C, 0x40, // C4 on
        0x00, 0x91, 0x40, 0x40, // E4 on, channel 2
        0x10, 0x90, 0x3C, 0x00, // C4 off via velocity 0
        0x20, 0xFF, 0x2F, 0x00,
    ]);
    assert_eq!(events.len(), 5);
    assert_eq!(
        events[3],
        Event::note_off(0x20, Note::from_data_byte(0x40), Channel::Two)
    );
    assert_eq!(events[4], Event::end(0));
}

#[test]
fn premature_end_reads_as_score_end() {
    // the last event is cut off after its status byte
    let events = drain(&[0x00, 0x90, 0x3C, 0x40, 0x05, 0x80]);
    assert_eq!(events.len(), 3);
    assert!(events[1].is_note_off());
    assert!(events[2].is_end());
}

#[test]
fn end_repeats_after_release() {
    let (mut reader, end) = body(&[0x00, 0xFF, 0x2F, 0x00]);
    let mut decoder = TrackDecoder::new(end, Some(Tempo::from_bpm(90)));
    assert_eq!(
        decoder.next_event(&mut reader).unwrap().tempo(),
        Some(Tempo::from_bpm(90))
    );
    for _ in 0..3 {
        assert_eq!(decoder.next_event(&mut reader).unwrap(), Event::end(0));
    }
    assert!(decoder.is_ended());
}

#[test]
fn corrupt_meta_type_ends_track() {
    let events = drain(&[0x00, 0xFF, 0x90, 0x00, 0x00, 0x90, 0x3C, 0x40]);
    assert_eq!(events.len(), 1);
    assert!(events[0].is_end());
}
