use std::{
    io::{Read, Seek},
    path::{Path, PathBuf},
};

use super::{TrackSegment, read_event};
use crate::{
    Tempo,
    event::{Event, EventKind},
    reader::{BufferedReader, ReadResult, ReaderError},
};

#[doc = r#"
Track 0 of a multi-track MIDI file, read once at catalog time.

In format 1 files the first track usually carries only tempo and other meta events for
the whole song. Its first tempo is folded into every entry of the file, and the track is
dropped from the catalog when it has no notes of its own.
"#]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConductorTrack {
    path: PathBuf,
    tempo: Option<Tempo>,
    has_notes: bool,
    meta_events: Vec<(u64, Event)>,
}

impl ConductorTrack {
    /// Decode the whole of `segment`.
    ///
    /// A body that ends early is treated like an end of track.
    pub fn extract<R: Read + Seek>(
        reader: &mut BufferedReader<R>,
        path: impl Into<PathBuf>,
        segment: &TrackSegment,
    ) -> ReadResult<Self> {
        reader
            .seek(segment.start_byte())
            .map_err(|e| ReaderError::io(segment.start_byte(), e))?;

        let mut conductor = Self {
            path: path.into(),
            tempo: None,
            has_notes: false,
            meta_events: Vec::new(),
        };
        let mut running_status = None;
        let mut clock: u64 = 0;
        loop {
            let event = match read_event(reader, &mut running_status, segment.end_marker()) {
                Ok(event) => event,
                Err(e) if e.is_out_of_bounds() => break,
                Err(e) => return Err(e),
            };
            clock += event.delta_ticks() as u64;
            match *event.kind() {
                EventKind::ScoreEnd => break,
                EventKind::NoteOn { .. } | EventKind::NoteOff { .. } => conductor.has_notes = true,
                EventKind::TempoChange(tempo) => {
                    if conductor.tempo.is_none() {
                        conductor.tempo = Some(tempo);
                    } else {
                        conductor.meta_events.push((clock, event));
                    }
                }
                _ => {}
            }
        }
        Ok(conductor)
    }

    /// The file the track belongs to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The first tempo of the track, if it sets one
    pub fn tempo(&self) -> Option<Tempo> {
        self.tempo
    }

    /// True if the track plays notes itself
    pub fn has_notes(&self) -> bool {
        self.has_notes
    }

    /// Tempo changes after the first, keyed by absolute tick
    pub fn meta_events(&self) -> &[(u64, Event)] {
        &self.meta_events
    }
}
