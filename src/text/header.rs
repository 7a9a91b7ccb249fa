use std::io::{Read, Seek};

use super::Rhythm;
use crate::reader::{BufferedReader, ReadResult, ReaderError};

const TITLE: &str = "#MUSIC_TITLE:";
const BPM: &str = "#MUSIC_BPM:";
const TONE: &str = "#MUSIC_TONE:";
const RHYTHM: &str = "#MUSIC_RHYTHM:";
const START: &str = "#MUSIC_START";
const END: &str = "#MUSIC_END";

/// Tempo of a block that sets none
pub const DEFAULT_BPM: u32 = 120;

/// Longest line kept by the text readers; the rest of a longer line is dropped
pub const MAX_LINE_LEN: usize = 1024;

/// One `#MUSIC_START` region of a text score, with the header values in force at its start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    /// `#MUSIC_TITLE:`, or empty
    pub title: String,
    /// `#MUSIC_BPM:`
    pub bpm: u32,
    /// `#MUSIC_TONE:`
    pub tone: i32,
    /// `#MUSIC_RHYTHM:`
    pub rhythm: Rhythm,
    /// Offset of the `#MUSIC_START` line
    pub start_byte: u64,
    /// Offset of the matching `#MUSIC_END` line, or the file size
    pub end_marker: u64,
}

#[derive(Debug, Clone)]
struct HeaderValues {
    title: String,
    bpm: u32,
    tone: i32,
    rhythm: Rhythm,
}

impl Default for HeaderValues {
    fn default() -> Self {
        Self {
            title: String::new(),
            bpm: DEFAULT_BPM,
            tone: 0,
            rhythm: Rhythm::Quarter,
        }
    }
}

/// The integer after `prefix`, if the rest of the line is one
pub(crate) fn directive_value(line: &str, prefix: &str) -> Option<i64> {
    line.strip_prefix(prefix)?.trim().parse().ok()
}

/// Scan a whole text score for its blocks, without decoding any notes.
///
/// Directives are matched on trimmed lines, case-sensitively. A malformed value is
/// ignored and the previous value stays in force.
pub fn scan_blocks<R: Read + Seek>(reader: &mut BufferedReader<R>) -> ReadResult<Vec<TextBlock>> {
    reader.seek(0).map_err(|e| ReaderError::io(0, e))?;
    let size = reader.size();
    let mut values = HeaderValues::default();
    let mut blocks: Vec<TextBlock> = Vec::new();
    let mut open: Option<usize> = None;

    loop {
        let at = reader.position();
        let Some(raw) = reader.read_until(b'\n', MAX_LINE_LEN)? else {
            break;
        };
        let text = String::from_utf8_lossy(&raw);
        let line = text.trim();

        if let Some(title) = line.strip_prefix(TITLE) {
            values.title = title.trim().to_string();
        } else if line.starts_with(BPM) {
            match directive_value(line, BPM).and_then(|v| u32::try_from(v).ok()) {
                Some(bpm) if bpm > 0 => values.bpm = bpm,
                _ => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("ignoring `{line}` at {at}");
                }
            }
        } else if line.starts_with(TONE) {
            if let Some(tone) = directive_value(line, TONE).and_then(|v| i32::try_from(v).ok()) {
                values.tone = tone;
            }
        } else if let Some(id) = line.strip_prefix(RHYTHM) {
            if let Some(rhythm) = Rhythm::parse(id) {
                values.rhythm = rhythm;
            }
        } else if line == START {
            open = Some(blocks.len());
            blocks.push(TextBlock {
                title: values.title.clone(),
                bpm: values.bpm,
                tone: values.tone,
                rhythm: values.rhythm,
                start_byte: at,
                end_marker: size,
            });
        } else if line == END {
            if let Some(index) = open.take() {
                blocks[index].end_marker = at;
            }
            values = HeaderValues::default();
        }
    }
    Ok(blocks)
}

#[cfg(test)]
fn scan(text: &str) -> Vec<TextBlock> {
    let mut reader =
        BufferedReader::with_capacity(16, std::io::Cursor::new(text.as_bytes().to_vec())).unwrap();
    scan_blocks(&mut reader).unwrap()
}

#[test]
fn blocks_snapshot_headers() {
    use pretty_assertions::assert_eq;
    let text = "#MUSIC_TITLE: Morning\n#MUSIC_BPM:90\n#MUSIC_TONE:-2\n#MUSIC_RHYTHM:1\n#MUSIC_START\n60,;\n#MUSIC_END\n#MUSIC_START\n62,;\n";
    let blocks = scan(text);
    assert_eq!(blocks.len(), 2);
    assert_eq!(
        blocks[0],
        TextBlock {
            title: "Morning".to_string(),
            bpm: 90,
            tone: -2,
            rhythm: Rhythm::Eighth,
            start_byte: 67,
            end_marker: 85,
        }
    );
    // values reset after #MUSIC_END, and an open block runs to the end of the file
    assert_eq!(blocks[1].title, "");
    assert_eq!(blocks[1].bpm, DEFAULT_BPM);
    assert_eq!(blocks[1].rhythm, Rhythm::Quarter);
    assert_eq!(blocks[1].start_byte, 96);
    assert_eq!(blocks[1].end_marker, text.len() as u64);
}

#[test]
fn malformed_values_keep_previous() {
    let blocks = scan("#MUSIC_BPM:150\n#MUSIC_BPM:0\n#MUSIC_BPM:fast\n#MUSIC_RHYTHM:9\n  #MUSIC_START  \r\n");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].bpm, 150);
    assert_eq!(blocks[0].rhythm, Rhythm::Quarter);
}

#[test]
fn directives_are_case_sensitive() {
    assert!(scan("#music_start\n60,;\n").is_empty());
    assert!(scan("#MUSIC_STARTED\n").is_empty());
}

#[test]
fn overlong_lines_are_cut() {
    let text = format!(
        "{}\n#MUSIC_TITLE: {}\n#MUSIC_START\n60,;\n",
        "\0".repeat(5000),
        "x".repeat(2000)
    );
    let blocks = scan(&text);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].title.len(), MAX_LINE_LEN - TITLE.len() - 1);
    assert_eq!(blocks[0].start_byte, 5001 + 2015 + 13);
}
