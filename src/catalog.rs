#![doc = r##"
The list of playable scores

A [`Catalog`] is built once by scanning a directory, a single file or an `.m3u` playlist.
Every MIDI track and every text `#MUSIC_START` block becomes one [`ScoreEntry`], which
holds everything the [`Player`](crate::player::Player) needs to seek straight to it later.

```rust
# use scorestream::{prelude::*, storage::MemoryStorage};
let mut storage = MemoryStorage::new();
storage.insert("SCORE/b.txt", b"#MUSIC_TITLE: Two\n#MUSIC_START\n62,;\n".to_vec());
storage.insert("SCORE/a.txt", b"#MUSIC_TITLE: One\n#MUSIC_START\n60,;\n".to_vec());
storage.insert("SCORE/.hidden.txt", b"#MUSIC_START\n".to_vec());

let catalog = Catalog::scan_with(&storage, "SCORE", &DecoderConfig::default()).unwrap();
let titles: Vec<&str> = catalog.entries().iter().map(|e| e.title()).collect();
assert_eq!(titles, ["One", "Two"]);
```
"##]

use std::{
    io::{Read, Seek},
    path::{Component, Path, PathBuf},
};

use crate::{
    FileError, ParseError, Tempo,
    config::DecoderConfig,
    file::{ConductorTrack, MidiFile},
    reader::{BufferedReader, ReadResult, ReaderError, ReaderErrorKind},
    storage::{FsStorage, Storage},
    text::{MAX_LINE_LEN, Rhythm, scan_blocks},
};

/// How an entry's bytes are decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScoreFormat {
    /// A Standard MIDI File track
    Midi,
    /// A plaintext score block
    Text,
}

impl ScoreFormat {
    /// `.mid` and `.midi` (any case) are MIDI, everything else is text
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("mid") || ext.eq_ignore_ascii_case("midi") => {
                Self::Midi
            }
            _ => Self::Text,
        }
    }
}

/// One independently playable unit: a MIDI track or a text block
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreEntry {
    path: PathBuf,
    format: ScoreFormat,
    track_index: usize,
    title: String,
    tempo: Tempo,
    bpm: u32,
    tone: i32,
    rhythm: Rhythm,
    ticks_per_quarter: u16,
    start_byte: u64,
    end_marker: u64,
}

impl ScoreEntry {
    /// The file holding the entry
    pub fn path(&self) -> &Path {
        &self.path
    }
    /// MIDI or text
    pub fn format(&self) -> ScoreFormat {
        self.format
    }
    /// Zero-based MIDI track number, or block number in a text file
    pub fn track_index(&self) -> usize {
        self.track_index
    }
    /// `#MUSIC_TITLE:` for text, `<file stem>_T<track number>` for MIDI
    pub fn title(&self) -> &str {
        &self.title
    }
    /// Tempo at the start of the entry
    pub fn tempo(&self) -> Tempo {
        self.tempo
    }
    /// Whole beats per minute at the start of the entry.
    ///
    /// For text scores this is the `#MUSIC_BPM:` value exactly as written.
    pub fn bpm(&self) -> u32 {
        self.bpm
    }
    /// Transposition in semitones (text scores)
    pub fn tone(&self) -> i32 {
        self.tone
    }
    /// Token length at the start of the entry (text scores)
    pub fn rhythm(&self) -> Rhythm {
        self.rhythm
    }
    /// Resolution of the entry's delta times
    pub fn ticks_per_quarter(&self) -> u16 {
        self.ticks_per_quarter
    }
    /// Where decoding starts
    pub fn start_byte(&self) -> u64 {
        self.start_byte
    }
    /// Where decoding stops
    pub fn end_marker(&self) -> u64 {
        self.end_marker
    }
}

/// Every playable entry found by one scan
#[derive(Debug)]
pub struct Catalog {
    root: PathBuf,
    entries: Vec<ScoreEntry>,
    conductors: Vec<ConductorTrack>,
    skipped: Vec<FileError>,
}

impl Catalog {
    /// Scan `path` on the host filesystem with the default configuration
    pub fn scan(path: impl AsRef<Path>) -> Result<Self, FileError> {
        Self::scan_with(&FsStorage, path, &DecoderConfig::default())
    }

    /// Scan `path`, a directory or a single file.
    ///
    /// Directory entries are visited in name order. Sub-directories, hidden files and
    /// `.m3u` playlists are not visited. A `.m3u` root is a playlist: every score file it
    /// lists is scanned in listed order, paths taken relative to the playlist's folder.
    ///
    /// A file that cannot be read or indexed is logged, recorded in [`Catalog::skipped`],
    /// and the scan goes on. Only a root that cannot be examined at all is an error.
    pub fn scan_with<S: Storage>(
        storage: &S,
        path: impl AsRef<Path>,
        config: &DecoderConfig,
    ) -> Result<Self, FileError> {
        let root = path.as_ref().to_path_buf();
        let is_dir = storage
            .is_dir(&root)
            .map_err(|e| FileError::new(&root, ReaderError::io(0, e)))?;

        let mut catalog = Self {
            root: root.clone(),
            entries: Vec::new(),
            conductors: Vec::new(),
            skipped: Vec::new(),
        };
        if !is_dir {
            catalog.add_file(storage, &root, config);
            return Ok(catalog);
        }

        let mut listing = storage
            .read_dir(&root)
            .map_err(|e| FileError::new(&root, ReaderError::io(0, e)))?;
        listing.sort();
        for path in listing.into_iter().filter(|path| !is_hidden(path)) {
            match storage.is_dir(&path) {
                Ok(true) => {}
                Ok(false) if is_playlist(&path) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("{}: playlists are only read as a root", path.display());
                }
                Ok(false) => catalog.add_score(storage, &path, config),
                Err(e) => catalog.skip(FileError::new(&path, ReaderError::io(0, e))),
            }
        }
        Ok(catalog)
    }

    fn add_file<S: Storage>(&mut self, storage: &S, path: &Path, config: &DecoderConfig) {
        if !is_playlist(path) {
            self.add_score(storage, path, config);
            return;
        }
        let listed = match read_playlist(storage, path, config) {
            Ok(listed) => listed,
            Err(e) => {
                self.skip(e);
                return;
            }
        };
        #[cfg(feature = "tracing")]
        tracing::debug!("{}: {} listed files", path.display(), listed.len());
        for score in listed {
            if is_hidden(&score) {
                continue;
            }
            if is_playlist(&score) {
                let nested = ReaderError::new(
                    0,
                    ReaderErrorKind::ParseError(ParseError::NestedPlaylist),
                );
                self.skip(FileError::new(score, nested));
                continue;
            }
            self.add_score(storage, &score, config);
        }
    }

    fn add_score<S: Storage>(&mut self, storage: &S, path: &Path, config: &DecoderConfig) {
        match scan_file(storage, path, config) {
            Ok((entries, conductor)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("{}: {} entries", path.display(), entries.len());
                self.entries.extend(entries);
                self.conductors.extend(conductor);
            }
            Err(e) => self.skip(e),
        }
    }

    fn skip(&mut self, error: FileError) {
        #[cfg(feature = "tracing")]
        tracing::warn!("skipping {error}");
        self.skipped.push(error);
    }

    /// The scanned path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entries in scan order
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// The entry at `index`
    pub fn get(&self, index: usize) -> Option<&ScoreEntry> {
        self.entries.get(index)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing playable was found
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Conductor tracks read from multi-track MIDI files
    pub fn conductors(&self) -> &[ConductorTrack] {
        &self.conductors
    }

    /// The conductor track of `path`, if it has one
    pub fn conductor(&self, path: &Path) -> Option<&ConductorTrack> {
        self.conductors.iter().find(|c| c.path() == path)
    }

    /// Files that could not be catalogued
    pub fn skipped(&self) -> &[FileError] {
        &self.skipped
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn is_playlist(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("m3u"))
}

/// The score paths named by the playlist at `path`, in listed order.
///
/// Each line is trimmed. Blank lines and lines starting with `#` are skipped. The rest are
/// taken relative to the playlist's folder, with `.` and `..` resolved. `\` separates
/// folders like `/` does.
fn read_playlist<S: Storage>(
    storage: &S,
    path: &Path,
    config: &DecoderConfig,
) -> Result<Vec<PathBuf>, FileError> {
    let source = storage
        .open(path)
        .map_err(|e| FileError::new(path, ReaderError::io(0, e)))?;
    let mut reader = BufferedReader::with_capacity(config.buffer_capacity(), source)
        .map_err(|e| FileError::new(path, ReaderError::io(0, e)))?;
    let folder = path.parent().unwrap_or(Path::new(""));

    let mut listed = Vec::new();
    while let Some(raw) = reader
        .read_until(b'\n', MAX_LINE_LEN)
        .map_err(|e| FileError::new(path, e))?
    {
        let text = String::from_utf8_lossy(&raw);
        let line = text.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        listed.push(resolve_listed(folder, line));
    }
    Ok(listed)
}

fn resolve_listed(folder: &Path, line: &str) -> PathBuf {
    let joined = folder.join(line.replace('\\', "/"));
    let mut resolved = PathBuf::new();
    for part in joined.components() {
        match part {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            part => resolved.push(part),
        }
    }
    resolved
}

type FileEntries = (Vec<ScoreEntry>, Option<ConductorTrack>);

fn scan_file<S: Storage>(
    storage: &S,
    path: &Path,
    config: &DecoderConfig,
) -> Result<FileEntries, FileError> {
    let source = storage
        .open(path)
        .map_err(|e| FileError::new(path, ReaderError::io(0, e)))?;
    let mut reader = BufferedReader::with_capacity(config.buffer_capacity(), source)
        .map_err(|e| FileError::new(path, ReaderError::io(0, e)))?;
    let scanned = match ScoreFormat::from_path(path) {
        ScoreFormat::Midi => scan_midi(&mut reader, path, config),
        ScoreFormat::Text => scan_text(&mut reader, path, config).map(|entries| (entries, None)),
    };
    scanned.map_err(|e| FileError::new(path, e))
}

fn scan_midi<R: Read + Seek>(
    reader: &mut BufferedReader<R>,
    path: &Path,
    config: &DecoderConfig,
) -> ReadResult<FileEntries> {
    let file = MidiFile::index(reader, config.max_tracks())?;
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ticks_per_quarter = file.header().ticks_per_quarter_note();

    let mut entries: Vec<ScoreEntry> = file
        .tracks()
        .iter()
        .map(|track| ScoreEntry {
            path: path.to_path_buf(),
            format: ScoreFormat::Midi,
            track_index: track.index(),
            title: format!("{stem}_T{}", track.index() + 1),
            tempo: Tempo::DEFAULT,
            bpm: Tempo::DEFAULT.bpm(),
            tone: 0,
            rhythm: Rhythm::Quarter,
            ticks_per_quarter,
            start_byte: track.start_byte(),
            end_marker: track.end_marker(),
        })
        .collect();

    let [first, _, ..] = file.tracks() else {
        return Ok((entries, None));
    };
    let conductor = ConductorTrack::extract(reader, path, first)?;
    if let Some(tempo) = conductor.tempo() {
        for entry in &mut entries {
            entry.tempo = tempo;
            entry.bpm = tempo.bpm();
        }
    }
    if !conductor.has_notes() {
        #[cfg(feature = "tracing")]
        tracing::debug!("{}: track 1 is a pure conductor track", path.display());
        entries.remove(0);
    }
    Ok((entries, Some(conductor)))
}

fn scan_text<R: Read + Seek>(
    reader: &mut BufferedReader<R>,
    path: &Path,
    config: &DecoderConfig,
) -> ReadResult<Vec<ScoreEntry>> {
    let entries = scan_blocks(reader)?
        .into_iter()
        .enumerate()
        .map(|(index, block)| ScoreEntry {
            path: path.to_path_buf(),
            format: ScoreFormat::Text,
            track_index: index,
            title: block.title,
            tempo: Tempo::from_bpm(block.bpm),
            bpm: block.bpm,
            tone: block.tone,
            rhythm: block.rhythm,
            ticks_per_quarter: config.text().ticks_per_quarter(),
            start_byte: block.start_byte,
            end_marker: block.end_marker,
        })
        .collect();
    Ok(entries)
}

#[test]
fn classifies_by_extension() {
    assert_eq!(ScoreFormat::from_path(Path::new("a/SONG.MID")), ScoreFormat::Midi);
    assert_eq!(ScoreFormat::from_path(Path::new("song.Midi")), ScoreFormat::Midi);
    assert_eq!(ScoreFormat::from_path(Path::new("song.txt")), ScoreFormat::Text);
    assert_eq!(ScoreFormat::from_path(Path::new("mid")), ScoreFormat::Text);
}

#[test]
fn hidden_names() {
    assert!(is_hidden(Path::new("dir/.DS_Store")));
    assert!(!is_hidden(Path::new(".config/song.txt")));
}

#[test]
fn playlist_extension() {
    assert!(is_playlist(Path::new("lists/Evening.M3U")));
    assert!(!is_playlist(Path::new("m3u")));
    assert!(!is_playlist(Path::new("song.m3u8")));
}

#[test]
fn listed_paths_resolve_against_the_folder() {
    use pretty_assertions::assert_eq;
    let folder = Path::new("SCORE/sets");
    assert_eq!(resolve_listed(folder, "a.txt"), Path::new("SCORE/sets/a.txt"));
    assert_eq!(resolve_listed(folder, "./x/../b.mid"), Path::new("SCORE/sets/b.mid"));
    assert_eq!(resolve_listed(folder, "..\\..\\c.txt"), Path::new("c.txt"));
    assert_eq!(resolve_listed(folder, "../../../d.txt"), Path::new("d.txt"));
    assert_eq!(resolve_listed(Path::new(""), "e.txt"), Path::new("e.txt"));
}

#[cfg(test)]
struct LockedEntry(crate::storage::MemoryStorage, &'static str);

#[cfg(test)]
impl Storage for LockedEntry {
    type Source = std::io::Cursor<Vec<u8>>;

    fn open(&self, path: &Path) -> std::io::Result<Self::Source> {
        self.0.open(path)
    }

    fn is_dir(&self, path: &Path) -> std::io::Result<bool> {
        if path == Path::new(self.1) {
            return Err(std::io::ErrorKind::PermissionDenied.into());
        }
        self.0.is_dir(path)
    }

    fn read_dir(&self, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        self.0.read_dir(dir)
    }
}

#[test]
fn unreadable_listing_entry_is_skipped() {
    let mut storage = crate::storage::MemoryStorage::new();
    storage.insert("SCORE/a.txt", b"#MUSIC_START\n60,\n".to_vec());
    storage.insert("SCORE/b.txt", b"#MUSIC_START\n62,\n".to_vec());
    let storage = LockedEntry(storage, "SCORE/a.txt");

    let catalog = Catalog::scan_with(&storage, "SCORE", &DecoderConfig::default()).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.entries()[0].path(), Path::new("SCORE/b.txt"));
    let [skipped] = catalog.skipped() else {
        panic!("expected one skipped file, got {:?}", catalog.skipped());
    };
    assert_eq!(skipped.path(), Path::new("SCORE/a.txt"));
    assert!(matches!(
        skipped.reader_error().error_kind(),
        ReaderErrorKind::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied
    ));
}
