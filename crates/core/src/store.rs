//! The time-keyed subtitle record set.
//! Records are keyed by the verbatim start token of their time-range line and
//! always come back out in lexicographic key order.

use crate::srt::scan::Scanner;
use crate::srt::SubtitleRecord;
use crate::transcribe::Transcriber;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, trace};

/// Errors surfaced by store construction, serialization, merge and annotate.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The input could not be read or the output could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The merge argument has no cue for a key of the receiving store.
    #[error("key {key} is missing from the merged store")]
    MissingKey { key: String },

    /// The transcription service failed; its error is passed through as is.
    #[error(transparent)]
    Transcription(anyhow::Error),
}

/// Cues keyed by the verbatim start token of their time-range line.
/// Built once, then only read; merge and annotate return new stores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtitleStore {
    records: BTreeMap<String, SubtitleRecord>,
}

impl SubtitleStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing key to record mapping without scanning anything.
    pub fn from_records(records: BTreeMap<String, SubtitleRecord>) -> Self {
        Self { records }
    }

    /// Scan the SRT file at `path`.
    pub fn from_path(path: &Path) -> Result<Self, StoreError> {
        trace!("from_path(path={})", path.display());
        let file = File::open(path)?;
        let store = Self::from_reader(BufReader::new(file))?;
        info!("read {} cues from {}", store.len(), path.display());
        Ok(store)
    }

    /// Scan any buffered reader line by line, keeping line terminators.
    /// This function should also split on lone `\r`, which `read_line` leaves inside a chunk.
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, StoreError> {
        let mut scanner = Scanner::new();
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            scanner.feed_text(&line);
        }
        Ok(Self::from_records(scanner.finish()))
    }

    /// Scan SRT text already in memory.
    pub fn parse_str(input: &str) -> Self {
        let mut scanner = Scanner::new();
        scanner.feed_text(input);
        Self::from_records(scanner.finish())
    }

    /// Number of distinct start keys.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no cue was collected.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a cue by its verbatim start token, e.g. `"00:00:03,748"`.
    pub fn get(&self, key: &str) -> Option<&SubtitleRecord> {
        self.records.get(key)
    }

    /// Start keys in lexicographic order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Key and cue pairs in lexicographic key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SubtitleRecord)> {
        self.records.iter().map(|(key, record)| (key.as_str(), record))
    }

    /// Render every cue followed by a newline, in key order.
    pub fn to_srt_string(&self) -> String {
        let mut out = String::new();
        for record in self.records.values() {
            out.push_str(&record.to_srt_string());
            out.push('\n');
        }
        out
    }

    /// Write [`SubtitleStore::to_srt_string`] output to `path`, replacing any existing file.
    pub fn write_srt(&self, path: &Path) -> Result<(), StoreError> {
        trace!("write_srt(path={})", path.display());
        let mut out = BufWriter::new(File::create(path)?);
        for record in self.records.values() {
            out.write_all(record.to_srt_string().as_bytes())?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        info!("wrote {} cues to {}", self.len(), path.display());
        Ok(())
    }

    /// Append `other`'s body to each of this store's cues, key by key.
    ///
    /// `other` must hold every key of `self`; the first missing key aborts
    /// the merge and no store is produced.
    pub fn merge(&self, other: &SubtitleStore) -> Result<SubtitleStore, StoreError> {
        let mut merged = BTreeMap::new();
        for (key, record) in &self.records {
            let extra = other
                .records
                .get(key)
                .ok_or_else(|| StoreError::MissingKey { key: key.clone() })?;
            let text = format!("{}{}", record.text, extra.text);
            merged.insert(
                key.clone(),
                SubtitleRecord::new(record.ordinal.clone(), record.time_frame.clone(), text),
            );
        }
        info!("merged {} cues", merged.len());
        Ok(Self::from_records(merged))
    }

    /// Append the transcription of each body to that body, one call per cue.
    pub fn annotate<T>(&self, transcriber: &T) -> Result<SubtitleStore, StoreError>
    where
        T: Transcriber + ?Sized,
    {
        let mut annotated = BTreeMap::new();
        for (key, record) in &self.records {
            let reading = transcriber
                .transcribe(&record.text)
                .map_err(|err| {
                    debug!("transcription failed for cue {key}");
                    StoreError::Transcription(err)
                })?;
            let text = format!("{}{}", record.text, reading);
            annotated.insert(
                key.clone(),
                SubtitleRecord::new(record.ordinal.clone(), record.time_frame.clone(), text),
            );
        }
        info!("annotated {} cues", annotated.len());
        Ok(Self::from_records(annotated))
    }
}
