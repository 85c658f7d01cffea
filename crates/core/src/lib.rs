//! Core library for scanning, merging and annotating SubRip subtitles.
//!
//! Text flows one way: [`srt::scan`] turns lines into cues, a
//! [`store::SubtitleStore`] holds them keyed by start time, and merge or
//! annotate produce new stores that serialize back to text.

pub mod srt;
pub mod store;
pub mod transcribe;

pub use srt::SubtitleRecord;
pub use store::{StoreError, SubtitleStore};
pub use transcribe::Transcriber;
