//! This module is responsible for the SRT cue model and its time arithmetic.
//! The line scanner that builds cues from text lives in [`scan`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod scan;

pub const SECONDS_IN_MINUTE: f64 = 60.0;
pub const SECONDS_IN_HOUR: f64 = 3600.0;

/// Number of colon-delimited groups in a usable `H:MM:SS,mmm` token.
pub const TIME_PARTS: usize = 3;

/// Matches `00:00:03,748 --> 00:00:06,901`, optionally indented with tabs.
/// Group 1 is the start token and group 2 the end token, both verbatim.
/// The start token stops at the first character that is not a digit, `:` or `,`,
/// and anything may sit between either token and the arrow.
pub(crate) static TIME_RANGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\t*(\d[\d:,]*).*?-->.*?(\d[\d:,.]*)").expect("time range pattern is valid")
});

/// Matches a line holding nothing but a cue ordinal.
pub(crate) static ORDINAL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\r?\n?$").expect("ordinal pattern is valid"));

/// One cue: ordinal label, raw time-range line and accumulated body text.
///
/// `start_time` and `end_time` stay at zero until [`SubtitleRecord::extract_times`]
/// is called; scanning never fills them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleRecord {
    pub ordinal: String,
    pub time_frame: String,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl SubtitleRecord {
    /// Build a record with both derived times at zero.
    pub fn new(
        ordinal: impl Into<String>,
        time_frame: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            ordinal: ordinal.into(),
            time_frame: time_frame.into(),
            text: text.into(),
            start_time: 0.0,
            end_time: 0.0,
        }
    }

    /// Derive start and end seconds from the stored time-range line.
    /// Empty or unmatched text yields `(0, 0)`; a bad token yields `0` for itself only.
    pub fn extract_times(&mut self) -> (f64, f64) {
        let (start, end) = match TIME_RANGE_REGEX.captures(&self.time_frame) {
            Some(caps) => (parse_srt_time(&caps[1]), parse_srt_time(&caps[2])),
            None => (0.0, 0.0),
        };
        self.start_time = start;
        self.end_time = end;
        (start, end)
    }

    /// Render the cue as ordinal, time frame and body glued together with no separators.
    pub fn to_srt_string(&self) -> String {
        format!("{}{}{}", self.ordinal, self.time_frame, self.text)
    }
}

/// Convert `H:M:S,mmm` to seconds, treating the comma as a decimal point.
/// Anything that does not split into exactly three numeric groups is `0`.
pub fn parse_srt_time(srt_time: &str) -> f64 {
    try_parse_srt_time(srt_time).unwrap_or(0.0)
}

fn try_parse_srt_time(srt_time: &str) -> Option<f64> {
    let parts: Vec<&str> = srt_time.trim().split(':').collect();
    if parts.len() != TIME_PARTS {
        return None;
    }
    let hours: u64 = parts[0].parse().ok()?;
    let minutes: u64 = parts[1].parse().ok()?;
    let seconds: f64 = parts[2].replace(',', ".").parse().ok()?;
    Some(seconds + SECONDS_IN_MINUTE * minutes as f64 + SECONDS_IN_HOUR * hours as f64)
}

/// Whether a start token has the `H:M:S` shape a cue needs to be opened.
pub(crate) fn has_time_parts(token: &str) -> bool {
    token.split(':').count() == TIME_PARTS
}
