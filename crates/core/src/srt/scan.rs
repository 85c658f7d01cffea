//! Line classification and the cue-building state machine.
//!
//! Scanning is permissive: a line that does not fit the grammar is dropped or
//! skipped and the scan carries on. Nothing in here returns an error.

use super::{has_time_parts, SubtitleRecord, ORDINAL_REGEX, TIME_RANGE_REGEX};
use std::collections::BTreeMap;
use tracing::debug;

/// What a single line is, given whether a cue body is currently open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Digits only, seen outside a cue body.
    OrdinalLine(&'a str),
    /// `<time> --> <time>`; `start` is the first token verbatim.
    TimeRangeLine { start: &'a str },
    /// Empty or whitespace only.
    BlankLine,
    /// Any other line inside a cue body.
    BodyLine,
    /// Any other line outside a cue body.
    Unrecognized,
}

/// Classify `line` (terminator included) for the given scanner state.
pub fn classify(line: &str, in_cue: bool) -> LineKind<'_> {
    if !in_cue {
        if let Some(caps) = ORDINAL_REGEX.captures(line) {
            if let Some(digits) = caps.get(1) {
                return LineKind::OrdinalLine(digits.as_str());
            }
        }
    }
    if let Some(start) = TIME_RANGE_REGEX.captures(line).and_then(|caps| caps.get(1)) {
        return LineKind::TimeRangeLine {
            start: start.as_str(),
        };
    }
    if line.trim().is_empty() {
        return LineKind::BlankLine;
    }
    if in_cue {
        LineKind::BodyLine
    } else {
        LineKind::Unrecognized
    }
}

/// Split `text` after every `\n`, `\r\n` or lone `\r`, keeping each terminator.
/// A trailing piece without a terminator is yielded as is.
pub fn lines_with_terminators(text: &str) -> impl Iterator<Item = &str> {
    let bytes = text.as_bytes();
    let mut start = 0;
    std::iter::from_fn(move || {
        if start >= bytes.len() {
            return None;
        }
        let rest = &bytes[start..];
        let end = match rest.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(i) if rest[i] == b'\r' && rest.get(i + 1) == Some(&b'\n') => start + i + 2,
            Some(i) => start + i + 1,
            None => bytes.len(),
        };
        let line = &text[start..end];
        start = end;
        Some(line)
    })
}

/// Whether the scanner is between cues or collecting a cue body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    InCue,
}

/// Accumulates cues keyed by their verbatim start-time token.
///
/// A later cue with the same start token replaces the earlier one. A blank
/// line closes the open cue but keeps the pending ordinal, so a cue without
/// its own ordinal line reuses the last one seen.
#[derive(Debug)]
pub struct Scanner {
    state: ScanState,
    ordinal: String,
    current: Option<String>,
    records: BTreeMap<String, SubtitleRecord>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    /// Start idle with an empty ordinal and no cues.
    pub fn new() -> Self {
        Self {
            state: ScanState::Idle,
            ordinal: String::new(),
            current: None,
            records: BTreeMap::new(),
        }
    }

    /// Current position in the cue grammar.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Feed a run of text, splitting it into lines first.
    pub fn feed_text(&mut self, text: &str) {
        for line in lines_with_terminators(text) {
            self.feed(line);
        }
    }

    /// Feed one line, terminator included.
    pub fn feed(&mut self, line: &str) {
        match classify(line, self.state == ScanState::InCue) {
            LineKind::OrdinalLine(digits) => {
                self.ordinal = digits.to_string();
            }
            LineKind::TimeRangeLine { start } => {
                if !has_time_parts(start) {
                    debug!("skipping time range with malformed start {start:?}");
                    return;
                }
                let record = SubtitleRecord::new(self.ordinal.clone(), line, "");
                if self.records.insert(start.to_string(), record).is_some() {
                    debug!("cue at {start} replaces an earlier cue with the same start");
                }
                self.current = Some(start.to_string());
                self.state = ScanState::InCue;
            }
            LineKind::BlankLine => {
                self.state = ScanState::Idle;
            }
            LineKind::BodyLine => {
                let record = self
                    .current
                    .as_ref()
                    .and_then(|key| self.records.get_mut(key));
                if let Some(record) = record {
                    record.text.push_str(line);
                }
            }
            LineKind::Unrecognized => {
                debug!("dropping line outside a cue: {:?}", line.trim_end());
            }
        }
    }

    /// Consume the scanner and hand back the collected cues.
    pub fn finish(self) -> BTreeMap<String, SubtitleRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &str) -> BTreeMap<String, SubtitleRecord> {
        let mut scanner = Scanner::new();
        scanner.feed_text(input);
        scanner.finish()
    }

    #[test]
    fn classifies_lines_by_state() {
        assert_eq!(classify("12\n", false), LineKind::OrdinalLine("12"));
        assert_eq!(classify("12\n", true), LineKind::BodyLine);
        assert_eq!(
            classify("\t00:00:03,748 --> 00:00:06,901\n", true),
            LineKind::TimeRangeLine {
                start: "00:00:03,748"
            }
        );
        assert_eq!(classify("\t\t\n", true), LineKind::BlankLine);
        assert_eq!(classify("\r\n", false), LineKind::BlankLine);
        assert_eq!(classify("stray\n", false), LineKind::Unrecognized);
        assert_eq!(classify("words\n", true), LineKind::BodyLine);
    }

    #[test]
    fn builds_a_single_cue() {
        let records = scan("1\n00:00:01,000 --> 00:00:02,000\nhello\n\n");
        assert_eq!(records.len(), 1);
        let record = &records["00:00:01,000"];
        assert_eq!(record.ordinal, "1");
        assert_eq!(record.time_frame, "00:00:01,000 --> 00:00:02,000\n");
        assert_eq!(record.text, "hello\n");
    }

    #[test]
    fn accumulates_multiline_bodies() {
        let records = scan("3\n00:00:05,000 --> 00:00:06,000\none\ntwo\r\nthree\n\n");
        assert_eq!(records["00:00:05,000"].text, "one\ntwo\r\nthree\n");
    }

    #[test]
    fn later_cue_with_same_start_wins() {
        let records = scan(
            "1\n00:00:01,000 --> 00:00:02,000\nfirst\n\n2\n00:00:01,000 --> 00:00:03,000\nsecond\n\n",
        );
        assert_eq!(records.len(), 1);
        let record = &records["00:00:01,000"];
        assert_eq!(record.ordinal, "2");
        assert_eq!(record.text, "second\n");
    }

    #[test]
    fn malformed_start_opens_no_cue() {
        let records = scan(
            "1\n1:00 --> 00:00:02,000\nlost\n\n2\n00:00:03,000 --> 00:00:04,000\nkept\n\n",
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records["00:00:03,000"].text, "kept\n");
    }

    #[test]
    fn malformed_start_inside_cue_is_skipped() {
        let mut scanner = Scanner::new();
        scanner.feed("1\n");
        scanner.feed("00:00:01,000 --> 00:00:02,000\n");
        scanner.feed("1:00 --> 00:00:02,000\n");
        assert_eq!(scanner.state(), ScanState::InCue);
        scanner.feed("still here\n");
        let records = scanner.finish();
        assert_eq!(records["00:00:01,000"].text, "still here\n");
    }

    #[test]
    fn digits_inside_a_body_are_text() {
        let records = scan("1\n00:00:01,000 --> 00:00:02,000\n42\n\n");
        let record = &records["00:00:01,000"];
        assert_eq!(record.ordinal, "1");
        assert_eq!(record.text, "42\n");
    }

    #[test]
    fn text_outside_a_cue_is_dropped() {
        let records = scan("preamble\n1\n00:00:01,000 --> 00:00:02,000\nhi\n\nafterword\n");
        assert_eq!(records["00:00:01,000"].text, "hi\n");
    }

    #[test]
    fn last_line_without_terminator_is_kept() {
        let records = scan("1\n00:00:01,000 --> 00:00:02,000\nend");
        assert_eq!(records["00:00:01,000"].text, "end");
    }

    #[test]
    fn splits_on_every_line_ending() {
        let lines: Vec<&str> = lines_with_terminators("a\nb\r\nc\rd").collect();
        assert_eq!(lines, vec!["a\n", "b\r\n", "c\r", "d"]);
        assert_eq!(lines_with_terminators("").count(), 0);
    }

    #[test]
    fn carriage_return_only_files_are_scanned() {
        let records = scan("1\r00:00:01,000 --> 00:00:02,000\rhi\rthere\r\r");
        assert_eq!(records.len(), 1);
        let record = &records["00:00:01,000"];
        assert_eq!(record.ordinal, "1");
        assert_eq!(record.text, "hi\rthere\r");
    }

    #[test]
    fn start_token_stops_before_a_dot() {
        let records = scan("1\n00:00:01.000 --> 00:00:02.000\na\n\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records["00:00:01"].text, "a\n");
    }

    #[test]
    fn text_before_the_arrow_still_opens_a_cue() {
        let records = scan(
            "1\n00:00:01.000 --> 00:00:02.000\na\n\n2\n00:00:03,000 X --> 00:00:04,000\nb\n\n",
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records["00:00:01"].text, "a\n");
        let second = &records["00:00:03,000"];
        assert_eq!(second.ordinal, "2");
        assert_eq!(second.time_frame, "00:00:03,000 X --> 00:00:04,000\n");
        assert_eq!(second.text, "b\n");
        assert_eq!(
            classify("1:00 X --> 00:00:02,000\n", false),
            LineKind::TimeRangeLine { start: "1:00" }
        );
    }

    #[test]
    fn ordinal_carries_over_and_time_range_opens_a_new_cue() {
        let records = scan(
            "5\n00:00:01,000 --> 00:00:02,000\na\n\n00:00:03,000 --> 00:00:04,000\nb\n00:00:05,000 --> 00:00:06,000\nc\n\n",
        );
        assert_eq!(records.len(), 3);
        let expected = [
            ("00:00:01,000", "a\n"),
            ("00:00:03,000", "b\n"),
            ("00:00:05,000", "c\n"),
        ];
        for (key, body) in expected {
            assert_eq!(records[key].ordinal, "5");
            assert_eq!(records[key].text, body);
        }
    }

    #[test]
    fn blank_line_keeps_the_current_key() {
        let mut scanner = Scanner::new();
        scanner.feed_text("1\n00:00:01,000 --> 00:00:02,000\nhi\n\n");
        assert_eq!(scanner.state(), ScanState::Idle);
        assert_eq!(scanner.current.as_deref(), Some("00:00:01,000"));
        assert_eq!(scanner.ordinal, "1");
    }
}
