//! Phonetic transcription of subtitle text.
//! A [`Transcriber`] turns a string into its romanized reading; the store
//! appends that reading to each cue body.

use anyhow::Result;
use pinyin::ToPinyin;

pub mod openai;

/// Produces a phonetic rendering of `text`, called once per cue.
pub trait Transcriber {
    fn transcribe(&self, text: &str) -> Result<String>;
}

/// Local Mandarin transcriber: Han characters become tone-marked pinyin,
/// every other character is passed through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinyinTranscriber;

impl Transcriber for PinyinTranscriber {
    fn transcribe(&self, text: &str) -> Result<String> {
        let mut out = String::with_capacity(text.len() * 2);
        for ch in text.chars() {
            match ch.to_pinyin() {
                Some(reading) => out.push_str(reading.with_tone()),
                None => out.push(ch),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_han_characters() {
        let out = PinyinTranscriber.transcribe("中国\n").unwrap();
        assert_eq!(out, "zhōngguó\n");
    }

    #[test]
    fn passes_other_text_through() {
        let out = PinyinTranscriber.transcribe("Hello, 2024!\n").unwrap();
        assert_eq!(out, "Hello, 2024!\n");
    }
}
