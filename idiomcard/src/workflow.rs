//! Stage logic of the idiom card workflow, kept free of HTTP and storage concerns.
//!
//! ```text
//! Start → Uploaded → Scanned → Selected → Explained → Persisted → CardRendered
//! ```
//!
//! Nothing is kept between requests: every stage receives what it needs from the URL or the
//! submitted form, and any failure sends the user back to `Start`.

use rand::{Rng, seq::IndexedRandom};
use serde::Serialize;
use std::collections::HashSet;

use crate::errors::{Error, Result};

/// Lines recognized in one image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// Non-blank lines in recognition order
    pub lines: Vec<String>,
    /// The longest line, first one wins on ties
    pub longest_line: String,
}

/// Characters that end a line. Tesseract also emits a form feed after each page.
const LINE_BREAKS: [char; 10] = ['\n', '\r', '\x0b', '\x0c', '\x1c', '\x1d', '\x1e', '\u{85}', '\u{2028}', '\u{2029}'];

impl ScanResult {
    /// Split OCR output into lines, dropping blank ones.
    ///
    /// Fails with [`Error::NoTextFound`] if no line is left.
    pub fn from_text(text: &str) -> Result<Self> {
        let lines: Vec<String> = text
            .split(LINE_BREAKS)
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();

        let longest_line = longest_line(&lines).ok_or(Error::NoTextFound)?.to_string();
        Ok(Self { lines, longest_line })
    }
}

/// The line with the most characters; the earliest one on ties.
pub fn longest_line(lines: &[String]) -> Option<&str> {
    let mut longest: Option<(&str, usize)> = None;
    for line in lines {
        let len = line.chars().count();
        if longest.is_none_or(|(_, best)| len > best) {
            longest = Some((line, len));
        }
    }
    longest.map(|(line, _)| line)
}

/// Texts chosen on the scan page must not be empty
pub fn require_selection(selected_texts: &[String]) -> Result<()> {
    if selected_texts.is_empty() {
        return Err(Error::NoSelection);
    }
    Ok(())
}

/// The texts to look up, each once, in order of first appearance.
///
/// The explanation page is a mapping keyed by text, so a repeated selection shows up once.
pub fn lookup_keys(selected_texts: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    selected_texts
        .iter()
        .filter(|text| seen.insert(text.as_str()))
        .cloned()
        .collect()
}

/// The idiom and explanation a new card is made of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDraw {
    pub idiom: String,
    pub explanation: String,
}

/// Draw a card from the submitted texts and explanations.
///
/// Both lists need at least `sample_size` entries. The idiom and the explanation are drawn
/// independently and uniformly, so the explanation need not belong to the idiom.
pub fn draw_card<R: Rng + ?Sized>(
    selected_texts: &[String],
    explanations: &[String],
    sample_size: usize,
    rng: &mut R,
) -> Result<CardDraw> {
    let insufficient = || Error::InsufficientData {
        required: sample_size,
        selected: selected_texts.len(),
        explanations: explanations.len(),
    };

    if selected_texts.len() < sample_size || explanations.len() < sample_size {
        return Err(insufficient());
    }

    let idiom = selected_texts.choose(rng).ok_or_else(insufficient)?;
    let explanation = explanations.choose(rng).ok_or_else(insufficient)?;

    Ok(CardDraw {
        idiom: idiom.clone(),
        explanation: explanation.clone(),
    })
}
