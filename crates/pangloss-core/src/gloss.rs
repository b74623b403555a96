// SPDX-License-Identifier: AGPL-3.0-or-later
//! Gloss entries: the three lines of one example list item

use crate::ast::{write_text, Block, Inline, TextSink};
use crate::text::segment;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Number of lines in a well-formed gloss
pub const GLOSS_LINES: usize = 3;

static LABEL_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\{#ex:([\w.:-]+)\}\s*$").expect("label pattern is valid"));

/// Why a list item is not a gloss
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedGloss {
    #[error("list item is empty")]
    Empty,

    #[error("list item does not start with a paragraph")]
    NotParagraph,

    #[error("expected 3 lines, found {0}")]
    LineCount(usize),
}

/// Part of a gloss line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// Author text, still to be escaped for the output format
    Text(String),
    /// Raw markup for the output format, kept verbatim
    Raw(String),
}

/// One line of a gloss
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pieces: Vec<Piece>,
}

impl Line {
    /// Read inline content, keeping raw markup only in the given formats
    pub fn from_inlines(inlines: &[Inline], raw_formats: &[&str]) -> Self {
        let mut builder = LineBuilder {
            raw_formats,
            line: Line::default(),
        };
        write_text(&mut builder, inlines);
        let mut line = builder.line;
        line.trim();
        line
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// The line's text with raw markup inlined
    pub fn plain(&self) -> String {
        self.pieces
            .iter()
            .map(|piece| match piece {
                Piece::Text(text) | Piece::Raw(text) => text.as_str(),
            })
            .collect()
    }

    /// Render the line, passing author text through `text` and raw markup
    /// through unchanged
    pub fn render<F>(&self, text: F) -> String
    where
        F: Fn(&str) -> String,
    {
        self.pieces
            .iter()
            .map(|piece| match piece {
                Piece::Text(t) => text(t.as_str()),
                Piece::Raw(markup) => markup.clone(),
            })
            .collect()
    }

    /// Remove a trailing `{#ex:<id>}` marker and return its identifier.
    ///
    /// The marker must sit in author text after the last raw markup.
    pub fn take_label(&mut self) -> Option<String> {
        let Some(Piece::Text(last)) = self.pieces.last_mut() else {
            return None;
        };
        let (rest, id) = split_label(last.as_str());
        let id = id?.to_string();
        let rest = rest.to_string();
        if rest.is_empty() {
            self.pieces.pop();
        } else {
            *last = rest;
        }
        Some(id)
    }

    fn push_text(&mut self, text: &str) {
        match self.pieces.last_mut() {
            Some(Piece::Text(last)) => last.push_str(text),
            _ => self.pieces.push(Piece::Text(text.to_string())),
        }
    }

    fn trim(&mut self) {
        if let Some(Piece::Text(first)) = self.pieces.first_mut() {
            *first = first.trim_start().to_string();
        }
        if let Some(Piece::Text(last)) = self.pieces.last_mut() {
            *last = last.trim_end().to_string();
        }
        self.pieces
            .retain(|piece| !matches!(piece, Piece::Text(text) if text.is_empty()));
    }
}

impl From<&str> for Line {
    fn from(text: &str) -> Self {
        let mut line = Line::default();
        if !text.is_empty() {
            line.push_text(text);
        }
        line
    }
}

struct LineBuilder<'a> {
    raw_formats: &'a [&'a str],
    line: Line,
}

impl TextSink for LineBuilder<'_> {
    fn text(&mut self, text: &str) {
        self.line.push_text(text);
    }

    fn raw(&mut self, format: &str, markup: &str) {
        if self.raw_formats.iter().any(|accepted| *accepted == format) {
            self.line.pieces.push(Piece::Raw(markup.to_string()));
        }
    }
}

/// Object-language line, morpheme gloss and free translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossEntry {
    pub orig: Line,
    pub gloss: Line,
    pub translation: Line,
}

/// Read the three lines of a gloss out of a list item.
///
/// Raw inlines survive only when their format is in `raw_formats`.
pub fn extract(item: &[Block], raw_formats: &[&str]) -> Result<GlossEntry, MalformedGloss> {
    let first = item.first().ok_or(MalformedGloss::Empty)?;
    let inlines = first
        .paragraph_inlines()
        .ok_or(MalformedGloss::NotParagraph)?;

    let lines: Vec<Line> = segment(inlines)
        .into_iter()
        .map(|line| Line::from_inlines(line, raw_formats))
        .collect();

    match <[Line; GLOSS_LINES]>::try_from(lines) {
        Ok([orig, gloss, translation]) => Ok(GlossEntry {
            orig,
            gloss,
            translation,
        }),
        Err(lines) => Err(MalformedGloss::LineCount(lines.len())),
    }
}

/// Whether a list should be treated as glosses at all.
///
/// Every item must be a well-formed gloss. Ordinary example lists that happen
/// to contain some three-line items stay untouched.
pub fn is_gloss_list(items: &[Vec<Block>]) -> bool {
    !items.is_empty() && items.iter().all(|item| extract(item, &[]).is_ok())
}

/// Split a trailing `{#ex:<id>}` label marker off a translation line
pub fn split_label(translation: &str) -> (&str, Option<&str>) {
    match LABEL_MARKER.captures(translation) {
        Some(caps) => {
            let start = caps.get(0).map_or(translation.len(), |m| m.start());
            (&translation[..start], caps.get(1).map(|m| m.as_str()))
        }
        None => (translation, None),
    }
}
