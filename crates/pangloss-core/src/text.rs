// SPDX-License-Identifier: AGPL-3.0-or-later
//! Text utilities shared by the gloss backends

use crate::ast::Inline;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w']+").expect("word pattern is valid"));

/// Rewrite glossing abbreviations given in capitals (`PERF`, `PST`) with
/// `wrap`, leaving every other token alone.
///
/// Only tokens made entirely of ASCII `A`-`Z` qualify, so capitalised words
/// (`Mary`) and person/number glosses (`1SG`) are untouched.
pub fn smallcapify<F>(text: &str, wrap: F) -> String
where
    F: Fn(&str) -> String,
{
    WORD.replace_all(text, |caps: &Captures<'_>| {
        let word = &caps[0];
        if is_abbreviation(word) {
            wrap(word)
        } else {
            word.to_string()
        }
    })
    .into_owned()
}

fn is_abbreviation(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|b| b.is_ascii_uppercase())
}

/// Split inline content into lines on soft breaks.
///
/// The breaks themselves are dropped, and so are empty runs between
/// consecutive breaks; no returned segment is empty.
pub fn segment(inlines: &[Inline]) -> Vec<&[Inline]> {
    inlines
        .split(|inline| matches!(inline, Inline::SoftBreak))
        .filter(|run| !run.is_empty())
        .collect()
}
