// SPDX-License-Identifier: AGPL-3.0-or-later
//! Leipzig.js gloss divs for HTML
//!
//! Leipzig.js aligns the words of the first two paragraphs of every
//! `data-gloss` div in the browser.

use super::{escape_html, Backend, Example, OutputFormat};
use std::borrow::Cow;

pub struct LeipzigBackend;

impl Backend for LeipzigBackend {
    fn name(&self) -> &'static str {
        "leipzigjs"
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Html
    }

    fn small_caps(&self, abbreviation: &str) -> String {
        format!("<abbr>{abbreviation}</abbr>")
    }

    fn escape<'a>(&self, text: &'a str) -> Cow<'a, str> {
        escape_html(text)
    }

    fn render(&self, examples: &[Example]) -> String {
        let mut html = String::new();
        for example in examples {
            match &example.label {
                Some(label) => html.push_str(&format!("<div data-gloss id=\"ex:{label}\">\n")),
                None => html.push_str("<div data-gloss>\n"),
            }
            html.push_str(&format!("<p>{}</p>\n", example.orig));
            html.push_str(&format!("<p>{}</p>\n", example.gloss));
            html.push_str(&format!("<p>\u{2018}{}\u{2019}</p>\n", example.translation));
            html.push_str("</div>\n");
        }
        html
    }
}
