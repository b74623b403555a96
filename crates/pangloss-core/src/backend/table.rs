// SPDX-License-Identifier: AGPL-3.0-or-later
//! Static HTML tables with one column per word

use super::{escape_html, Backend, Example, OutputFormat};
use std::borrow::Cow;

pub struct TableBackend;

impl Backend for TableBackend {
    fn name(&self) -> &'static str {
        "table"
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
            let words: Vec<&str> = example.orig.split_whitespace().collect();
            let glosses: Vec<&str> = example.gloss.split_whitespace().collect();
            let columns = words.len().max(glosses.len()).max(1);

            match &example.label {
                Some(label) => html.push_str(&format!("<table class=\"gloss\" id=\"ex:{label}\">\n")),
                None => html.push_str("<table class=\"gloss\">\n"),
            }
            push_row(&mut html, &words, columns);
            push_row(&mut html, &glosses, columns);
            html.push_str(&format!(
                "<tr><td colspan=\"{columns}\">\u{2018}{}\u{2019}</td></tr>\n",
                example.translation
            ));
            html.push_str("</table>\n");
        }
        html
    }
}

fn push_row(html: &mut String, cells: &[&str], columns: usize) {
    html.push_str("<tr>");
    for i in 0..columns {
        html.push_str("<td>");
        html.push_str(cells.get(i).copied().unwrap_or_default());
        html.push_str("</td>");
    }
    html.push_str("</tr>\n");
}
