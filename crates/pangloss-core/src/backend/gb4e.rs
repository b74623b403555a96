// SPDX-License-Identifier: AGPL-3.0-or-later
//! gb4e interlinear glosses for LaTeX
//!
//! The whole list becomes one `exe` environment; labelled examples get a
//! `\label{ex:<id>}` that `\ref` citations resolve against.

use super::{escape_latex, Backend, Example, OutputFormat};
use std::borrow::Cow;

pub struct Gb4eBackend;

impl Backend for Gb4eBackend {
    fn name(&self) -> &'static str {
        "gb4e"
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Latex
    }

    fn small_caps(&self, abbreviation: &str) -> String {
        format!("\\textsc{{{}}}", abbreviation.to_lowercase())
    }

    fn escape<'a>(&self, text: &'a str) -> Cow<'a, str> {
        escape_latex(text)
    }

    fn render(&self, examples: &[Example]) -> String {
        let mut latex = String::from("\\begin{exe}\n");
        for example in examples {
            latex.push_str("\\ex");
            if let Some(label) = &example.label {
                latex.push_str(&format!("\\label{{ex:{label}}}"));
            }
            latex.push('\n');
            latex.push_str(&format!("\\gll {} \\\\\n", example.orig));
            latex.push_str(&format!("{} \\\\\n", example.gloss));
            latex.push_str(&format!("\\trans `{}' \\\\\n", example.translation));
        }
        latex.push_str("\\end{exe}");
        latex
    }
}
