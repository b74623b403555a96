// SPDX-License-Identifier: AGPL-3.0-or-later
//! linguex interlinear glosses for LaTeX

use super::{escape_latex, Backend, Example, OutputFormat};
use std::borrow::Cow;

pub struct LinguexBackend;

impl Backend for LinguexBackend {
    fn name(&self) -> &'static str {
        "linguex"
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
        // linguex ends each example at a blank line
        examples
            .iter()
            .map(|example| {
                let label = example
                    .label
                    .as_ref()
                    .map(|label| format!("\\label{{ex:{label}}} "))
                    .unwrap_or_default();
                format!(
                    "\\ex. {label}\\gll {}\\\\\n{}\\\\\n\\glt `{}'\n",
                    example.orig, example.gloss, example.translation
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
