// SPDX-License-Identifier: AGPL-3.0-or-later
//! `@ex:<id>` citations to labelled examples

use crate::ast::{Citation, Inline, Rewriter};
use crate::backend::OutputFormat;
use crate::config::Settings;
use tracing::warn;

/// Citation key prefix reserved for example references
pub const REFERENCE_PREFIX: &str = "ex:";

/// Target expression for one example identifier, if the format has one
pub fn reference_target(format: OutputFormat, id: &str) -> Option<String> {
    match format {
        OutputFormat::Latex => Some(format!("\\ref{{{REFERENCE_PREFIX}{id}}}")),
        // TODO: link to the example's id once the leipzigjs and table backends number their examples
        OutputFormat::Html => None,
    }
}

/// Substitute a target at the template's `{}` placeholder
pub fn fill_template(template: &str, target: &str) -> String {
    template.replacen("{}", target, 1)
}

/// Replaces citation groups of `ex:` keys with raw reference markup
pub struct ReferenceResolver<'a> {
    format: OutputFormat,
    settings: &'a Settings,
    resolved: usize,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(format: OutputFormat, settings: &'a Settings) -> Self {
        Self {
            format,
            settings,
            resolved: 0,
        }
    }

    /// Citation groups replaced so far
    pub fn resolved(&self) -> usize {
        self.resolved
    }

    /// Reference markup for a citation group, or `None` to leave it alone
    pub fn resolve(&self, citations: &[Citation]) -> Option<Inline> {
        if !citations.first()?.citation_id.starts_with(REFERENCE_PREFIX) {
            return None;
        }

        let mut targets = Vec::with_capacity(citations.len());
        for citation in citations {
            let Some(id) = citation.citation_id.strip_prefix(REFERENCE_PREFIX) else {
                warn!(
                    key = %citation.citation_id,
                    "citation group mixes example references with other keys, leaving it"
                );
                return None;
            };
            targets.push(reference_target(self.format, id)?);
        }

        let separator = format!("{} ", self.settings.ref_delim);
        let template = self.settings.example_ref_format.singular();
        let text = fill_template(template, &targets.join(&separator));

        Some(Inline::RawInline(self.format.raw_format().to_string(), text))
    }
}

impl Rewriter for ReferenceResolver<'_> {
    fn rewrite_inline(&mut self, inline: &Inline) -> Option<Inline> {
        let Inline::Cite(citations, _) = inline else {
            return None;
        };

        let replacement = self.resolve(citations)?;
        self.resolved += 1;
        Some(replacement)
    }
}
