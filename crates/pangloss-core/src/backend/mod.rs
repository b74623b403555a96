// SPDX-License-Identifier: AGPL-3.0-or-later
//! Gloss backends and the registry that selects them

mod gb4e;
mod leipzig;
mod linguex;
mod table;

pub use gb4e::Gb4eBackend;
pub use leipzig::LeipzigBackend;
pub use linguex::LinguexBackend;
pub use table::TableBackend;

use crate::ast::Block;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Error type for format and backend selection
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Unknown {format} backend '{name}' (available: {})", .available.join(", "))]
    UnknownBackend {
        format: OutputFormat,
        name: String,
        available: Vec<&'static str>,
    },
}

/// Output formats that glosses can be rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Latex,
    Html,
}

impl OutputFormat {
    /// Format name used to tag raw blocks and inlines
    pub const fn raw_format(&self) -> &'static str {
        match self {
            Self::Latex => "latex",
            Self::Html => "html",
        }
    }

    /// Raw inline formats passed through verbatim into this format's output
    pub const fn accepted_raw_formats(&self) -> &'static [&'static str] {
        match self {
            Self::Latex => &["latex", "tex"],
            Self::Html => &["html", "html4", "html5"],
        }
    }
}

impl FromStr for OutputFormat {
    type Err = BackendError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "latex" | "beamer" => Ok(Self::Latex),
            "html" | "html4" | "html5" => Ok(Self::Html),
            other => Err(BackendError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw_format())
    }
}

/// One gloss ready for a backend: small caps applied, label split off
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub orig: String,
    pub gloss: String,
    pub translation: String,
    pub label: Option<String>,
}

/// Raw markup produced for one example list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub format: OutputFormat,
    pub markup: String,
}

impl Fragment {
    pub fn into_block(self) -> Block {
        Block::RawBlock(self.format.raw_format().to_string(), self.markup)
    }
}

/// Backend trait: render a run of examples as raw markup
pub trait Backend: Send + Sync {
    /// Name used in the `latexBackend` / `htmlBackend` settings
    fn name(&self) -> &'static str;

    /// The output format this backend produces
    fn format(&self) -> OutputFormat;

    /// Markup for a glossing abbreviation such as `PERF`
    fn small_caps(&self, abbreviation: &str) -> String;

    /// Escape author text for the output format. Raw markup is never escaped.
    fn escape<'a>(&self, text: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(text)
    }

    /// Render examples into one block of markup
    fn render(&self, examples: &[Example]) -> String;

    fn fragment(&self, examples: &[Example]) -> Fragment {
        Fragment {
            format: self.format(),
            markup: self.render(examples),
        }
    }
}

/// Registry of backends keyed by output format and name
pub struct BackendRegistry {
    backends: HashMap<OutputFormat, HashMap<&'static str, Box<dyn Backend>>>,
}

impl BackendRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    /// Create a registry with the built-in backends
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(Gb4eBackend));
        registry.register(Box::new(LinguexBackend));
        registry.register(Box::new(LeipzigBackend));
        registry.register(Box::new(TableBackend));
        registry
    }

    /// Register a backend, replacing any with the same format and name
    pub fn register(&mut self, backend: Box<dyn Backend>) {
        self.backends
            .entry(backend.format())
            .or_default()
            .insert(backend.name(), backend);
    }

    /// Backend names available for a format (sorted)
    pub fn names(&self, format: OutputFormat) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .backends
            .get(&format)
            .map(|by_name| by_name.keys().copied().collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    pub fn resolve(&self, format: OutputFormat, name: &str) -> Result<&dyn Backend, BackendError> {
        self.backends
            .get(&format)
            .and_then(|by_name| by_name.get(name))
            .map(|backend| backend.as_ref())
            .ok_or_else(|| BackendError::UnknownBackend {
                format,
                name: name.to_string(),
                available: self.names(format),
            })
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Escape the characters HTML treats as markup in text content
pub(crate) fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Escape the characters LaTeX treats as markup in text
pub(crate) fn escape_latex(text: &str) -> Cow<'_, str> {
    if !text.contains(['\\', '%', '#', '&', '_', '$', '{', '}', '~', '^']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\textbackslash{}"),
            '~' => escaped.push_str("\\textasciitilde{}"),
            '^' => escaped.push_str("\\textasciicircum{}"),
            '%' | '#' | '&' | '_' | '$' | '{' | '}' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
pub(crate) fn example(orig: &str, gloss: &str, translation: &str, label: Option<&str>) -> Example {
    Example {
        orig: orig.to_string(),
        gloss: gloss.to_string(),
        translation: translation.to_string(),
        label: label.map(str::to_string),
    }
}
