// SPDX-License-Identifier: AGPL-3.0-or-later
//! One filter run over a pandoc document

use crate::ast::Pandoc;
use crate::backend::{BackendError, BackendRegistry, OutputFormat};
use crate::config::{ConfigError, ConfigSources};
use crate::refs::ReferenceResolver;
use crate::render::GlossRenderer;
use std::io::{Read, Write};
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid pandoc JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FilterError>;

/// What to do when the output format or backend is not supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Fail the run
    #[default]
    Strict,
    /// Leave the document unmodified
    Lenient,
}

/// Counts from one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
    pub lists: usize,
    pub examples: usize,
    pub skipped: usize,
    pub ignored: usize,
    pub references: usize,
}

pub struct Filter<'r> {
    registry: &'r BackendRegistry,
    sources: ConfigSources,
    strictness: Strictness,
}

impl<'r> Filter<'r> {
    pub fn new(registry: &'r BackendRegistry, sources: ConfigSources) -> Self {
        Self {
            registry,
            sources,
            strictness: Strictness::default(),
        }
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Render glosses and resolve references in place.
    ///
    /// Settings and the backend are resolved before anything is rewritten, so
    /// an error leaves the document untouched.
    pub fn apply(&self, doc: &mut Pandoc, format_name: &str) -> Result<Report> {
        let format = match format_name.parse::<OutputFormat>() {
            Ok(format) => format,
            Err(err) => return self.unsupported(err),
        };

        let settings = self.sources.resolve(format_name, &doc.meta)?;
        let backend_name = settings.backend_for(format);
        let backend = match self.registry.resolve(format, backend_name) {
            Ok(backend) => backend,
            Err(err) => return self.unsupported(err),
        };
        debug!(%format, backend = backend.name(), "resolved backend");

        let mut glosses = GlossRenderer::new(backend);
        doc.walk(&mut glosses);

        let mut references = ReferenceResolver::new(format, &settings);
        doc.walk(&mut references);

        let report = Report {
            lists: glosses.lists(),
            examples: glosses.examples(),
            skipped: glosses.skipped(),
            ignored: glosses.ignored(),
            references: references.resolved(),
        };
        info!(
            lists = report.lists,
            examples = report.examples,
            skipped = report.skipped,
            ignored = report.ignored,
            references = report.references,
            "filter finished"
        );
        Ok(report)
    }

    /// Read a document, filter it, and write it back.
    ///
    /// Nothing is written unless the whole run succeeds.
    pub fn run<R: Read, W: Write>(&self, reader: R, mut writer: W, format_name: &str) -> Result<Report> {
        let mut doc: Pandoc = serde_json::from_reader(reader)?;
        let report = self.apply(&mut doc, format_name)?;
        let output = serde_json::to_vec(&doc)?;
        writer.write_all(&output)?;
        writer.flush()?;
        Ok(report)
    }

    fn unsupported(&self, err: BackendError) -> Result<Report> {
        match self.strictness {
            Strictness::Strict => Err(err.into()),
            Strictness::Lenient => {
                warn!("{err}; leaving document unchanged");
                Ok(Report::default())
            }
        }
    }
}
