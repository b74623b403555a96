// SPDX-License-Identifier: AGPL-3.0-or-later
//! Pangloss Core - Interlinear glosses for pandoc documents
//!
//! This crate provides:
//! - A serde model of pandoc's JSON AST with a top-down rewriter
//! - Detection of example lists whose items are three-line glosses
//! - gb4e and linguex backends for LaTeX, Leipzig.js and table backends for HTML
//! - Resolution of `@ex:<id>` citations to labelled examples
//! - Settings merged from defaults, config files and document metadata

pub mod ast;
pub mod backend;
pub mod config;
pub mod filter;
pub mod gloss;
pub mod refs;
pub mod render;
pub mod text;

pub use ast::{Block, Inline, MetaValue, Pandoc, Rewriter};
pub use backend::{Backend, BackendError, BackendRegistry, Example, OutputFormat};
pub use config::{ConfigError, ConfigSources, Settings, SettingsLayer};
pub use filter::{Filter, FilterError, Report, Strictness};
pub use gloss::{GlossEntry, Line, MalformedGloss};
pub use refs::ReferenceResolver;
pub use render::GlossRenderer;
