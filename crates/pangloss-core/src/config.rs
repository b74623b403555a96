// SPDX-License-Identifier: AGPL-3.0-or-later
//! Layered settings
//!
//! Settings are merged from five layers, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. `~/.pangloss/config.yaml`
//! 3. `~/.pangloss/config-<format>.yaml`
//! 4. the file named by the `glossConfig` metadata key, else `./pangloss.yaml`
//! 5. document metadata
//!
//! Every layer above the defaults is a [`SettingsLayer`] whose fields are all
//! optional; a missing field leaves the value from the layers below in place.
//! Keys outside the closed setting set are ignored everywhere.

use crate::ast::{stringify, stringify_blocks, MetaValue};
use crate::backend::OutputFormat;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Metadata key naming the local config file
pub const LOCAL_CONFIG_KEY: &str = "glossConfig";

/// Local config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "pangloss.yaml";

/// Directory under the home directory holding the global config files
pub const GLOBAL_CONFIG_DIR: &str = ".pangloss";

/// Every recognised setting name
pub const SETTING_NAMES: [&str; 11] = [
    "chapters",
    "chaptersDepth",
    "exampleLabelFormat",
    "exampleRefFormat",
    "rangeDelim",
    "pairDelim",
    "lastDelim",
    "refDelim",
    "linkReferences",
    "latexBackend",
    "htmlBackend",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid settings in {layer}: {message}")]
    Invalid { layer: Layer, message: String },

    #[error("Invalid template: {0}")]
    Template(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Where a layer of settings came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Global,
    GlobalFormat,
    Local,
    Metadata,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Global => "global config",
            Self::GlobalFormat => "format config",
            Self::Local => "local config",
            Self::Metadata => "document metadata",
        })
    }
}

/// Reference text template: a single template, or singular and plural forms
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RefFormat {
    Single(String),
    ByNumber(Vec<String>),
}

impl RefFormat {
    /// The template for a single reference.
    ///
    /// The plural form of a [`RefFormat::ByNumber`] pair is never chosen.
    pub fn singular(&self) -> &str {
        match self {
            Self::Single(template) => template,
            Self::ByNumber(templates) => templates.first().map_or("{}", String::as_str),
        }
    }

    fn templates(&self) -> &[String] {
        match self {
            Self::Single(template) => std::slice::from_ref(template),
            Self::ByNumber(templates) => templates,
        }
    }
}

/// Effective settings for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Number examples per chapter
    pub chapters: bool,
    pub chapters_depth: u32,
    pub example_label_format: String,
    pub example_ref_format: RefFormat,
    pub range_delim: String,
    pub pair_delim: String,
    pub last_delim: String,
    /// Separator between references cited together
    pub ref_delim: String,
    pub link_references: bool,
    pub latex_backend: String,
    pub html_backend: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chapters: false,
            chapters_depth: 1,
            example_label_format: "({})".to_string(),
            example_ref_format: RefFormat::ByNumber(vec![
                "ex. {}".to_string(),
                "exs. {}".to_string(),
            ]),
            range_delim: "-".to_string(),
            pair_delim: ",".to_string(),
            last_delim: ",".to_string(),
            ref_delim: ",".to_string(),
            link_references: false,
            latex_backend: "gb4e".to_string(),
            html_backend: "leipzigjs".to_string(),
        }
    }
}

impl Settings {
    /// Overlay every value the layer has an opinion on
    pub fn with(mut self, layer: SettingsLayer) -> Self {
        if let Some(v) = layer.chapters {
            self.chapters = v;
        }
        if let Some(v) = layer.chapters_depth {
            self.chapters_depth = v;
        }
        if let Some(v) = layer.example_label_format {
            self.example_label_format = v;
        }
        if let Some(v) = layer.example_ref_format {
            self.example_ref_format = v;
        }
        if let Some(v) = layer.range_delim {
            self.range_delim = v;
        }
        if let Some(v) = layer.pair_delim {
            self.pair_delim = v;
        }
        if let Some(v) = layer.last_delim {
            self.last_delim = v;
        }
        if let Some(v) = layer.ref_delim {
            self.ref_delim = v;
        }
        if let Some(v) = layer.link_references {
            self.link_references = v;
        }
        if let Some(v) = layer.latex_backend {
            self.latex_backend = v;
        }
        if let Some(v) = layer.html_backend {
            self.html_backend = v;
        }
        self
    }

    /// Backend name selected for an output format
    pub fn backend_for(&self, format: OutputFormat) -> &str {
        match format {
            OutputFormat::Latex => &self.latex_backend,
            OutputFormat::Html => &self.html_backend,
        }
    }

    /// Check that every reference template has a `{}` placeholder
    pub fn validate(&self) -> Result<()> {
        let templates = self.example_ref_format.templates();
        if templates.is_empty() {
            return Err(ConfigError::Template(
                "exampleRefFormat list is empty".to_string(),
            ));
        }
        if let Some(template) = templates.iter().find(|t| !t.contains("{}")) {
            return Err(ConfigError::Template(format!(
                "exampleRefFormat '{template}' has no {{}} placeholder"
            )));
        }

        Ok(())
    }
}

/// One layer's opinion on each setting; `None` means no opinion
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsLayer {
    pub chapters: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_depth")]
    pub chapters_depth: Option<u32>,
    pub example_label_format: Option<String>,
    pub example_ref_format: Option<RefFormat>,
    pub range_delim: Option<String>,
    pub pair_delim: Option<String>,
    pub last_delim: Option<String>,
    pub ref_delim: Option<String>,
    pub link_references: Option<bool>,
    pub latex_backend: Option<String>,
    pub html_backend: Option<String>,
}

impl SettingsLayer {
    /// Merge a higher-precedence layer over this one
    pub fn merge(self, higher: SettingsLayer) -> SettingsLayer {
        SettingsLayer {
            chapters: higher.chapters.or(self.chapters),
            chapters_depth: higher.chapters_depth.or(self.chapters_depth),
            example_label_format: higher.example_label_format.or(self.example_label_format),
            example_ref_format: higher.example_ref_format.or(self.example_ref_format),
            range_delim: higher.range_delim.or(self.range_delim),
            pair_delim: higher.pair_delim.or(self.pair_delim),
            last_delim: higher.last_delim.or(self.last_delim),
            ref_delim: higher.ref_delim.or(self.ref_delim),
            link_references: higher.link_references.or(self.link_references),
            latex_backend: higher.latex_backend.or(self.latex_backend),
            html_backend: higher.html_backend.or(self.html_backend),
        }
    }

    /// Parse a YAML config file's contents. An empty file is an empty layer.
    pub fn from_yaml(text: &str, path: &Path) -> Result<Self> {
        let parse_error = |source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        };

        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: serde_yaml::Value = serde_yaml::from_str(text).map_err(parse_error)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value).map_err(parse_error)
    }

    /// Read the recognised settings out of document metadata
    pub fn from_metadata(meta: &BTreeMap<String, MetaValue>) -> Result<Self> {
        let fields: serde_json::Map<String, serde_json::Value> = SETTING_NAMES
            .iter()
            .filter_map(|name| meta.get(*name).map(|v| (name.to_string(), meta_to_json(v))))
            .collect();

        serde_json::from_value(serde_json::Value::Object(fields)).map_err(|err| {
            ConfigError::Invalid {
                layer: Layer::Metadata,
                message: err.to_string(),
            }
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn deserialize_depth<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Depth {
        Number(u32),
        Text(String),
    }

    match Option::<Depth>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Depth::Number(depth)) => Ok(Some(depth)),
        Some(Depth::Text(text)) => text.trim().parse().map(Some).map_err(|_| {
            de::Error::custom(format!("chaptersDepth must be a whole number, got '{text}'"))
        }),
    }
}

/// Metadata as plain JSON: inline and block text is stringified
fn meta_to_json(value: &MetaValue) -> serde_json::Value {
    use serde_json::Value;

    match value {
        MetaValue::Map(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), meta_to_json(value)))
                .collect(),
        ),
        MetaValue::List(items) => Value::Array(items.iter().map(meta_to_json).collect()),
        MetaValue::Bool(flag) => Value::Bool(*flag),
        MetaValue::String(text) => Value::String(text.clone()),
        MetaValue::Inlines(inlines) => Value::String(stringify(inlines)),
        MetaValue::Blocks(blocks) => Value::String(stringify_blocks(blocks)),
    }
}

fn meta_text(value: &MetaValue) -> Option<String> {
    match value {
        MetaValue::String(text) => Some(text.clone()),
        MetaValue::Inlines(inlines) => Some(stringify(inlines)),
        MetaValue::Blocks(blocks) => Some(stringify_blocks(blocks)),
        _ => None,
    }
}

/// Locations of the config files
#[derive(Debug, Clone)]
pub struct ConfigSources {
    /// Directory holding `config.yaml` and `config-<format>.yaml`
    pub global_dir: Option<PathBuf>,
    /// Directory relative local config paths resolve against
    pub working_dir: PathBuf,
}

impl ConfigSources {
    /// The user's `~/.pangloss` and the process working directory
    pub fn discover() -> Self {
        Self {
            global_dir: dirs::home_dir().map(|home| home.join(GLOBAL_CONFIG_DIR)),
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    pub fn global_config(&self) -> Option<PathBuf> {
        self.global_dir.as_ref().map(|dir| dir.join("config.yaml"))
    }

    pub fn format_config(&self, format: &str) -> Option<PathBuf> {
        self.global_dir
            .as_ref()
            .map(|dir| dir.join(format!("config-{format}.yaml")))
    }

    /// `glossConfig` from the metadata if set, else `pangloss.yaml`
    pub fn local_config(&self, meta: &BTreeMap<String, MetaValue>) -> PathBuf {
        let path = meta
            .get(LOCAL_CONFIG_KEY)
            .and_then(meta_text)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE));
        self.working_dir.join(path)
    }

    /// Merge every layer into the effective settings for a document
    pub fn resolve(&self, format: &str, meta: &BTreeMap<String, MetaValue>) -> Result<Settings> {
        let mut merged = SettingsLayer::default();

        let files = [
            (Layer::Global, self.global_config()),
            (Layer::GlobalFormat, self.format_config(format)),
            (Layer::Local, Some(self.local_config(meta))),
        ];
        for (layer, path) in files {
            if let Some(path) = path {
                merged = merged.merge(read_layer(layer, &path)?);
            }
        }

        let metadata = SettingsLayer::from_metadata(meta)?;
        if !metadata.is_empty() {
            debug!(layer = %Layer::Metadata, "applying settings");
        }
        merged = merged.merge(metadata);

        let settings = Settings::default().with(merged);
        settings.validate()?;
        Ok(settings)
    }
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self::discover()
    }
}

/// Read one config file; a missing or unreadable file contributes nothing
fn read_layer(layer: Layer, path: &Path) -> Result<SettingsLayer> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            debug!(%layer, path = %path.display(), "skipping config file: {err}");
            return Ok(SettingsLayer::default());
        }
    };

    debug!(%layer, path = %path.display(), "applying settings");
    SettingsLayer::from_yaml(&text, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Inline;
    use std::fs;
    use tempfile::TempDir;

    fn inlines(text: &str) -> MetaValue {
        MetaValue::Inlines(vec![Inline::Str(text.to_string())])
    }

    struct Fixture {
        home: TempDir,
        work: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                home: TempDir::new().unwrap(),
                work: TempDir::new().unwrap(),
            }
        }

        fn sources(&self) -> ConfigSources {
            ConfigSources {
                global_dir: Some(self.home.path().to_path_buf()),
                working_dir: self.work.path().to_path_buf(),
            }
        }

        fn global(&self, name: &str, yaml: &str) {
            fs::write(self.home.path().join(name), yaml).unwrap();
        }

        fn local(&self, name: &str, yaml: &str) {
            fs::write(self.work.path().join(name), yaml).unwrap();
        }
    }

    #[test]
    fn test_defaults_without_files() {
        let fixture = Fixture::new();
        let settings = fixture.sources().resolve("latex", &BTreeMap::new()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_no_home_directory() {
        let fixture = Fixture::new();
        let sources = ConfigSources {
            global_dir: None,
            ..fixture.sources()
        };
        assert_eq!(
            sources.resolve("latex", &BTreeMap::new()).unwrap(),
            Settings::default()
        );
    }

    #[test]
    fn test_precedence_global_then_metadata() {
        let fixture = Fixture::new();
        fixture.global("config.yaml", "rangeDelim: ':'\n");

        let mut meta = BTreeMap::new();
        meta.insert("rangeDelim".to_string(), inlines("/"));

        let sources = fixture.sources();
        assert_eq!(sources.resolve("latex", &meta).unwrap().range_delim, "/");
        assert_eq!(
            sources.resolve("latex", &BTreeMap::new()).unwrap().range_delim,
            ":"
        );

        fs::remove_file(fixture.home.path().join("config.yaml")).unwrap();
        assert_eq!(
            sources.resolve("latex", &BTreeMap::new()).unwrap().range_delim,
            "-"
        );
    }

    #[test]
    fn test_format_config_only_for_its_format() {
        let fixture = Fixture::new();
        fixture.global("config.yaml", "pairDelim: ';'\nrefDelim: ';'\n");
        fixture.global("config-html.yaml", "refDelim: '&'\nhtmlBackend: table\n");

        let html = fixture.sources().resolve("html", &BTreeMap::new()).unwrap();
        assert_eq!(html.pair_delim, ";");
        assert_eq!(html.ref_delim, "&");
        assert_eq!(html.html_backend, "table");

        let latex = fixture.sources().resolve("latex", &BTreeMap::new()).unwrap();
        assert_eq!(latex.ref_delim, ";");
        assert_eq!(latex.html_backend, "leipzigjs");
    }

    #[test]
    fn test_local_config_in_working_dir() {
        let fixture = Fixture::new();
        fixture.global("config.yaml", "latexBackend: gb4e\nlastDelim: and\n");
        fixture.local(LOCAL_CONFIG_FILE, "latexBackend: linguex\n");

        let settings = fixture.sources().resolve("latex", &BTreeMap::new()).unwrap();
        assert_eq!(settings.latex_backend, "linguex");
        assert_eq!(settings.last_delim, "and");
    }

    #[test]
    fn test_local_config_from_metadata_key() {
        let fixture = Fixture::new();
        fixture.local(LOCAL_CONFIG_FILE, "rangeDelim: ignored\n");
        fixture.local("glosses.yaml", "rangeDelim: '--'\nchapters: true\n");

        let mut meta = BTreeMap::new();
        meta.insert(LOCAL_CONFIG_KEY.to_string(), inlines("glosses.yaml"));

        let settings = fixture.sources().resolve("latex", &meta).unwrap();
        assert_eq!(settings.range_delim, "--");
        assert!(settings.chapters);
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let fixture = Fixture::new();
        fixture.global("config.yaml", "rangeDelim: [unclosed\n");

        let err = fixture
            .sources()
            .resolve("latex", &BTreeMap::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if path.ends_with("config.yaml")));
    }

    #[test]
    fn test_ill_typed_file_value_is_an_error() {
        let fixture = Fixture::new();
        fixture.local(LOCAL_CONFIG_FILE, "chapters: [1, 2]\n");
        assert!(fixture.sources().resolve("latex", &BTreeMap::new()).is_err());
    }

    #[test]
    fn test_empty_and_unknown_keys() {
        let fixture = Fixture::new();
        fixture.global("config.yaml", "");
        fixture.global("config-latex.yaml", "# nothing here\n");
        fixture.local(LOCAL_CONFIG_FILE, "somethingElse: 3\nrefDelim: ';'\n");

        let settings = fixture.sources().resolve("latex", &BTreeMap::new()).unwrap();
        assert_eq!(settings.ref_delim, ";");
    }

    #[test]
    fn test_chapters_depth_accepts_text_and_numbers() {
        let path = Path::new("test.yaml");
        assert_eq!(
            SettingsLayer::from_yaml("chaptersDepth: 2", path).unwrap().chapters_depth,
            Some(2)
        );
        assert_eq!(
            SettingsLayer::from_yaml("chaptersDepth: '3'", path).unwrap().chapters_depth,
            Some(3)
        );
        assert!(SettingsLayer::from_yaml("chaptersDepth: deep", path).is_err());

        let mut meta = BTreeMap::new();
        meta.insert("chaptersDepth".to_string(), inlines("2"));
        assert_eq!(
            SettingsLayer::from_metadata(&meta).unwrap().chapters_depth,
            Some(2)
        );
    }

    #[test]
    fn test_ref_format_from_metadata() {
        let mut meta = BTreeMap::new();
        meta.insert(
            "exampleRefFormat".to_string(),
            MetaValue::List(vec![inlines("Example {}"), inlines("Examples {}")]),
        );
        meta.insert("linkReferences".to_string(), MetaValue::Bool(true));
        meta.insert("title".to_string(), inlines("Ignored"));

        let layer = SettingsLayer::from_metadata(&meta).unwrap();
        assert_eq!(
            layer.example_ref_format,
            Some(RefFormat::ByNumber(vec![
                "Example {}".to_string(),
                "Examples {}".to_string()
            ]))
        );
        assert_eq!(layer.link_references, Some(true));
        assert_eq!(layer.example_ref_format.unwrap().singular(), "Example {}");
    }

    #[test]
    fn test_merge_keeps_lower_values() {
        let low = SettingsLayer {
            range_delim: Some("-".into()),
            pair_delim: Some(",".into()),
            ..Default::default()
        };
        let high = SettingsLayer {
            pair_delim: Some("&".into()),
            ..Default::default()
        };

        let merged = low.merge(high);
        assert_eq!(merged.range_delim.as_deref(), Some("-"));
        assert_eq!(merged.pair_delim.as_deref(), Some("&"));
        assert_eq!(merged.ref_delim, None);
    }

    #[test]
    fn test_validate_templates() {
        let settings = Settings::default().with(SettingsLayer {
            example_ref_format: Some(RefFormat::Single("see example".into())),
            ..Default::default()
        });
        assert!(matches!(settings.validate(), Err(ConfigError::Template(_))));

        let settings = Settings::default().with(SettingsLayer {
            example_ref_format: Some(RefFormat::ByNumber(vec![])),
            ..Default::default()
        });
        assert!(settings.validate().is_err());

        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_label_format_is_not_validated() {
        let settings = Settings::default().with(SettingsLayer {
            example_label_format: Some("Example".into()),
            ..Default::default()
        });
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_every_layer_in_order() {
        let fixture = Fixture::new();
        fixture.global("config.yaml", "refDelim: global\n");
        fixture.global("config-latex.yaml", "refDelim: format\n");
        fixture.local(LOCAL_CONFIG_FILE, "refDelim: local\n");

        let mut meta = BTreeMap::new();
        meta.insert("refDelim".to_string(), inlines("metadata"));

        let sources = fixture.sources();
        let ref_delim = |meta: &BTreeMap<String, MetaValue>| {
            sources.resolve("latex", meta).unwrap().ref_delim
        };

        assert_eq!(ref_delim(&meta), "metadata");
        meta.clear();
        assert_eq!(ref_delim(&meta), "local");
        fs::remove_file(fixture.work.path().join(LOCAL_CONFIG_FILE)).unwrap();
        assert_eq!(ref_delim(&meta), "format");
        fs::remove_file(fixture.home.path().join("config-latex.yaml")).unwrap();
        assert_eq!(ref_delim(&meta), "global");
        fs::remove_file(fixture.home.path().join("config.yaml")).unwrap();
        assert_eq!(ref_delim(&meta), ",");
    }

    #[test]
    fn test_unreadable_config_contributes_nothing() {
        let fixture = Fixture::new();
        fixture.global("config.yaml", "refDelim: ';'\n");
        fs::create_dir(fixture.work.path().join(LOCAL_CONFIG_FILE)).unwrap();

        let settings = fixture.sources().resolve("latex", &BTreeMap::new()).unwrap();
        assert_eq!(settings.ref_delim, ";");
    }

    #[test]
    fn test_backend_for_format() {
        let settings = Settings::default();
        assert_eq!(settings.backend_for(OutputFormat::Latex), "gb4e");
        assert_eq!(settings.backend_for(OutputFormat::Html), "leipzigjs");
    }
}
