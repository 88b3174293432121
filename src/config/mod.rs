//! Build configuration
//!
//! Holds the comment markers, the expose toggle, rewrite rules, the plugin
//! chain and document metadata. Configuration is read-only once a build
//! starts and can be shared between parallel builds.
//!
//! Format (YAML shown, JSON and TOML use the same keys):
//! ```yaml
//! expose: true
//! comment:
//!   line: "//"
//!   block:
//!     start: "/*"
//!     end: "*/"
//! rewrite:
//!   - find: "TODO"
//!     replace: "todo"
//! plugins:
//!   - path: ./plugins/normalize
//! plugin_timeout_ms: 30000
//! metadata:
//!   - keyword: project
//!     value: emits
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EmitsError, Result};

/// Fixed suffix marking a line comment as exposing the lines that follow it
pub const EXPOSE_MARKER: &str = ">";

/// Default upper bound for a single plugin run
pub const DEFAULT_PLUGIN_TIMEOUT_MS: u64 = 30_000;

/// Start and end markers of a block comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMarkers {
    pub start: String,
    pub end: String,
}

/// Comment markers used by the line classifier
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommentSyntax {
    /// Line comment marker, e.g. `//` or `#`
    pub line: Option<String>,
    /// Block comment markers, e.g. `/*` and `*/`
    pub block: Option<BlockMarkers>,
}

impl CommentSyntax {
    pub fn new(line: Option<&str>, block: Option<(&str, &str)>) -> Self {
        Self {
            line: line.map(str::to_string),
            block: block.map(|(start, end)| BlockMarkers {
                start: start.to_string(),
                end: end.to_string(),
            }),
        }
    }

    /// C-style markers: `//`, `/*` and `*/`
    pub fn c_style() -> Self {
        Self::new(Some("//"), Some(("/*", "*/")))
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_none() && self.block.is_none()
    }

    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if matches!(self.line.as_deref(), Some("")) {
            errors.push("line comment marker is empty".to_string());
        }
        if let Some(block) = &self.block {
            if block.start.is_empty() {
                errors.push("block comment start marker is empty".to_string());
            }
            if block.end.is_empty() {
                errors.push("block comment end marker is empty".to_string());
            }
        }
        errors
    }
}

/// A find/replace rule applied to every retained line value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    /// Regular expression to search for
    pub find: String,
    /// Replacement template (`$1`, `${name}` expand capture groups)
    #[serde(default)]
    pub replace: String,
}

impl RewriteRule {
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }
}

/// An external executable run over the serialized tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSpec {
    pub path: PathBuf,
}

/// A key/value pair copied verbatim into the output document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaEntry {
    pub keyword: String,
    pub value: String,
}

impl MetaEntry {
    /// Parses `key=value`
    pub fn parse(pair: &str) -> Option<Self> {
        let (keyword, value) = pair.split_once('=')?;
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return None;
        }
        Some(Self {
            keyword: keyword.to_string(),
            value: value.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Whether `>`-terminated line comments expose the lines after them
    #[serde(default)]
    pub expose: bool,

    #[serde(default)]
    pub comment: CommentSyntax,

    #[serde(default)]
    pub rewrite: Vec<RewriteRule>,

    #[serde(default)]
    pub plugins: Vec<PluginSpec>,

    #[serde(default = "default_plugin_timeout_ms")]
    pub plugin_timeout_ms: u64,

    #[serde(default)]
    pub metadata: Vec<MetaEntry>,
}

fn default_plugin_timeout_ms() -> u64 {
    DEFAULT_PLUGIN_TIMEOUT_MS
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            expose: false,
            comment: CommentSyntax::default(),
            rewrite: Vec::new(),
            plugins: Vec::new(),
            plugin_timeout_ms: DEFAULT_PLUGIN_TIMEOUT_MS,
            metadata: Vec::new(),
        }
    }
}

impl Configuration {
    pub fn new(comment: CommentSyntax) -> Self {
        Self {
            comment,
            ..Default::default()
        }
    }

    pub fn with_expose(mut self, expose: bool) -> Self {
        self.expose = expose;
        self
    }

    pub fn with_rewrite(mut self, rule: RewriteRule) -> Self {
        self.rewrite.push(rule);
        self
    }

    pub fn with_plugin(mut self, path: impl Into<PathBuf>) -> Self {
        self.plugins.push(PluginSpec { path: path.into() });
        self
    }

    pub fn with_plugin_timeout(mut self, timeout: Duration) -> Self {
        self.plugin_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_metadata(mut self, keyword: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push(MetaEntry {
            keyword: keyword.into(),
            value: value.into(),
        });
        self
    }

    pub fn plugin_timeout(&self) -> Duration {
        Duration::from_millis(self.plugin_timeout_ms.max(1))
    }

    /// Loads a configuration file, picking the format from its extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EmitsError::Config(format!("Could not read {}: {}", path.display(), e))
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let parsed = match extension.as_str() {
            "json" => Self::from_json(&content),
            "toml" => Self::from_toml(&content),
            "yml" | "yaml" => Self::from_yaml(&content),
            other => Err(EmitsError::Config(format!(
                "Unsupported configuration format: {:?}",
                other
            ))),
        };

        parsed.map_err(|e| match e {
            EmitsError::Config(msg) => {
                EmitsError::Config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| EmitsError::Config(format!("Invalid YAML: {}", e)))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| EmitsError::Config(format!("Invalid JSON: {}", e)))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| EmitsError::Config(format!("Invalid TOML: {}", e)))
    }

    /// Checks the comment markers; every problem is reported at once
    pub fn validate(&self) -> Result<()> {
        let errors = self.comment.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(EmitsError::Config(errors.join(", ")))
        }
    }
}
