use std::path::Path;

use serde::{Deserialize, Serialize};

use super::DirectiveNode;
use crate::config::MetaEntry;
use crate::error::Result;

/// The artifact handed to downstream documentation tooling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitDocument {
    pub source_file: String,
    #[serde(default)]
    pub metadata: Vec<MetaEntry>,
    /// RFC 3339 timestamp of generation
    pub generated_at_timestamp: String,
    #[serde(default)]
    pub data: Vec<DirectiveNode>,
}

impl EmitDocument {
    pub fn new(source_file: impl Into<String>, metadata: Vec<MetaEntry>, data: Vec<DirectiveNode>) -> Self {
        Self {
            source_file: source_file.into(),
            metadata,
            generated_at_timestamp: chrono::Utc::now().to_rfc3339(),
            data,
        }
    }

    /// Number of directive nodes with a keyword, at any depth
    pub fn directive_count(&self) -> usize {
        fn count(nodes: &[DirectiveNode]) -> usize {
            nodes
                .iter()
                .map(|n| usize::from(n.is_directive()) + count(&n.children))
                .sum()
        }
        count(&self.data)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the document, creating parent directories as needed
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}
