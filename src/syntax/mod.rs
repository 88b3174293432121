//! Built-in comment marker presets keyed by file extension.

use std::collections::HashMap;
use std::path::Path;

use crate::config::CommentSyntax;

/// Comment markers of one family of languages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentPreset {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    pub line: Option<&'static str>,
    pub block: Option<(&'static str, &'static str)>,
}

impl CommentPreset {
    pub fn syntax(&self) -> CommentSyntax {
        CommentSyntax::new(self.line, self.block)
    }
}

const PRESETS: &[CommentPreset] = &[
    CommentPreset {
        name: "c",
        extensions: &[
            "rs", "go", "c", "h", "cc", "cpp", "hpp", "cs", "java", "kt", "kts", "js", "jsx",
            "ts", "tsx", "swift", "scala", "dart", "php",
        ],
        line: Some("//"),
        block: Some(("/*", "*/")),
    },
    CommentPreset {
        name: "hash",
        extensions: &["py", "rb", "sh", "bash", "zsh", "pl", "r", "yml", "yaml", "toml", "tf"],
        line: Some("#"),
        block: None,
    },
    CommentPreset {
        name: "sql",
        extensions: &["sql"],
        line: Some("--"),
        block: Some(("/*", "*/")),
    },
    CommentPreset {
        name: "lua",
        extensions: &["lua"],
        line: Some("--"),
        block: Some(("--[[", "]]")),
    },
    CommentPreset {
        name: "haskell",
        extensions: &["hs", "elm"],
        line: Some("--"),
        block: Some(("{-", "-}")),
    },
    CommentPreset {
        name: "css",
        extensions: &["css", "scss", "less"],
        line: None,
        block: Some(("/*", "*/")),
    },
    CommentPreset {
        name: "markup",
        extensions: &["html", "htm", "xml", "svg", "vue"],
        line: None,
        block: Some(("<!--", "-->")),
    },
];

#[derive(Clone)]
pub struct SyntaxRegistry {
    presets: HashMap<&'static str, CommentPreset>,
    extension_map: HashMap<String, &'static str>,
}

impl SyntaxRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            presets: HashMap::new(),
            extension_map: HashMap::new(),
        };

        for preset in PRESETS {
            registry.register(*preset);
        }

        registry
    }

    pub fn register(&mut self, preset: CommentPreset) {
        for ext in preset.extensions {
            self.extension_map.insert(ext.to_string(), preset.name);
        }
        self.presets.insert(preset.name, preset);
    }

    pub fn get_by_name(&self, name: &str) -> Option<&CommentPreset> {
        self.presets.get(name)
    }

    pub fn get_by_extension(&self, ext: &str) -> Option<&CommentPreset> {
        self.extension_map
            .get(&ext.to_lowercase())
            .and_then(|name| self.presets.get(name))
    }

    pub fn get_for_file(&self, path: &Path) -> Option<&CommentPreset> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.get_by_extension(ext))
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        self.get_for_file(path).is_some()
    }

    /// Presets sorted by name
    pub fn presets(&self) -> Vec<&CommentPreset> {
        let mut presets: Vec<_> = self.presets.values().collect();
        presets.sort_by_key(|p| p.name);
        presets
    }
}

impl Default for SyntaxRegistry {
    fn default() -> Self {
        Self::new()
    }
}
