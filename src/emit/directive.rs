//! Directive grammar
//!
//! A retained line value is read as a directive when it looks like
//! ``.keyword`flags` value``:
//!
//! - `keyword`: word characters right after a leading `.`
//! - `flags` (optional): comma separated, each either `name:value` or a bare
//!   token
//! - `value`: everything after the single space following keyword/flags
//!
//! Anything else becomes a plain node carrying the text as its value.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::tree::{Node, Tree};

static DIRECTIVE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\.(\w+)(?:`(.+)`)? (.+)$").expect("directive regex is valid")
});

static FLAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?):(.+)$").expect("flag regex is valid"));

const FLAG_SEPARATOR: char = ',';

/// A flag attached to a directive keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: String,
}

impl Flag {
    pub fn named(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: value.into(),
        }
    }

    pub fn bare(value: impl Into<String>) -> Self {
        Self {
            name: None,
            value: value.into(),
        }
    }

    /// Parses one `name:value` token; tokens without a usable colon become
    /// bare flags holding the raw token
    pub fn parse(token: &str) -> Self {
        match FLAG_REGEX.captures(token) {
            Some(caps) => Self::named(&caps[1], &caps[2]),
            None => Self::bare(token),
        }
    }
}

/// Output node mirroring one retained source node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveNode {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub keyword: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<Flag>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DirectiveNode>,
    /// Source line, for diagnostics only
    #[serde(skip)]
    pub line: usize,
}

impl DirectiveNode {
    pub fn is_directive(&self) -> bool {
        !self.keyword.is_empty()
    }

    /// Named flag value, if present
    pub fn flag(&self, name: &str) -> Option<&str> {
        self.flags
            .iter()
            .find(|f| f.name.as_deref() == Some(name))
            .map(|f| f.value.as_str())
    }
}

/// Parses a single value without children
pub fn parse_directive(value: &str) -> DirectiveNode {
    let mut node = DirectiveNode::default();
    if value.is_empty() {
        return node;
    }

    match DIRECTIVE_REGEX.captures(value) {
        Some(caps) => {
            node.keyword = caps[1].to_string();
            node.value = caps[3].to_string();
            if let Some(flags) = caps.get(2) {
                node.flags = flags.as_str().split(FLAG_SEPARATOR).map(Flag::parse).collect();
            }
        }
        None => node.value = value.trim().to_string(),
    }

    node
}

/// Extracts a node and all of its descendants; one output node per input node
pub fn extract(node: &Node) -> DirectiveNode {
    let mut directive = parse_directive(node.value());
    directive.line = node.number();
    directive.children = node.children.iter().map(extract).collect();
    directive
}

/// Extracts every root of the tree in order
pub fn extract_tree(tree: &Tree) -> Vec<DirectiveNode> {
    tree.roots.iter().map(extract).collect()
}
