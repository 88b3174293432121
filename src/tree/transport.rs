//! JSON document exchanged with plugin executables.
//!
//! ```json
//! {
//!   "source": "src/lib.rs",
//!   "children": [
//!     {
//!       "lineNumber": 1,
//!       "lineComment": true,
//!       "indent": 0,
//!       "value": ".route GET /users",
//!       "children": [
//!         { "lineNumber": 2, "exposed": true, "indent": 4, "value": "fn users()", "parentLineNumber": 1 }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Parent links are written as line numbers only. When a document is read
//! back, they are recomputed from the nesting and the incoming values ignored.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ClassifiedLine, Node, Tree};
use crate::error::Result;

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportNode {
    pub line_number: usize,
    #[serde(default, skip_serializing_if = "is_false")]
    pub block_start: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub block_line: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub block_end: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub line_comment: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub exposed: bool,
    #[serde(default)]
    pub indent: usize,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TransportNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_line_number: Option<usize>,
}

impl TransportNode {
    fn from_node(node: &Node) -> Self {
        let line = &node.line;
        Self {
            line_number: line.number,
            block_start: line.block_start,
            block_line: line.block_line,
            block_end: line.block_end,
            line_comment: line.line_comment,
            exposed: line.exposed,
            indent: line.indent,
            value: line.value.clone(),
            children: node.children.iter().map(Self::from_node).collect(),
            parent_line_number: node.parent_line,
        }
    }

    fn into_node(self, parent_line: Option<usize>) -> Node {
        let number = self.line_number;
        Node {
            line: ClassifiedLine {
                number,
                indent: self.indent,
                block_start: self.block_start,
                block_line: self.block_line,
                block_end: self.block_end,
                line_comment: self.line_comment,
                exposed: self.exposed,
                value: self.value,
            },
            parent_line,
            children: self
                .children
                .into_iter()
                .map(|child| child.into_node(Some(number)))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportDocument {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub children: Vec<TransportNode>,
}

impl TransportDocument {
    pub fn from_tree(tree: &Tree, source: &str) -> Self {
        Self {
            source: source.to_string(),
            children: tree.roots.iter().map(TransportNode::from_node).collect(),
        }
    }

    pub fn into_tree(self) -> Tree {
        Tree {
            roots: self
                .children
                .into_iter()
                .map(|node| node.into_node(None))
                .collect(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_vec(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Reads a document back. Nesting depth follows source indentation, so
    /// the parser's recursion limit is lifted.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let mut deserializer = serde_json::Deserializer::from_slice(&data);
        deserializer.disable_recursion_limit();
        let document = Self::deserialize(&mut deserializer)?;
        deserializer.end()?;
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommentSyntax, Configuration};
    use crate::tree::{parse, prune};
    use tempfile::TempDir;

    fn sample_tree() -> Tree {
        let config = Configuration::new(CommentSyntax::c_style()).with_expose(true);
        prune(parse("// .route GET /users >\n    fn users()\n// end", &config))
    }

    #[test]
    fn test_serialized_shape() {
        let doc = TransportDocument::from_tree(&sample_tree(), "src/lib.rs");
        let json: serde_json::Value = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["source"], "src/lib.rs");
        let first = &json["children"][0];
        assert_eq!(first["lineNumber"], 1);
        assert_eq!(first["lineComment"], true);
        assert_eq!(first["exposed"], true);
        assert_eq!(first["value"], ".route GET /users");
        assert!(first.get("blockStart").is_none());
        assert!(first.get("parentLineNumber").is_none());

        let child = &first["children"][0];
        assert_eq!(child["parentLineNumber"], 1);
        assert_eq!(child["indent"], 4);
        assert!(child.get("lineComment").is_none());
    }

    #[test]
    fn test_read_recomputes_parent_links() {
        let json = r#"{
            "children": [
                {"lineNumber": 3, "lineComment": true, "value": "a", "parentLineNumber": 99,
                 "children": [{"lineNumber": 4, "exposed": true, "value": "b", "parentLineNumber": 42}]}
            ]
        }"#;
        let doc: TransportDocument = serde_json::from_str(json).unwrap();
        let tree = doc.into_tree();

        assert_eq!(tree.roots[0].parent_line, None);
        assert_eq!(tree.roots[0].children[0].parent_line, Some(3));
        assert!(tree.roots[0].children[0].line.exposed);
        assert_eq!(tree.roots[0].children[0].line.indent, 0);
    }

    #[test]
    fn test_write_then_read_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tree.json");
        let tree = sample_tree();

        TransportDocument::from_tree(&tree, "x").write(&path).unwrap();
        let loaded = TransportDocument::read(&path).unwrap();

        assert_eq!(loaded.source, "x");
        assert_eq!(loaded.into_tree(), tree);
    }

    #[test]
    fn test_read_deeply_nested_document() {
        let text: String = (0..200).map(|i| format!("{}// level {}\n", " ".repeat(i), i)).collect();
        let tree = parse(&text, &Configuration::new(CommentSyntax::c_style()));
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("deep.json");

        TransportDocument::from_tree(&tree, "deep.rs").write(&path).unwrap();
        let loaded = TransportDocument::read(&path).unwrap().into_tree();

        assert_eq!(loaded.len(), 200);
        assert_eq!(loaded, tree);
    }

    #[test]
    fn test_read_rejects_trailing_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tree.json");
        std::fs::write(&path, r#"{"children": []} extra"#).unwrap();

        assert!(TransportDocument::read(&path).is_err());
    }

    #[test]
    fn test_read_rejects_malformed_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tree.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(TransportDocument::read(&path).is_err());
    }
}
