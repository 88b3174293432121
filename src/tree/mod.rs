//! Line tree
//!
//! Source lines are classified one at a time, then placed into a rose tree
//! by indentation. Every input line produces exactly one node, so a
//! pre-order walk of a freshly built tree visits lines 1..N in order.

pub mod builder;
pub mod classifier;
pub mod line;
pub mod sanitize;
pub mod transport;

pub use builder::TreeBuilder;
pub use classifier::{indent_of, LineClassifier};
pub use line::ClassifiedLine;
pub use sanitize::prune;
pub use transport::{TransportDocument, TransportNode};

use crate::config::Configuration;

/// A line together with the lines nested under it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    pub line: ClassifiedLine,
    /// Line number of the parent node, `None` for roots
    pub parent_line: Option<usize>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn number(&self) -> usize {
        self.line.number
    }

    pub fn value(&self) -> &str {
        &self.line.value
    }
}

/// Ordered forest of line nodes for one input file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    pub roots: Vec<Node>,
}

impl Tree {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Pre-order, depth-first traversal
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            stack: self.roots.iter().rev().collect(),
        }
    }

    /// Line numbers in pre-order
    pub fn line_numbers(&self) -> Vec<usize> {
        self.iter().map(Node::number).collect()
    }

    /// Visits every node mutably in pre-order
    pub fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Node),
    {
        fn visit<F: FnMut(&mut Node)>(node: &mut Node, f: &mut F) {
            f(node);
            for child in &mut node.children {
                visit(child, f);
            }
        }

        for root in &mut self.roots {
            visit(root, &mut f);
        }
    }
}

pub struct PreOrder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Classifies every line of `text` and builds the unpruned tree
pub fn parse(text: &str, config: &Configuration) -> Tree {
    let classifier = LineClassifier::new(config);
    let mut builder = TreeBuilder::new();

    for (i, raw) in text.lines().enumerate() {
        let line = classifier.classify(builder.last(), raw);
        builder.insert(i + 1, line);
    }

    builder.finish()
}
