use std::cmp::Ordering;

use super::{ClassifiedLine, Node, Tree};

/// Arena slot used while the tree is under construction
struct Slot {
    line: ClassifiedLine,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Builds a [`Tree`] from classified lines using indentation alone.
///
/// Nodes live in a flat arena with index links in both directions while
/// lines are inserted; [`TreeBuilder::finish`] turns the arena into an
/// owned top-down tree whose nodes know their parent only by line number.
#[derive(Default)]
pub struct TreeBuilder {
    slots: Vec<Slot>,
    roots: Vec<usize>,
    cursor: Option<usize>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classification of the most recently inserted line
    pub fn last(&self) -> Option<&ClassifiedLine> {
        self.cursor.map(|id| &self.slots[id].line)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Inserts a line relative to the previously inserted one.
    ///
    /// - same indent: sibling of the previous line
    /// - deeper indent: child of the previous line
    /// - shallower indent: sibling of the closest ancestor with the same
    ///   indent; without one, child of the closest ancestor with a smaller
    ///   indent, or a new root when no ancestor qualifies
    pub fn insert(&mut self, line_number: usize, mut line: ClassifiedLine) -> &mut Self {
        line.number = line_number;

        let parent = self
            .cursor
            .and_then(|cursor| self.parent_for(cursor, line.indent, line_number));

        let id = self.slots.len();
        self.slots.push(Slot {
            line,
            parent,
            children: Vec::new(),
        });

        match parent {
            Some(parent) => self.slots[parent].children.push(id),
            None => self.roots.push(id),
        }
        self.cursor = Some(id);

        self
    }

    fn parent_for(&self, cursor: usize, indent: usize, line_number: usize) -> Option<usize> {
        let current = &self.slots[cursor];

        match indent.cmp(&current.line.indent) {
            Ordering::Equal => current.parent,
            Ordering::Greater => Some(cursor),
            Ordering::Less => {
                let mut ancestor = current.parent;
                while let Some(id) = ancestor {
                    let slot = &self.slots[id];
                    match indent.cmp(&slot.line.indent) {
                        Ordering::Equal => return slot.parent,
                        Ordering::Greater => {
                            tracing::debug!(
                                "line {} dedents to indent {} with no matching ancestor, attaching under line {}",
                                line_number,
                                indent,
                                slot.line.number
                            );
                            return Some(id);
                        }
                        Ordering::Less => ancestor = slot.parent,
                    }
                }
                None
            }
        }
    }

    /// Consumes the arena and returns the owned tree
    pub fn finish(mut self) -> Tree {
        let roots = std::mem::take(&mut self.roots);
        Tree {
            roots: roots
                .into_iter()
                .map(|id| self.take_node(id, None))
                .collect(),
        }
    }

    fn take_node(&mut self, id: usize, parent_line: Option<usize>) -> Node {
        let line = std::mem::take(&mut self.slots[id].line);
        let children = std::mem::take(&mut self.slots[id].children);
        let number = line.number;

        Node {
            line,
            parent_line,
            children: children
                .into_iter()
                .map(|child| self.take_node(child, Some(number)))
                .collect(),
        }
    }
}
