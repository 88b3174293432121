use super::{Node, Tree};

/// Drops every subtree that carries no comment or exposed line.
///
/// A node survives when it is a comment or exposed itself, or when at least
/// one of its children survives. Survivors keep their relative order.
pub fn prune(tree: Tree) -> Tree {
    Tree {
        roots: tree.roots.into_iter().filter_map(prune_node).collect(),
    }
}

fn prune_node(node: Node) -> Option<Node> {
    let Node {
        line,
        parent_line,
        children,
    } = node;

    let children: Vec<Node> = children.into_iter().filter_map(prune_node).collect();

    if line.is_comment_or_exposed() || !children.is_empty() {
        Some(Node {
            line,
            parent_line,
            children,
        })
    } else {
        None
    }
}
