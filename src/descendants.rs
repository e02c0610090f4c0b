//! Subtree sizes for every node.

use crate::tree::Tree;

/// Number of nodes below each node, indexed by node index.
///
/// A leaf has 0; an internal node has its number of children plus the
/// counts of those children.
pub fn count_descendants(tree: &Tree) -> Vec<usize> {
    let mut counts = vec![0; tree.num_nodes()];
    for node in tree.postorder() {
        counts[node.index()] = node
            .children()
            .iter()
            .map(|&child| 1 + counts[child])
            .sum();
    }
    counts
}

/// One output row of the descendant table.
#[derive(Debug, Clone, PartialEq)]
pub struct DescendantRow {
    pub label: String,
    pub num_descendants: usize,
    pub edge_length: Option<f64>,
}

impl DescendantRow {
    /// Cells as written: the edge length uses the shortest round-trip
    /// float form and is empty when absent.
    pub fn cells(&self) -> [String; 3] {
        [
            self.label.clone(),
            self.num_descendants.to_string(),
            self.edge_length
                .map(|length| format!("{:?}", length))
                .unwrap_or_default(),
        ]
    }
}

/// Rows for the labeled nodes, in preorder.
pub fn descendant_rows(tree: &Tree) -> Vec<DescendantRow> {
    let counts = count_descendants(tree);
    tree.labeled_nodes()
        .into_iter()
        .filter_map(|index| {
            let node = &tree[index];
            node.label().map(|label| DescendantRow {
                label: label.to_string(),
                num_descendants: counts[index],
                edge_length: node.edge_length(),
            })
        })
        .collect()
}
