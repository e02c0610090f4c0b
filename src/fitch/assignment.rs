use super::CharacterStates;
use crate::metadata::FieldTable;
use crate::tree::Tree;

/// Allocates a fresh state array for `field` and seeds the leaves.
///
/// A leaf gets the singleton of its metadata value; a leaf without a label,
/// without a metadata record or with an empty cell stays empty (unknown).
/// Internal nodes are left empty for [`upward_pass`](super::upward_pass).
pub fn assign_leaf_states<'a>(tree: &Tree, table: &'a FieldTable, field: usize) -> CharacterStates<'a> {
    let mut states = CharacterStates::new(tree.num_nodes());
    for node in tree.preorder().filter(|node| node.is_leaf()) {
        if let Some(value) = node.label().and_then(|label| table.value(label, field)) {
            states.insert(node.index(), value);
        }
    }
    states
}
