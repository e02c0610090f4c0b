use super::{CharacterSet, CharacterStates};
use crate::tree::{NodeIndex, Tree};

/// First Fitch pass, children before parents.
///
/// Every internal node takes the intersection of its children's sets when it
/// is non-empty and their union otherwise. An unknown (empty) child empties
/// the intersection, pushing the node into the union of the other children.
pub fn upward_pass(tree: &Tree, states: &mut CharacterStates<'_>) {
    for node in tree.postorder().filter(|node| !node.is_leaf()) {
        let combined = combine_children(states, node.children());
        states.replace(node.index(), combined);
    }
}

fn combine_children<'a>(states: &CharacterStates<'a>, children: &[NodeIndex]) -> CharacterSet<'a> {
    let Some((&first, rest)) = children.split_first() else {
        return CharacterSet::new();
    };

    let mut intersection = states[first].clone();
    let mut union = states[first].clone();
    for &child in rest {
        let child_set = &states[child];
        intersection.retain(|state| child_set.contains(state));
        union.extend(child_set.iter().copied());
    }

    if intersection.is_empty() {
        union
    } else {
        intersection
    }
}

/// Second Fitch pass, parents before children.
///
/// A non-root node keeps its intersection with the parent's final set when
/// that is non-empty. A node that still has no state afterwards inherits the
/// parent's set, so leaves without metadata receive the ancestral value.
pub fn downward_pass(tree: &Tree, states: &mut CharacterStates<'_>) {
    for node in tree.preorder() {
        let Some(parent) = node.parent() else {
            continue;
        };
        let index = node.index();

        let refined: CharacterSet = states[index]
            .intersection(&states[parent])
            .copied()
            .collect();
        if !refined.is_empty() {
            states.replace(index, refined);
        } else if states[index].is_empty() {
            let inherited = states[parent].clone();
            states.replace(index, inherited);
        }
    }
}
