//! Fitch parsimony reconstruction of discrete metadata fields.
//!
//! Each field goes through the same pipeline on a fresh state array:
//!
//! 1. [`assign_leaf_states`]: leaves get the singleton of their metadata
//!    value, or the empty set when it is unknown.
//! 2. [`upward_pass`]: postorder, each internal node takes the intersection
//!    of its children's sets, or their union when the intersection is empty.
//! 3. [`downward_pass`]: preorder, each node is narrowed by its parent's final
//!    set and nodes left without any state inherit the parent's set.
//! 4. [`extract_column`]: every labeled node's final set becomes one output
//!    cell under the configured [`AmbiguityPolicy`].
//!
//! [`Reconstructor`] runs the pipeline for all requested fields.

pub mod assignment;
pub mod extraction;
pub mod passes;
pub mod reconstructor;

use crate::tree::NodeIndex;
use std::collections::BTreeSet;

pub use assignment::assign_leaf_states;
pub use extraction::{extract_column, resolve_cell, AmbiguityPolicy, FieldStats, Resolution};
pub use passes::{downward_pass, upward_pass};
pub use reconstructor::{
    reconstruct_field, FieldColumn, Reconstruction, ReconstructionOptions, Reconstructor,
};

/// Candidate states of one node for one field. Ordered, so ambiguous
/// candidates always come out sorted.
pub type CharacterSet<'a> = BTreeSet<&'a str>;

/// One [CharacterSet] per tree node, indexed by [NodeIndex].
///
/// Values borrow from the metadata table. A new instance is created for
/// every field, so no state can carry over from one field to the next.
#[derive(Debug, Clone)]
pub struct CharacterStates<'a> {
    sets: Vec<CharacterSet<'a>>,
}

impl<'a> CharacterStates<'a> {
    /// Creates `num_nodes` empty sets.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            sets: vec![CharacterSet::new(); num_nodes],
        }
    }

    pub(crate) fn replace(&mut self, index: NodeIndex, set: CharacterSet<'a>) {
        self.sets[index] = set;
    }

    pub(crate) fn insert(&mut self, index: NodeIndex, state: &'a str) {
        self.sets[index].insert(state);
    }
}

impl<'a> std::ops::Index<NodeIndex> for CharacterStates<'a> {
    type Output = CharacterSet<'a>;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.sets[index]
    }
}
