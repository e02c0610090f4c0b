pub mod num_descendants;
pub mod reconstruct;

use crate::tree::{read_newick, Tree};
use crate::utils::progress_bar_builder::ProgressBarBuilder;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// Reads the tree behind a spinner and logs its shape.
fn load_tree(path: &Path) -> Result<Tree> {
    let progress = ProgressBarBuilder::new(format!("Reading tree {}", path.display()))
        .with_tick()
        .build()?;

    let tree = read_newick(path)
        .with_context(|| format!("Failed to read tree from {}", path.display()))?;

    progress.finish_and_clear();
    info!(
        "Tree {}: {} nodes, {} leaves",
        path.display(),
        tree.num_nodes(),
        tree.num_leaves()
    );
    let duplicates = tree.duplicate_labels();
    if duplicates > 0 {
        warn!(
            "{} labels occur on more than one tree node; reporting the first occurrence of each",
            duplicates
        );
    }
    Ok(tree)
}
