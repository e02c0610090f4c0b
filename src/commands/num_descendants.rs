use super::load_tree;
use crate::config::Config;
use crate::descendants::descendant_rows;
use crate::export::write_descendants;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

pub fn run(tree_file: &Path, output_file: &Path, config_file: Option<&Path>) -> Result<()> {
    let config = Config::load(config_file).context("Failed to load configuration")?;
    let tree = load_tree(tree_file)?;

    let rows = descendant_rows(&tree);
    write_descendants(output_file, &config.label_column, &rows)
        .with_context(|| format!("Failed to write {}", output_file.display()))?;

    info!("Wrote descendant counts for {} nodes to {}", rows.len(), output_file.display());
    Ok(())
}
