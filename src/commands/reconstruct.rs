use super::load_tree;
use crate::api::{ProgressCallback, ProgressEvent};
use crate::config::Config;
use crate::export::{write_reconstruction, RunSummary, SummaryInputs};
use crate::fitch::Reconstructor;
use crate::metadata::{FieldSelection, FieldTable};
use crate::utils::progress_bar_builder::{ProgressBarBuilder, FIELD_BAR_TEMPLATE};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Inputs of the `reconstruct` command.
#[derive(Debug, Clone, Default)]
pub struct ReconstructArgs {
    pub tree: PathBuf,
    pub metadata: PathBuf,
    pub output: PathBuf,
    /// Comma-separated field list.
    pub fields: Option<String>,
    pub id_field: Option<String>,
    pub tolerate_ambiguity: bool,
    pub threads: Option<usize>,
    pub summary: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub fn run(args: ReconstructArgs) -> Result<()> {
    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    let selection = FieldSelection {
        id_field: args.id_field.clone(),
        fields: args.fields.as_deref().map(FieldSelection::parse_field_list),
    };

    // Metadata first: a missing column should fail before the tree is parsed
    let progress = ProgressBarBuilder::new(format!("Reading metadata {}", args.metadata.display()))
        .with_tick()
        .build()?;
    let table = FieldTable::from_path(&args.metadata, &selection)
        .with_context(|| format!("Failed to read metadata from {}", args.metadata.display()))?;
    progress.finish_and_clear();
    info!(
        "Metadata {}: {} records, ID column '{}', fields: {}",
        args.metadata.display(),
        table.num_records(),
        table.id_field(),
        table.fields().join(", ")
    );

    let tree = load_tree(&args.tree)?;
    let unmatched = table.count_unmatched(&tree);
    if unmatched > 0 {
        info!("{} metadata IDs do not match any tree label", unmatched);
    }

    let options = config.reconstruction_options(args.tolerate_ambiguity, args.threads);
    let policy = options.policy;
    let progress = ProgressBarBuilder::new("")
        .with_template(FIELD_BAR_TEMPLATE)
        .with_length(table.fields().len() as u64)
        .with_tick()
        .build()?;
    let bar = progress.clone();
    let callback: ProgressCallback = Arc::new(move |event: ProgressEvent| match event {
        ProgressEvent::Progress { current, .. } => bar.set_position(current),
        ProgressEvent::Message { message, .. } => bar.set_message(message),
        _ => {}
    });

    let reconstruction = Reconstructor::new(options)
        .with_progress(callback)
        .run(&tree, &table)
        .context("Reconstruction failed")?;
    progress.finish_and_clear();

    let rows = write_reconstruction(&args.output, &config.label_column, &reconstruction)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!(
        "Wrote {} rows x {} fields to {}",
        rows.saturating_sub(1),
        reconstruction.columns().len(),
        args.output.display()
    );

    if let Some(summary_path) = &args.summary {
        let inputs = SummaryInputs {
            tree: args.tree.clone(),
            metadata: args.metadata.clone(),
            output: args.output.clone(),
        };
        RunSummary::new(inputs, policy, &tree, &table, &reconstruction)
            .write(summary_path)
            .with_context(|| format!("Failed to write summary {}", summary_path.display()))?;
        info!("Run summary written to {}", summary_path.display());
    }

    Ok(())
}
