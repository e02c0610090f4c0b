use super::{deserialize_datetime, serialize_datetime};
use crate::error::Result;
use crate::fitch::{AmbiguityPolicy, FieldStats, Reconstruction};
use crate::metadata::FieldTable;
use crate::tree::Tree;
use crate::utils::compression::create_writer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const SUMMARY_VERSION: &str = "1.0";

/// JSON record of one `reconstruct` run.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub version: String,
    #[serde(serialize_with = "serialize_datetime", deserialize_with = "deserialize_datetime")]
    pub created_at: DateTime<Utc>,
    pub tool_version: String,
    pub inputs: SummaryInputs,
    pub id_field: String,
    pub ambiguity_policy: AmbiguityPolicy,
    pub tree: TreeSummary,
    pub metadata: MetadataSummary,
    pub fields: Vec<FieldSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryInputs {
    pub tree: PathBuf,
    pub metadata: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TreeSummary {
    pub nodes: usize,
    pub leaves: usize,
    pub labeled_nodes: usize,
    pub duplicate_labels: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetadataSummary {
    pub records: usize,
    pub duplicates: usize,
    /// IDs that occur nowhere in the tree.
    pub unmatched: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FieldSummary {
    pub field: String,
    #[serde(flatten)]
    pub stats: FieldStats,
}

impl RunSummary {
    pub fn new(
        inputs: SummaryInputs,
        policy: AmbiguityPolicy,
        tree: &Tree,
        table: &FieldTable,
        reconstruction: &Reconstruction,
    ) -> Self {
        RunSummary {
            version: SUMMARY_VERSION.to_string(),
            created_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            inputs,
            id_field: table.id_field().to_string(),
            ambiguity_policy: policy,
            tree: TreeSummary {
                nodes: tree.num_nodes(),
                leaves: tree.num_leaves(),
                labeled_nodes: reconstruction.num_rows(),
                duplicate_labels: tree.duplicate_labels(),
            },
            metadata: MetadataSummary {
                records: table.num_records(),
                duplicates: table.duplicates(),
                unmatched: table.count_unmatched(tree),
            },
            fields: reconstruction
                .columns()
                .iter()
                .map(|column| FieldSummary {
                    field: column.field.clone(),
                    stats: column.stats.clone(),
                })
                .collect(),
        }
    }

    /// Writes pretty-printed JSON, gzip-compressed for `.gz` paths.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut writer = create_writer(path)?;
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.finish()?;
        Ok(())
    }
}
