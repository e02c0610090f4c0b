use super::{assign_leaf_states, downward_pass, extract_column, upward_pass, AmbiguityPolicy, FieldStats};
use crate::api::{ProgressCallback, ProgressEvent};
use crate::error::Result;
use crate::metadata::FieldTable;
use crate::tree::{NodeIndex, Tree};
use crate::utils::threading::WorkerPool;
use tracing::debug;

const TASK: &str = "Reconstruction";

pub const DEFAULT_SEPARATOR: &str = ", ";

#[derive(Debug, Clone)]
pub struct ReconstructionOptions {
    pub policy: AmbiguityPolicy,
    /// Joins candidates under [AmbiguityPolicy::Tolerant].
    pub separator: String,
    /// Field workers; fields run one after another when 1.
    pub threads: usize,
}

impl Default for ReconstructionOptions {
    fn default() -> Self {
        Self {
            policy: AmbiguityPolicy::default(),
            separator: DEFAULT_SEPARATOR.to_string(),
            threads: 1,
        }
    }
}

/// Final values of one field for every labeled node.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldColumn {
    pub field: String,
    pub values: Vec<String>,
    pub stats: FieldStats,
}

/// Result table: one row per labeled node, one column per field.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    labels: Vec<String>,
    columns: Vec<FieldColumn>,
}

impl Reconstruction {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Columns in the order the fields were requested.
    pub fn columns(&self) -> &[FieldColumn] {
        &self.columns
    }

    pub fn num_rows(&self) -> usize {
        self.labels.len()
    }

    /// Cells of row `row`: the label followed by one value per field.
    pub fn row(&self, row: usize) -> Vec<&str> {
        std::iter::once(self.labels[row].as_str())
            .chain(self.columns.iter().map(|column| column.values[row].as_str()))
            .collect()
    }
}

/// Runs the full pipeline for field number `field` of `table`.
pub fn reconstruct_field(
    tree: &Tree,
    table: &FieldTable,
    field: usize,
    labeled: &[NodeIndex],
    options: &ReconstructionOptions,
) -> FieldColumn {
    let mut states = assign_leaf_states(tree, table, field);
    upward_pass(tree, &mut states);
    downward_pass(tree, &mut states);
    let (values, stats) = extract_column(&states, labeled, options.policy, &options.separator);

    FieldColumn {
        field: table.fields()[field].clone(),
        values,
        stats,
    }
}

pub struct Reconstructor {
    options: ReconstructionOptions,
    progress_callback: Option<ProgressCallback>,
}

impl Reconstructor {
    pub fn new(options: ReconstructionOptions) -> Self {
        Self {
            options,
            progress_callback: None,
        }
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Reconstructs every field of `table` over `tree`.
    pub fn run(&self, tree: &Tree, table: &FieldTable) -> Result<Reconstruction> {
        let labeled = tree.labeled_nodes();
        let num_fields = table.fields().len();
        let total = num_fields as u64;

        self.emit_progress(ProgressEvent::Started {
            task: TASK.to_string(),
            total,
        });

        let columns = match self.run_fields(tree, table, &labeled) {
            Ok(columns) => columns,
            Err(e) => {
                self.emit_progress(ProgressEvent::Error {
                    task: TASK.to_string(),
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        for column in &columns {
            debug!(
                "Field '{}': {} resolved, {} ambiguous, {} without data",
                column.field, column.stats.resolved, column.stats.ambiguous, column.stats.no_data
            );
        }

        self.emit_progress(ProgressEvent::Completed {
            task: TASK.to_string(),
        });

        let labels = labeled
            .iter()
            .filter_map(|&index| tree[index].label())
            .map(str::to_string)
            .collect();

        Ok(Reconstruction { labels, columns })
    }

    fn run_fields(&self, tree: &Tree, table: &FieldTable, labeled: &[NodeIndex]) -> Result<Vec<FieldColumn>> {
        let num_fields = table.fields().len();
        let total = num_fields as u64;
        let mut done = 0u64;

        if self.options.threads <= 1 || num_fields <= 1 {
            let mut columns = Vec::with_capacity(num_fields);
            for field in 0..num_fields {
                let column = reconstruct_field(tree, table, field, labeled, &self.options);
                done += 1;
                self.report_field(&column, done, total);
                columns.push(column);
            }
            return Ok(columns);
        }

        let pool = WorkerPool::new(self.options.threads);
        debug!("Reconstructing {} fields on {} workers", num_fields, pool.num_threads());
        pool.run(
            num_fields,
            |field| reconstruct_field(tree, table, field, labeled, &self.options),
            |_, column| {
                done += 1;
                self.report_field(column, done, total);
            },
        )
    }

    fn report_field(&self, column: &FieldColumn, current: u64, total: u64) {
        self.emit_progress(ProgressEvent::Message {
            task: TASK.to_string(),
            message: column.field.clone(),
        });
        self.emit_progress(ProgressEvent::Progress {
            task: TASK.to_string(),
            current,
            total,
        });
    }

    fn emit_progress(&self, event: ProgressEvent) {
        if let Some(callback) = &self.progress_callback {
            callback(event);
        }
    }
}
