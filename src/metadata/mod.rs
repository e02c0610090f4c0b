//! Delimited metadata table keyed by an ID column.
//!
//! The header is validated against the requested ID column and fields before
//! any row is read, so configuration mistakes surface before the tree is
//! touched. Only the requested fields are kept in memory.

use crate::tree::Tree;
use crate::utils::compression::open_reader;
use crate::utils::delimited::{delimiter_for_path, split_record, SplitError};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

const UTF8_BOM: char = '\u{feff}';

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open metadata stream: {0}")]
    Compression(#[from] niffler::Error),

    #[error("Metadata table is empty (no header line)")]
    MissingHeader,

    #[error("ID column '{0}' not found in metadata header")]
    MissingIdColumn(String),

    #[error("Field '{0}' not found in metadata header")]
    MissingField(String),

    #[error("No fields to reconstruct")]
    NoFields,

    #[error("Line {line}: {found} cells but the header has {expected} columns")]
    TooManyCells {
        line: usize,
        found: usize,
        expected: usize,
    },

    #[error("Line {0}: unclosed quoted cell")]
    UnclosedQuote(usize),
}

/// Which columns of the metadata table to use.
#[derive(Debug, Clone, Default)]
pub struct FieldSelection {
    /// ID column matched against tree labels; the first column when `None`.
    pub id_field: Option<String>,
    /// Fields to reconstruct; every column except the ID column when `None`.
    pub fields: Option<Vec<String>>,
}

impl FieldSelection {
    /// Parses a comma-separated field list as given on the command line.
    pub fn parse_field_list(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Metadata records keyed by ID, holding the values of the selected fields.
#[derive(Debug, Clone)]
pub struct FieldTable {
    id_field: String,
    fields: Vec<String>,
    records: HashMap<String, Vec<String>>,
    duplicates: usize,
}

impl FieldTable {
    /// Reads a (possibly compressed) table, choosing the separator from the
    /// file name.
    pub fn from_path(path: &Path, selection: &FieldSelection) -> Result<Self, MetadataError> {
        let reader = open_reader(path)?;
        Self::from_reader(reader, delimiter_for_path(path), selection)
    }

    pub fn from_reader<R: BufRead>(
        reader: R,
        delimiter: u8,
        selection: &FieldSelection,
    ) -> Result<Self, MetadataError> {
        let mut lines = reader.lines().enumerate();

        let header = match next_record(&mut lines, delimiter)? {
            Some((_, cells)) => cells,
            None => return Err(MetadataError::MissingHeader),
        };

        let (id_field, id_column) = resolve_id_column(&header, selection)?;
        let (fields, field_columns) = resolve_fields(&header, &id_field, selection)?;

        let mut records: HashMap<String, Vec<String>> = HashMap::new();
        let mut duplicates = 0;
        while let Some((line_number, mut cells)) = next_record(&mut lines, delimiter)? {
            if cells.len() > header.len() {
                return Err(MetadataError::TooManyCells {
                    line: line_number,
                    found: cells.len(),
                    expected: header.len(),
                });
            }
            cells.resize(header.len(), String::new());

            // The ID column may also be requested as a field
            let id = &cells[id_column];
            if id.is_empty() {
                continue;
            }
            if records.contains_key(id) {
                duplicates += 1;
                continue;
            }
            let values = field_columns
                .iter()
                .map(|&column| cells[column].clone())
                .collect();
            records.insert(id.clone(), values);
        }

        if duplicates > 0 {
            warn!(
                "{} duplicate IDs in column '{}'; keeping the first row of each",
                duplicates, id_field
            );
        }

        Ok(Self {
            id_field,
            fields,
            records,
            duplicates,
        })
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of distinct IDs.
    pub fn num_records(&self) -> usize {
        self.records.len()
    }

    /// Rows dropped because their ID had already been seen.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Value of field number `field` for `id`. Empty cells count as missing.
    pub fn value(&self, id: &str, field: usize) -> Option<&str> {
        self.records
            .get(id)
            .and_then(|values| values.get(field))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Number of IDs that do not occur as a label anywhere in `tree`.
    pub fn count_unmatched(&self, tree: &Tree) -> usize {
        let labels: std::collections::HashSet<&str> =
            tree.preorder().filter_map(|node| node.label()).collect();
        self.records
            .keys()
            .filter(|id| !labels.contains(id.as_str()))
            .count()
    }
}

/// Reads the next non-blank record and the line it starts on. Physical lines
/// are joined while a quoted cell is still open.
fn next_record<I>(lines: &mut I, delimiter: u8) -> Result<Option<(usize, Vec<String>)>, MetadataError>
where
    I: Iterator<Item = (usize, std::io::Result<String>)>,
{
    let mut pending: Option<(usize, String)> = None;
    for (number, line) in lines.by_ref() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        let line = if number == 0 {
            line.trim_start_matches(UTF8_BOM)
        } else {
            line
        };

        let (start, text) = match pending.take() {
            Some((start, mut text)) => {
                text.push('\n');
                text.push_str(line);
                (start, text)
            }
            None if line.is_empty() => continue,
            None => (number + 1, line.to_string()),
        };
        match split_record(&text, delimiter) {
            Ok(cells) => return Ok(Some((start, cells))),
            Err(SplitError::UnclosedQuote) => pending = Some((start, text)),
        }
    }

    match pending {
        Some((start, _)) => Err(MetadataError::UnclosedQuote(start)),
        None => Ok(None),
    }
}

fn resolve_id_column(
    header: &[String],
    selection: &FieldSelection,
) -> Result<(String, usize), MetadataError> {
    match &selection.id_field {
        Some(name) => header
            .iter()
            .position(|column| column == name)
            .map(|column| (name.clone(), column))
            .ok_or_else(|| MetadataError::MissingIdColumn(name.clone())),
        None => Ok((header[0].clone(), 0)),
    }
}

fn resolve_fields(
    header: &[String],
    id_field: &str,
    selection: &FieldSelection,
) -> Result<(Vec<String>, Vec<usize>), MetadataError> {
    let requested: Vec<String> = match &selection.fields {
        Some(fields) => {
            let mut unique: Vec<String> = Vec::with_capacity(fields.len());
            for field in fields.iter().map(|f| f.trim()).filter(|f| !f.is_empty()) {
                if unique.iter().any(|seen| seen == field) {
                    warn!("Field '{}' requested more than once; using it once", field);
                } else {
                    unique.push(field.to_string());
                }
            }
            unique
        }
        None => header
            .iter()
            .filter(|column| column.as_str() != id_field)
            .cloned()
            .collect(),
    };

    if requested.is_empty() {
        return Err(MetadataError::NoFields);
    }

    let columns = requested
        .iter()
        .map(|field| {
            header
                .iter()
                .position(|column| column == field)
                .ok_or_else(|| MetadataError::MissingField(field.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((requested, columns))
}
