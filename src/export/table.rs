use crate::descendants::DescendantRow;
use crate::error::Result;
use crate::fitch::Reconstruction;
use crate::utils::compression::{create_writer, OutputWriter};
use crate::utils::delimited::{delimiter_for_path, quote_cell, TAB};
use std::io::Write;
use std::path::Path;

pub const NUM_DESCENDANTS_COLUMN: &str = "num_descendants";
pub const EDGE_LENGTH_COLUMN: &str = "edge_length";

/// Delimited table output, gzip-compressed when the path ends in `.gz`.
pub struct TableWriter {
    writer: OutputWriter,
    delimiter: u8,
    rows: usize,
}

impl TableWriter {
    pub fn create(path: &Path, delimiter: u8) -> Result<Self> {
        Ok(Self {
            writer: create_writer(path)?,
            delimiter,
            rows: 0,
        })
    }

    pub fn write_row<S: AsRef<str>>(&mut self, cells: &[S]) -> Result<()> {
        for (idx, cell) in cells.iter().enumerate() {
            if idx > 0 {
                self.writer.write_all(&[self.delimiter])?;
            }
            self.writer
                .write_all(quote_cell(cell.as_ref(), self.delimiter).as_bytes())?;
        }
        self.writer.write_all(b"\n")?;
        self.rows += 1;
        Ok(())
    }

    /// Completes the output and returns the number of rows written.
    pub fn finish(self) -> Result<usize> {
        self.writer.finish()?;
        Ok(self.rows)
    }
}

/// Writes the reconstruction table; the separator follows the file name.
pub fn write_reconstruction(path: &Path, label_column: &str, reconstruction: &Reconstruction) -> Result<usize> {
    let mut writer = TableWriter::create(path, delimiter_for_path(path))?;

    let header: Vec<&str> = std::iter::once(label_column)
        .chain(reconstruction.columns().iter().map(|column| column.field.as_str()))
        .collect();
    writer.write_row(&header)?;

    for row in 0..reconstruction.num_rows() {
        writer.write_row(&reconstruction.row(row))?;
    }
    writer.finish()
}

/// Writes the descendant table, always tab-separated.
pub fn write_descendants(path: &Path, label_column: &str, rows: &[DescendantRow]) -> Result<usize> {
    let mut writer = TableWriter::create(path, TAB)?;
    writer.write_row(&[label_column, NUM_DESCENDANTS_COLUMN, EDGE_LENGTH_COLUMN])?;
    for row in rows {
        writer.write_row(&row.cells())?;
    }
    writer.finish()
}
