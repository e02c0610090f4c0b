use std::path::Path;

pub(crate) const TAB: u8 = b'\t';
pub(crate) const COMMA: u8 = b',';

/// Picks the table separator from a file name: tab for `.tsv`, `.txt` and
/// `.tsv.gz`, comma for everything else.
pub fn delimiter_for_path(path: &Path) -> u8 {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if name.ends_with(".tsv") || name.ends_with(".txt") || name.ends_with(".tsv.gz") {
        TAB
    } else {
        COMMA
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    UnclosedQuote,
}

/// Splits one line into cells. Cells may be wrapped in double quotes, with
/// `""` standing for a literal quote inside a quoted cell.
pub fn split_record(line: &str, delimiter: u8) -> Result<Vec<String>, SplitError> {
    let delimiter = char::from(delimiter);
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;
    let mut at_cell_start = true;

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    cell.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                cell.push(c);
            }
            continue;
        }

        if c == delimiter {
            cells.push(std::mem::take(&mut cell));
            at_cell_start = true;
            continue;
        }
        if c == '"' && at_cell_start {
            in_quotes = true;
        } else {
            cell.push(c);
        }
        at_cell_start = false;
    }

    if in_quotes {
        return Err(SplitError::UnclosedQuote);
    }
    cells.push(cell);
    Ok(cells)
}

/// Quotes a cell when it contains the delimiter, a quote or a line break.
pub fn quote_cell(cell: &str, delimiter: u8) -> std::borrow::Cow<'_, str> {
    let delimiter = char::from(delimiter);
    if cell.contains(|c: char| c == delimiter || c == '"' || c == '\n' || c == '\r') {
        std::borrow::Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
    } else {
        std::borrow::Cow::Borrowed(cell)
    }
}
