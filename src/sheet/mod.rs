//! Workbook access: opening an uploaded `.xlsx` image and extracting its
//! first sheet as rows of cell strings, plus header detection and per-row
//! parsing.
//!
//! Spreadsheet binary decoding is delegated to `calamine`; this module only
//! normalizes its output into the pipeline's row-matrix shape.

pub mod header;
pub mod row;

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

use crate::error::{IngestError, IngestResult};

pub use header::{detect, HeaderLayout};
pub use row::parse_row;

/// Open a workbook from its raw bytes and return the rows of its first sheet
/// (in the workbook's declared sheet order) as cell strings.
///
/// Errors:
/// - [`IngestError::Open`] if the bytes are not a well-formed `.xlsx` workbook
/// - [`IngestError::NoSheets`] if the workbook declares zero sheets
/// - [`IngestError::SheetRead`] if row extraction fails for the first sheet
pub fn read_first_sheet(bytes: &[u8]) -> IngestResult<Vec<Vec<String>>> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor)?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(IngestError::NoSheets)?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|source| IngestError::SheetRead {
            sheet: sheet.clone(),
            source,
        })?;

    Ok(range.rows().map(row_to_cells).collect())
}

/// Convert one calamine row into cell strings.
///
/// calamine pads every row of a range to the rectangle width, so trailing
/// empty cells are dropped here; header detection keys on a row's actual
/// column count (a single-cell title row must stay single-cell).
fn row_to_cells(row: &[Data]) -> Vec<String> {
    let mut cells: Vec<String> = row.iter().map(cell_to_string).collect();
    while cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}

fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(f) => f.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::row_to_cells;
    use calamine::Data;

    #[test]
    fn trailing_empty_cells_are_dropped() {
        let row = vec![
            Data::String("Title".to_string()),
            Data::Empty,
            Data::String(String::new()),
        ];
        assert_eq!(row_to_cells(&row), vec!["Title".to_string()]);
    }

    #[test]
    fn interior_empty_cells_are_kept() {
        let row = vec![
            Data::String("a".to_string()),
            Data::Empty,
            Data::Int(3),
        ];
        assert_eq!(
            row_to_cells(&row),
            vec!["a".to_string(), String::new(), "3".to_string()]
        );
    }
}
