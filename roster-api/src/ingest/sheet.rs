//! Spreadsheet reading.
//!
//! Only the first sheet is read. Cells are rendered as text and each row
//! loses its trailing empty cells, so a row whose last columns are blank
//! comes back short and fails the arity check.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader};
use roster_core::{IngestError, RosterResult};

/// Rows of the first sheet, as text, positioned from cell A1.
pub type SheetRows = Vec<Vec<String>>;

/// Read the first sheet of `path` on the blocking pool.
pub async fn read_first_sheet(path: PathBuf) -> RosterResult<SheetRows> {
    tokio::task::spawn_blocking(move || read_first_sheet_blocking(&path))
        .await
        .map_err(|e| IngestError::TaskFailed {
            reason: format!("sheet reader panicked: {}", e),
        })?
}

/// Synchronous variant of [`read_first_sheet`].
pub fn read_first_sheet_blocking(path: &Path) -> RosterResult<SheetRows> {
    let mut workbook = open_workbook_auto(path).map_err(|e| IngestError::Open {
        reason: e.to_string(),
    })?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(IngestError::NoSheets)?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| IngestError::ReadRows {
            sheet: sheet.clone(),
            reason: e.to_string(),
        })?;

    Ok(range_to_rows(&range))
}

/// Render a calamine range as text rows anchored at A1.
///
/// calamine trims leading empty rows and columns off a range, so they are
/// put back here to keep column positions stable.
pub fn range_to_rows(range: &Range<Data>) -> SheetRows {
    let (first_row, first_col) = match range.start() {
        Some(start) => start,
        None => return Vec::new(),
    };

    let mut rows: SheetRows = (0..first_row).map(|_| Vec::new()).collect();
    for row in range.rows() {
        let mut cells: Vec<String> = std::iter::repeat(String::new())
            .take(first_col as usize)
            .chain(row.iter().map(|cell| cell.to_string()))
            .collect();
        trim_trailing_empty(&mut cells);
        rows.push(cells);
    }
    rows
}

fn trim_trailing_empty(cells: &mut Vec<String>) {
    while cells.last().is_some_and(|cell| cell.is_empty()) {
        cells.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: (u32, u32), rows: &[&[&str]]) -> Range<Data> {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(1).max(1) as u32;
        let end = (start.0 + rows.len() as u32 - 1, start.1 + width - 1);
        let mut range = Range::new(start, end);
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let cell = if value.is_empty() {
                    Data::Empty
                } else {
                    Data::String(value.to_string())
                };
                range.set_value((start.0 + r as u32, start.1 + c as u32), cell);
            }
        }
        range
    }

    #[test]
    fn test_trailing_empty_cells_are_dropped() {
        let rows = range_to_rows(&range((0, 0), &[&["a", "b", "", ""], &["c", "", "d", ""]]));
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "", "d"]]);
    }

    #[test]
    fn test_leading_offset_is_restored() {
        let rows = range_to_rows(&range((1, 2), &[&["x", "y"]]));
        assert_eq!(rows, vec![vec![], vec!["", "", "x", "y"]]);
    }

    #[test]
    fn test_numbers_render_without_fraction() {
        let mut range = Range::new((0, 0), (0, 1));
        range.set_value((0, 0), Data::Float(75001.0));
        range.set_value((0, 1), Data::Int(42));
        assert_eq!(range_to_rows(&range), vec![vec!["75001", "42"]]);
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let err = read_first_sheet_blocking(Path::new("/definitely/not/here.xlsx")).err();
        assert!(matches!(
            err,
            Some(roster_core::RosterError::Ingest(IngestError::Open { .. }))
        ));
    }
}
