//! Bulk spreadsheet ingestion: staging, parsing, validation and commit.

pub mod pipeline;
pub mod sheet;
pub mod staging;
pub mod validate;

pub use pipeline::{ImportPipeline, ImportReport};
pub use sheet::{read_first_sheet, read_first_sheet_blocking, SheetRows};
pub use staging::{sanitize_file_name, staged_path};
pub use validate::{validate_header, validate_row, validate_rows};
