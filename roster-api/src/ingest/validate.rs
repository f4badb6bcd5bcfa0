//! All-or-nothing validation of parsed sheet rows.
//!
//! Row numbers in errors are 1-based sheet rows: the header is row 1, the
//! first data row is row 2.

use roster_core::{
    is_valid_email, NewEmployee, ValidationError, COLUMN_COUNT, EMAIL_COLUMN, EXPECTED_HEADERS,
};

/// Check the header row against the fixed column order.
pub fn validate_header(header: &[String]) -> Result<(), ValidationError> {
    if header.len() != COLUMN_COUNT {
        return Err(ValidationError::HeaderLength {
            expected: COLUMN_COUNT,
            found: header.len(),
        });
    }

    for (index, (found, expected)) in header.iter().zip(EXPECTED_HEADERS).enumerate() {
        if found != expected {
            return Err(ValidationError::HeaderMismatch {
                column: index + 1,
                expected: expected.to_string(),
                found: found.clone(),
            });
        }
    }
    Ok(())
}

/// Validate one data row and map it to a [`NewEmployee`].
pub fn validate_row(row_number: usize, cells: &[String]) -> Result<NewEmployee, ValidationError> {
    let employee = NewEmployee::from_row(row_number, cells)?;

    let email = &cells[EMAIL_COLUMN];
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail {
            row: row_number,
            value: email.clone(),
        });
    }
    Ok(employee)
}

/// Validate a whole sheet. Returns the data rows as employees, header
/// excluded, or the first failure found.
pub fn validate_rows(rows: &[Vec<String>]) -> Result<Vec<NewEmployee>, ValidationError> {
    let (header, data) = rows.split_first().ok_or(ValidationError::EmptySheet)?;
    validate_header(header)?;

    data.iter()
        .enumerate()
        .map(|(index, cells)| validate_row(index + 2, cells))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_test_utils::{employee_row, header_row, sheet_rows};

    #[test]
    fn test_valid_sheet_yields_data_rows() -> Result<(), ValidationError> {
        let batch = validate_rows(&sheet_rows(2))?;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].email, employee_row(0)[EMAIL_COLUMN]);
        Ok(())
    }

    #[test]
    fn test_header_only_sheet_is_valid_and_empty() -> Result<(), ValidationError> {
        assert!(validate_rows(&[header_row()])?.is_empty());
        Ok(())
    }

    #[test]
    fn test_empty_sheet() {
        assert_eq!(validate_rows(&[]), Err(ValidationError::EmptySheet));
    }

    #[test]
    fn test_header_order_mismatch() {
        let mut header = header_row();
        header.swap(0, 1);
        assert_eq!(
            validate_header(&header),
            Err(ValidationError::HeaderMismatch {
                column: 1,
                expected: "FirstName".to_string(),
                found: "LastName".to_string(),
            })
        );
    }

    #[test]
    fn test_header_length_mismatch() {
        let mut header = header_row();
        header.pop();
        assert_eq!(
            validate_header(&header),
            Err(ValidationError::HeaderLength {
                expected: 10,
                found: 9
            })
        );
    }

    #[test]
    fn test_short_row_reports_sheet_row_number() {
        let mut rows = sheet_rows(3);
        rows[2].truncate(7);
        assert_eq!(
            validate_rows(&rows),
            Err(ValidationError::ColumnCount {
                row: 3,
                expected: 10,
                found: 7
            })
        );
    }

    #[test]
    fn test_invalid_email_rejects_batch() {
        let mut rows = sheet_rows(2);
        rows[2][EMAIL_COLUMN] = "not-an-email".to_string();
        assert_eq!(
            validate_rows(&rows),
            Err(ValidationError::InvalidEmail {
                row: 3,
                value: "not-an-email".to_string()
            })
        );
    }
}
