//! Property-Based Tests for Sheet Validation
//!
//! - Any well-formed sheet validates to one payload per data row, in order
//! - Validation is deterministic: the same rows give the same result
//! - Breaking one email rejects the whole sheet and names that row

use proptest::prelude::*;
use roster_api::ingest::validate_rows;
use roster_core::{ValidationError, EMAIL_COLUMN};
use roster_test_utils::generators::arb_valid_sheet;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_valid_sheet_yields_every_row(rows in arb_valid_sheet(20)) {
        let batch = validate_rows(&rows);
        prop_assert!(batch.is_ok());
        let batch = batch.unwrap_or_default();
        prop_assert_eq!(batch.len(), rows.len() - 1);
        for (payload, row) in batch.iter().zip(rows.iter().skip(1)) {
            prop_assert_eq!(&payload.first_name, &row[0]);
            prop_assert_eq!(&payload.email, &row[EMAIL_COLUMN]);
            prop_assert_eq!(&payload.web, &row[9]);
        }
    }

    #[test]
    fn prop_validation_is_deterministic(rows in arb_valid_sheet(10)) {
        prop_assert_eq!(validate_rows(&rows), validate_rows(&rows));
    }

    #[test]
    fn prop_one_bad_email_rejects_sheet(
        rows in arb_valid_sheet(10).prop_filter("needs a data row", |r| r.len() > 1),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut rows = rows;
        let target = 1 + pick.index(rows.len() - 1);
        rows[target][EMAIL_COLUMN] = "no-at-sign".to_string();

        // Earlier rows are valid, so the first failure is the broken one.
        prop_assert_eq!(
            validate_rows(&rows),
            Err(ValidationError::InvalidEmail {
                row: target + 1,
                value: "no-at-sign".to_string(),
            })
        );
    }
}
