//! Property-based tests for the delimited table parser
//!
//! Tests invariants:
//! - A row of quoted fields parses back to the original field values
//! - Unquoted rows split on commas and newlines

use proptest::prelude::*;

use crate::core::roster::tabular::parse_rows;

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

/// Field content that needs quoting: commas and quotes included
fn arb_quoted_content() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,\"]{1,12}"
}

/// Field content that needs no quoting
fn arb_plain_field() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,10}"
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: quoting every field and joining with commas round-trips
    #[test]
    fn prop_quoted_fields_round_trip(
        fields in prop::collection::vec(arb_quoted_content(), 1..6)
    ) {
        let line = fields.iter().map(|f| quote(f)).collect::<Vec<_>>().join(",");
        let rows = parse_rows(&line);
        prop_assert_eq!(rows, vec![fields]);
    }

    /// Property: plain rows split on commas and newlines, trailing newline or not
    #[test]
    fn prop_plain_rows_split(
        rows in prop::collection::vec(prop::collection::vec(arb_plain_field(), 1..5), 1..6),
        trailing_newline in any::<bool>(),
        crlf in any::<bool>()
    ) {
        let separator = if crlf { "\r\n" } else { "\n" };
        let mut text = rows
            .iter()
            .map(|row| row.join(","))
            .collect::<Vec<_>>()
            .join(separator);
        if trailing_newline {
            text.push_str(separator);
        }

        prop_assert_eq!(parse_rows(&text), rows);
    }
}
