//! Property-based tests for weighted sampling and name generation
//!
//! Tests invariants:
//! - Cumulative weights strictly increase and the last equals the total
//! - A draw selects the row whose half-open interval contains it
//! - Draws at or past the total are reported as defects
//! - Names are deterministic per (entity, seed) and come from the tables

use proptest::prelude::*;

use crate::core::roster::names::{Gender, NameGenerator};
use crate::core::roster::random::SeededRandomStream;
use crate::core::roster::weighted::{NameTableCache, WeightedTable};

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

/// Weight cells as they appear in table text; empty and zero count as 1
fn arb_weight_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("0".to_string()),
        (1u32..10_000).prop_map(|w| w.to_string()),
    ]
}

/// A `Name,Weight` table with 1..20 rows
fn arb_table_text() -> impl Strategy<Value = String> {
    prop::collection::vec(("[A-Z][a-z]{2,8}", arb_weight_cell()), 1..20).prop_map(|rows| {
        let mut text = String::from("Name,Weight\n");
        for (name, weight) in rows {
            text.push_str(&format!("{},{}\n", name, weight));
        }
        text
    })
}

fn arb_gender() -> impl Strategy<Value = Gender> {
    prop_oneof![Just(Gender::Male), Just(Gender::Female)]
}

fn expected_weight(cell: &str) -> u32 {
    match cell.parse::<u32>() {
        Ok(0) | Err(_) => 1,
        Ok(w) => w,
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: cumulative weights are strictly increasing and end at the total
    #[test]
    fn prop_cumulative_weights_monotonic(text in arb_table_text()) {
        let table = WeightedTable::parse("prop", &text).unwrap();
        let rows = table.rows();

        let mut previous = 0u32;
        for row in rows {
            prop_assert!(row.weight >= 1);
            prop_assert_eq!(row.cumulative_weight, previous + row.weight);
            prop_assert!(row.cumulative_weight > previous);
            previous = row.cumulative_weight;
        }
        prop_assert_eq!(table.total_weight(), previous);
    }

    /// Property: effective weights follow the cell rules
    #[test]
    fn prop_effective_weights(text in arb_table_text()) {
        let table = WeightedTable::parse("prop", &text).unwrap();
        let cells: Vec<String> = text
            .lines()
            .skip(1)
            .map(|line| line.split(',').nth(1).unwrap_or("").to_string())
            .collect();

        prop_assert_eq!(table.rows().len(), cells.len());
        for (row, cell) in table.rows().iter().zip(cells.iter()) {
            prop_assert_eq!(row.weight, expected_weight(cell));
        }
    }

    /// Property: a draw lands in the interval of the row it selects
    #[test]
    fn prop_sample_selects_containing_interval(
        text in arb_table_text(),
        fraction in 0.0f64..1.0
    ) {
        let table = WeightedTable::parse("prop", &text).unwrap();
        let draw = ((table.total_weight() as f64) * fraction) as u32;
        let draw = draw.min(table.total_weight() - 1);

        let selected = table.sample(draw).unwrap();
        prop_assert!(draw < selected.cumulative_weight);
        prop_assert!(draw >= selected.cumulative_weight - selected.weight);

        let miss = table.sample(table.total_weight());
        prop_assert!(miss.is_err());
        prop_assert!(miss.unwrap_err().is_defect());
    }

    /// Property: stream draws always stay within the table
    #[test]
    fn prop_stream_draws_never_miss(
        text in arb_table_text(),
        id in "[A-Za-z0-9_]{1,40}",
        seed in any::<u32>()
    ) {
        let table = WeightedTable::parse("prop", &text).unwrap();
        let mut stream = SeededRandomStream::new(&id, seed);
        for _ in 0..16 {
            prop_assert!(table.sample_with(&mut stream).is_ok());
        }
    }

    /// Property: names are deterministic and built from table entries
    #[test]
    fn prop_names_deterministic(
        id in "[A-Za-z0-9_]{1,40}",
        seed in any::<u32>(),
        gender in arb_gender()
    ) {
        let mut cache = NameTableCache::new();
        let generator = NameGenerator::from_texts(
            &mut cache,
            "Name,Weight\nJames,3\nMichael,2",
            "Name,Weight\nMary,1\nLinda,4",
            "Name,Weight\nSmith,5\nJones,1\nBrown,2",
        )
        .unwrap();

        let first = generator.generate(&id, gender, seed).unwrap();
        let second = generator.generate(&id, gender, seed).unwrap();
        prop_assert_eq!(&first, &second);

        let (given, family) = first.split_once(' ').unwrap();
        let given_names: Vec<&str> = generator
            .given_names(gender)
            .rows()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        prop_assert!(given_names.contains(&given));
        prop_assert!(["Smith", "Jones", "Brown"].contains(&family));
    }
}
