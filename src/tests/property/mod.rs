//! Property-based tests for the roster engine
//!
//! This module contains property-based tests using the proptest framework.
//! Property tests verify invariants that should hold for all inputs, rather
//! than testing specific cases.
//!
//! ## Running Property Tests
//!
//! ```sh
//! cargo test property --release
//! ```
//!
//! ## Test Modules
//!
//! - `tabular_props`: Tests for the delimited table parser
//!   - Quoted fields survive commas and escaped quotes
//!   - Plain rows split on commas and newlines
//!
//! - `weighted_props`: Tests for weighted sampling
//!   - Cumulative weights strictly increase and end at the total
//!   - Every in-range draw selects the row whose interval contains it
//!   - Name generation is deterministic per (entity, seed)
//!
//! - `cloner_props`: Tests for balanced cloning
//!   - Targets are reached exactly
//!   - Clone counts never differ by more than one
//!   - Shared templates never push a collection below its target
//!
//! ## Configuration
//!
//! By default, proptest runs 256 cases per property. This can be configured
//! via the `PROPTEST_CASES` environment variable.

mod cloner_props;
mod tabular_props;
mod weighted_props;
