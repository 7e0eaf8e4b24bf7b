//! Integration tests for cinetui
//!
//! Tests are organized by component:
//! - tmdb_test: TMDB API client tests
//! - cli_test: argument parsing, JSON output, command exit codes
//! - ui_test: full-frame rendering and key handling
//! - e2e_test: screen flows (load -> flags -> toggle -> settle)

// Note: Each test file is a separate integration test crate
// Tests are run individually by cargo, not via mod.rs
