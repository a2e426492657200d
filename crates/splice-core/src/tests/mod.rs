//! Unit tests for `splice_core` types.

mod config_tests;
mod edit_tests;
