//! Test suites for splice-syntax.
