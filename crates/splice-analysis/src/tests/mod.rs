//! Test suites for splice-analysis.

mod unit;
