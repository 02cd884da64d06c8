//! Registry tests.

mod catalog_tests;
mod persistence_tests;
