//! Expression compiler tests.

mod compile_tests;
