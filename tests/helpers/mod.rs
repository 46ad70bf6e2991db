//! Test helpers module
//!
//! Utilities for tests that touch the process environment, the working
//! directory or `.env` files.

pub mod simple_test;
pub mod test_data;

pub use simple_test::*;
pub use test_data::*;
