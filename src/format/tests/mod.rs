//! Unit tests for the record and batch wire shapes.

mod batch_tests;
mod record_tests;
