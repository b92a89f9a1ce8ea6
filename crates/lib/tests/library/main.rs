//! Integration tests for libbs.

mod application_tests;
mod common;
