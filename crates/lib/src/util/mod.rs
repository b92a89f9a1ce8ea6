//! Shared utilities.
//!
//! Hashing, archive extraction and filesystem helpers used by the contributor.

pub mod archive;
pub mod fs;
pub mod hash;

#[cfg(test)]
pub mod testutil;
