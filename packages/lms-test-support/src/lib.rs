//! Shared helpers for the `lms` integration tests.

pub mod logging;
pub mod unique_helpers;
