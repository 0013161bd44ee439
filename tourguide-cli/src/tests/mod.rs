//! Unit tests for the tour guide CLI.
#![expect(clippy::expect_used, reason = "tests should fail fast")]
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;
