//! Integration test suite.
//!
//! Exercises full composer-project fixtures end to end, through both the
//! library API and the `magedeploy` binary.

mod common;

mod cli;
mod lifecycle;
