//! Command tests for storage-backup
//!
//! These tests verify command behavior using mocked storage and webhook clients.

mod run;
mod validate;
