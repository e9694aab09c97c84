//! Unit tests for storage-backup building blocks

mod config;
mod scheduler;
