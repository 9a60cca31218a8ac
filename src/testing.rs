//! Shared fixtures for tests and benchmarks.

pub mod fixtures;
