//! Shared helpers for integration tests.

pub mod type_fixtures;
