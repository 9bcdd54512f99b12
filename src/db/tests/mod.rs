//! Shared database repository test infrastructure.
//!
//! All repository tests run against in-memory SQLite with the real migration
//! files applied, so the schema under test is the production schema.

pub mod harness;
