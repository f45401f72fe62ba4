//! Infrastructure layer module
//!
//! Configuration loading and validation. External integrations that
//! implement domain ports live under `adapters` instead.

pub mod config;
