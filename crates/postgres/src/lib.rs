//! # Postgres
//!
//! This crate provides the PostgreSQL connection pool and schema migrations for the
//! basketball camps marketplace.

/// Database client for the camps marketplace.
pub mod database;
