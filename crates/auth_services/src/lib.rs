//! # Auth Services
//!
//! This crate provides account and session handling for the camps marketplace.
//! It includes JWT token handling, middleware for request authentication, role guards
//! and the `users_profile` service.

/// JWT token handling and user authentication services.
pub mod jwt;
/// Middleware for request authentication and session extraction.
pub mod middleware;
/// Service definitions for user management and authentication operations.
pub mod service;
/// Types and structures used in authentication services.
pub mod types;
