//! # Object Storage
//!
//! This crate stores camp images in a write-once bucket and derives the public URLs
//! that camps and submissions reference.

/// Object key scheme for uploaded images.
mod keys;
pub use keys::*;

/// Storage backends.
mod store;
pub use store::*;
