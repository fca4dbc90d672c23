//! Source tree traversal and fingerprinting
//!
//! The walker visits directories top-down in a fixed order; the hasher turns a
//! directory's files (or its whole subtree) into a stable fingerprint.

pub mod hasher;
pub mod path;
pub mod walker;
