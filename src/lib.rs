//! dirvault: incremental, depth-bounded encrypted archival
//!
//! Walks a source tree, partitions it into archival units by depth, and
//! re-archives a unit only when its content fingerprint differs from the one
//! recorded in the unit's checksum artifact.

pub mod checksum;
pub mod cli;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod tree;
pub mod types;
