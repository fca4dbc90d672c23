//! Merge rules applied before any source is added.

pub mod merge_policy;
