//! Traversal & decision engine
//!
//! Partitions a source tree into archival units by depth and decides, per
//! unit, whether a fresh archive is needed.

pub mod pass;
pub mod plan;
pub mod policy;
pub mod report;

pub use pass::ArchivePass;
pub use plan::{plan_partition, PlannedDirectory};
pub use policy::Decision;
pub use report::{Action, DirectoryFailure, DirectoryOutcome, PassReport};
