//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod db;
mod metrics;
mod board_repo;
pub mod positioning;
mod section;
mod task;

#[cfg(test)]
mod tests;

pub use traits::Repository;
pub use db::{db_err, init_db, DbState, Deadline, TxLimits};
pub use metrics::{DbMetrics, MetricsSnapshot};
pub use board_repo::BoardRepository;
pub use positioning::Reindexer;
pub use section::{SectionPositioningOperations, SectionRepository};
pub use task::{TaskAttachmentOperations, TaskPositioningOperations, TaskRepository};
