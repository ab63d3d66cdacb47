//! Task Repository Module
//!
//! This module provides task repository functionality split into specialized sub-modules:
//! - task_repo: Core CRUD operations
//! - task_positioning: Ordering of tasks within (and across) sections
//! - task_attachments: Comments and document links

mod task_repo;
mod task_positioning;
mod task_attachments;

pub use task_repo::TaskRepository;

// Re-export all operation traits so they can be used by importing TaskRepository
pub use task_positioning::TaskPositioningOperations;
pub use task_attachments::TaskAttachmentOperations;
