//! Section Repository Module
//!
//! This module provides section repository functionality split into specialized sub-modules:
//! - section_repo: Core CRUD operations
//! - section_positioning: Ordering of sections within boards

mod section_repo;
mod section_positioning;

pub use section_repo::SectionRepository;

// Re-export the operation trait so it can be used by importing SectionRepository
pub use section_positioning::SectionPositioningOperations;
