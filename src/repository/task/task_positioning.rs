//! Task Positioning Operations
//!
//! Operations for ordering tasks within (and across) sections.

use async_trait::async_trait;

use crate::domain::{DomainResult, PositionMap};

/// Trait for task positioning operations
#[async_trait]
pub trait TaskPositioningOperations {
    /// Apply a drag-and-drop result: `ordered_ids` becomes the exact order of
    /// `dest_section_id`, tasks taken from `source_section_id` move over.
    /// Use the same section as source and destination to reorder in place.
    async fn move_tasks(
        &self,
        source_section_id: u32,
        dest_section_id: u32,
        ordered_ids: &[u32],
    ) -> DomainResult<PositionMap>;

    /// Renumber a section's tasks to be sequential (0, 1, 2, ...)
    async fn reindex_section(&self, section_id: u32) -> DomainResult<PositionMap>;

    /// Current task positions of a section
    async fn section_positions(&self, section_id: u32) -> DomainResult<PositionMap>;
}

#[async_trait]
impl TaskPositioningOperations for super::task_repo::TaskRepository {
    async fn move_tasks(
        &self,
        source_section_id: u32,
        dest_section_id: u32,
        ordered_ids: &[u32],
    ) -> DomainResult<PositionMap> {
        self.reindexer
            .move_between_containers(source_section_id, dest_section_id, ordered_ids)
            .await
    }

    async fn reindex_section(&self, section_id: u32) -> DomainResult<PositionMap> {
        self.reindexer.reindex_container(section_id).await
    }

    async fn section_positions(&self, section_id: u32) -> DomainResult<PositionMap> {
        self.reindexer.positions(section_id).await
    }
}
