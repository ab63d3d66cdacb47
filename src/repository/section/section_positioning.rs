//! Section Positioning Operations
//!
//! Operations for ordering sections within (and across) boards.

use async_trait::async_trait;

use crate::domain::{DomainResult, PositionMap};

/// Trait for section positioning operations
#[async_trait]
pub trait SectionPositioningOperations {
    /// Apply a drag-and-drop result: `ordered_ids` becomes the exact order of
    /// `dest_board_id`, sections taken from `source_board_id` move over
    async fn move_sections(
        &self,
        source_board_id: u32,
        dest_board_id: u32,
        ordered_ids: &[u32],
    ) -> DomainResult<PositionMap>;

    /// Renumber a board's sections to be sequential (0, 1, 2, ...)
    async fn reindex_board(&self, board_id: u32) -> DomainResult<PositionMap>;

    /// Current section positions of a board
    async fn board_positions(&self, board_id: u32) -> DomainResult<PositionMap>;
}

#[async_trait]
impl SectionPositioningOperations for super::section_repo::SectionRepository {
    async fn move_sections(
        &self,
        source_board_id: u32,
        dest_board_id: u32,
        ordered_ids: &[u32],
    ) -> DomainResult<PositionMap> {
        self.reindexer
            .move_between_containers(source_board_id, dest_board_id, ordered_ids)
            .await
    }

    async fn reindex_board(&self, board_id: u32) -> DomainResult<PositionMap> {
        self.reindexer.reindex_container(board_id).await
    }

    async fn board_positions(&self, board_id: u32) -> DomainResult<PositionMap> {
        self.reindexer.positions(board_id).await
    }
}
