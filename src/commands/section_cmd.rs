//! Commands for Section CRUD + ordering

use crate::domain::{PositionMap, Section};
use crate::repository::{Repository, SectionPositioningOperations};
use crate::AppState;
use super::user_error;

/// Create a section at the right end of a board
pub async fn create_section(state: &AppState, board_id: u32, title: String) -> Result<Section, String> {
    state
        .sections
        .create(&Section::new(0, board_id, title))
        .await
        .map_err(|e| user_error("create_section", e))
}

/// Sections of a board in display order
pub async fn list_sections(state: &AppState, board_id: u32) -> Result<Vec<Section>, String> {
    state
        .sections
        .list_by_board(board_id)
        .await
        .map_err(|e| user_error("list_sections", e))
}

pub async fn rename_section(state: &AppState, id: u32, title: String) -> Result<Section, String> {
    let mut section = state
        .sections
        .find_by_id(id)
        .await
        .map_err(|e| user_error("rename_section", e))?
        .ok_or_else(|| format!("Section {} not found", id))?;

    section.title = title;
    state.sections.update(&section).await.map_err(|e| user_error("rename_section", e))
}

/// Delete a section and its tasks
pub async fn delete_section(state: &AppState, id: u32) -> Result<(), String> {
    state.sections.delete(id).await.map_err(|e| user_error("delete_section", e))
}

/// Apply a section drag: `ordered_ids` is the final order of the destination board
pub async fn move_sections(
    state: &AppState,
    source_board_id: u32,
    dest_board_id: u32,
    ordered_ids: Vec<u32>,
) -> Result<PositionMap, String> {
    state
        .sections
        .move_sections(source_board_id, dest_board_id, &ordered_ids)
        .await
        .map_err(|e| user_error("move_sections", e))
}
