//! Commands for Board CRUD

use crate::domain::Board;
use crate::repository::Repository;
use crate::AppState;
use super::user_error;

/// Create a new board
pub async fn create_board(
    state: &AppState,
    name: String,
    description: Option<String>,
) -> Result<Board, String> {
    let mut board = Board::new(0, name);
    board.description = description;
    state.boards.create(&board).await.map_err(|e| user_error("create_board", e))
}

/// List all boards
pub async fn list_boards(state: &AppState) -> Result<Vec<Board>, String> {
    state.boards.list().await.map_err(|e| user_error("list_boards", e))
}

/// Rename a board and/or replace its description
pub async fn update_board(
    state: &AppState,
    id: u32,
    name: Option<String>,
    description: Option<String>,
) -> Result<Board, String> {
    let mut board = state
        .boards
        .find_by_id(id)
        .await
        .map_err(|e| user_error("update_board", e))?
        .ok_or_else(|| format!("Board {} not found", id))?;

    if let Some(name) = name {
        board.name = name;
    }
    if description.is_some() {
        board.description = description;
    }
    state.boards.update(&board).await.map_err(|e| user_error("update_board", e))
}

/// Delete a board with all its sections and tasks
pub async fn delete_board(state: &AppState, id: u32) -> Result<(), String> {
    state.boards.delete(id).await.map_err(|e| user_error("delete_board", e))
}
