//! Section Entity
//!
//! A column on a board. Sections are ordered within their board and own an
//! ordered list of tasks.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: u32,
    /// Owning board
    pub board_id: u32,
    pub title: String,
    /// Position within the board, assigned by the reindexer
    pub position: u32,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Section {
    pub fn new(id: u32, board_id: u32, title: String) -> Self {
        Self {
            id,
            board_id,
            title,
            position: 0,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Entity for Section {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}
