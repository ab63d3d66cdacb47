//! Ordered Item
//!
//! A row that belongs to exactly one container and carries a dense,
//! zero-based position within it (a task inside a section, a section
//! inside a board).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult};

/// Member id -> position, for every member of the containers an operation touched
pub type PositionMap = BTreeMap<u32, u32>;

/// One member of an ordered container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedItem {
    pub id: u32,
    pub container_id: u32,
    pub position: u32,
}

impl OrderedItem {
    pub fn new(id: u32, container_id: u32, position: u32) -> Self {
        Self { id, container_id, position }
    }

    /// Build from raw column values, rejecting rows that cannot be ordered
    pub fn from_row(id: i64, container_id: i64, position: i64) -> DomainResult<Self> {
        let id = u32::try_from(id)
            .map_err(|_| DomainError::Internal(format!("Invalid member id {}", id)))?;
        let container_id = u32::try_from(container_id)
            .map_err(|_| DomainError::Internal(format!("Invalid container id {} on member {}", container_id, id)))?;
        let position = u32::try_from(position)
            .map_err(|_| DomainError::Internal(format!("Negative position {} on member {}", position, id)))?;
        Ok(Self { id, container_id, position })
    }
}

/// Describes one ordered relation in the schema.
///
/// Table and column names are compile-time constants, so they can be
/// spliced into SQL text safely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderScope {
    /// Table holding the ordered rows
    pub member_table: &'static str,
    /// Foreign key column on `member_table` pointing at the container
    pub container_column: &'static str,
    /// Table holding the containers
    pub container_table: &'static str,
    /// Human readable names used in error messages
    pub member_label: &'static str,
    pub container_label: &'static str,
}

/// Tasks ordered within a section
pub const TASKS_IN_SECTION: OrderScope = OrderScope {
    member_table: "tasks",
    container_column: "section_id",
    container_table: "sections",
    member_label: "Task",
    container_label: "Section",
};

/// Sections ordered within a board
pub const SECTIONS_IN_BOARD: OrderScope = OrderScope {
    member_table: "sections",
    container_column: "board_id",
    container_table: "boards",
    member_label: "Section",
    container_label: "Board",
};

/// Check that `members`, sorted by position, hold exactly `0..n-1`
pub fn is_dense(members: &[OrderedItem]) -> bool {
    let mut positions: Vec<u32> = members.iter().map(|m| m.position).collect();
    positions.sort_unstable();
    positions.iter().enumerate().all(|(i, p)| *p as usize == i)
}
