//! Position Store
//!
//! Row access the reindexer needs while a transaction is open.
//! Implementations can use SQLite, in-memory, etc.

use crate::domain::{DomainResult, OrderScope, OrderedItem};

/// Where a row currently lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub container_id: u32,
    /// `None` while the row has not been appended to its container yet
    pub position: Option<u32>,
}

pub trait PositionStore {
    /// The relation this store reads and writes
    fn scope(&self) -> &OrderScope;

    fn container_exists(&self, container_id: u32) -> DomainResult<bool>;

    /// Placement of a row, `None` when no such row exists
    fn locate(&self, item_id: u32) -> DomainResult<Option<Placement>>;

    /// Placed members of a container in `(position, id)` order
    fn members(&self, container_id: u32) -> DomainResult<Vec<OrderedItem>>;

    /// Put a row into `container_id` at `position`
    fn write_position(&mut self, item_id: u32, container_id: u32, position: u32) -> DomainResult<()>;

    /// Delete a row; dependent rows go with it
    fn delete_member(&mut self, item_id: u32) -> DomainResult<()>;
}
