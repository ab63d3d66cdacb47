//! Positioning Module
//!
//! The reindexer keeps `position` dense for every ordered relation. It is
//! split into:
//! - store: the row access trait the ordering operations run against
//! - ordering: append / remove / move / reindex over any store
//! - sqlite_store: the store over an open SQLite transaction
//!
//! `Reindexer` binds a `DbState` and an `OrderScope` and runs each
//! operation in its own transaction.

mod store;
mod ordering;
mod sqlite_store;

#[cfg(test)]
pub(crate) mod memory_store;

pub use store::{Placement, PositionStore};
pub use ordering::{
    append_to_container, move_between_containers, positions, reindex_container,
    remove_from_container,
};
pub use sqlite_store::SqlitePositionStore;

use crate::domain::{DomainResult, OrderScope, PositionMap};
use super::db::{DbState, Deadline};

/// Transactional entry point for one ordered relation
#[derive(Clone)]
pub struct Reindexer {
    db: DbState,
    scope: OrderScope,
}

impl Reindexer {
    pub fn new(db: DbState, scope: OrderScope) -> Self {
        Self { db, scope }
    }

    pub fn scope(&self) -> &OrderScope {
        &self.scope
    }

    /// Place an unplaced row at the end of its container
    pub async fn append_to_container(&self, container_id: u32, item_id: u32) -> DomainResult<PositionMap> {
        let scope = self.scope;
        self.db
            .with_transaction(move |tx, deadline| {
                let mut store = SqlitePositionStore::new(tx, scope, deadline);
                append_to_container(&mut store, container_id, item_id)
            })
            .await
    }

    /// Delete a member (and its dependants) and close the gap
    pub async fn remove_from_container(&self, container_id: u32, item_id: u32) -> DomainResult<PositionMap> {
        let scope = self.scope;
        self.db
            .with_transaction(move |tx, deadline| {
                let mut store = SqlitePositionStore::new(tx, scope, deadline);
                remove_from_container(&mut store, container_id, item_id)
            })
            .await
    }

    /// Make `ordered_ids` the exact ordering of the destination container
    pub async fn move_between_containers(
        &self,
        source_id: u32,
        destination_id: u32,
        ordered_ids: &[u32],
    ) -> DomainResult<PositionMap> {
        let scope = self.scope;
        self.db
            .with_transaction(move |tx, deadline| {
                let mut store = SqlitePositionStore::new(tx, scope, deadline);
                move_between_containers(&mut store, source_id, destination_id, ordered_ids)
            })
            .await
    }

    /// Renumber a container in its current order
    pub async fn reindex_container(&self, container_id: u32) -> DomainResult<PositionMap> {
        let scope = self.scope;
        self.db
            .with_transaction(move |tx, deadline| {
                let mut store = SqlitePositionStore::new(tx, scope, deadline);
                reindex_container(&mut store, container_id)
            })
            .await
    }

    /// Current ordering of a container
    pub async fn positions(&self, container_id: u32) -> DomainResult<PositionMap> {
        let scope = self.scope;
        let deadline = Deadline::after(self.db.limits().transaction_timeout);
        self.db
            .read(move |conn| {
                let store = SqlitePositionStore::new(conn, scope, deadline);
                positions(&store, container_id)
            })
            .await
    }
}
