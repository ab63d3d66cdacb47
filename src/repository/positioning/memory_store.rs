//! In-memory Position Store
//!
//! Test double with snapshot rollback and failure injection.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{DomainError, DomainResult, OrderScope, OrderedItem};
use super::store::{Placement, PositionStore};

pub struct MemoryPositionStore {
    scope: OrderScope,
    containers: BTreeSet<u32>,
    rows: BTreeMap<u32, Placement>,
    write_budget: Option<usize>,
}

impl MemoryPositionStore {
    pub fn new(scope: OrderScope) -> Self {
        Self {
            scope,
            containers: BTreeSet::new(),
            rows: BTreeMap::new(),
            write_budget: None,
        }
    }

    pub fn add_container(&mut self, container_id: u32) {
        self.containers.insert(container_id);
    }

    /// A freshly inserted row that has no position yet
    pub fn insert_unplaced(&mut self, item_id: u32, container_id: u32) {
        self.rows.insert(item_id, Placement { container_id, position: None });
    }

    /// A row with an arbitrary position, for corrupt-data tests
    pub fn insert_placed(&mut self, item_id: u32, container_id: u32, position: u32) {
        self.rows.insert(item_id, Placement { container_id, position: Some(position) });
    }

    /// Let `n` more writes succeed, then fail every write
    pub fn fail_after_writes(&mut self, n: usize) {
        self.write_budget = Some(n);
    }

    /// Run `f` and restore every row if it fails
    pub fn atomically<T>(&mut self, f: impl FnOnce(&mut Self) -> DomainResult<T>) -> DomainResult<T> {
        let snapshot = self.rows.clone();
        let result = f(self);
        if result.is_err() {
            self.rows = snapshot;
        }
        result
    }
}

impl PositionStore for MemoryPositionStore {
    fn scope(&self) -> &OrderScope {
        &self.scope
    }

    fn container_exists(&self, container_id: u32) -> DomainResult<bool> {
        Ok(self.containers.contains(&container_id))
    }

    fn locate(&self, item_id: u32) -> DomainResult<Option<Placement>> {
        Ok(self.rows.get(&item_id).copied())
    }

    fn members(&self, container_id: u32) -> DomainResult<Vec<OrderedItem>> {
        let mut members: Vec<OrderedItem> = self
            .rows
            .iter()
            .filter(|(_, p)| p.container_id == container_id)
            .filter_map(|(id, p)| p.position.map(|pos| OrderedItem::new(*id, container_id, pos)))
            .collect();
        members.sort_by_key(|m| (m.position, m.id));
        Ok(members)
    }

    fn write_position(&mut self, item_id: u32, container_id: u32, position: u32) -> DomainResult<()> {
        if let Some(budget) = self.write_budget.as_mut() {
            if *budget == 0 {
                return Err(DomainError::Internal("injected write failure".to_string()));
            }
            *budget -= 1;
        }
        let row = self
            .rows
            .get_mut(&item_id)
            .ok_or_else(|| DomainError::NotFound(format!("{} {} not found", self.scope.member_label, item_id)))?;
        row.container_id = container_id;
        row.position = Some(position);
        Ok(())
    }

    fn delete_member(&mut self, item_id: u32) -> DomainResult<()> {
        self.rows
            .remove(&item_id)
            .map(|_| ())
            .ok_or_else(|| DomainError::NotFound(format!("{} {} not found", self.scope.member_label, item_id)))
    }
}
