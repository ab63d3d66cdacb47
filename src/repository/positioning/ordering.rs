//! Ordering Operations
//!
//! Keeps member positions dense (`0..n-1`) across append, remove and move.
//! Each function expects to run inside one transaction opened by the caller;
//! on error the caller rolls back, so partial writes are never observed.

use std::collections::{BTreeMap, HashSet};

use crate::domain::{is_dense, DomainError, DomainResult, OrderedItem, PositionMap};
use super::store::PositionStore;

fn require_container<S: PositionStore>(store: &S, container_id: u32) -> DomainResult<()> {
    if store.container_exists(container_id)? {
        Ok(())
    } else {
        Err(DomainError::NotFound(format!(
            "{} {} not found",
            store.scope().container_label,
            container_id
        )))
    }
}

/// Rewrite positions of a container to `0..n-1`, keeping the current order.
/// Returns the number of rows written.
fn renumber<S: PositionStore>(store: &mut S, container_id: u32) -> DomainResult<usize> {
    let members = store.members(container_id)?;
    let mut written = 0;
    for (index, member) in members.iter().enumerate() {
        let index = index as u32;
        if member.position != index {
            store.write_position(member.id, container_id, index)?;
            written += 1;
        }
    }
    Ok(written)
}

/// Re-read the touched containers, verify they are dense and collect positions
fn finish<S: PositionStore>(store: &S, containers: &[u32]) -> DomainResult<PositionMap> {
    let mut map = PositionMap::new();
    for &container_id in containers {
        let members = store.members(container_id)?;
        if !is_dense(&members) {
            return Err(DomainError::Internal(format!(
                "{} {} positions are not dense after reindex",
                store.scope().container_label,
                container_id
            )));
        }
        map.extend(members.iter().map(|m| (m.id, m.position)));
    }
    Ok(map)
}

/// Current positions of a container
pub fn positions<S: PositionStore>(store: &S, container_id: u32) -> DomainResult<PositionMap> {
    require_container(store, container_id)?;
    Ok(store
        .members(container_id)?
        .iter()
        .map(|m| (m.id, m.position))
        .collect())
}

/// Place an unplaced row at the end of `container_id`
pub fn append_to_container<S: PositionStore>(
    store: &mut S,
    container_id: u32,
    item_id: u32,
) -> DomainResult<PositionMap> {
    require_container(store, container_id)?;

    let label = store.scope().member_label;
    let placement = store
        .locate(item_id)?
        .ok_or_else(|| DomainError::NotFound(format!("{} {} not found", label, item_id)))?;
    if let Some(position) = placement.position {
        return Err(DomainError::InvalidInput(format!(
            "{} {} is already placed at position {} in {} {}",
            label,
            item_id,
            position,
            store.scope().container_label,
            placement.container_id
        )));
    }

    let position = store.members(container_id)?.len() as u32;
    store.write_position(item_id, container_id, position)?;
    log::debug!("Appended {} {} to {} at {}", label, item_id, container_id, position);

    finish(store, &[container_id])
}

/// Delete a member and close the gap it leaves
pub fn remove_from_container<S: PositionStore>(
    store: &mut S,
    container_id: u32,
    item_id: u32,
) -> DomainResult<PositionMap> {
    require_container(store, container_id)?;

    let scope = *store.scope();
    let placement = store
        .locate(item_id)?
        .ok_or_else(|| DomainError::NotFound(format!("{} {} not found", scope.member_label, item_id)))?;
    if placement.container_id != container_id || placement.position.is_none() {
        return Err(DomainError::InvalidInput(format!(
            "{} {} is not a member of {} {}",
            scope.member_label, item_id, scope.container_label, container_id
        )));
    }

    store.delete_member(item_id)?;
    let written = renumber(store, container_id)?;
    log::debug!(
        "Removed {} {} from {} {}, {} positions rewritten",
        scope.member_label, item_id, scope.container_label, container_id, written
    );

    finish(store, &[container_id])
}

/// Make `ordered_ids` the exact ordering of `destination_id`.
///
/// Ids taken from `source_id` (when it differs from the destination) move
/// over, and the source is renumbered to close the gaps. Every current
/// destination member must appear in `ordered_ids`.
pub fn move_between_containers<S: PositionStore>(
    store: &mut S,
    source_id: u32,
    destination_id: u32,
    ordered_ids: &[u32],
) -> DomainResult<PositionMap> {
    let scope = *store.scope();
    require_container(store, source_id)?;
    if destination_id != source_id {
        require_container(store, destination_id)?;
    }

    let mut seen = HashSet::with_capacity(ordered_ids.len());
    if let Some(dup) = ordered_ids.iter().find(|id| !seen.insert(**id)) {
        return Err(DomainError::InvalidInput(format!(
            "{} {} appears more than once in the requested order",
            scope.member_label, dup
        )));
    }

    let mut current: BTreeMap<u32, OrderedItem> = store
        .members(destination_id)?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();
    let destination_ids: Vec<u32> = current.keys().copied().collect();
    if source_id != destination_id {
        current.extend(store.members(source_id)?.into_iter().map(|m| (m.id, m)));
    }

    let mut moved = 0;
    for id in ordered_ids {
        match current.get(id) {
            Some(member) if member.container_id == destination_id => {}
            Some(_) => moved += 1,
            None => {
                return Err(match store.locate(*id)? {
                    None => DomainError::NotFound(format!("{} {} not found", scope.member_label, id)),
                    Some(placement) => DomainError::InvalidInput(format!(
                        "{} {} belongs to {} {}, not {} {}",
                        scope.member_label,
                        id,
                        scope.container_label,
                        placement.container_id,
                        scope.container_label,
                        destination_id
                    )),
                });
            }
        }
    }

    if let Some(missing) = destination_ids.iter().find(|id| !seen.contains(*id)) {
        return Err(DomainError::ConcurrentModification(format!(
            "{} {} in {} {} is missing from the requested order",
            scope.member_label, missing, scope.container_label, destination_id
        )));
    }
    if source_id != destination_id && moved == 0 {
        return Err(DomainError::InvalidInput(format!(
            "Requested order for {} {} contains nothing from {} {}",
            scope.container_label, destination_id, scope.container_label, source_id
        )));
    }

    let mut written = 0;
    for (index, id) in ordered_ids.iter().enumerate() {
        let index = index as u32;
        let member = current[id];
        if member.container_id != destination_id || member.position != index {
            store.write_position(*id, destination_id, index)?;
            written += 1;
        }
    }

    let mut touched = vec![destination_id];
    if source_id != destination_id {
        written += renumber(store, source_id)?;
        touched.push(source_id);
    }
    log::debug!(
        "Reordered {} {} ({} moved from {}), {} positions rewritten",
        scope.container_label, destination_id, moved, source_id, written
    );

    finish(store, &touched)
}

/// Repair pass: renumber a container in its current order
pub fn reindex_container<S: PositionStore>(store: &mut S, container_id: u32) -> DomainResult<PositionMap> {
    require_container(store, container_id)?;
    let written = renumber(store, container_id)?;
    if written > 0 {
        log::info!(
            "Reindexed {} {}, {} positions rewritten",
            store.scope().container_label,
            container_id,
            written
        );
    }
    finish(store, &[container_id])
}
