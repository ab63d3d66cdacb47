//! SQLite Position Store
//!
//! `PositionStore` over an open transaction. Every write first checks the
//! transaction deadline.

use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{DomainError, DomainResult, OrderScope, OrderedItem};
use crate::repository::db::{db_err, now_millis, Deadline};
use super::store::{Placement, PositionStore};

pub struct SqlitePositionStore<'c> {
    conn: &'c Connection,
    scope: OrderScope,
    deadline: Deadline,
}

impl<'c> SqlitePositionStore<'c> {
    /// `conn` is normally a `Transaction`, which derefs to `Connection`
    pub fn new(conn: &'c Connection, scope: OrderScope, deadline: Deadline) -> Self {
        Self { conn, scope, deadline }
    }
}

impl PositionStore for SqlitePositionStore<'_> {
    fn scope(&self) -> &OrderScope {
        &self.scope
    }

    fn container_exists(&self, container_id: u32) -> DomainResult<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)",
            self.scope.container_table
        );
        let mut stmt = self.conn.prepare_cached(&sql).map_err(db_err)?;
        let exists: i64 = stmt.query_row(params![container_id], |row| row.get(0)).map_err(db_err)?;
        Ok(exists != 0)
    }

    fn locate(&self, item_id: u32) -> DomainResult<Option<Placement>> {
        let sql = format!(
            "SELECT {}, position FROM {} WHERE id = ?1",
            self.scope.container_column, self.scope.member_table
        );
        let mut stmt = self.conn.prepare_cached(&sql).map_err(db_err)?;
        let row = stmt
            .query_row(params![item_id], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, Option<i64>>(1)?))
            })
            .optional()
            .map_err(db_err)?;

        match row {
            None => Ok(None),
            Some((container_id, position)) => {
                let container_id = u32::try_from(container_id).map_err(|_| {
                    DomainError::Internal(format!("Invalid container id on {} {}", self.scope.member_label, item_id))
                })?;
                let position = match position {
                    Some(p) => Some(u32::try_from(p).map_err(|_| {
                        DomainError::Internal(format!("Negative position on {} {}", self.scope.member_label, item_id))
                    })?),
                    None => None,
                };
                Ok(Some(Placement { container_id, position }))
            }
        }
    }

    fn members(&self, container_id: u32) -> DomainResult<Vec<OrderedItem>> {
        let sql = format!(
            "SELECT id, {col}, position FROM {table}
             WHERE {col} = ?1 AND position IS NOT NULL
             ORDER BY position, id",
            col = self.scope.container_column,
            table = self.scope.member_table
        );
        let mut stmt = self.conn.prepare_cached(&sql).map_err(db_err)?;
        let mut rows = stmt.query(params![container_id]).map_err(db_err)?;

        let mut members = Vec::new();
        while let Some(row) = rows.next().map_err(db_err)? {
            members.push(OrderedItem::from_row(
                row.get(0).map_err(db_err)?,
                row.get(1).map_err(db_err)?,
                row.get(2).map_err(db_err)?,
            )?);
        }
        Ok(members)
    }

    fn write_position(&mut self, item_id: u32, container_id: u32, position: u32) -> DomainResult<()> {
        self.deadline.check("position write")?;

        let sql = format!(
            "UPDATE {} SET {} = ?1, position = ?2, updated_at = ?3 WHERE id = ?4",
            self.scope.member_table, self.scope.container_column
        );
        let mut stmt = self.conn.prepare_cached(&sql).map_err(db_err)?;
        let changed = stmt
            .execute(params![container_id, position, now_millis(), item_id])
            .map_err(db_err)?;

        if changed == 0 {
            return Err(DomainError::NotFound(format!("{} {} not found", self.scope.member_label, item_id)));
        }
        Ok(())
    }

    fn delete_member(&mut self, item_id: u32) -> DomainResult<()> {
        self.deadline.check("delete")?;

        let sql = format!("DELETE FROM {} WHERE id = ?1", self.scope.member_table);
        let changed = self.conn.execute(&sql, params![item_id]).map_err(db_err)?;

        if changed == 0 {
            return Err(DomainError::NotFound(format!("{} {} not found", self.scope.member_label, item_id)));
        }
        Ok(())
    }
}
