//! Board Repository
//!
//! Boards are not ordered; deleting one removes its sections and tasks
//! through foreign key cascades.

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use crate::domain::{Board, DomainError, DomainResult};
use super::db::{db_err, now_millis, DbState};
use super::traits::Repository;

pub struct BoardRepository {
    db: DbState,
}

impl BoardRepository {
    pub fn new(db: DbState) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Repository<Board> for BoardRepository {
    async fn create(&self, entity: &Board) -> DomainResult<Board> {
        if entity.name.trim().is_empty() {
            return Err(DomainError::InvalidInput("Board name cannot be empty".to_string()));
        }

        self.db
            .with_transaction(|tx, _| {
                let now = now_millis();
                tx.execute(
                    "INSERT INTO boards (name, description, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
                    params![entity.name, entity.description, now, now],
                )
                .map_err(db_err)?;

                let mut board = entity.clone();
                board.id = tx.last_insert_rowid() as u32;
                board.created_at = Some(now);
                board.updated_at = Some(now);
                Ok(board)
            })
            .await
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Board>> {
        self.db
            .read(|conn| {
                conn.query_row(
                    "SELECT id, name, description, created_at, updated_at FROM boards WHERE id = ?1",
                    params![id],
                    |row| {
                        Ok(Board {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            description: row.get(2)?,
                            created_at: row.get(3)?,
                            updated_at: row.get(4)?,
                        })
                    },
                )
                .optional()
                .map_err(db_err)
            })
            .await
    }

    async fn list(&self) -> DomainResult<Vec<Board>> {
        self.db
            .read(|conn| {
                let mut stmt = conn
                    .prepare("SELECT id, name, description, created_at, updated_at FROM boards ORDER BY id")
                    .map_err(db_err)?;
                let mut rows = stmt.query([]).map_err(db_err)?;

                let mut boards = Vec::new();
                while let Some(row) = rows.next().map_err(db_err)? {
                    boards.push(Board {
                        id: row.get(0).map_err(db_err)?,
                        name: row.get(1).map_err(db_err)?,
                        description: row.get(2).map_err(db_err)?,
                        created_at: row.get(3).map_err(db_err)?,
                        updated_at: row.get(4).map_err(db_err)?,
                    });
                }
                Ok(boards)
            })
            .await
    }

    async fn update(&self, entity: &Board) -> DomainResult<Board> {
        if entity.name.trim().is_empty() {
            return Err(DomainError::InvalidInput("Board name cannot be empty".to_string()));
        }

        self.db
            .with_transaction(|tx, _| {
                let now = now_millis();
                let changed = tx
                    .execute(
                        "UPDATE boards SET name = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
                        params![entity.name, entity.description, now, entity.id],
                    )
                    .map_err(db_err)?;
                if changed == 0 {
                    return Err(DomainError::NotFound(format!("Board {} not found", entity.id)));
                }

                let mut board = entity.clone();
                board.updated_at = Some(now);
                Ok(board)
            })
            .await
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        self.db
            .with_transaction(|tx, _| {
                let changed = tx
                    .execute("DELETE FROM boards WHERE id = ?1", params![id])
                    .map_err(db_err)?;
                if changed == 0 {
                    return Err(DomainError::NotFound(format!("Board {} not found", id)));
                }
                log::info!("Deleted board {}", id);
                Ok(())
            })
            .await
    }
}
