//! Section Repository - Core CRUD Operations
//!
//! Creation and deletion go through the reindexer inside the same
//! transaction as the row insert/delete, so a board's sections are always
//! numbered `0..n-1`.

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use crate::domain::{DomainError, DomainResult, Section, SECTIONS_IN_BOARD};
use crate::repository::db::{db_err, now_millis, DbState};
use crate::repository::positioning::{self, PositionStore, Reindexer, SqlitePositionStore};
use crate::repository::traits::Repository;

const SECTION_COLUMNS: &str = "id, board_id, title, position, created_at, updated_at";

pub struct SectionRepository {
    pub(super) db: DbState,
    pub(super) reindexer: Reindexer,
}

impl SectionRepository {
    pub fn new(db: DbState) -> Self {
        let reindexer = Reindexer::new(db.clone(), SECTIONS_IN_BOARD);
        Self { db, reindexer }
    }

    /// Sections of a board in position order
    pub async fn list_by_board(&self, board_id: u32) -> DomainResult<Vec<Section>> {
        self.db
            .read(|conn| {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {} FROM sections WHERE board_id = ?1 AND position IS NOT NULL ORDER BY position, id",
                        SECTION_COLUMNS
                    ))
                    .map_err(db_err)?;
                let mut rows = stmt.query(params![board_id]).map_err(db_err)?;

                let mut sections = Vec::new();
                while let Some(row) = rows.next().map_err(db_err)? {
                    sections.push(row_to_section(row)?);
                }
                Ok(sections)
            })
            .await
    }
}

#[async_trait]
impl Repository<Section> for SectionRepository {
    async fn create(&self, entity: &Section) -> DomainResult<Section> {
        if entity.title.trim().is_empty() {
            return Err(DomainError::InvalidInput("Section title cannot be empty".to_string()));
        }

        self.db
            .with_transaction(|tx, deadline| {
                let mut store = SqlitePositionStore::new(tx, SECTIONS_IN_BOARD, deadline);
                if !store.container_exists(entity.board_id)? {
                    return Err(DomainError::NotFound(format!("Board {} not found", entity.board_id)));
                }

                let now = now_millis();
                tx.execute(
                    "INSERT INTO sections (board_id, title, position, created_at, updated_at) VALUES (?1, ?2, NULL, ?3, ?4)",
                    params![entity.board_id, entity.title, now, now],
                )
                .map_err(db_err)?;
                let id = tx.last_insert_rowid() as u32;

                let positions = positioning::append_to_container(&mut store, entity.board_id, id)?;

                let mut section = entity.clone();
                section.id = id;
                section.position = positions.get(&id).copied().unwrap_or_default();
                section.created_at = Some(now);
                section.updated_at = Some(now);
                Ok(section)
            })
            .await
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Section>> {
        self.db
            .read(|conn| {
                conn.query_row(
                    &format!("SELECT {} FROM sections WHERE id = ?1", SECTION_COLUMNS),
                    params![id],
                    |row| Ok(row_to_section(row)),
                )
                .optional()
                .map_err(db_err)?
                .transpose()
            })
            .await
    }

    async fn list(&self) -> DomainResult<Vec<Section>> {
        self.db
            .read(|conn| {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {} FROM sections ORDER BY board_id, position, id",
                        SECTION_COLUMNS
                    ))
                    .map_err(db_err)?;
                let mut rows = stmt.query([]).map_err(db_err)?;

                let mut sections = Vec::new();
                while let Some(row) = rows.next().map_err(db_err)? {
                    sections.push(row_to_section(row)?);
                }
                Ok(sections)
            })
            .await
    }

    /// Renames the section. Board and position are owned by the reindexer
    /// and are not changed here.
    async fn update(&self, entity: &Section) -> DomainResult<Section> {
        if entity.title.trim().is_empty() {
            return Err(DomainError::InvalidInput("Section title cannot be empty".to_string()));
        }

        self.db
            .with_transaction(|tx, _| {
                let changed = tx
                    .execute(
                        "UPDATE sections SET title = ?1, updated_at = ?2 WHERE id = ?3",
                        params![entity.title, now_millis(), entity.id],
                    )
                    .map_err(db_err)?;
                if changed == 0 {
                    return Err(DomainError::NotFound(format!("Section {} not found", entity.id)));
                }

                tx.query_row(
                    &format!("SELECT {} FROM sections WHERE id = ?1", SECTION_COLUMNS),
                    params![entity.id],
                    |row| Ok(row_to_section(row)),
                )
                .map_err(db_err)?
            })
            .await
    }

    /// Deletes the section with its tasks and closes the gap in its board
    async fn delete(&self, id: u32) -> DomainResult<()> {
        self.db
            .with_transaction(|tx, deadline| {
                let mut store = SqlitePositionStore::new(tx, SECTIONS_IN_BOARD, deadline);
                let placement = store
                    .locate(id)?
                    .ok_or_else(|| DomainError::NotFound(format!("Section {} not found", id)))?;

                positioning::remove_from_container(&mut store, placement.container_id, id)?;
                log::info!("Deleted section {} from board {}", id, placement.container_id);
                Ok(())
            })
            .await
    }
}

/// Convert a database row to Section
pub(super) fn row_to_section(row: &rusqlite::Row) -> DomainResult<Section> {
    Ok(Section {
        id: row.get(0).map_err(db_err)?,
        board_id: row.get(1).map_err(db_err)?,
        title: row.get(2).map_err(db_err)?,
        position: row.get::<_, Option<u32>>(3).map_err(db_err)?.unwrap_or(0),
        created_at: row.get(4).map_err(db_err)?,
        updated_at: row.get(5).map_err(db_err)?,
    })
}
