//! Task Repository - Core CRUD Operations
//!
//! SQLite-backed implementation for Task CRUD operations.
//! Specialized operations are in separate modules:
//! - task_positioning: Position management
//! - task_attachments: Comments and document links

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use crate::domain::{DomainError, DomainResult, Task, TaskPriority, TASKS_IN_SECTION};
use crate::repository::db::{db_err, now_millis, DbState};
use crate::repository::positioning::{self, PositionStore, Reindexer, SqlitePositionStore};
use crate::repository::traits::Repository;

const TASK_COLUMNS: &str =
    "id, section_id, title, content, priority, due_at, position, created_at, updated_at";

/// SQLite implementation of Task repository
pub struct TaskRepository {
    pub(super) db: DbState,
    pub(super) reindexer: Reindexer,
}

impl TaskRepository {
    pub fn new(db: DbState) -> Self {
        let reindexer = Reindexer::new(db.clone(), TASKS_IN_SECTION);
        Self { db, reindexer }
    }

    /// Tasks of a section in position order
    pub async fn list_by_section(&self, section_id: u32) -> DomainResult<Vec<Task>> {
        self.db
            .read(|conn| {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {} FROM tasks WHERE section_id = ?1 AND position IS NOT NULL ORDER BY position, id",
                        TASK_COLUMNS
                    ))
                    .map_err(db_err)?;
                let mut rows = stmt.query(params![section_id]).map_err(db_err)?;

                let mut tasks = Vec::new();
                while let Some(row) = rows.next().map_err(db_err)? {
                    tasks.push(row_to_task(row)?);
                }
                Ok(tasks)
            })
            .await
    }
}

#[async_trait]
impl Repository<Task> for TaskRepository {
    /// Inserts the task at the bottom of its section
    async fn create(&self, entity: &Task) -> DomainResult<Task> {
        if entity.title.trim().is_empty() {
            return Err(DomainError::InvalidInput("Task title cannot be empty".to_string()));
        }

        self.db
            .with_transaction(|tx, deadline| {
                let mut store = SqlitePositionStore::new(tx, TASKS_IN_SECTION, deadline);
                if !store.container_exists(entity.section_id)? {
                    return Err(DomainError::NotFound(format!("Section {} not found", entity.section_id)));
                }

                let now = now_millis();
                tx.execute(
                    "INSERT INTO tasks (section_id, title, content, priority, due_at, position, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?7)",
                    params![
                        entity.section_id,
                        entity.title,
                        entity.content,
                        entity.priority.as_str(),
                        entity.due_at,
                        now,
                        now
                    ],
                )
                .map_err(db_err)?;
                let id = tx.last_insert_rowid() as u32;

                let positions = positioning::append_to_container(&mut store, entity.section_id, id)?;

                let mut task = entity.clone();
                task.id = id;
                task.position = positions.get(&id).copied().unwrap_or_default();
                task.created_at = Some(now);
                task.updated_at = Some(now);
                Ok(task)
            })
            .await
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Task>> {
        self.db
            .read(|conn| {
                conn.query_row(
                    &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
                    params![id],
                    |row| Ok(row_to_task(row)),
                )
                .optional()
                .map_err(db_err)?
                .transpose()
            })
            .await
    }

    async fn list(&self) -> DomainResult<Vec<Task>> {
        self.db
            .read(|conn| {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {} FROM tasks ORDER BY section_id, position, id",
                        TASK_COLUMNS
                    ))
                    .map_err(db_err)?;
                let mut rows = stmt.query([]).map_err(db_err)?;

                let mut tasks = Vec::new();
                while let Some(row) = rows.next().map_err(db_err)? {
                    tasks.push(row_to_task(row)?);
                }
                Ok(tasks)
            })
            .await
    }

    /// Updates the task's own fields. Section and position only change
    /// through `TaskPositioningOperations`.
    async fn update(&self, entity: &Task) -> DomainResult<Task> {
        if entity.title.trim().is_empty() {
            return Err(DomainError::InvalidInput("Task title cannot be empty".to_string()));
        }

        self.db
            .with_transaction(|tx, _| {
                let changed = tx
                    .execute(
                        "UPDATE tasks SET title = ?1, content = ?2, priority = ?3, due_at = ?4, updated_at = ?5 WHERE id = ?6",
                        params![
                            entity.title,
                            entity.content,
                            entity.priority.as_str(),
                            entity.due_at,
                            now_millis(),
                            entity.id
                        ],
                    )
                    .map_err(db_err)?;
                if changed == 0 {
                    return Err(DomainError::NotFound(format!("Task {} not found", entity.id)));
                }

                tx.query_row(
                    &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
                    params![entity.id],
                    |row| Ok(row_to_task(row)),
                )
                .map_err(db_err)?
            })
            .await
    }

    /// Deletes the task with its comments and document links, then closes
    /// the gap in its section
    async fn delete(&self, id: u32) -> DomainResult<()> {
        self.db
            .with_transaction(|tx, deadline| {
                let mut store = SqlitePositionStore::new(tx, TASKS_IN_SECTION, deadline);
                let placement = store
                    .locate(id)?
                    .ok_or_else(|| DomainError::NotFound(format!("Task {} not found", id)))?;

                positioning::remove_from_container(&mut store, placement.container_id, id)?;
                Ok(())
            })
            .await
    }
}

/// Convert a database row to Task
pub(super) fn row_to_task(row: &rusqlite::Row) -> DomainResult<Task> {
    Ok(Task {
        id: row.get(0).map_err(db_err)?,
        section_id: row.get(1).map_err(db_err)?,
        title: row.get(2).map_err(db_err)?,
        content: row.get(3).map_err(db_err)?,
        priority: TaskPriority::from_str(&row.get::<_, String>(4).map_err(db_err)?),
        due_at: row.get(5).map_err(db_err)?,
        position: row.get::<_, Option<u32>>(6).map_err(db_err)?.unwrap_or(0),
        created_at: row.get(7).map_err(db_err)?,
        updated_at: row.get(8).map_err(db_err)?,
    })
}
