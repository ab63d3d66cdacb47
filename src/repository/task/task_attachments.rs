//! Task Attachment Operations
//!
//! Comments and document links hang off a task and are removed with it by
//! the `ON DELETE CASCADE` foreign keys.

use async_trait::async_trait;
use rusqlite::{params, Connection};

use crate::domain::{DomainError, DomainResult, TaskComment, TaskDocument};
use crate::repository::db::{db_err, now_millis};

/// Trait for comment and document operations on tasks
#[async_trait]
pub trait TaskAttachmentOperations {
    async fn add_comment(&self, task_id: u32, body: &str) -> DomainResult<TaskComment>;

    /// Comments of a task, oldest first
    async fn list_comments(&self, task_id: u32) -> DomainResult<Vec<TaskComment>>;

    async fn link_document(&self, task_id: u32, name: &str, url: &str) -> DomainResult<TaskDocument>;

    async fn list_documents(&self, task_id: u32) -> DomainResult<Vec<TaskDocument>>;
}

fn require_task(conn: &Connection, task_id: u32) -> DomainResult<()> {
    let exists: i64 = conn
        .query_row("SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?1)", params![task_id], |row| row.get(0))
        .map_err(db_err)?;
    if exists == 0 {
        return Err(DomainError::NotFound(format!("Task {} not found", task_id)));
    }
    Ok(())
}

#[async_trait]
impl TaskAttachmentOperations for super::task_repo::TaskRepository {
    async fn add_comment(&self, task_id: u32, body: &str) -> DomainResult<TaskComment> {
        if body.trim().is_empty() {
            return Err(DomainError::InvalidInput("Comment cannot be empty".to_string()));
        }

        self.db
            .with_transaction(|tx, _| {
                require_task(tx, task_id)?;
                let now = now_millis();
                tx.execute(
                    "INSERT INTO task_comments (task_id, body, created_at) VALUES (?1, ?2, ?3)",
                    params![task_id, body, now],
                )
                .map_err(db_err)?;

                Ok(TaskComment {
                    id: tx.last_insert_rowid() as u32,
                    task_id,
                    body: body.to_string(),
                    created_at: now,
                })
            })
            .await
    }

    async fn list_comments(&self, task_id: u32) -> DomainResult<Vec<TaskComment>> {
        self.db
            .read(|conn| {
                require_task(conn, task_id)?;
                let mut stmt = conn
                    .prepare("SELECT id, task_id, body, created_at FROM task_comments WHERE task_id = ?1 ORDER BY created_at, id")
                    .map_err(db_err)?;
                let mut rows = stmt.query(params![task_id]).map_err(db_err)?;

                let mut comments = Vec::new();
                while let Some(row) = rows.next().map_err(db_err)? {
                    comments.push(TaskComment {
                        id: row.get(0).map_err(db_err)?,
                        task_id: row.get(1).map_err(db_err)?,
                        body: row.get(2).map_err(db_err)?,
                        created_at: row.get(3).map_err(db_err)?,
                    });
                }
                Ok(comments)
            })
            .await
    }

    async fn link_document(&self, task_id: u32, name: &str, url: &str) -> DomainResult<TaskDocument> {
        if url.trim().is_empty() {
            return Err(DomainError::InvalidInput("Document URL cannot be empty".to_string()));
        }

        self.db
            .with_transaction(|tx, _| {
                require_task(tx, task_id)?;
                let now = now_millis();
                tx.execute(
                    "INSERT INTO task_documents (task_id, name, url, created_at) VALUES (?1, ?2, ?3, ?4)",
                    params![task_id, name, url, now],
                )
                .map_err(db_err)?;

                Ok(TaskDocument {
                    id: tx.last_insert_rowid() as u32,
                    task_id,
                    name: name.to_string(),
                    url: url.to_string(),
                    created_at: now,
                })
            })
            .await
    }

    async fn list_documents(&self, task_id: u32) -> DomainResult<Vec<TaskDocument>> {
        self.db
            .read(|conn| {
                require_task(conn, task_id)?;
                let mut stmt = conn
                    .prepare("SELECT id, task_id, name, url, created_at FROM task_documents WHERE task_id = ?1 ORDER BY id")
                    .map_err(db_err)?;
                let mut rows = stmt.query(params![task_id]).map_err(db_err)?;

                let mut documents = Vec::new();
                while let Some(row) = rows.next().map_err(db_err)? {
                    documents.push(TaskDocument {
                        id: row.get(0).map_err(db_err)?,
                        task_id: row.get(1).map_err(db_err)?,
                        name: row.get(2).map_err(db_err)?,
                        url: row.get(3).map_err(db_err)?,
                        created_at: row.get(4).map_err(db_err)?,
                    });
                }
                Ok(documents)
            })
            .await
    }
}
