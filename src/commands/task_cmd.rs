//! Commands for Task CRUD, ordering and attachments

use crate::domain::{PositionMap, Task, TaskComment, TaskDocument, TaskPriority};
use crate::repository::{Repository, TaskAttachmentOperations, TaskPositioningOperations};
use crate::AppState;
use super::user_error;

/// Create a task at the bottom of a section
pub async fn create_task(
    state: &AppState,
    section_id: u32,
    title: String,
    content: Option<String>,
    priority: Option<String>,
) -> Result<Task, String> {
    let mut task = Task::new(0, section_id, title);
    task.content = content;
    task.priority = priority.map(|p| TaskPriority::from_str(&p)).unwrap_or_default();

    state.tasks.create(&task).await.map_err(|e| user_error("create_task", e))
}

/// Tasks of a section in display order
pub async fn list_tasks(state: &AppState, section_id: u32) -> Result<Vec<Task>, String> {
    state
        .tasks
        .list_by_section(section_id)
        .await
        .map_err(|e| user_error("list_tasks", e))
}

/// Get task by ID
pub async fn get_task(state: &AppState, id: u32) -> Result<Option<Task>, String> {
    state.tasks.find_by_id(id).await.map_err(|e| user_error("get_task", e))
}

/// Update task fields; `None` keeps the current value
pub async fn update_task(
    state: &AppState,
    id: u32,
    title: Option<String>,
    content: Option<String>,
    priority: Option<String>,
    due_at: Option<i64>,
) -> Result<Task, String> {
    let mut task = state
        .tasks
        .find_by_id(id)
        .await
        .map_err(|e| user_error("update_task", e))?
        .ok_or_else(|| format!("Task {} not found", id))?;

    if let Some(title) = title {
        task.title = title;
    }
    if content.is_some() {
        task.content = content;
    }
    if let Some(priority) = priority {
        task.priority = TaskPriority::from_str(&priority);
    }
    if due_at.is_some() {
        task.due_at = due_at;
    }

    state.tasks.update(&task).await.map_err(|e| user_error("update_task", e))
}

/// Delete a task with its comments and document links
pub async fn delete_task(state: &AppState, id: u32) -> Result<(), String> {
    state.tasks.delete(id).await.map_err(|e| user_error("delete_task", e))
}

/// Apply a card drag: `ordered_ids` is the final order of the destination
/// section, exactly as the client shows it
pub async fn move_tasks(
    state: &AppState,
    source_section_id: u32,
    dest_section_id: u32,
    ordered_ids: Vec<u32>,
) -> Result<PositionMap, String> {
    state
        .tasks
        .move_tasks(source_section_id, dest_section_id, &ordered_ids)
        .await
        .map_err(|e| user_error("move_tasks", e))
}

pub async fn add_task_comment(state: &AppState, task_id: u32, body: String) -> Result<TaskComment, String> {
    state
        .tasks
        .add_comment(task_id, &body)
        .await
        .map_err(|e| user_error("add_task_comment", e))
}

pub async fn list_task_comments(state: &AppState, task_id: u32) -> Result<Vec<TaskComment>, String> {
    state
        .tasks
        .list_comments(task_id)
        .await
        .map_err(|e| user_error("list_task_comments", e))
}

pub async fn link_task_document(
    state: &AppState,
    task_id: u32,
    name: String,
    url: String,
) -> Result<TaskDocument, String> {
    state
        .tasks
        .link_document(task_id, &name, &url)
        .await
        .map_err(|e| user_error("link_task_document", e))
}

pub async fn list_task_documents(state: &AppState, task_id: u32) -> Result<Vec<TaskDocument>, String> {
    state
        .tasks
        .list_documents(task_id)
        .await
        .map_err(|e| user_error("list_task_documents", e))
}
