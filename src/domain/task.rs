//! Task Entity
//!
//! A kanban card. Tasks are ordered within their section and may carry
//! comments and links to documents, which live and die with the task.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Normal,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Normal => "normal",
            TaskPriority::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "low" => TaskPriority::Low,
            "high" => TaskPriority::High,
            _ => TaskPriority::Normal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u32,
    /// Owning section
    pub section_id: u32,
    pub title: String,
    /// Markdown body
    pub content: Option<String>,
    pub priority: TaskPriority,
    /// Due date, unix millis
    pub due_at: Option<i64>,
    /// Position within the section, assigned by the reindexer
    pub position: u32,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Task {
    pub fn new(id: u32, section_id: u32, title: String) -> Self {
        Self {
            id,
            section_id,
            title,
            content: None,
            priority: TaskPriority::default(),
            due_at: None,
            position: 0,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Entity for Task {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskComment {
    pub id: u32,
    pub task_id: u32,
    pub body: String,
    pub created_at: i64,
}

/// Link from a task to an external document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDocument {
    pub id: u32,
    pub task_id: u32,
    pub name: String,
    pub url: String,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let task = Task::new(1, 4, "Write report".to_string());
        assert_eq!(task.id(), 1);
        assert_eq!(task.section_id, 4);
        assert_eq!(task.priority, TaskPriority::Normal);
        assert!(task.content.is_none());
    }

    #[test]
    fn test_priority_parsing() {
        assert_eq!(TaskPriority::from_str("high"), TaskPriority::High);
        assert_eq!(TaskPriority::from_str("urgent"), TaskPriority::Normal);
        assert_eq!(TaskPriority::Low.as_str(), "low");
    }

    #[test]
    fn test_priority_serialization() {
        let json = serde_json::to_string(&TaskPriority::High).unwrap();
        assert_eq!(json, "\"high\"");
    }
}
