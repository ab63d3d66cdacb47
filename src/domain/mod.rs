//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO external dependencies (except serde for serialization).

mod entity;
mod board;
mod section;
mod task;
mod ordered_item;

pub use entity::{Entity, DomainError, DomainResult};
pub use board::Board;
pub use section::Section;
pub use task::{Task, TaskComment, TaskDocument, TaskPriority};
pub use ordered_item::{is_dense, OrderScope, OrderedItem, PositionMap, SECTIONS_IN_BOARD, TASKS_IN_SECTION};
