//! Board Entity
//!
//! A board owns an ordered list of sections.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: u32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Board {
    pub fn new(id: u32, name: String) -> Self {
        Self {
            id,
            name,
            description: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Entity for Board {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}
