use serde::{Deserialize, Serialize};

use uuid::Uuid;

use super::Role;

/// An authenticated caller, as vouched for by the identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    #[serde(rename = "sub")]
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn customer(id: Uuid) -> Self {
        Self {
            id,
            role: Role::Customer,
        }
    }

    pub fn restaurant(id: Uuid) -> Self {
        Self {
            id,
            role: Role::Restaurant,
        }
    }

    pub fn is(&self, id: Uuid) -> bool {
        self.id == id
    }
}
