use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Customer record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: Uuid,                     // internal ID, JWT subject
    pub login_id: String,             // user-chosen ID, immutable
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,        // Argon2 hash, not exposed in JSON
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub gender: Option<String>,       // "M" | "F"
    pub height: Option<f64>,
    pub created_at: OffsetDateTime,
}

impl Customer {
    pub fn gender(&self) -> Option<Gender> {
        self.gender.as_deref().and_then(Gender::parse)
    }

    pub fn body_attrs(&self) -> BodyAttrs {
        BodyAttrs {
            weight: self.weight,
            age: self.age,
            gender: self.gender(),
            height: self.height,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    M,
    F,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::M => "M",
            Gender::F => "F",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "M" | "m" => Some(Gender::M),
            "F" | "f" => Some(Gender::F),
            _ => None,
        }
    }
}

/// Body attributes written on signup and profile updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyAttrs {
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub height: Option<f64>,
}

impl BodyAttrs {
    /// Fields set in `patch` win; unset ones keep the current value.
    pub fn merged(self, patch: BodyAttrs) -> BodyAttrs {
        BodyAttrs {
            weight: patch.weight.or(self.weight),
            age: patch.age.or(self.age),
            gender: patch.gender.or(self.gender),
            height: patch.height.or(self.height),
        }
    }
}
