use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

pub const USERS_TABLE: &str = "users";
pub const SESSIONS_TABLE: &str = "sessions";

/// Column order shared by inserts, selects and row mapping.
pub const USER_FIELDS: [&str; 8] = [
    "id",
    "first_name",
    "last_name",
    "birth_date",
    "sex",
    "biography",
    "city",
    "password_hash",
];

pub const SESSION_FIELDS: [&str; 2] = ["user_id", "token"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            other => Err(format!("unknown sex value {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub sex: Sex,
    pub biography: String,
    pub city: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: Uuid,
    pub token: String,
}

impl Session {
    /// Issues a session with a fresh random v4 token.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            token: Uuid::new_v4().to_string(),
        }
    }
}
