use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /users` and `PUT /users/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text("username", &self.username)?;
        require_text("email", &self.email)?;
        require_text("full_name", &self.full_name)?;
        if !self.email.contains('@') {
            return Err(AppError::ValidationError(format!(
                "email '{}' is not a valid address",
                self.email
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Address {
    pub id: i32,
    pub user_id: i32,
    pub country: String,
    pub city: String,
    pub street: String,
    pub house_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /addresses`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAddress {
    pub user_id: i32,
    pub country: String,
    pub city: String,
    pub street: String,
    #[serde(default)]
    pub house_number: Option<String>,
}

impl NewAddress {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text("country", &self.country)?;
        require_text("city", &self.city)?;
        require_text("street", &self.street)
    }
}

/// Optional filters for `GET /users/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserSearch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

/// How `GET /users/search/{idOrUsername}` interprets its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Id(i32),
    Username(String),
}

impl UserLookup {
    /// All-digit input is an id, anything else a username. `None` when the
    /// digits cannot fit an id, so no user can match.
    pub fn parse(input: &str) -> Option<Self> {
        if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
            input.parse().ok().map(UserLookup::Id)
        } else {
            Some(UserLookup::Username(input.to_string()))
        }
    }
}

/// An `{id}` path segment.
///
/// Integers that do not fit a row id are kept apart from garbage input:
/// they are well-formed but can never match, so routes answer "not found"
/// (or `exists: false`) instead of rejecting the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathId {
    Id(i32),
    OutOfRange(String),
}

impl PathId {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if let Ok(id) = raw.parse::<i32>() {
            return Ok(PathId::Id(id));
        }
        let digits = raw.strip_prefix('-').unwrap_or(raw);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            Ok(PathId::OutOfRange(raw.to_string()))
        } else {
            Err(AppError::ValidationError(format!(
                "'{}' is not a valid integer id",
                raw
            )))
        }
    }

    /// The id for a query, or NotFound with `message` when no row can match.
    pub fn or_not_found(&self, message: &str) -> Result<i32, AppError> {
        match self {
            PathId::Id(id) => Ok(*id),
            PathId::OutOfRange(_) => Err(AppError::NotFound(message.to_string())),
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{} must not be empty", field)));
    }
    Ok(())
}
