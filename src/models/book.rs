//! Book (catalog) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Internal row structure for book queries; genres arrive as one
/// aggregated string column
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub authors: Option<String>,
    pub publisher: Option<String>,
    pub publish_year: Option<i32>,
    pub stock: i32,
    pub borrowed: i32,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub modified_at: DateTime<Utc>,
    pub modified_by: Option<String>,
    pub genres: Option<String>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        let genres = row
            .genres
            .map(|g| g.split(", ").map(String::from).collect())
            .unwrap_or_default();

        Book {
            id: row.id,
            name: row.name,
            description: row.description,
            authors: row.authors,
            publisher: row.publisher,
            publish_year: row.publish_year,
            stock: row.stock,
            borrowed: row.borrowed,
            genres,
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
        }
    }
}

/// Book model with resolved genre names
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub authors: Option<String>,
    pub publisher: Option<String>,
    pub publish_year: Option<i32>,
    /// Copies available for borrowing
    pub stock: i32,
    /// Copies currently out on loan
    pub borrowed: i32,
    pub genres: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub modified_at: DateTime<Utc>,
    pub modified_by: Option<String>,
}

/// Book search parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    pub name: Option<String>,
    pub authors: Option<String>,
    pub publisher: Option<String>,
    pub publish_year: Option<i32>,
    /// Comma-separated genre names
    pub genres: Option<String>,
    /// Genre match mode: "any" (default) or "all"
    pub genre_match: Option<String>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Book name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub authors: Option<String>,
    pub publisher: Option<String>,
    pub publish_year: Option<i32>,
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: i32,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Book name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub authors: Option<String>,
    pub publisher: Option<String>,
    pub publish_year: Option<i32>,
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: Option<i32>,
    pub genres: Option<Vec<String>>,
}
