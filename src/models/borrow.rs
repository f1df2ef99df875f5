//! Borrow (loan) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle status of a borrow record.
///
/// `Borrowed` is the only non-terminal state; `Returned` and `Overdue` are
/// final and a borrow is never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Borrowed,
    Returned,
    Overdue,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Borrowed => "borrowed",
            BorrowStatus::Returned => "returned",
            BorrowStatus::Overdue => "overdue",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BorrowStatus::Borrowed)
    }
}

impl std::fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BorrowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "borrowed" => Ok(BorrowStatus::Borrowed),
            "returned" => Ok(BorrowStatus::Returned),
            "overdue" => Ok(BorrowStatus::Overdue),
            _ => Err(format!("Invalid borrow status: {}", s)),
        }
    }
}

// SQLx conversion: borrow status is stored as TEXT
impl sqlx::Type<Postgres> for BorrowStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BorrowStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BorrowStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Borrow record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub return_deadline: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
    pub created_by: Option<String>,
}

impl Borrow {
    /// Attach resolved book names for the API response
    pub fn with_books(self, books: Vec<String>) -> BorrowDetails {
        BorrowDetails {
            id: self.id,
            user_id: self.user_id,
            borrowed_at: self.borrowed_at,
            return_deadline: self.return_deadline,
            returned_at: self.returned_at,
            status: self.status,
            created_by: self.created_by,
            books,
        }
    }
}

/// Borrow record with resolved book names
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowDetails {
    pub id: Uuid,
    pub user_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub return_deadline: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
    pub created_by: Option<String>,
    pub books: Vec<String>,
}

/// Borrow creation input assembled by the API layer
#[derive(Debug, Clone)]
pub struct CreateBorrow {
    pub user_id: Uuid,
    pub book_ids: Vec<Uuid>,
    pub created_by: String,
}

/// Penalty record created for a late return
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Penalty {
    pub id: Uuid,
    pub borrow_id: Uuid,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            BorrowStatus::Borrowed,
            BorrowStatus::Returned,
            BorrowStatus::Overdue,
        ] {
            assert_eq!(status.as_str().parse::<BorrowStatus>(), Ok(status));
        }
    }

    #[test]
    fn only_borrowed_is_non_terminal() {
        assert!(!BorrowStatus::Borrowed.is_terminal());
        assert!(BorrowStatus::Returned.is_terminal());
        assert!(BorrowStatus::Overdue.is_terminal());
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("renewed".parse::<BorrowStatus>().is_err());
    }
}
