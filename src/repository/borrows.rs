//! Borrows repository: the transactional borrow/return workflow.
//!
//! Each operation is one all-or-nothing transaction. Correctness under
//! concurrent requests comes from row locks taken inside the transaction,
//! not from in-process synchronization: the borrower's user row serializes
//! per-user eligibility checks, the conditional stock update serializes
//! per-book mutations, and the borrow row lock makes returns idempotent.

use chrono::{DateTime, Duration, Utc};
use sqlx::{PgConnection, Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    config::CirculationConfig,
    error::{AppError, AppResult},
    models::borrow::{Borrow, BorrowDetails, BorrowStatus, CreateBorrow, Penalty},
    penalty::{PenaltyCalculator, PenaltyOutcome},
    repository::books::BooksRepository,
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrow by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Borrow> {
        sqlx::query_as::<_, Borrow>("SELECT * FROM borrows WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow with id {} not found", id)))
    }

    /// Borrow history for a user, newest first, with resolved book names
    pub async fn get_user_borrows(&self, user_id: Uuid) -> AppResult<Vec<BorrowDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT b.*,
                   (SELECT STRING_AGG(bk.name, ', ' ORDER BY bk.name)
                    FROM borrowed_books bb
                    JOIN books bk ON bk.id = bb.book_id
                    WHERE bb.borrow_id = b.id) AS books
            FROM borrows b
            WHERE b.user_id = $1
            ORDER BY b.borrowed_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let books: Option<String> = row.get("books");
            result.push(BorrowDetails {
                id: row.get("id"),
                user_id: row.get("user_id"),
                borrowed_at: row.get("borrowed_at"),
                return_deadline: row.get("return_deadline"),
                returned_at: row.get("returned_at"),
                status: row.get("status"),
                created_by: row.get("created_by"),
                books: books
                    .map(|b| b.split(", ").map(String::from).collect())
                    .unwrap_or_default(),
            });
        }

        Ok(result)
    }

    /// Penalties accrued by a user across all borrows, newest first
    pub async fn get_user_penalties(&self, user_id: Uuid) -> AppResult<Vec<Penalty>> {
        let penalties = sqlx::query_as::<_, Penalty>(
            r#"
            SELECT p.*
            FROM penalties p
            JOIN borrows b ON b.id = p.borrow_id
            WHERE b.user_id = $1
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(penalties)
    }

    /// Borrow books for a user as one atomic transaction.
    ///
    /// Eligibility (penalty, cap, duplicates) is checked under a lock of the
    /// borrower's user row before any insert; every requested book then gets
    /// a line item and a stock decrement. Any failure rolls the whole
    /// operation back, so no partial borrow is ever persisted.
    pub async fn create(
        &self,
        borrow: &CreateBorrow,
        policy: &CirculationConfig,
    ) -> AppResult<BorrowDetails> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        Self::check_eligibility(&mut tx, borrow.user_id, &borrow.book_ids, policy, now).await?;

        let return_deadline = now + Duration::days(policy.loan_period_days);

        let created = sqlx::query_as::<_, Borrow>(
            r#"
            INSERT INTO borrows (user_id, borrowed_at, return_deadline, status, created_by)
            VALUES ($1, $2, $3, 'borrowed', $4)
            RETURNING *
            "#,
        )
        .bind(borrow.user_id)
        .bind(now)
        .bind(return_deadline)
        .bind(&borrow.created_by)
        .fetch_one(&mut *tx)
        .await?;

        let mut book_names = Vec::with_capacity(borrow.book_ids.len());
        for book_id in &borrow.book_ids {
            // Defensive re-check under the open transaction; also rejects the
            // same book appearing twice in a single request.
            if Self::has_active_borrow(&mut tx, borrow.user_id, *book_id).await? {
                return Err(AppError::DuplicateActiveLoan(format!(
                    "User with id {} has already borrowed the book with id {}",
                    borrow.user_id, book_id
                )));
            }

            sqlx::query("INSERT INTO borrowed_books (borrow_id, book_id) VALUES ($1, $2)")
                .bind(created.id)
                .bind(book_id)
                .execute(&mut *tx)
                .await?;

            let name = BooksRepository::decrement_stock(&mut tx, *book_id).await?;
            book_names.push(name);
        }

        tx.commit().await?;

        tracing::info!(
            borrow_id = %created.id,
            user_id = %borrow.user_id,
            books = book_names.len(),
            "borrow created"
        );

        Ok(created.with_books(book_names))
    }

    /// Return a borrow as one atomic transaction.
    ///
    /// The borrow row is locked first, so of two concurrent returns only one
    /// sees the `borrowed` status and the other is rejected. A late return
    /// creates exactly one penalty row and penalizes the borrower; stock is
    /// restored for every line item either way.
    pub async fn return_borrow(
        &self,
        borrow_id: Uuid,
        policy: &CirculationConfig,
        calculator: &PenaltyCalculator,
    ) -> AppResult<BorrowDetails> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Borrow>("SELECT * FROM borrows WHERE id = $1 FOR UPDATE")
            .bind(borrow_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow with id {} not found", borrow_id)))?;

        if current.status.is_terminal() {
            return Err(AppError::AlreadyReturned(format!(
                "Borrow with id {} has already been returned",
                borrow_id
            )));
        }

        let now = Utc::now();

        let new_status = match calculator.evaluate(current.return_deadline, now) {
            PenaltyOutcome::OnTime => BorrowStatus::Returned,
            PenaltyOutcome::Late {
                overdue_days,
                amount,
            } => {
                sqlx::query("INSERT INTO penalties (borrow_id, total_amount) VALUES ($1, $2)")
                    .bind(borrow_id)
                    .bind(amount)
                    .execute(&mut *tx)
                    .await?;

                let penalty_until = now + Duration::days(policy.penalty_grace_days);
                sqlx::query(
                    "UPDATE users SET is_penalized = TRUE, penalty_until = $2, \
                     status = 'penalized', modified_at = NOW() WHERE id = $1",
                )
                .bind(current.user_id)
                .bind(penalty_until)
                .execute(&mut *tx)
                .await?;

                tracing::info!(
                    borrow_id = %borrow_id,
                    user_id = %current.user_id,
                    overdue_days,
                    amount,
                    "late return penalized"
                );

                BorrowStatus::Overdue
            }
        };

        let updated = sqlx::query_as::<_, Borrow>(
            r#"
            UPDATE borrows
            SET status = $2, returned_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(borrow_id)
        .bind(new_status)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let book_ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT book_id FROM borrowed_books WHERE borrow_id = $1 ORDER BY book_id",
        )
        .bind(borrow_id)
        .fetch_all(&mut *tx)
        .await?;

        let mut book_names = Vec::with_capacity(book_ids.len());
        for book_id in book_ids {
            // A vanished book row here is a data consistency bug, not a user
            // mistake; it aborts the whole return.
            let name = BooksRepository::increment_stock(&mut tx, book_id)
                .await
                .map_err(|err| match err {
                    AppError::NotFound(msg) => AppError::Integrity(format!(
                        "Borrow {} references a missing book: {}",
                        borrow_id, msg
                    )),
                    other => other,
                })?;
            book_names.push(name);
        }

        tx.commit().await?;

        Ok(updated.with_books(book_names))
    }

    /// Eligibility gate for a new borrow: active penalty, borrow cap and
    /// duplicate checks, in that order.
    ///
    /// Locks the borrower's user row first, so concurrent borrows by the same
    /// user serialize here and cannot interleave past the cap or duplicate
    /// checks. An expired penalty is cleared as a side effect of this check,
    /// not by any background job.
    async fn check_eligibility(
        conn: &mut PgConnection,
        user_id: Uuid,
        book_ids: &[Uuid],
        policy: &CirculationConfig,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let user = sqlx::query(
            "SELECT is_penalized, penalty_until FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))?;

        let is_penalized: bool = user.get("is_penalized");
        let penalty_until: Option<DateTime<Utc>> = user.get("penalty_until");
        if is_penalized {
            match penalty_until {
                Some(until) if until > now => {
                    return Err(AppError::PenaltyActive(format!(
                        "User with id {} is penalized until {}",
                        user_id, until
                    )));
                }
                _ => {
                    sqlx::query(
                        "UPDATE users SET is_penalized = FALSE, penalty_until = NULL, \
                         status = 'active', modified_at = NOW() WHERE id = $1",
                    )
                    .bind(user_id)
                    .execute(&mut *conn)
                    .await?;
                }
            }
        }

        let active_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM borrowed_books
            WHERE borrow_id IN (SELECT id FROM borrows WHERE user_id = $1 AND status != 'returned')
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        if active_count >= policy.max_active_borrows {
            return Err(AppError::BorrowCapExceeded(format!(
                "User with id {} already has {} borrowed books",
                user_id, active_count
            )));
        }

        for book_id in book_ids {
            if Self::has_active_borrow(&mut *conn, user_id, *book_id).await? {
                return Err(AppError::DuplicateActiveLoan(format!(
                    "User with id {} has already borrowed the book with id {}",
                    user_id, book_id
                )));
            }
        }

        Ok(())
    }

    async fn has_active_borrow(
        conn: &mut PgConnection,
        user_id: Uuid,
        book_id: Uuid,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM borrowed_books bb
                JOIN borrows b ON b.id = bb.borrow_id
                WHERE b.user_id = $1
                  AND b.status != 'returned'
                  AND bb.book_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(exists)
    }
}
