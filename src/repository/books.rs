//! Books repository for catalog CRUD and the stock ledger

use sqlx::{PgConnection, Pool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, BookRow, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID with resolved genre names
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT b.*,
                   (SELECT STRING_AGG(g.name, ', ' ORDER BY g.name)
                    FROM book_genres bg
                    JOIN genres g ON g.id = bg.genre_id
                    WHERE bg.book_id = b.id) AS genres
            FROM books b
            WHERE b.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(row.into())
    }

    /// Search books with optional field and genre filters
    pub async fn search(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT b.*,
                   (SELECT STRING_AGG(g.name, ', ' ORDER BY g.name)
                    FROM book_genres bg
                    JOIN genres g ON g.id = bg.genre_id
                    WHERE bg.book_id = b.id) AS genres
            FROM books b
            WHERE 1=1
            "#,
        );

        if let Some(ref name) = query.name {
            builder.push(" AND b.name ILIKE ");
            builder.push_bind(format!("%{}%", name));
        }
        if let Some(ref authors) = query.authors {
            builder.push(" AND b.authors ILIKE ");
            builder.push_bind(format!("%{}%", authors));
        }
        if let Some(ref publisher) = query.publisher {
            builder.push(" AND b.publisher ILIKE ");
            builder.push_bind(format!("%{}%", publisher));
        }
        if let Some(year) = query.publish_year {
            builder.push(" AND b.publish_year = ");
            builder.push_bind(year);
        }

        if let Some(ref genres) = query.genres {
            let names: Vec<String> = genres
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();

            if !names.is_empty() {
                self.validate_genres(&names).await?;

                let genre_match = query.genre_match.as_deref().unwrap_or("any");
                if genre_match != "any" && genre_match != "all" {
                    return Err(AppError::Validation(
                        "genre_match must be \"any\" or \"all\"".to_string(),
                    ));
                }

                builder.push(
                    " AND EXISTS (SELECT 1 FROM book_genres bg JOIN genres g ON g.id = bg.genre_id \
                     WHERE bg.book_id = b.id AND g.name = ANY(",
                );
                builder.push_bind(names.clone());
                builder.push("))");

                if genre_match == "all" {
                    builder.push(
                        " AND (SELECT COUNT(DISTINCT g2.name) FROM book_genres bg2 \
                         JOIN genres g2 ON g2.id = bg2.genre_id \
                         WHERE bg2.book_id = b.id AND g2.name = ANY(",
                    );
                    builder.push_bind(names.clone());
                    builder.push(")) = ");
                    builder.push_bind(names.len() as i64);
                }
            }
        }

        builder.push(" ORDER BY b.name");

        let rows = builder
            .build_query_as::<BookRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    /// Create a book and its genre links in one transaction
    pub async fn create(&self, book: &CreateBook, created_by: &str) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO books (name, description, authors, publisher, publish_year, stock, created_by, modified_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING id
            "#,
        )
        .bind(&book.name)
        .bind(&book.description)
        .bind(&book.authors)
        .bind(&book.publisher)
        .bind(book.publish_year)
        .bind(book.stock)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        Self::link_genres(&mut tx, id, &book.genres).await?;

        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Update a book; replaces genre links only when genres are provided
    pub async fn update(&self, id: Uuid, book: &UpdateBook, modified_by: &str) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE books
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                authors = COALESCE($4, authors),
                publisher = COALESCE($5, publisher),
                publish_year = COALESCE($6, publish_year),
                stock = COALESCE($7, stock),
                modified_at = NOW(),
                modified_by = $8
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&book.name)
        .bind(&book.description)
        .bind(&book.authors)
        .bind(&book.publisher)
        .bind(book.publish_year)
        .bind(book.stock)
        .bind(modified_by)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        if let Some(ref genres) = book.genres {
            sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::link_genres(&mut tx, id, genres).await?;
        }

        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Delete a book; refused while copies are out on loan
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let borrowed: Option<i32> = sqlx::query_scalar("SELECT borrowed FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let borrowed =
            borrowed.ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        if borrowed > 0 {
            return Err(AppError::Conflict(format!(
                "Book with id {} has {} copies out on loan",
                id, borrowed
            )));
        }

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn link_genres(conn: &mut PgConnection, book_id: Uuid, genres: &[String]) -> AppResult<()> {
        for name in genres {
            let genre_id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM genres WHERE name = $1")
                .bind(name)
                .fetch_optional(&mut *conn)
                .await?;

            let genre_id = genre_id
                .ok_or_else(|| AppError::NotFound(format!("Genre \"{}\" does not exist", name)))?;

            sqlx::query(
                "INSERT INTO book_genres (book_id, genre_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(book_id)
            .bind(genre_id)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    async fn validate_genres(&self, names: &[String]) -> AppResult<()> {
        let known: Vec<String> = sqlx::query_scalar("SELECT name FROM genres WHERE name = ANY($1)")
            .bind(names)
            .fetch_all(&self.pool)
            .await?;

        for name in names {
            if !known.contains(name) {
                return Err(AppError::NotFound(format!("Genre \"{}\" does not exist", name)));
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Stock ledger
    //
    // Both mutations run on the caller's connection so they participate in
    // the enclosing borrow/return transaction. The conditional UPDATE is the
    // atomic read-modify-write: the row lock it takes serializes concurrent
    // borrows of the same book, so stock never drops below zero and
    // stock + borrowed is conserved.
    // ------------------------------------------------------------------

    /// Take one copy out: stock -= 1, borrowed += 1. Returns the book name.
    pub async fn decrement_stock(conn: &mut PgConnection, book_id: Uuid) -> AppResult<String> {
        let row = sqlx::query(
            r#"
            UPDATE books
            SET stock = stock - 1,
                borrowed = borrowed + 1
            WHERE id = $1 AND stock > 0
            RETURNING name
            "#,
        )
        .bind(book_id)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(row) = row {
            return Ok(row.get("name"));
        }

        // Zero rows updated: either the book is gone or it is out of stock
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(book_id)
            .fetch_one(&mut *conn)
            .await?;

        if exists {
            Err(AppError::InsufficientStock(format!(
                "Book with id {} has no available copies",
                book_id
            )))
        } else {
            Err(AppError::NotFound(format!("Book with id {} not found", book_id)))
        }
    }

    /// Put one copy back: stock += 1, borrowed -= 1. Returns the book name.
    ///
    /// Callers must only restore stock for books confirmed present in a
    /// borrow's line items; there is no guard against driving borrowed
    /// negative beyond the schema constraint.
    pub async fn increment_stock(conn: &mut PgConnection, book_id: Uuid) -> AppResult<String> {
        sqlx::query(
            r#"
            UPDATE books
            SET stock = stock + 1,
                borrowed = borrowed - 1
            WHERE id = $1
            RETURNING name
            "#,
        )
        .bind(book_id)
        .fetch_optional(&mut *conn)
        .await?
        .map(|row| row.get("name"))
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))
    }
}
