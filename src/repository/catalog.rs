//! Catalog repositories for database operations.
//!
//! Board games and books are independent collections with symmetric schemas,
//! so the two repositories mirror each other deliberately.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::catalog::{BoardGame, BoardGameRow, Book, BookRow},
};

#[derive(Clone)]
pub struct BoardGamesRepository {
    pool: SqlitePool,
}

impl BoardGamesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all board games in storage order
    pub async fn list(&self) -> AppResult<Vec<BoardGame>> {
        let rows = sqlx::query_as::<_, BoardGameRow>("SELECT * FROM boardgames ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(BoardGame::from).collect())
    }

    /// Get board game by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BoardGame> {
        sqlx::query_as::<_, BoardGameRow>("SELECT * FROM boardgames WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(BoardGame::from)
            .ok_or_else(|| AppError::NotFound("Board game not found".to_string()))
    }

    /// Check whether a board game exists
    pub async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM boardgames WHERE id = ?)")
                .bind(id.to_string())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a new board game
    pub async fn create(
        &self,
        title: &str,
        designer: Option<&str>,
        genre: Option<&str>,
    ) -> AppResult<BoardGame> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO boardgames (id, title, designer, genre, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(title)
        .bind(designer)
        .bind(genre)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update an existing board game (caller supplies the merged field set)
    pub async fn update(
        &self,
        id: Uuid,
        title: &str,
        designer: Option<&str>,
        genre: Option<&str>,
    ) -> AppResult<BoardGame> {
        let result = sqlx::query(
            "UPDATE boardgames SET title = ?, designer = ?, genre = ?, updated_at = ? WHERE id = ?",
        )
        .bind(title)
        .bind(designer)
        .bind(genre)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Board game not found".to_string()));
        }

        self.get_by_id(id).await
    }

    /// Delete a board game
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM boardgames WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Board game not found".to_string()));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: SqlitePool,
}

impl BooksRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all books in storage order
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>("SELECT * FROM books ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        sqlx::query_as::<_, BookRow>("SELECT * FROM books WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Book::from)
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Check whether a book exists
    pub async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = ?)")
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Create a new book
    pub async fn create(
        &self,
        title: &str,
        author: &str,
        genre: Option<&str>,
    ) -> AppResult<Book> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO books (id, title, author, genre, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(title)
        .bind(author)
        .bind(genre)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update an existing book (caller supplies the merged field set)
    pub async fn update(
        &self,
        id: Uuid,
        title: &str,
        author: &str,
        genre: Option<&str>,
    ) -> AppResult<Book> {
        let result = sqlx::query(
            "UPDATE books SET title = ?, author = ?, genre = ?, updated_at = ? WHERE id = ?",
        )
        .bind(title)
        .bind(author)
        .bind(genre)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Book not found".to_string()));
        }

        self.get_by_id(id).await
    }

    /// Delete a book
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Book not found".to_string()));
        }
        Ok(())
    }
}
