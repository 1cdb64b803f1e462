//! Catalog management service

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::catalog::{
        BoardGame, Book, CreateBoardGame, CreateBook, UpdateBoardGame, UpdateBook,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all board games
    pub async fn list_boardgames(&self) -> AppResult<Vec<BoardGame>> {
        self.repository.boardgames.list().await
    }

    /// Get a board game by its (string) ID
    pub async fn get_boardgame(&self, id: &str) -> AppResult<BoardGame> {
        self.repository.boardgames.get_by_id(parse_id(id)?).await
    }

    /// Create a new board game
    pub async fn create_boardgame(&self, request: CreateBoardGame) -> AppResult<BoardGame> {
        request.validate()?;
        let title = request.title.unwrap_or_default();
        self.repository
            .boardgames
            .create(&title, request.designer.as_deref(), request.genre.as_deref())
            .await
    }

    /// Update a board game; absent fields keep their stored value
    pub async fn update_boardgame(
        &self,
        id: &str,
        request: UpdateBoardGame,
    ) -> AppResult<BoardGame> {
        let id = parse_id(id)?;
        let existing = self.repository.boardgames.get_by_id(id).await?;

        let title = request.title.unwrap_or(existing.title);
        if title.trim().is_empty() {
            return Err(AppError::Validation(
                "Title is required for board game".to_string(),
            ));
        }
        let designer = request.designer.or(existing.designer);
        let genre = request.genre.or(existing.genre);

        self.repository
            .boardgames
            .update(id, &title, designer.as_deref(), genre.as_deref())
            .await
    }

    /// Delete a board game
    pub async fn delete_boardgame(&self, id: &str) -> AppResult<()> {
        self.repository.boardgames.delete(parse_id(id)?).await
    }

    /// List all books
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    /// Get a book by its (string) ID
    pub async fn get_book(&self, id: &str) -> AppResult<Book> {
        self.repository.books.get_by_id(parse_id(id)?).await
    }

    /// Create a new book
    pub async fn create_book(&self, request: CreateBook) -> AppResult<Book> {
        request.validate()?;
        let title = request.title.unwrap_or_default();
        let author = request.author.unwrap_or_default();
        self.repository
            .books
            .create(&title, &author, request.genre.as_deref())
            .await
    }

    /// Update a book; absent fields keep their stored value
    pub async fn update_book(&self, id: &str, request: UpdateBook) -> AppResult<Book> {
        let id = parse_id(id)?;
        let existing = self.repository.books.get_by_id(id).await?;

        let title = request.title.unwrap_or(existing.title);
        let author = request.author.unwrap_or(existing.author);
        if title.trim().is_empty() || author.trim().is_empty() {
            return Err(AppError::Validation(
                "Title and Author are required for book".to_string(),
            ));
        }
        let genre = request.genre.or(existing.genre);

        self.repository
            .books
            .update(id, &title, &author, genre.as_deref())
            .await
    }

    /// Delete a book
    pub async fn delete_book(&self, id: &str) -> AppResult<()> {
        self.repository.books.delete(parse_id(id)?).await
    }
}

fn parse_id(id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::InvalidId("Invalid ID format".to_string()))
}
