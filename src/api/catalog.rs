//! Catalog endpoints for board games and books.
//!
//! Reads are public; creation needs any authenticated role and
//! update/delete are admin only. The role check runs before the ID is even
//! parsed, so a non-admin gets 403 regardless of whether the item exists.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        catalog::{
            BoardGame, Book, CreateBoardGame, CreateBook, UpdateBoardGame, UpdateBook,
        },
        user::Role,
    },
};

use super::AuthenticatedUser;

/// List all board games
#[utoipa::path(
    get,
    path = "/boardgames",
    tag = "boardgames",
    responses(
        (status = 200, description = "List of board games", body = Vec<BoardGame>)
    )
)]
pub async fn list_boardgames(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BoardGame>>> {
    let games = state.services.catalog.list_boardgames().await?;
    Ok(Json(games))
}

/// Get a board game by ID
#[utoipa::path(
    get,
    path = "/boardgames/{id}",
    tag = "boardgames",
    params(("id" = String, Path, description = "Board game ID")),
    responses(
        (status = 200, description = "Board game details", body = BoardGame),
        (status = 400, description = "Invalid ID format", body = crate::error::ErrorResponse),
        (status = 404, description = "Board game not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_boardgame(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BoardGame>> {
    let game = state.services.catalog.get_boardgame(&id).await?;
    Ok(Json(game))
}

/// Create a new board game
#[utoipa::path(
    post,
    path = "/boardgames",
    tag = "boardgames",
    security(("bearer_auth" = [])),
    request_body = CreateBoardGame,
    responses(
        (status = 201, description = "Board game created", body = BoardGame),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_boardgame(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBoardGame>,
) -> AppResult<(StatusCode, Json<BoardGame>)> {
    claims.require_role(&[Role::Admin, Role::User])?;

    let game = state.services.catalog.create_boardgame(request).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

/// Update an existing board game (admin only)
#[utoipa::path(
    put,
    path = "/boardgames/{id}",
    tag = "boardgames",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Board game ID")),
    request_body = UpdateBoardGame,
    responses(
        (status = 200, description = "Board game updated", body = BoardGame),
        (status = 400, description = "Invalid input or ID format", body = crate::error::ErrorResponse),
        (status = 403, description = "Not an admin", body = crate::error::ErrorResponse),
        (status = 404, description = "Board game not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_boardgame(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateBoardGame>,
) -> AppResult<Json<BoardGame>> {
    claims.require_admin()?;

    let game = state.services.catalog.update_boardgame(&id, request).await?;
    Ok(Json(game))
}

/// Delete a board game (admin only)
#[utoipa::path(
    delete,
    path = "/boardgames/{id}",
    tag = "boardgames",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Board game ID")),
    responses(
        (status = 204, description = "Board game deleted"),
        (status = 400, description = "Invalid ID format", body = crate::error::ErrorResponse),
        (status = 403, description = "Not an admin", body = crate::error::ErrorResponse),
        (status = 404, description = "Board game not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_boardgame(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.catalog.delete_boardgame(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "List of books", body = Vec<Book>)
    )
)]
pub async fn list_books(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 400, description = "Invalid ID format", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(&id).await?;
    Ok(Json(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require_role(&[Role::Admin, Role::User])?;

    let book = state.services.catalog.create_book(request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update an existing book (admin only)
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input or ID format", body = crate::error::ErrorResponse),
        (status = 403, description = "Not an admin", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    claims.require_admin()?;

    let book = state.services.catalog.update_book(&id, request).await?;
    Ok(Json(book))
}

/// Delete a book (admin only)
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 400, description = "Invalid ID format", body = crate::error::ErrorResponse),
        (status = 403, description = "Not an admin", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.catalog.delete_book(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
