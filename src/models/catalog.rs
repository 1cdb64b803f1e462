//! Catalog item models (board games and books)
//!
//! The two collections are independent and symmetric; a loan refers to one of
//! them through an (`ItemType`, id) pair, never an untyped reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Discriminator for the two catalog collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ItemType {
    BoardGame,
    Book,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::BoardGame => "BoardGame",
            ItemType::Book => "Book",
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BoardGame" => Ok(ItemType::BoardGame),
            "Book" => Ok(ItemType::Book),
            _ => Err(format!("Invalid item type: {}", s)),
        }
    }
}

/// Internal row structure for board game queries
#[derive(Debug, Clone, FromRow)]
pub struct BoardGameRow {
    id: String,
    title: String,
    designer: Option<String>,
    genre: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BoardGameRow> for BoardGame {
    fn from(row: BoardGameRow) -> Self {
        BoardGame {
            id: Uuid::parse_str(&row.id).unwrap_or_default(),
            title: row.title,
            designer: row.designer,
            genre: row.genre,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Board game catalog record
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardGame {
    pub id: Uuid,
    pub title: String,
    pub designer: Option<String>,
    pub genre: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Internal row structure for book queries
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    id: String,
    title: String,
    author: String,
    genre: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: Uuid::parse_str(&row.id).unwrap_or_default(),
            title: row.title,
            author: row.author,
            genre: row.genre,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Book catalog record
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create board game request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBoardGame {
    #[validate(
        required(message = "Title is required for board game"),
        length(min = 1, message = "Title is required for board game")
    )]
    pub title: Option<String>,
    pub designer: Option<String>,
    pub genre: Option<String>,
}

/// Update board game request (partial)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBoardGame {
    pub title: Option<String>,
    pub designer: Option<String>,
    pub genre: Option<String>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(
        required(message = "Title and Author are required for book"),
        length(min = 1, message = "Title and Author are required for book")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "Title and Author are required for book"),
        length(min = 1, message = "Title and Author are required for book")
    )]
    pub author: Option<String>,
    pub genre: Option<String>,
}

/// Update book request (partial)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_type_parses_wire_values() {
        assert_eq!("BoardGame".parse::<ItemType>().unwrap(), ItemType::BoardGame);
        assert_eq!("Book".parse::<ItemType>().unwrap(), ItemType::Book);
        assert!("boardgame".parse::<ItemType>().is_err());
        assert!("Cd".parse::<ItemType>().is_err());
        assert_eq!(ItemType::BoardGame.to_string(), "BoardGame");
    }

    #[test]
    fn create_book_requires_title_and_author() {
        let missing_author = CreateBook {
            title: Some("Dune".to_string()),
            author: None,
            genre: None,
        };
        assert!(missing_author.validate().is_err());

        let complete = CreateBook {
            title: Some("Dune".to_string()),
            author: Some("Frank Herbert".to_string()),
            genre: Some("Science Fiction".to_string()),
        };
        assert!(complete.validate().is_ok());
    }
}
