//! Repository layer for database operations

pub mod catalog;
pub mod loans;
pub mod users;

use sqlx::SqlitePool;

/// Main repository struct holding the database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: SqlitePool,
    pub users: users::UsersRepository,
    pub boardgames: catalog::BoardGamesRepository,
    pub books: catalog::BooksRepository,
    pub loans: loans::LoansRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            boardgames: catalog::BoardGamesRepository::new(pool.clone()),
            books: catalog::BooksRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            pool,
        }
    }
}
