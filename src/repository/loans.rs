//! Loans repository for database operations

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        catalog::{BoardGameRow, BookRow, ItemType},
        loan::{Loan, LoanDetails, LoanDetailsRow, LoanItem, LoanRow, LoanStatus, NewLoan},
    },
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: SqlitePool,
}

impl LoansRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Loan> {
        sqlx::query_as::<_, LoanRow>("SELECT * FROM loans WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Loan::from)
            .ok_or_else(|| AppError::NotFound(format!("Loan with ID {} not found.", id)))
    }

    /// Create a new loan (borrow an item).
    ///
    /// The at-most-one-active-loan invariant is carried by the partial unique
    /// index on (item_id, item_type) WHERE return_date IS NULL, so the insert
    /// itself fails on a concurrent duplicate borrow; there is no
    /// check-then-insert window.
    pub async fn create(&self, new: &NewLoan) -> AppResult<Loan> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO loans (
                id, item_id, item_type, borrower_name, loan_date, due_date,
                return_date, loaned_by_user_id, returned_by_user_id,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, NULL, ?, NULL, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(new.item_id.to_string())
        .bind(new.item_type.as_str())
        .bind(&new.borrower_name)
        .bind(now)
        .bind(new.due_date)
        .bind(new.loaned_by_user_id.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => self.get_by_id(id).await,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::Conflict(format!(
                    "{} with ID {} is already on loan.",
                    new.item_type, new.item_id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Return a loan, exactly once.
    ///
    /// The update is conditional on return_date still being NULL; a loan that
    /// was already returned (or returned concurrently) is a conflict, never a
    /// silent success.
    pub async fn return_loan(&self, id: Uuid, returned_by_user_id: Uuid) -> AppResult<Loan> {
        let loan = self.get_by_id(id).await?;

        if loan.return_date.is_some() {
            return Err(AppError::Conflict(format!(
                "Loan with ID {} has already been returned.",
                id
            )));
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET return_date = ?, returned_by_user_id = ?, updated_at = ?
            WHERE id = ? AND return_date IS NULL
            "#,
        )
        .bind(now)
        .bind(returned_by_user_id.to_string())
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Loan with ID {} has already been returned.",
                id
            )));
        }

        self.get_by_id(id).await
    }

    /// List loans matching the filter, enriched for display with the
    /// referenced catalog item and the loaning/returning usernames.
    pub async fn list(
        &self,
        status: Option<LoanStatus>,
        borrower_name: Option<&str>,
    ) -> AppResult<Vec<LoanDetails>> {
        let mut sql = String::from(
            r#"
            SELECT l.*, lu.username AS loaned_by_username, ru.username AS returned_by_username
            FROM loans l
            LEFT JOIN users lu ON lu.id = l.loaned_by_user_id
            LEFT JOIN users ru ON ru.id = l.returned_by_user_id
            "#,
        );

        let mut conditions: Vec<&str> = Vec::new();
        match status {
            Some(LoanStatus::Loaned) => conditions.push("l.return_date IS NULL"),
            Some(LoanStatus::Returned) => conditions.push("l.return_date IS NOT NULL"),
            None => {}
        }
        if borrower_name.is_some() {
            conditions.push("LOWER(l.borrower_name) LIKE '%' || LOWER(?) || '%'");
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY l.loan_date");

        let mut query = sqlx::query_as::<_, LoanDetailsRow>(&sql);
        if let Some(name) = borrower_name {
            query = query.bind(name.to_string());
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let loan = Loan::from(row.loan);
            let item = self.resolve_item(loan.item_type, loan.item_id).await?;
            result.push(LoanDetails {
                id: loan.id,
                item,
                item_type: loan.item_type,
                borrower_name: loan.borrower_name,
                loan_date: loan.loan_date,
                due_date: loan.due_date,
                return_date: loan.return_date,
                loaned_by: row.loaned_by_username,
                returned_by: row.returned_by_username,
            });
        }

        Ok(result)
    }

    /// Resolve a loan's catalog item by branching on its type tag
    async fn resolve_item(&self, item_type: ItemType, item_id: Uuid) -> AppResult<Option<LoanItem>> {
        let item = match item_type {
            ItemType::BoardGame => {
                sqlx::query_as::<_, BoardGameRow>("SELECT * FROM boardgames WHERE id = ?")
                    .bind(item_id.to_string())
                    .fetch_optional(&self.pool)
                    .await?
                    .map(|row| LoanItem::BoardGame(row.into()))
            }
            ItemType::Book => sqlx::query_as::<_, BookRow>("SELECT * FROM books WHERE id = ?")
                .bind(item_id.to_string())
                .fetch_optional(&self.pool)
                .await?
                .map(|row| LoanItem::Book(row.into())),
        };
        Ok(item)
    }
}
