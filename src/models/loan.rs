//! Loan model and related types

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::catalog::{BoardGame, Book, ItemType};
use crate::error::{AppError, AppResult};

/// Loan model from database
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: Uuid,
    pub item_id: Uuid,
    pub item_type: ItemType,
    pub borrower_name: String,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub loaned_by_user_id: Uuid,
    pub returned_by_user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Internal row structure for loan queries
#[derive(Debug, Clone, FromRow)]
pub struct LoanRow {
    id: String,
    item_id: String,
    item_type: String,
    borrower_name: String,
    loan_date: DateTime<Utc>,
    due_date: DateTime<Utc>,
    return_date: Option<DateTime<Utc>>,
    loaned_by_user_id: String,
    returned_by_user_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LoanRow> for Loan {
    fn from(row: LoanRow) -> Self {
        Loan {
            id: Uuid::parse_str(&row.id).unwrap_or_default(),
            item_id: Uuid::parse_str(&row.item_id).unwrap_or_default(),
            item_type: row.item_type.parse().unwrap_or(ItemType::BoardGame),
            borrower_name: row.borrower_name,
            loan_date: row.loan_date,
            due_date: row.due_date,
            return_date: row.return_date,
            loaned_by_user_id: Uuid::parse_str(&row.loaned_by_user_id).unwrap_or_default(),
            returned_by_user_id: row
                .returned_by_user_id
                .as_deref()
                .and_then(|id| Uuid::parse_str(id).ok()),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Internal row structure for the loan list query (loan + usernames)
#[derive(Debug, Clone, FromRow)]
pub struct LoanDetailsRow {
    #[sqlx(flatten)]
    pub(crate) loan: LoanRow,
    pub(crate) loaned_by_username: Option<String>,
    pub(crate) returned_by_username: Option<String>,
}

/// The catalog item a loan refers to, resolved by its type tag
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum LoanItem {
    BoardGame(BoardGame),
    Book(Book),
}

/// Loan enriched for display with the referenced item and usernames.
/// The enrichment is a read-side join, not a stored relationship; `item` is
/// `null` when the catalog record was deleted after the loan was made.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanDetails {
    pub id: Uuid,
    pub item: Option<LoanItem>,
    pub item_type: ItemType,
    pub borrower_name: String,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub loaned_by: Option<String>,
    pub returned_by: Option<String>,
}

/// Validated parameters for inserting a loan
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub item_id: Uuid,
    pub item_type: ItemType,
    pub borrower_name: String,
    pub due_date: DateTime<Utc>,
    pub loaned_by_user_id: Uuid,
}

/// Borrow request body
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    /// ID of the board game or book
    pub item_id: Option<String>,
    /// "BoardGame" or "Book"
    pub item_type: Option<String>,
    pub borrower_name: Option<String>,
    /// RFC 3339 timestamp or YYYY-MM-DD date
    pub due_date: Option<String>,
}

/// Return request body
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub loan_id: Option<String>,
}

/// Loan list query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct LoanQuery {
    /// "loaned" or "returned"
    pub status: Option<String>,
    /// Case-insensitive substring match on the borrower's name
    pub borrower_name: Option<String>,
}

/// Loan state filter derived from `return_date`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStatus {
    Loaned,
    Returned,
}

impl LoanStatus {
    /// Lenient parse of the `status` query parameter; unknown values mean
    /// "no filter", matching the original API behavior.
    pub fn from_query(s: &str) -> Option<Self> {
        match s {
            "loaned" => Some(LoanStatus::Loaned),
            "returned" => Some(LoanStatus::Returned),
            _ => None,
        }
    }
}

/// Parse a due date from either an RFC 3339 timestamp or a plain date.
/// Plain dates come from `<input type="date">` clients and map to midnight UTC.
pub fn parse_due_date(s: &str) -> AppResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    Err(AppError::Validation(format!("Invalid dueDate: {}", s)))
}
