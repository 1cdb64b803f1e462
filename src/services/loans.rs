//! Loan management service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        catalog::ItemType,
        loan::{
            parse_due_date, BorrowRequest, Loan, LoanDetails, LoanQuery, LoanStatus, NewLoan,
            ReturnRequest,
        },
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a catalog item: moves it from Available to Loaned
    pub async fn borrow(&self, request: BorrowRequest, acting_user_id: Uuid) -> AppResult<Loan> {
        let (Some(item_id), Some(item_type), Some(borrower_name), Some(due_date)) = (
            request.item_id,
            request.item_type,
            request.borrower_name,
            request.due_date,
        ) else {
            return Err(AppError::Validation("Missing required fields".to_string()));
        };
        if borrower_name.trim().is_empty() {
            return Err(AppError::Validation("Missing required fields".to_string()));
        }

        let item_type: ItemType = item_type.parse().map_err(|_| {
            AppError::Validation(
                "Invalid itemType. Must be \"BoardGame\" or \"Book\".".to_string(),
            )
        })?;
        let item_id = Uuid::parse_str(&item_id)
            .map_err(|_| AppError::InvalidId("Invalid item ID format".to_string()))?;
        let due_date = parse_due_date(&due_date)?;

        // The referenced catalog item lives in one of two collections;
        // resolve it by branching on the type tag.
        let exists = match item_type {
            ItemType::BoardGame => self.repository.boardgames.exists(item_id).await?,
            ItemType::Book => self.repository.books.exists(item_id).await?,
        };
        if !exists {
            return Err(AppError::NotFound(format!(
                "{} with ID {} not found.",
                item_type, item_id
            )));
        }

        self.repository
            .loans
            .create(&NewLoan {
                item_id,
                item_type,
                borrower_name,
                due_date,
                loaned_by_user_id: acting_user_id,
            })
            .await
    }

    /// Return a loaned item: moves it back to Available
    pub async fn return_loan(
        &self,
        request: ReturnRequest,
        acting_user_id: Uuid,
    ) -> AppResult<Loan> {
        let Some(loan_id) = request.loan_id else {
            return Err(AppError::Validation("Missing loanId".to_string()));
        };
        let loan_id = Uuid::parse_str(&loan_id)
            .map_err(|_| AppError::InvalidId("Invalid loan ID format".to_string()))?;

        self.repository.loans.return_loan(loan_id, acting_user_id).await
    }

    /// List loans matching the query filters
    pub async fn list(&self, query: &LoanQuery) -> AppResult<Vec<LoanDetails>> {
        let status = query.status.as_deref().and_then(LoanStatus::from_query);
        self.repository
            .loans
            .list(status, query.borrower_name.as_deref())
            .await
    }

    /// List all active (not yet returned) loans
    pub async fn active(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list(Some(LoanStatus::Loaned), None).await
    }
}
