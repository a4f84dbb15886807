//! Transaction service
//!
//! Provides business logic for recording actual amounts against categories:
//! listing by period, creation, updates and deletion.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{MoneybagsError, MoneybagsResult};
use crate::models::budget::normalize_comment;
use crate::models::period::validate_year;
use crate::models::transaction::parse_date;
use crate::models::{
    Amount, CategoryId, DateRange, PayeeId, Transaction, TransactionDetail, TransactionId,
    TransactionWithPayee, YearMonth,
};
use crate::storage::{categories, payees, transactions, Storage};

/// Number of recent transactions shown when no limit is given
pub const DEFAULT_RECENT_LIMIT: u32 = 5;

/// Upper bound for the recent transactions limit
pub const MAX_RECENT_LIMIT: u32 = 100;

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
}

/// Request body for creating a transaction
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransaction {
    pub category_id: CategoryId,
    #[serde(default)]
    pub payee_id: Option<PayeeId>,
    /// `YYYY-MM-DD`
    pub date: String,
    pub amount: Amount,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Request body for updating a transaction
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTransaction {
    /// `YYYY-MM-DD`
    pub date: String,
    pub amount: Amount,
    #[serde(default)]
    pub payee_id: Option<PayeeId>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl<'a> TransactionService<'a> {
    /// Create a new transaction service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Transactions of a category in a month, or the whole year when no
    /// month is given
    pub async fn list(
        &self,
        category_id: CategoryId,
        year: i32,
        month: Option<u32>,
    ) -> MoneybagsResult<Vec<TransactionWithPayee>> {
        let range = match month {
            Some(month) => YearMonth::new(year, month)
                .map_err(|e| MoneybagsError::Validation(e.to_string()))?
                .range(),
            None => {
                validate_year(year).map_err(|e| MoneybagsError::Validation(e.to_string()))?;
                DateRange::year(year)
            }
        };

        let mut conn = self.storage.acquire().await?;
        if categories::get(&mut conn, category_id).await?.is_none() {
            return Err(MoneybagsError::category_not_found(category_id.to_string()));
        }

        let list = transactions::list_for_category(&mut conn, category_id, range).await?;
        debug!(category_id = %category_id, year, ?month, count = list.len(), "listed transactions");
        Ok(list)
    }

    /// Get a transaction by ID
    pub async fn get(&self, id: TransactionId) -> MoneybagsResult<Option<Transaction>> {
        let mut conn = self.storage.acquire().await?;
        transactions::get(&mut conn, id).await
    }

    /// Record a new transaction
    pub async fn create(&self, request: CreateTransaction) -> MoneybagsResult<Transaction> {
        let date = checked_date(&request.date)?;
        checked_amount(request.amount)?;

        let mut conn = self.storage.acquire().await?;
        if categories::get(&mut conn, request.category_id).await?.is_none() {
            return Err(MoneybagsError::category_not_found(request.category_id.to_string()));
        }
        if let Some(payee_id) = request.payee_id {
            if payees::get(&mut conn, payee_id).await?.is_none() {
                return Err(MoneybagsError::payee_not_found(payee_id.to_string()));
            }
        }

        let txn = Transaction::new(
            request.category_id,
            request.payee_id,
            date,
            request.amount,
            request.comment,
        );
        transactions::insert(&mut conn, &txn).await?;

        info!(
            transaction_id = %txn.id,
            category_id = %txn.category_id,
            date = %txn.date,
            amount = txn.amount.units(),
            "created transaction"
        );
        Ok(txn)
    }

    /// Change date, amount, payee and comment of a transaction
    pub async fn update(
        &self,
        id: TransactionId,
        request: UpdateTransaction,
    ) -> MoneybagsResult<Transaction> {
        let date = checked_date(&request.date)?;
        checked_amount(request.amount)?;

        let mut conn = self.storage.acquire().await?;
        let mut txn = transactions::get(&mut conn, id)
            .await?
            .ok_or_else(|| MoneybagsError::transaction_not_found(id.to_string()))?;

        if let Some(payee_id) = request.payee_id {
            if payees::get(&mut conn, payee_id).await?.is_none() {
                return Err(MoneybagsError::payee_not_found(payee_id.to_string()));
            }
        }

        txn.date = date;
        txn.amount = request.amount;
        txn.payee_id = request.payee_id;
        txn.comment = normalize_comment(request.comment);
        txn.updated_at = chrono::Utc::now();

        transactions::update(&mut conn, &txn).await?;
        info!(transaction_id = %id, "updated transaction");
        Ok(txn)
    }

    /// Delete a transaction
    pub async fn delete(&self, id: TransactionId) -> MoneybagsResult<()> {
        let mut conn = self.storage.acquire().await?;
        if !transactions::delete(&mut conn, id).await? {
            return Err(MoneybagsError::transaction_not_found(id.to_string()));
        }
        info!(transaction_id = %id, "deleted transaction");
        Ok(())
    }

    /// The newest transactions with payee and category names
    pub async fn recent(&self, limit: Option<u32>) -> MoneybagsResult<Vec<TransactionDetail>> {
        let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT).clamp(1, MAX_RECENT_LIMIT);
        let mut conn = self.storage.acquire().await?;
        transactions::recent(&mut conn, limit).await
    }
}

/// Parses a `YYYY-MM-DD` date whose year is within the supported range
pub(crate) fn checked_date(value: &str) -> MoneybagsResult<NaiveDate> {
    let date = parse_date(value).map_err(MoneybagsError::Validation)?;
    validate_year(date.year()).map_err(|e| MoneybagsError::Validation(e.to_string()))?;
    Ok(date)
}

fn checked_amount(amount: Amount) -> MoneybagsResult<Amount> {
    amount
        .checked_limit()
        .map_err(|e| MoneybagsError::Validation(e.to_string()))
}
