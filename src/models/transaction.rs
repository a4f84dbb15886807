//! Transaction model
//!
//! A transaction is a dated actual amount recorded against a category and an
//! optional payee. Negative amounts are allowed for corrections and refunds.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::budget::normalize_comment;
use super::category::CategoryType;
use super::ids::{CategoryId, PayeeId, TransactionId};
use super::money::Amount;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub category_id: CategoryId,
    pub payee_id: Option<PayeeId>,
    pub date: NaiveDate,
    pub amount: Amount,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        category_id: CategoryId,
        payee_id: Option<PayeeId>,
        date: NaiveDate,
        amount: Amount,
        comment: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            category_id,
            payee_id,
            date,
            amount,
            comment: normalize_comment(comment),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A transaction joined with its payee name, as listed in the budget grid
#[derive(Debug, Clone, Serialize)]
pub struct TransactionWithPayee {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub payee_name: Option<String>,
}

/// A transaction joined with payee and category details for the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct TransactionDetail {
    pub id: TransactionId,
    pub date: NaiveDate,
    pub amount: Amount,
    pub comment: Option<String>,
    pub payee_name: String,
    pub category_id: CategoryId,
    pub category_name: String,
    pub category_type: CategoryType,
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}': expected YYYY-MM-DD", s.trim()))
}
