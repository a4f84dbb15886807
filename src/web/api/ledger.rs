//! Budget entry and transaction endpoints

use axum::extract::State;
use serde::Deserialize;

use crate::models::{BudgetEntry, BudgetEntryId, CategoryId, Transaction, TransactionId, TransactionWithPayee};
use crate::services::budget::{BudgetYearData, SaveBudgetEntry};
use crate::services::transaction::{CreateTransaction, UpdateTransaction};
use crate::services::{BudgetService, TransactionService};
use crate::web::extract::{Json, Path, Query};
use crate::web::response::{created, ok, ApiCreated, ApiResult};
use crate::web::AppState;

/// Query string of the transaction list
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionQuery {
    pub category_id: CategoryId,
    pub year: i32,
    #[serde(default)]
    pub month: Option<u32>,
}

pub async fn budget_year(State(state): State<AppState>, Path(year): Path<i32>) -> ApiResult<BudgetYearData> {
    ok(BudgetService::new(&state.storage).year_data(year).await?)
}

pub async fn save_budget_entry(
    State(state): State<AppState>,
    Json(body): Json<SaveBudgetEntry>,
) -> ApiResult<BudgetEntry> {
    ok(BudgetService::new(&state.storage).save_entry(body).await?)
}

pub async fn delete_budget_entry(
    State(state): State<AppState>,
    Path(id): Path<BudgetEntryId>,
) -> ApiResult<()> {
    BudgetService::new(&state.storage).delete_entry(id).await?;
    ok(())
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> ApiResult<Vec<TransactionWithPayee>> {
    ok(TransactionService::new(&state.storage)
        .list(query.category_id, query.year, query.month)
        .await?)
}

pub async fn create_transaction(
    State(state): State<AppState>,
    Json(body): Json<CreateTransaction>,
) -> ApiCreated<Transaction> {
    created(TransactionService::new(&state.storage).create(body).await?)
}

pub async fn update_transaction(
    State(state): State<AppState>,
    Path(id): Path<TransactionId>,
    Json(body): Json<UpdateTransaction>,
) -> ApiResult<Transaction> {
    ok(TransactionService::new(&state.storage).update(id, body).await?)
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<TransactionId>,
) -> ApiResult<()> {
    TransactionService::new(&state.storage).delete(id).await?;
    ok(())
}
