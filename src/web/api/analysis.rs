//! Analysis and dashboard endpoints

use axum::extract::State;
use chrono::{Datelike, Local, NaiveDate};
use serde::Deserialize;

use crate::models::{CategoryId, TransactionDetail};
use crate::reports::{CategoryTrendReport, MonthlyVarianceReport, YearOverviewReport};
use crate::services::dashboard::{MonitoredCategory, RecurringPayment, YearSummary};
use crate::services::DashboardService;
use crate::web::extract::{Path, Query};
use crate::web::response::{ok, ApiResult};
use crate::web::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentQuery {
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryQuery {
    #[serde(default)]
    pub year: Option<i32>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub async fn overview(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> ApiResult<YearOverviewReport> {
    ok(YearOverviewReport::generate(&state.storage, year).await?)
}

pub async fn trends(
    State(state): State<AppState>,
    Path((year, category_id)): Path<(i32, CategoryId)>,
) -> ApiResult<CategoryTrendReport> {
    ok(CategoryTrendReport::generate(&state.storage, year, category_id).await?)
}

pub async fn variance(
    State(state): State<AppState>,
    Path((year, month, category_id)): Path<(i32, u32, CategoryId)>,
) -> ApiResult<MonthlyVarianceReport> {
    ok(MonthlyVarianceReport::generate(&state.storage, year, month, category_id).await?)
}

pub async fn recurring(State(state): State<AppState>) -> ApiResult<Vec<RecurringPayment>> {
    ok(DashboardService::new(&state.storage)
        .recurring_payments(today())
        .await?)
}

pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Vec<TransactionDetail>> {
    ok(DashboardService::new(&state.storage)
        .recent_transactions(query.limit)
        .await?)
}

pub async fn summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<YearSummary> {
    let year = query.year.unwrap_or_else(|| today().year());
    ok(DashboardService::new(&state.storage).year_summary(year).await?)
}

pub async fn monitored(State(state): State<AppState>) -> ApiResult<Vec<MonitoredCategory>> {
    ok(DashboardService::new(&state.storage)
        .monitored_categories(today())
        .await?)
}
