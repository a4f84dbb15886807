//! Supersaver endpoints

use axum::extract::State;
use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;

use crate::models::{
    Amount, SupersaverCategory, SupersaverCategoryId, SupersaverCategorySummary,
    SupersaverEntryDetail, SupersaverEntryId, SupersaverHeatmap, SupersaverSummary,
};
use crate::services::supersaver::{SaveSupersaverEntry, SupersaverCategoryName};
use crate::services::SupersaverService;
use crate::web::extract::{Json, Path};
use crate::web::response::{created, ok, ApiCreated, ApiResult};
use crate::web::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryBalance {
    pub category_id: SupersaverCategoryId,
    pub balance: Amount,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> ApiResult<Vec<SupersaverCategorySummary>> {
    ok(SupersaverService::new(&state.storage).list_categories().await?)
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<SupersaverCategoryName>,
) -> ApiCreated<SupersaverCategory> {
    created(
        SupersaverService::new(&state.storage)
            .create_category(&body.name)
            .await?,
    )
}

pub async fn rename_category(
    State(state): State<AppState>,
    Path(id): Path<SupersaverCategoryId>,
    Json(body): Json<SupersaverCategoryName>,
) -> ApiResult<SupersaverCategory> {
    ok(SupersaverService::new(&state.storage)
        .rename_category(id, &body.name)
        .await?)
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<SupersaverCategoryId>,
) -> ApiResult<SupersaverCategory> {
    ok(SupersaverService::new(&state.storage).delete_category(id).await?)
}

pub async fn balance(
    State(state): State<AppState>,
    Path(id): Path<SupersaverCategoryId>,
) -> ApiResult<CategoryBalance> {
    let balance = SupersaverService::new(&state.storage).balance(id).await?;
    ok(CategoryBalance {
        category_id: id,
        balance,
    })
}

pub async fn month_entries(
    State(state): State<AppState>,
    Path((id, year, month)): Path<(SupersaverCategoryId, i32, u32)>,
) -> ApiResult<Vec<SupersaverEntryDetail>> {
    ok(SupersaverService::new(&state.storage)
        .entries_for_month(id, year, month)
        .await?)
}

pub async fn create_entry(
    State(state): State<AppState>,
    Json(body): Json<SaveSupersaverEntry>,
) -> ApiCreated<SupersaverEntryDetail> {
    created(SupersaverService::new(&state.storage).create_entry(body).await?)
}

pub async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<SupersaverEntryId>,
    Json(body): Json<SaveSupersaverEntry>,
) -> ApiResult<SupersaverEntryDetail> {
    ok(SupersaverService::new(&state.storage)
        .update_entry(id, body)
        .await?)
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<SupersaverEntryId>,
) -> ApiResult<()> {
    SupersaverService::new(&state.storage).delete_entry(id).await?;
    ok(())
}

pub async fn heatmap(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> ApiResult<SupersaverHeatmap> {
    ok(SupersaverService::new(&state.storage).heatmap(year).await?)
}

pub async fn heatmap_current_year(State(state): State<AppState>) -> ApiResult<SupersaverHeatmap> {
    ok(SupersaverService::new(&state.storage)
        .heatmap(today().year())
        .await?)
}

pub async fn summary(State(state): State<AppState>) -> ApiResult<SupersaverSummary> {
    ok(SupersaverService::new(&state.storage)
        .dashboard_summary(today())
        .await?)
}
