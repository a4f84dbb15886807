//! Category, payee and template endpoints

use axum::extract::State;

use crate::models::{BudgetTemplate, Category, CategoryId, Payee, PayeeId, PayeeUsage};
use crate::services::category::{CategoryListItem, CreateCategory, RenameCategory};
use crate::services::payee::{CreatePayee, UpdatePayee};
use crate::services::template::{AddToTemplate, CopyResult, CopyTemplate};
use crate::services::{CategoryService, PayeeService, TemplateService};
use crate::web::extract::{Json, Path};
use crate::web::response::{created, ok, ApiCreated, ApiResult};
use crate::web::AppState;

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<CategoryListItem>> {
    ok(CategoryService::new(&state.storage).list_with_usage().await?)
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CreateCategory>,
) -> ApiCreated<Category> {
    created(
        CategoryService::new(&state.storage)
            .create(&body.name, body.category_type)
            .await?,
    )
}

pub async fn rename_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(body): Json<RenameCategory>,
) -> ApiResult<Category> {
    ok(CategoryService::new(&state.storage).rename(id, &body.name).await?)
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> ApiResult<Category> {
    ok(CategoryService::new(&state.storage).delete(id).await?)
}

pub async fn list_payees(State(state): State<AppState>) -> ApiResult<Vec<PayeeUsage>> {
    ok(PayeeService::new(&state.storage).list_with_usage().await?)
}

pub async fn create_payee(
    State(state): State<AppState>,
    Json(body): Json<CreatePayee>,
) -> ApiCreated<Payee> {
    created(
        PayeeService::new(&state.storage)
            .create(&body.name, body.payee_type)
            .await?,
    )
}

pub async fn update_payee(
    State(state): State<AppState>,
    Path(id): Path<PayeeId>,
    Json(body): Json<UpdatePayee>,
) -> ApiResult<Payee> {
    ok(PayeeService::new(&state.storage)
        .update(id, &body.name, body.payee_type)
        .await?)
}

pub async fn delete_payee(State(state): State<AppState>, Path(id): Path<PayeeId>) -> ApiResult<Payee> {
    ok(PayeeService::new(&state.storage).delete(id).await?)
}

pub async fn list_years(State(state): State<AppState>) -> ApiResult<Vec<i32>> {
    ok(TemplateService::new(&state.storage).years().await?)
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> ApiResult<Vec<Category>> {
    ok(TemplateService::new(&state.storage).categories(year).await?)
}

pub async fn add_to_template(
    State(state): State<AppState>,
    Path(year): Path<i32>,
    Json(body): Json<AddToTemplate>,
) -> ApiCreated<BudgetTemplate> {
    created(
        TemplateService::new(&state.storage)
            .add(year, body.category_id)
            .await?,
    )
}

pub async fn remove_from_template(
    State(state): State<AppState>,
    Path((year, category_id)): Path<(i32, CategoryId)>,
) -> ApiResult<()> {
    TemplateService::new(&state.storage)
        .remove(year, category_id)
        .await?;
    ok(())
}

pub async fn copy_template(
    State(state): State<AppState>,
    Json(body): Json<CopyTemplate>,
) -> ApiResult<CopyResult> {
    let copied = TemplateService::new(&state.storage)
        .copy(body.from_year, body.to_year)
        .await?;
    ok(CopyResult { copied })
}
