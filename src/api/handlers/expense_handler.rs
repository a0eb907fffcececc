//! Expense tracking handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{CreateExpense, Expense, ExpenseFilter, ExpenseSummary, TenantContext, UpdateExpense};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, PaginationParams};

pub fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_expenses).post(create_expense))
        .route("/summary", get(summary))
        .route("/categories", get(categories))
        .route(
            "/:id",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}

pub async fn create_expense(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ValidatedJson(payload): ValidatedJson<CreateExpense>,
) -> AppResult<Created<Expense>> {
    let expense = state.services.expenses().create_expense(&ctx, payload).await?;
    Ok(Created(expense))
}

pub async fn list_expenses(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(page): Query<PaginationParams>,
    Query(filter): Query<ExpenseFilter>,
) -> AppResult<ApiResponse<Vec<Expense>>> {
    let expenses = state
        .services
        .expenses()
        .list_expenses(&ctx, filter, page.page(), page.limit())
        .await?;

    Ok(ApiResponse::paginated(expenses))
}

pub async fn get_expense(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Expense>> {
    let expense = state.services.expenses().get_expense(&ctx, id).await?;
    Ok(ApiResponse::success(expense))
}

pub async fn update_expense(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateExpense>,
) -> AppResult<ApiResponse<Expense>> {
    let expense = state
        .services
        .expenses()
        .update_expense(&ctx, id, payload)
        .await?;

    Ok(ApiResponse::with_message(expense, "Expense updated"))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.expenses().delete_expense(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Totals by category and month over the filtered range
pub async fn summary(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(filter): Query<ExpenseFilter>,
) -> AppResult<ApiResponse<ExpenseSummary>> {
    let summary = state.services.expenses().summary(&ctx, filter).await?;
    Ok(ApiResponse::success(summary))
}

pub async fn categories(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> AppResult<ApiResponse<Vec<String>>> {
    let categories = state.services.expenses().categories(&ctx).await?;
    Ok(ApiResponse::success(categories))
}
