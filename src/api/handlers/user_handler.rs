//! Tenant user management handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::DEFAULT_USER_PAGE_SIZE;
use crate::domain::{ChangePassword, CreateUser, TenantContext, UpdateUser, User};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, PaginationParams};

/// Free-text search over email and names
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserSearch {
    pub search: Option<String>,
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/me/password", put(change_password))
        .route("/:id", get(get_user).put(update_user).delete(deactivate_user))
}

/// Add a user to the tenant (owner or admin)
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email taken or user limit reached")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ValidatedJson(payload): ValidatedJson<CreateUser>,
) -> AppResult<Created<User>> {
    let user = state.services.users().create_user(&ctx, payload).await?;
    Ok(Created(user))
}

/// List the tenant's users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(PaginationParams, UserSearch),
    responses(
        (status = 200, description = "One page of users", body = Vec<User>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(page): Query<PaginationParams>,
    Query(filter): Query<UserSearch>,
) -> AppResult<ApiResponse<Vec<User>>> {
    let users = state
        .services
        .users()
        .list_users(
            &ctx,
            filter.search,
            page.page(),
            page.limit_or(DEFAULT_USER_PAGE_SIZE),
        )
        .await?;

    Ok(ApiResponse::paginated(users))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<User>> {
    let user = state.services.users().get_user(&ctx, id).await?;
    Ok(ApiResponse::success(user))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUser>,
) -> AppResult<ApiResponse<User>> {
    let user = state.services.users().update_user(&ctx, id, payload).await?;
    Ok(ApiResponse::with_message(user, "User updated"))
}

/// Deactivate a user. Accounts are never hard-deleted.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deactivated", body = User),
        (status = 400, description = "Owner or self cannot be deactivated"),
        (status = 404, description = "User not found")
    )
)]
pub async fn deactivate_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<User>> {
    let user = state.services.users().deactivate_user(&ctx, id).await?;
    Ok(ApiResponse::with_message(user, "User deactivated"))
}

#[utoipa::path(
    put,
    path = "/api/users/me/password",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = ChangePassword,
    responses(
        (status = 204, description = "Password changed"),
        (status = 401, description = "Current password is wrong")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ValidatedJson(payload): ValidatedJson<ChangePassword>,
) -> AppResult<StatusCode> {
    state.services.users().change_password(&ctx, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}
