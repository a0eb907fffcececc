//! Hotel module handlers: tables, reservations and floor stats.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{
    CreateReservation, CreateTable, HotelStats, HotelTable, Reservation, ReservationFilter,
    TableStatus, TenantContext, UpdateReservation, UpdateTable,
};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, PaginationParams};

#[derive(Debug, Default, Deserialize)]
pub struct TableQuery {
    pub status: Option<TableStatus>,
}

pub fn hotel_routes() -> Router<AppState> {
    Router::new()
        .route("/tables", get(list_tables).post(create_table))
        .route(
            "/tables/:id",
            get(get_table).put(update_table).delete(delete_table),
        )
        .route(
            "/reservations",
            get(list_reservations).post(create_reservation),
        )
        .route(
            "/reservations/:id",
            get(get_reservation)
                .put(update_reservation)
                .delete(cancel_reservation),
        )
        .route("/stats", get(stats))
}

pub async fn create_table(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ValidatedJson(payload): ValidatedJson<CreateTable>,
) -> AppResult<Created<HotelTable>> {
    let table = state.services.hotel().create_table(&ctx, payload).await?;
    Ok(Created(table))
}

pub async fn list_tables(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<TableQuery>,
) -> AppResult<ApiResponse<Vec<HotelTable>>> {
    let tables = state.services.hotel().list_tables(&ctx, query.status).await?;
    Ok(ApiResponse::success(tables))
}

pub async fn get_table(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<HotelTable>> {
    let table = state.services.hotel().get_table(&ctx, id).await?;
    Ok(ApiResponse::success(table))
}

pub async fn update_table(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateTable>,
) -> AppResult<ApiResponse<HotelTable>> {
    let table = state.services.hotel().update_table(&ctx, id, payload).await?;
    Ok(ApiResponse::with_message(table, "Table updated"))
}

/// Blocked while the table has pending or confirmed reservations
pub async fn delete_table(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.hotel().delete_table(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_reservation(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ValidatedJson(payload): ValidatedJson<CreateReservation>,
) -> AppResult<Created<Reservation>> {
    let reservation = state.services.hotel().create_reservation(&ctx, payload).await?;
    Ok(Created(reservation))
}

pub async fn list_reservations(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Query(page): Query<PaginationParams>,
    Query(filter): Query<ReservationFilter>,
) -> AppResult<ApiResponse<Vec<Reservation>>> {
    let reservations = state
        .services
        .hotel()
        .list_reservations(&ctx, filter, page.page(), page.limit())
        .await?;

    Ok(ApiResponse::paginated(reservations))
}

pub async fn get_reservation(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Reservation>> {
    let reservation = state.services.hotel().get_reservation(&ctx, id).await?;
    Ok(ApiResponse::success(reservation))
}

pub async fn update_reservation(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateReservation>,
) -> AppResult<ApiResponse<Reservation>> {
    let reservation = state
        .services
        .hotel()
        .update_reservation(&ctx, id, payload)
        .await?;

    Ok(ApiResponse::with_message(reservation, "Reservation updated"))
}

/// Cancels rather than deletes, so the booking history is kept
pub async fn cancel_reservation(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Reservation>> {
    let reservation = state.services.hotel().cancel_reservation(&ctx, id).await?;
    Ok(ApiResponse::with_message(reservation, "Reservation cancelled"))
}

pub async fn stats(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> AppResult<ApiResponse<HotelStats>> {
    let stats = state.services.hotel().stats(&ctx).await?;
    Ok(ApiResponse::success(stats))
}
