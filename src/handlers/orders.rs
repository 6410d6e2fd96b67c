use axum::extract::{Extension, Path, Query, State};

use crate::database::aggregate;
use crate::database::models::client::Client;
use crate::database::models::order::{
    CreateOrder, Order, OrderView, OrderWithClient, UpdateOrder,
};
use crate::database::repository::{delete_scoped, Repository};
use crate::database::scope::{Page, Scope, ScopedSelect};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ListBody, ValidatedJson};
use crate::AppState;

use super::ListQuery;

/// GET /order
///
/// Totals for the whole page come from one grouped aggregate rather than
/// one query per order.
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ListBody<OrderView>> {
    let select = ScopedSelect::new(Order::TABLE, Scope::qualified("orders.user_id", caller.id))
        .columns(Order::VIEW_COLUMNS)
        .join(Order::CLIENT_JOIN)
        .search(Order::SEARCHABLE, query.search.as_deref())
        .order_by(Order::ORDER_BY)
        .paginate(Page::new(
            query.page.unwrap_or(1),
            state.config.pagination.page_size,
        ));

    let (rows, count) = Repository::<OrderWithClient>::new(state.pool.clone())
        .fetch_page(&select)
        .await?;

    let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
    let totals = aggregate::order_totals(&state.pool, &ids).await?;

    let data = rows
        .into_iter()
        .map(|row| {
            let total = aggregate::total_for(&totals, row.id);
            OrderView::compose(row, total)
        })
        .collect();

    Ok(ApiResponse::success(ListBody { data, count }))
}

/// GET /order/:id
pub async fn read(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<OrderView> {
    let view = fetch_view(&state, caller.id, id).await?;
    Ok(ApiResponse::success(view))
}

/// POST /order
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<CreateOrder>,
) -> ApiResult<OrderView> {
    assert_client_owned(&state, caller.id, payload.client).await?;

    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders (code, emission, delivery, client_id, user_id) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(&payload.code)
    .bind(payload.emission)
    .bind(payload.delivery)
    .bind(payload.client)
    .bind(caller.id)
    .fetch_one(&state.pool)
    .await?;

    let view = fetch_view(&state, caller.id, order.id).await?;
    Ok(ApiResponse::created(view))
}

/// PUT /order/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateOrder>,
) -> ApiResult<OrderView> {
    if payload.code.is_none()
        && payload.emission.is_none()
        && payload.delivery.is_none()
        && payload.client.is_none()
    {
        let view = fetch_view(&state, caller.id, id).await?;
        return Ok(ApiResponse::success(view));
    }

    if let Some(client) = payload.client {
        assert_client_owned(&state, caller.id, client).await?;
    }

    let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE orders SET updated_at = now()");
    if let Some(code) = &payload.code {
        qb.push(", code = ").push_bind(code);
    }
    if let Some(emission) = payload.emission {
        qb.push(", emission = ").push_bind(emission);
    }
    if let Some(delivery) = payload.delivery {
        qb.push(", delivery = ").push_bind(delivery);
    }
    if let Some(client) = payload.client {
        qb.push(", client_id = ").push_bind(client);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" AND user_id = ").push_bind(caller.id);
    qb.push(" RETURNING *");

    let updated = qb
        .build_query_as::<Order>()
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Record not found"))?;

    let view = fetch_view(&state, caller.id, updated.id).await?;
    Ok(ApiResponse::success(view))
}

/// DELETE /order/:id
///
/// Line items cascade with the order.
pub async fn destroy(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    delete_scoped(&state.pool, Order::TABLE, "user_id", caller.id, id).await?;
    Ok(ApiResponse::empty())
}

/// Scoped single-order view with the derived total.
async fn fetch_view(state: &AppState, caller_id: i32, id: i32) -> Result<OrderView, ApiError> {
    let select = ScopedSelect::new(Order::TABLE, Scope::qualified("orders.user_id", caller_id))
        .columns(Order::VIEW_COLUMNS)
        .join(Order::CLIENT_JOIN)
        .by_id(id);

    let row = Repository::<OrderWithClient>::new(state.pool.clone())
        .fetch_expected(&select)
        .await?;

    let total = aggregate::order_total(&state.pool, row.id).await?;
    Ok(OrderView::compose(row, total))
}

/// An order may only reference a client the caller owns; anything else
/// looks exactly like a missing client.
async fn assert_client_owned(
    state: &AppState,
    caller_id: i32,
    client_id: i32,
) -> Result<(), ApiError> {
    let select = ScopedSelect::new(Client::TABLE, Scope::user(caller_id)).by_id(client_id);
    Repository::<Client>::new(state.pool.clone())
        .fetch_optional(&select)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::bad_request("client not found"))
}
