use axum::extract::{Extension, Path, Query, State};

use crate::database::models::item_order::{
    CreateItemOrder, ItemOrder, ItemOrderView, ItemOrderWithProduct, UpdateItemOrder,
};
use crate::database::models::order::Order;
use crate::database::models::product::Product;
use crate::database::repository::{delete_scoped, Repository};
use crate::database::scope::{Page, Scope, ScopedSelect};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ListBody, ValidatedJson};
use crate::AppState;

use super::ListQuery;

/// GET /item-order/:order
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(order): Path<i32>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ListBody<ItemOrderView>> {
    assert_order_owned(&state, caller.id, order).await?;

    let select = ScopedSelect::new(
        ItemOrder::TABLE,
        Scope::qualified("item_orders.order_id", order),
    )
    .columns(ItemOrder::VIEW_COLUMNS)
    .join(ItemOrder::PRODUCT_JOIN)
    .search(ItemOrder::SEARCHABLE, query.search.as_deref())
    .order_by(ItemOrder::ORDER_BY)
    .paginate(Page::new(
        query.page.unwrap_or(1),
        state.config.pagination.page_size,
    ));

    let (rows, count) = Repository::<ItemOrderWithProduct>::new(state.pool.clone())
        .fetch_page(&select)
        .await?;

    let data = rows.into_iter().map(ItemOrderView::compose).collect();
    Ok(ApiResponse::success(ListBody { data, count }))
}

/// GET /item-order/:order/:id
pub async fn read(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path((order, id)): Path<(i32, i32)>,
) -> ApiResult<ItemOrderView> {
    assert_order_owned(&state, caller.id, order).await?;

    let view = fetch_view(&state, order, id).await?;
    Ok(ApiResponse::success(view))
}

/// POST /item-order
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<CreateItemOrder>,
) -> ApiResult<ItemOrderView> {
    assert_order_owned(&state, caller.id, payload.order).await?;
    assert_product_owned(&state, caller.id, payload.product).await?;

    let item = sqlx::query_as::<_, ItemOrder>(
        "INSERT INTO item_orders (order_id, product_id, unit_price, quantity) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(payload.order)
    .bind(payload.product)
    .bind(payload.unit_price)
    .bind(payload.quantity)
    .fetch_one(&state.pool)
    .await?;

    let view = fetch_view(&state, payload.order, item.id).await?;
    Ok(ApiResponse::created(view))
}

/// PUT /item-order/:order/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path((order, id)): Path<(i32, i32)>,
    ValidatedJson(payload): ValidatedJson<UpdateItemOrder>,
) -> ApiResult<ItemOrderView> {
    assert_order_owned(&state, caller.id, order).await?;

    if payload.product.is_none() && payload.unit_price.is_none() && payload.quantity.is_none() {
        let view = fetch_view(&state, order, id).await?;
        return Ok(ApiResponse::success(view));
    }

    if let Some(product) = payload.product {
        assert_product_owned(&state, caller.id, product).await?;
    }

    let mut qb =
        sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE item_orders SET updated_at = now()");
    if let Some(product) = payload.product {
        qb.push(", product_id = ").push_bind(product);
    }
    if let Some(unit_price) = payload.unit_price {
        qb.push(", unit_price = ").push_bind(unit_price);
    }
    if let Some(quantity) = payload.quantity {
        qb.push(", quantity = ").push_bind(quantity);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" AND order_id = ").push_bind(order);
    qb.push(" RETURNING *");

    let updated = qb
        .build_query_as::<ItemOrder>()
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Record not found"))?;

    let view = fetch_view(&state, order, updated.id).await?;
    Ok(ApiResponse::success(view))
}

/// DELETE /item-order/:order/:id
pub async fn destroy(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path((order, id)): Path<(i32, i32)>,
) -> ApiResult<()> {
    assert_order_owned(&state, caller.id, order).await?;

    delete_scoped(&state.pool, ItemOrder::TABLE, "order_id", order, id).await?;
    Ok(ApiResponse::empty())
}

/// Line items are reachable only through an order the caller owns; a
/// foreign order id is indistinguishable from a missing one.
async fn assert_order_owned(
    state: &AppState,
    caller_id: i32,
    order_id: i32,
) -> Result<(), ApiError> {
    let select = ScopedSelect::new(Order::TABLE, Scope::user(caller_id)).by_id(order_id);
    Repository::<Order>::new(state.pool.clone())
        .fetch_optional(&select)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::not_found("Record not found"))
}

async fn assert_product_owned(
    state: &AppState,
    caller_id: i32,
    product_id: i32,
) -> Result<(), ApiError> {
    let select = ScopedSelect::new(Product::TABLE, Scope::user(caller_id)).by_id(product_id);
    Repository::<Product>::new(state.pool.clone())
        .fetch_optional(&select)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::bad_request("product not found"))
}

/// Single line item joined with its product, scoped to the parent order.
async fn fetch_view(state: &AppState, order: i32, id: i32) -> Result<ItemOrderView, ApiError> {
    let select = ScopedSelect::new(
        ItemOrder::TABLE,
        Scope::qualified("item_orders.order_id", order),
    )
    .columns(ItemOrder::VIEW_COLUMNS)
    .join(ItemOrder::PRODUCT_JOIN)
    .by_id(id);

    let row = Repository::<ItemOrderWithProduct>::new(state.pool.clone())
        .fetch_expected(&select)
        .await?;

    Ok(ItemOrderView::compose(row))
}
