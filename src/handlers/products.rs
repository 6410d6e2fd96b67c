use axum::extract::{Extension, Path, Query, State};

use crate::database::models::category::Category;
use crate::database::models::product::{CreateProduct, Product, UpdateProduct};
use crate::database::repository::{delete_scoped, Repository};
use crate::database::scope::{Page, Scope, ScopedSelect};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ListBody, ValidatedJson};
use crate::AppState;

use super::ListQuery;

/// GET /product
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ListBody<Product>> {
    let select = ScopedSelect::new(Product::TABLE, Scope::user(caller.id))
        .search(Product::SEARCHABLE, query.search.as_deref())
        .order_by(Product::ORDER_BY)
        .paginate(Page::new(
            query.page.unwrap_or(1),
            state.config.pagination.page_size,
        ));

    let (data, count) = Repository::<Product>::new(state.pool.clone())
        .fetch_page(&select)
        .await?;
    Ok(ApiResponse::success(ListBody { data, count }))
}

/// GET /product/:id
pub async fn read(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<Product> {
    let select = ScopedSelect::new(Product::TABLE, Scope::user(caller.id)).by_id(id);
    let product = Repository::<Product>::new(state.pool.clone())
        .fetch_expected(&select)
        .await?;
    Ok(ApiResponse::success(product))
}

/// POST /product
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<CreateProduct>,
) -> ApiResult<Product> {
    assert_category_owned(&state, caller.id, payload.category).await?;

    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (reference, description, unit_price, category_id, user_id) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(&payload.reference)
    .bind(&payload.description)
    .bind(payload.unit_price)
    .bind(payload.category)
    .bind(caller.id)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::created(product))
}

/// PUT /product/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateProduct>,
) -> ApiResult<Product> {
    let repository = Repository::<Product>::new(state.pool.clone());

    if payload.reference.is_none()
        && payload.description.is_none()
        && payload.unit_price.is_none()
        && payload.category.is_none()
    {
        let select = ScopedSelect::new(Product::TABLE, Scope::user(caller.id)).by_id(id);
        return Ok(ApiResponse::success(repository.fetch_expected(&select).await?));
    }

    if let Some(category) = payload.category {
        assert_category_owned(&state, caller.id, category).await?;
    }

    let mut qb =
        sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE products SET updated_at = now()");
    if let Some(reference) = &payload.reference {
        qb.push(", reference = ").push_bind(reference);
    }
    if let Some(description) = &payload.description {
        qb.push(", description = ").push_bind(description);
    }
    if let Some(unit_price) = payload.unit_price {
        qb.push(", unit_price = ").push_bind(unit_price);
    }
    if let Some(category) = payload.category {
        qb.push(", category_id = ").push_bind(category);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" AND user_id = ").push_bind(caller.id);
    qb.push(" RETURNING *");

    let updated = qb
        .build_query_as::<Product>()
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Record not found"))?;

    Ok(ApiResponse::success(updated))
}

/// DELETE /product/:id
pub async fn destroy(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    delete_scoped(&state.pool, Product::TABLE, "user_id", caller.id, id).await?;
    Ok(ApiResponse::empty())
}

/// A product may only reference a category the caller owns; anything else
/// looks exactly like a missing category.
async fn assert_category_owned(
    state: &AppState,
    caller_id: i32,
    category_id: i32,
) -> Result<(), ApiError> {
    let select = ScopedSelect::new(Category::TABLE, Scope::user(caller_id)).by_id(category_id);
    Repository::<Category>::new(state.pool.clone())
        .fetch_optional(&select)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::bad_request("category not found"))
}
