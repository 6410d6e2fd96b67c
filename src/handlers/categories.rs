use axum::extract::{Extension, Path, Query, State};

use crate::database::models::category::{Category, CreateCategory, UpdateCategory};
use crate::database::repository::{delete_scoped, Repository};
use crate::database::scope::{Page, Scope, ScopedSelect};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ListBody, ValidatedJson};
use crate::AppState;

use super::ListQuery;

/// GET /category
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ListBody<Category>> {
    let select = ScopedSelect::new(Category::TABLE, Scope::user(caller.id))
        .search(Category::SEARCHABLE, query.search.as_deref())
        .order_by(Category::ORDER_BY)
        .paginate(Page::new(
            query.page.unwrap_or(1),
            state.config.pagination.page_size,
        ));

    let (data, count) = Repository::<Category>::new(state.pool.clone())
        .fetch_page(&select)
        .await?;
    Ok(ApiResponse::success(ListBody { data, count }))
}

/// GET /category/:id
pub async fn read(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<Category> {
    let select = ScopedSelect::new(Category::TABLE, Scope::user(caller.id)).by_id(id);
    let category = Repository::<Category>::new(state.pool.clone())
        .fetch_expected(&select)
        .await?;
    Ok(ApiResponse::success(category))
}

/// POST /category
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<CreateCategory>,
) -> ApiResult<Category> {
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (description, user_id) VALUES ($1, $2) RETURNING *",
    )
    .bind(&payload.description)
    .bind(caller.id)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::created(category))
}

/// PUT /category/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateCategory>,
) -> ApiResult<Category> {
    let repository = Repository::<Category>::new(state.pool.clone());

    if payload.description.is_none() {
        // Nothing to change; answer with the row as it stands
        let select = ScopedSelect::new(Category::TABLE, Scope::user(caller.id)).by_id(id);
        return Ok(ApiResponse::success(repository.fetch_expected(&select).await?));
    }

    let mut qb =
        sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE categories SET updated_at = now()");
    if let Some(description) = &payload.description {
        qb.push(", description = ").push_bind(description);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" AND user_id = ").push_bind(caller.id);
    qb.push(" RETURNING *");

    let updated = qb
        .build_query_as::<Category>()
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Record not found"))?;

    Ok(ApiResponse::success(updated))
}

/// DELETE /category/:id
pub async fn destroy(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    delete_scoped(&state.pool, Category::TABLE, "user_id", caller.id, id).await?;
    Ok(ApiResponse::empty())
}
