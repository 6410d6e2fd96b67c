use axum::extract::{Extension, Path, Query, State};

use crate::database::models::client::{Client, CreateClient, UpdateClient};
use crate::database::repository::{delete_scoped, Repository};
use crate::database::scope::{Page, Scope, ScopedSelect};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ListBody, ValidatedJson};
use crate::AppState;

use super::ListQuery;

/// GET /client
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ListBody<Client>> {
    let select = ScopedSelect::new(Client::TABLE, Scope::user(caller.id))
        .search(Client::SEARCHABLE, query.search.as_deref())
        .order_by(Client::ORDER_BY)
        .paginate(Page::new(
            query.page.unwrap_or(1),
            state.config.pagination.page_size,
        ));

    let (data, count) = Repository::<Client>::new(state.pool.clone())
        .fetch_page(&select)
        .await?;
    Ok(ApiResponse::success(ListBody { data, count }))
}

/// GET /client/:id
pub async fn read(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<Client> {
    let select = ScopedSelect::new(Client::TABLE, Scope::user(caller.id)).by_id(id);
    let client = Repository::<Client>::new(state.pool.clone())
        .fetch_expected(&select)
        .await?;
    Ok(ApiResponse::success(client))
}

/// POST /client
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<CreateClient>,
) -> ApiResult<Client> {
    let client = sqlx::query_as::<_, Client>(
        "INSERT INTO clients (name, last_name, email, user_id) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(&payload.name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(caller.id)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::created(client))
}

/// PUT /client/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateClient>,
) -> ApiResult<Client> {
    let repository = Repository::<Client>::new(state.pool.clone());

    if payload.name.is_none() && payload.last_name.is_none() && payload.email.is_none() {
        let select = ScopedSelect::new(Client::TABLE, Scope::user(caller.id)).by_id(id);
        return Ok(ApiResponse::success(repository.fetch_expected(&select).await?));
    }

    let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE clients SET updated_at = now()");
    if let Some(name) = &payload.name {
        qb.push(", name = ").push_bind(name);
    }
    if let Some(last_name) = &payload.last_name {
        qb.push(", last_name = ").push_bind(last_name);
    }
    if let Some(email) = &payload.email {
        qb.push(", email = ").push_bind(email);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" AND user_id = ").push_bind(caller.id);
    qb.push(" RETURNING *");

    let updated = qb
        .build_query_as::<Client>()
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Record not found"))?;

    Ok(ApiResponse::success(updated))
}

/// DELETE /client/:id
pub async fn destroy(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    delete_scoped(&state.pool, Client::TABLE, "user_id", caller.id, id).await?;
    Ok(ApiResponse::empty())
}
