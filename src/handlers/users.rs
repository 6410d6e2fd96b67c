use axum::extract::{Extension, Path, Query, State};
use serde::Serialize;

use crate::auth::{self, Claims};
use crate::database::models::user::{CreateUser, Login, UpdateUser, User};
use crate::database::scope::Page;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ListBody, ValidatedJson};
use crate::AppState;

use super::ListQuery;

/// Registration and login answer with a bearer token alongside the user.
#[derive(Debug, Serialize)]
pub struct TokenBody {
    pub token: String,
    pub user: User,
}

/// POST /user - register (public)
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUser>,
) -> ApiResult<TokenBody> {
    let hash = auth::hash_password(&payload.password)?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, first_name, last_name, email, password) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(&payload.username)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&hash)
    .fetch_one(&state.pool)
    .await?;

    let token = issue_token(&state, &user)?;
    Ok(ApiResponse::created(TokenBody { token, user }))
}

/// POST /user/login - authenticate and receive a bearer token (public)
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<Login>,
) -> ApiResult<TokenBody> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&payload.email)
        .fetch_optional(&state.pool)
        .await?;

    // Unknown email and wrong password answer identically
    let user = match user {
        Some(user) if auth::verify_password(&payload.password, &user.password) => user,
        _ => return Err(ApiError::unauthorized("Invalid email or password")),
    };

    let token = issue_token(&state, &user)?;
    Ok(ApiResponse::success(TokenBody { token, user }))
}

/// GET /user - paginated user directory
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ListBody<User>> {
    let page = Page::new(
        query.page.unwrap_or(1),
        state.config.pagination.page_size,
    );
    let term = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("%{}%", t));

    let (data, count) = match term {
        Some(pattern) => {
            let rows = sqlx::query_as::<_, User>(
                "SELECT * FROM users WHERE username ILIKE $1 OR email ILIKE $1 \
                 ORDER BY username LIMIT $2 OFFSET $3",
            )
            .bind(&pattern)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&state.pool)
            .await?;
            let count: (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM users WHERE username ILIKE $1 OR email ILIKE $1",
            )
            .bind(&pattern)
            .fetch_one(&state.pool)
            .await?;
            (rows, count.0)
        }
        None => {
            let rows = sqlx::query_as::<_, User>(
                "SELECT * FROM users ORDER BY username LIMIT $1 OFFSET $2",
            )
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&state.pool)
            .await?;
            let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
                .fetch_one(&state.pool)
                .await?;
            (rows, count.0)
        }
    };

    Ok(ApiResponse::success(ListBody { data, count }))
}

/// GET /user/:id
pub async fn read(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<User> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Record not found"))?;

    Ok(ApiResponse::success(user))
}

/// PUT /user/:id - callers may only update their own account
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateUser>,
) -> ApiResult<User> {
    if id != caller.id {
        return Err(ApiError::not_found("Record not found"));
    }

    if payload.username.is_none()
        && payload.first_name.is_none()
        && payload.last_name.is_none()
        && payload.email.is_none()
        && payload.password.is_none()
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&state.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Record not found"))?;
        return Ok(ApiResponse::success(user));
    }

    // The hash is recomputed only when the payload carries a new password
    let hash = match &payload.password {
        Some(password) => Some(auth::hash_password(password)?),
        None => None,
    };

    let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE users SET updated_at = now()");
    if let Some(username) = &payload.username {
        qb.push(", username = ").push_bind(username);
    }
    if let Some(first_name) = &payload.first_name {
        qb.push(", first_name = ").push_bind(first_name);
    }
    if let Some(last_name) = &payload.last_name {
        qb.push(", last_name = ").push_bind(last_name);
    }
    if let Some(email) = &payload.email {
        qb.push(", email = ").push_bind(email);
    }
    if let Some(hash) = &hash {
        qb.push(", password = ").push_bind(hash);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" RETURNING *");

    let updated = qb
        .build_query_as::<User>()
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Record not found"))?;

    Ok(ApiResponse::success(updated))
}

/// DELETE /user/:id - callers may only delete their own account
pub async fn destroy(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    if id != caller.id {
        return Err(ApiError::not_found("Record not found"));
    }

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Record not found"));
    }

    Ok(ApiResponse::empty())
}

fn issue_token(state: &AppState, user: &User) -> Result<String, ApiError> {
    let claims = Claims::new(
        user.id,
        user.username.clone(),
        user.email.clone(),
        state.config.security.jwt_expiry_hours,
    );
    Ok(auth::generate_token(&claims, &state.config.security.jwt_secret)?)
}
