use sqlx::{postgres::PgRow, FromRow, PgPool, Row};

use crate::database::scope::{ScopedSelect, SqlParam};
use crate::database::DbError;

/// Executes [`ScopedSelect`] queries for one row type. The scope baked into
/// the query is what keeps every read inside the caller's ownership; this
/// type only binds parameters and maps rows.
pub struct Repository<T> {
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn fetch_all(&self, select: &ScopedSelect) -> Result<Vec<T>, DbError> {
        let query = select.to_sql();
        let mut q = sqlx::query_as::<_, T>(&query.sql);
        for param in &query.params {
            q = bind_query_as(q, param);
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    pub async fn fetch_optional(&self, select: &ScopedSelect) -> Result<Option<T>, DbError> {
        let query = select.to_sql();
        let mut q = sqlx::query_as::<_, T>(&query.sql);
        for param in &query.params {
            q = bind_query_as(q, param);
        }
        Ok(q.fetch_optional(&self.pool).await?)
    }

    /// Single-row lookup inside the scope; absence (including rows owned by
    /// someone else) is NotFound.
    pub async fn fetch_expected(&self, select: &ScopedSelect) -> Result<T, DbError> {
        self.fetch_optional(select)
            .await?
            .ok_or_else(DbError::not_found)
    }

    pub async fn count(&self, select: &ScopedSelect) -> Result<i64, DbError> {
        let query = select.to_count_sql();
        let mut q = sqlx::query(&query.sql);
        for param in &query.params {
            q = bind_query(q, param);
        }
        let row = q.fetch_one(&self.pool).await?;
        Ok(row.try_get(0)?)
    }

    /// Rows plus the total matching count, as one page of a listing.
    pub async fn fetch_page(&self, select: &ScopedSelect) -> Result<(Vec<T>, i64), DbError> {
        let rows = self.fetch_all(select).await?;
        let count = self.count(select).await?;
        Ok((rows, count))
    }
}

/// Scoped hard delete: one statement, zero affected rows is NotFound.
pub async fn delete_scoped(
    pool: &PgPool,
    table: &'static str,
    scope_column: &'static str,
    scope_id: i32,
    id: i32,
) -> Result<(), DbError> {
    let sql = format!(
        "DELETE FROM {} WHERE id = $1 AND {} = $2",
        table, scope_column
    );
    let result = sqlx::query(&sql).bind(id).bind(scope_id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(DbError::not_found());
    }
    Ok(())
}

fn bind_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    param: &'q SqlParam,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    match param {
        SqlParam::Int(v) => q.bind(*v),
        SqlParam::Text(v) => q.bind(v),
    }
}

fn bind_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    param: &'q SqlParam,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match param {
        SqlParam::Int(v) => q.bind(*v),
        SqlParam::Text(v) => q.bind(v),
    }
}
