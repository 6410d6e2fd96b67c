//! Ownership-scoped SELECT builder.
//!
//! Every read of an owned entity goes through [`ScopedSelect`], which cannot
//! be constructed without a [`Scope`]. The generated WHERE clause therefore
//! always carries the ownership filter; search terms, id lookups and
//! pagination are AND-ed onto it. The builder is pure (SQL text plus a typed
//! parameter list) so the shape of every query is unit-testable without a
//! database.

/// Parameter values a scoped query can bind.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
}

/// The mandatory row filter: owned entities are scoped to the creating user,
/// line items to their parent order.
#[derive(Debug, Clone, Copy)]
pub struct Scope {
    column: &'static str,
    id: i32,
}

impl Scope {
    pub fn user(id: i32) -> Self {
        Self { column: "user_id", id }
    }

    pub fn order(id: i32) -> Self {
        Self { column: "order_id", id }
    }

    /// Scope on a qualified column, for queries that join other tables.
    pub fn qualified(column: &'static str, id: i32) -> Self {
        Self { column, id }
    }
}

/// 1-based page over a fixed page size.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    number: i64,
    size: i64,
}

impl Page {
    pub fn new(number: i64, size: i64) -> Self {
        Self { number: number.max(1), size }
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    pub fn offset(&self) -> i64 {
        self.size * (self.number - 1)
    }
}

/// Generated SQL plus its bind parameters, in order.
#[derive(Debug)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

pub struct ScopedSelect {
    table: &'static str,
    columns: &'static str,
    join: Option<&'static str>,
    scope: Scope,
    id: Option<i32>,
    search_columns: &'static [&'static str],
    search: Option<String>,
    order_by: Option<&'static str>,
    page: Option<Page>,
}

impl ScopedSelect {
    pub fn new(table: &'static str, scope: Scope) -> Self {
        Self {
            table,
            columns: "*",
            join: None,
            scope,
            id: None,
            search_columns: &[],
            search: None,
            order_by: None,
            page: None,
        }
    }

    pub fn columns(mut self, columns: &'static str) -> Self {
        self.columns = columns;
        self
    }

    pub fn join(mut self, join: &'static str) -> Self {
        self.join = Some(join);
        self
    }

    pub fn by_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    /// Case-insensitive substring search OR-ed across `columns`, AND-ed with
    /// the scope. Blank terms are ignored.
    pub fn search(mut self, columns: &'static [&'static str], term: Option<&str>) -> Self {
        self.search_columns = columns;
        self.search = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| format!("%{}%", t));
        self
    }

    pub fn order_by(mut self, order_by: &'static str) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn paginate(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    pub fn to_sql(&self) -> SqlQuery {
        let mut params = Vec::new();
        let mut sql = format!("SELECT {} FROM {}", self.columns, self.table);
        if let Some(join) = self.join {
            sql.push(' ');
            sql.push_str(join);
        }
        sql.push_str(" WHERE ");
        sql.push_str(&self.where_clause(&mut params));

        if let Some(order_by) = self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        if let Some(page) = self.page {
            params.push(SqlParam::Int(page.limit()));
            sql.push_str(&format!(" LIMIT ${}", params.len()));
            params.push(SqlParam::Int(page.offset()));
            sql.push_str(&format!(" OFFSET ${}", params.len()));
        }

        SqlQuery { sql, params }
    }

    /// Count query over the same FROM/WHERE, without ordering or pagination.
    pub fn to_count_sql(&self) -> SqlQuery {
        let mut params = Vec::new();
        let mut sql = format!("SELECT COUNT(*) FROM {}", self.table);
        if let Some(join) = self.join {
            sql.push(' ');
            sql.push_str(join);
        }
        sql.push_str(" WHERE ");
        sql.push_str(&self.where_clause(&mut params));

        SqlQuery { sql, params }
    }

    fn where_clause(&self, params: &mut Vec<SqlParam>) -> String {
        let mut parts = Vec::new();

        params.push(SqlParam::Int(self.scope.id as i64));
        parts.push(format!("{} = ${}", self.scope.column, params.len()));

        if let Some(id) = self.id {
            params.push(SqlParam::Int(id as i64));
            parts.push(format!("{} = ${}", self.id_column(), params.len()));
        }

        if let Some(pattern) = &self.search {
            if !self.search_columns.is_empty() {
                params.push(SqlParam::Text(pattern.clone()));
                let index = params.len();
                let likes: Vec<String> = self
                    .search_columns
                    .iter()
                    .map(|col| format!("{} ILIKE ${}", col, index))
                    .collect();
                parts.push(format!("({})", likes.join(" OR ")));
            }
        }

        parts.join(" AND ")
    }

    fn id_column(&self) -> String {
        // Joined queries must qualify the id to avoid ambiguity
        if self.join.is_some() {
            format!("{}.id", self.table)
        } else {
            "id".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_filter_is_always_present() {
        let q = ScopedSelect::new("categories", Scope::user(7)).to_sql();
        assert_eq!(q.sql, "SELECT * FROM categories WHERE user_id = $1");
        assert_eq!(q.params, vec![SqlParam::Int(7)]);
    }

    #[test]
    fn id_lookup_is_anded_with_scope() {
        let q = ScopedSelect::new("products", Scope::user(7)).by_id(42).to_sql();
        assert_eq!(q.sql, "SELECT * FROM products WHERE user_id = $1 AND id = $2");
        assert_eq!(q.params, vec![SqlParam::Int(7), SqlParam::Int(42)]);
    }

    #[test]
    fn search_is_ilike_across_columns_anded_with_scope() {
        let q = ScopedSelect::new("clients", Scope::user(3))
            .search(&["name", "last_name", "email"], Some("smith"))
            .to_sql();
        assert_eq!(
            q.sql,
            "SELECT * FROM clients WHERE user_id = $1 AND \
             (name ILIKE $2 OR last_name ILIKE $2 OR email ILIKE $2)"
        );
        assert_eq!(
            q.params,
            vec![SqlParam::Int(3), SqlParam::Text("%smith%".to_string())]
        );
    }

    #[test]
    fn blank_search_terms_are_ignored() {
        let q = ScopedSelect::new("categories", Scope::user(3))
            .search(&["description"], Some("   "))
            .to_sql();
        assert_eq!(q.sql, "SELECT * FROM categories WHERE user_id = $1");
    }

    #[test]
    fn pagination_binds_limit_and_offset() {
        let q = ScopedSelect::new("categories", Scope::user(1))
            .order_by("description")
            .paginate(Page::new(3, 10))
            .to_sql();
        assert_eq!(
            q.sql,
            "SELECT * FROM categories WHERE user_id = $1 \
             ORDER BY description LIMIT $2 OFFSET $3"
        );
        assert_eq!(
            q.params,
            vec![SqlParam::Int(1), SqlParam::Int(10), SqlParam::Int(20)]
        );
    }

    #[test]
    fn page_numbers_below_one_clamp_to_first_page() {
        let page = Page::new(0, 10);
        assert_eq!(page.offset(), 0);
        let page = Page::new(-5, 10);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn joined_select_qualifies_columns() {
        let q = ScopedSelect::new("orders", Scope::qualified("orders.user_id", 9))
            .columns("orders.id, orders.code, clients.name AS client_name")
            .join("JOIN clients ON clients.id = orders.client_id")
            .by_id(5)
            .to_sql();
        assert_eq!(
            q.sql,
            "SELECT orders.id, orders.code, clients.name AS client_name \
             FROM orders JOIN clients ON clients.id = orders.client_id \
             WHERE orders.user_id = $1 AND orders.id = $2"
        );
    }

    #[test]
    fn count_sql_reuses_where_without_pagination() {
        let q = ScopedSelect::new("products", Scope::user(2))
            .search(&["reference", "description"], Some("chair"))
            .order_by("reference")
            .paginate(Page::new(2, 10))
            .to_count_sql();
        assert_eq!(
            q.sql,
            "SELECT COUNT(*) FROM products WHERE user_id = $1 AND \
             (reference ILIKE $2 OR description ILIKE $2)"
        );
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn order_scope_filters_line_items() {
        let q = ScopedSelect::new("item_orders", Scope::order(11)).to_sql();
        assert_eq!(q.sql, "SELECT * FROM item_orders WHERE order_id = $1");
        assert_eq!(q.params, vec![SqlParam::Int(11)]);
    }
}
