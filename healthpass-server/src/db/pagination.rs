//! Page-based pagination over composable SQL
//!
//! [`ListQuery`] collects the pieces of a `SELECT` (projection, source,
//! AND-ed conditions, OR groups, grouping, ordering) with positional
//! arguments. [`paginate`] runs a cheap count derived from the same pieces
//! and then fetches one window.

use serde::Serialize;
use shared::error::ErrorCode;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Arguments, FromRow, Sqlite, SqliteConnection};

use super::repository::{RepoError, RepoResult};

/// A positional bind argument
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Int(i64),
    Text(String),
    Bool(bool),
}

impl From<i64> for SqlArg {
    fn from(v: i64) -> Self {
        SqlArg::Int(v)
    }
}

impl From<bool> for SqlArg {
    fn from(v: bool) -> Self {
        SqlArg::Bool(v)
    }
}

impl From<String> for SqlArg {
    fn from(v: String) -> Self {
        SqlArg::Text(v)
    }
}

impl From<&str> for SqlArg {
    fn from(v: &str) -> Self {
        SqlArg::Text(v.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ListQuery {
    select: String,
    from: String,
    conditions: Vec<String>,
    args: Vec<SqlArg>,
    group_by: Option<String>,
    order_by: Option<String>,
}

impl ListQuery {
    /// `SELECT {select} FROM {from}`; `from` may contain joins
    pub fn new(select: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            select: select.into(),
            from: from.into(),
            conditions: Vec::new(),
            args: Vec::new(),
            group_by: None,
            order_by: None,
        }
    }

    /// AND a condition with `?` placeholders matching `args`
    pub fn filter<I>(mut self, condition: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SqlArg>,
    {
        self.conditions.push(condition.into());
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// AND an optional equality condition; `None` adds nothing
    pub fn filter_eq<T: Into<SqlArg>>(self, column: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.filter(format!("{column} = ?"), [v]),
            None => self,
        }
    }

    /// AND a group of OR-ed conditions
    ///
    /// An empty group adds nothing rather than matching everything or nothing.
    pub fn filter_any(mut self, group: Vec<(String, Vec<SqlArg>)>) -> Self {
        if group.is_empty() {
            return self;
        }
        let mut parts = Vec::with_capacity(group.len());
        for (condition, args) in group {
            parts.push(condition);
            self.args.extend(args);
        }
        self.conditions.push(format!("({})", parts.join(" OR ")));
        self
    }

    /// AND `column IN (...)`; an empty list matches no row
    pub fn filter_in(mut self, column: &str, ids: &[i64]) -> Self {
        if ids.is_empty() {
            self.conditions.push("0 = 1".to_string());
            return self;
        }
        self.conditions
            .push(format!("{column} IN ({})", placeholders(ids.len())));
        self.args.extend(ids.iter().copied().map(SqlArg::Int));
        self
    }

    pub fn group_by(mut self, clause: impl Into<String>) -> Self {
        self.group_by = Some(clause.into());
        self
    }

    pub fn order_by(mut self, clause: impl Into<String>) -> Self {
        self.order_by = Some(clause.into());
        self
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Full statement, without paging
    pub fn sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}{}", self.select, self.from, self.where_clause());
        if let Some(group_by) = &self.group_by {
            sql.push_str(&format!(" GROUP BY {group_by}"));
        }
        if let Some(order_by) = &self.order_by {
            sql.push_str(&format!(" ORDER BY {order_by}"));
        }
        sql
    }

    /// Row count of [`Self::sql`]: projection replaced, ordering dropped,
    /// groups counted through a subquery
    pub fn count_sql(&self) -> String {
        match &self.group_by {
            Some(group_by) => format!(
                "SELECT COUNT(*) FROM (SELECT 1 FROM {}{} GROUP BY {group_by})",
                self.from,
                self.where_clause()
            ),
            None => format!("SELECT COUNT(*) FROM {}{}", self.from, self.where_clause()),
        }
    }

    fn arguments(&self) -> Result<SqliteArguments<'static>, sqlx::Error> {
        let mut out = SqliteArguments::default();
        for arg in &self.args {
            let added = match arg {
                SqlArg::Int(v) => out.add(*v),
                SqlArg::Text(v) => out.add(v.clone()),
                SqlArg::Bool(v) => out.add(*v),
            };
            added.map_err(sqlx::Error::Encode)?;
        }
        Ok(out)
    }

    /// Every matching row
    pub async fn fetch_all<T>(&self, conn: &mut SqliteConnection) -> RepoResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let sql = self.sql();
        let rows = sqlx::query_as_with::<Sqlite, T, _>(&sql, self.arguments()?)
            .fetch_all(conn)
            .await?;
        Ok(rows)
    }

    pub async fn count(&self, conn: &mut SqliteConnection) -> RepoResult<u64> {
        let sql = self.count_sql();
        let total: i64 = sqlx::query_scalar_with::<Sqlite, i64, _>(&sql, self.arguments()?)
            .fetch_one(conn)
            .await?;
        Ok(total.max(0) as u64)
    }
}

/// `?, ?, ?` for `n` arguments
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// One window of a result set
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_id: u64,
    pub page_size: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn next_page_id(&self) -> Option<u64> {
        let end = self.page_id.checked_mul(self.page_size);
        if end.is_none_or(|end| end >= self.total) {
            None
        } else {
            Some(self.page_id + 1)
        }
    }

    pub fn prev_page_id(&self) -> Option<u64> {
        if self.page_id <= 1 {
            None
        } else {
            Some(self.page_id - 1)
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_id: self.page_id,
            page_size: self.page_size,
            total: self.total,
        }
    }

    /// The empty first page
    pub fn empty(page_size: u64) -> Self {
        Page {
            items: Vec::new(),
            page_id: 1,
            page_size,
            total: 0,
        }
    }
}

/// Fetch page `page_id` (1-based) of `query`
pub async fn paginate<T>(
    conn: &mut SqliteConnection,
    query: &ListQuery,
    page_id: i64,
    page_size: i64,
) -> RepoResult<Page<T>>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    if page_id < 1 || page_size < 1 {
        return Err(RepoError::Business(
            ErrorCode::InvalidPage,
            format!("invalid page {page_id} of size {page_size}"),
        ));
    }
    let total = query.count(&mut *conn).await?;
    if total == 0 {
        return Ok(Page::empty(page_size as u64));
    }

    // An offset past i64::MAX cannot be bound
    let offset = (page_id - 1).checked_mul(page_size).ok_or_else(|| {
        RepoError::Business(
            ErrorCode::InvalidPage,
            format!("page {page_id} of size {page_size} is out of range"),
        )
    })?;

    let sql = format!("{} LIMIT ? OFFSET ?", query.sql());
    let mut args = query.arguments()?;
    args.add(page_size).map_err(sqlx::Error::Encode)?;
    args.add(offset).map_err(sqlx::Error::Encode)?;
    let items = sqlx::query_as_with::<Sqlite, T, _>(&sql, args)
        .fetch_all(&mut *conn)
        .await?;

    Ok(Page {
        items,
        page_id: page_id as u64,
        page_size: page_size as u64,
        total,
    })
}
