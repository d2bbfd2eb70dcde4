//! Filter composition for list queries.
//!
//! Each optional filter renders as `($n IS NULL OR <predicate>)`, so an unset filter binds `NULL`
//! and degenerates to `TRUE`. The statement text is the same whichever filters are active and
//! every value goes through a bind parameter. Column names are `&'static str` and never come
//! from callers.

use chrono::{DateTime, Utc};
use sqlx::{Encode, Postgres, QueryBuilder, Type};

pub struct FilterComposer<'args> {
    builder: QueryBuilder<'args, Postgres>,
    tiebreak: &'static str,
}

impl<'args> FilterComposer<'args> {
    /// `select` must be a bare `SELECT ... FROM table` with no `WHERE`. `tiebreak` orders rows
    /// sharing a `created_at`.
    pub fn new(select: &'static str, tiebreak: &'static str) -> Self {
        let mut builder = QueryBuilder::new(select);
        builder.push(" WHERE TRUE");
        Self { builder, tiebreak }
    }

    /// `column = value`
    pub fn eq<T>(mut self, column: &'static str, sql_type: &'static str, value: Option<T>) -> Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres> + Clone + Send,
    {
        self.builder.push(" AND (");
        self.builder.push_bind(value.clone());
        self.builder.push(format!("::{sql_type} IS NULL OR {column} = "));
        self.builder.push_bind(value);
        self.builder.push(")");
        self
    }

    /// `column = ANY(values)`; an empty list matches nothing.
    pub fn any_of(mut self, column: &'static str, values: Vec<String>) -> Self {
        self.builder.push(format!(" AND {column} = ANY("));
        self.builder.push_bind(values);
        self.builder.push(")");
        self
    }

    /// Case-insensitive substring match. `column` may be an expression such as
    /// `first_name || ' ' || last_name`.
    pub fn contains(mut self, column: &'static str, needle: Option<&str>) -> Self {
        let pattern = needle.map(|n| format!("%{}%", escape_like(n)));
        self.builder.push(" AND (");
        self.builder.push_bind(pattern.clone());
        self.builder.push(format!("::TEXT IS NULL OR {column} ILIKE "));
        self.builder.push_bind(pattern);
        self.builder.push(" ESCAPE '\\')");
        self
    }

    /// Date column falls between today and `days` days from today, inclusive.
    pub fn within_days(mut self, column: &'static str, days: Option<i32>) -> Self {
        self.builder.push(" AND (");
        self.builder.push_bind(days);
        self.builder.push(format!("::INT IS NULL OR {column} BETWEEN CURRENT_DATE AND CURRENT_DATE + "));
        self.builder.push_bind(days);
        self.builder.push("::INT)");
        self
    }

    /// Date column is in the past, and no more than `days` days ago when set.
    pub fn expired_within_days(mut self, column: &'static str, days: Option<i32>) -> Self {
        self.builder.push(format!(" AND {column} < CURRENT_DATE AND ("));
        self.builder.push_bind(days);
        self.builder.push(format!("::INT IS NULL OR {column} >= CURRENT_DATE - "));
        self.builder.push_bind(days);
        self.builder.push("::INT)");
        self
    }

    /// Rows strictly older than the cursor.
    pub fn before_cursor(mut self, cursor: Option<DateTime<Utc>>) -> Self {
        self.builder.push(" AND (");
        self.builder.push_bind(cursor);
        self.builder.push("::TIMESTAMPTZ IS NULL OR created_at < ");
        self.builder.push_bind(cursor);
        self.builder.push(")");
        self
    }

    /// Newest first, fetching one row beyond `limit` so the caller can tell whether another page
    /// exists.
    pub fn paginate(mut self, limit: i64) -> QueryBuilder<'args, Postgres> {
        self.builder
            .push(format!(" ORDER BY created_at DESC, {} DESC LIMIT ", self.tiebreak));
        self.builder.push_bind(limit + 1);
        self.builder
    }

    #[cfg(test)]
    fn sql(&self) -> &str {
        self.builder.sql()
    }
}

fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
