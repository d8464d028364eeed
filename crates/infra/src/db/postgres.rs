//! Postgres-backed row store.
//!
//! Statements are assembled with `sqlx::QueryBuilder`: table and column names
//! come from the static schemas, every value goes through `push_bind` and
//! reaches the server as a `$n` parameter.

use std::sync::Arc;

use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row as _};
use tracing::{instrument, Span};

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::database::Database;
use super::error::{map_sqlx_error, StoreError};
use super::query::{Direction, Filter, Query};
use super::row::Row;
use super::schema::{ColumnType, Schema};
use super::value::Value;
use crate::config::DatabaseSettings;

#[derive(Debug, Clone)]
pub struct PostgresDatabase {
    pool: Arc<PgPool>,
}

impl PostgresDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    #[instrument(skip(settings), fields(max_connections = settings.max_connections), err)]
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the SQL migrations under `crates/infra/migrations`.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&*self.pool).await?;
        Ok(())
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, kind: ColumnType, value: &Value) -> Result<(), StoreError> {
    match (kind, value) {
        (ColumnType::Text, Value::Text(s)) => qb.push_bind(s.clone()),
        (ColumnType::Int, Value::Int(n)) => qb.push_bind(*n),
        (ColumnType::Decimal, Value::Decimal(d)) => qb.push_bind(*d),
        (ColumnType::Decimal, Value::Int(n)) => qb.push_bind(Decimal::from(*n)),
        (ColumnType::Bool, Value::Bool(b)) => qb.push_bind(*b),
        (ColumnType::Date, Value::Date(d)) => qb.push_bind(*d),
        (ColumnType::Time, Value::Time(t)) => qb.push_bind(*t),
        (ColumnType::Uuid, Value::Uuid(u)) => qb.push_bind(*u),
        (ColumnType::Text, Value::Null) => qb.push_bind(None::<String>),
        (ColumnType::Int, Value::Null) => qb.push_bind(None::<i64>),
        (ColumnType::Decimal, Value::Null) => qb.push_bind(None::<Decimal>),
        (ColumnType::Bool, Value::Null) => qb.push_bind(None::<bool>),
        (ColumnType::Date, Value::Null) => qb.push_bind(None::<NaiveDate>),
        (ColumnType::Time, Value::Null) => qb.push_bind(None::<NaiveTime>),
        (ColumnType::Uuid, Value::Null) => qb.push_bind(None::<Uuid>),
        (kind, value) => {
            return Err(StoreError::Backend(format!("cannot bind {value:?} to a {kind:?} column")));
        }
    };
    Ok(())
}

fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn push_compare(
    qb: &mut QueryBuilder<'_, Postgres>,
    schema: &Schema,
    column: &str,
    op: &str,
    value: &Value,
) -> Result<(), StoreError> {
    let kind = schema.kind_of(column)?;
    qb.push(column).push(op);
    push_value(qb, kind, value)
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, schema: &Schema, filter: &Filter) -> Result<(), StoreError> {
    match filter {
        Filter::All => {
            qb.push("TRUE");
        }
        Filter::Eq(c, v) => push_compare(qb, schema, c, " = ", v)?,
        Filter::Ne(c, v) => push_compare(qb, schema, c, " <> ", v)?,
        Filter::Gte(c, v) => push_compare(qb, schema, c, " >= ", v)?,
        Filter::Lte(c, v) => push_compare(qb, schema, c, " <= ", v)?,
        Filter::IsNull(c) => {
            schema.kind_of(c)?;
            qb.push(*c).push(" IS NULL");
        }
        Filter::NotNull(c) => {
            schema.kind_of(c)?;
            qb.push(*c).push(" IS NOT NULL");
        }
        Filter::Search(columns, text) => {
            let pattern = escape_like(text);
            qb.push("(");
            for (i, c) in columns.iter().enumerate() {
                schema.kind_of(c)?;
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push("CAST(").push(*c).push(" AS TEXT) ILIKE ");
                qb.push_bind(pattern.clone());
            }
            if columns.is_empty() {
                qb.push("FALSE");
            }
            qb.push(")");
        }
        Filter::And(fs) | Filter::Or(fs) => {
            let (joiner, empty) = if matches!(filter, Filter::And(_)) {
                (" AND ", "TRUE")
            } else {
                (" OR ", "FALSE")
            };
            if fs.is_empty() {
                qb.push(empty);
                return Ok(());
            }
            qb.push("(");
            for (i, f) in fs.iter().enumerate() {
                if i > 0 {
                    qb.push(joiner);
                }
                push_filter(qb, schema, f)?;
            }
            qb.push(")");
        }
    }
    Ok(())
}

fn decode_row(schema: &Schema, row: &PgRow) -> Result<Row, sqlx::Error> {
    let mut out = Row::new();
    for column in schema.columns {
        let name = column.name;
        let value: Value = match column.kind {
            ColumnType::Text => row.try_get::<Option<String>, _>(name)?.into(),
            ColumnType::Int => row.try_get::<Option<i64>, _>(name)?.into(),
            ColumnType::Decimal => row.try_get::<Option<Decimal>, _>(name)?.into(),
            ColumnType::Bool => row.try_get::<Option<bool>, _>(name)?.into(),
            ColumnType::Date => row.try_get::<Option<NaiveDate>, _>(name)?.into(),
            ColumnType::Time => row.try_get::<Option<NaiveTime>, _>(name)?.into(),
            ColumnType::Uuid => row.try_get::<Option<Uuid>, _>(name)?.into(),
        };
        out.set(name, value);
    }
    Ok(out)
}

fn column_list(schema: &Schema) -> String {
    schema.columns.iter().map(|c| c.name).collect::<Vec<_>>().join(", ")
}

#[async_trait::async_trait]
impl Database for PostgresDatabase {
    #[instrument(skip(self, schema, query), fields(table = schema.table, rows = tracing::field::Empty), err)]
    async fn fetch(&self, schema: &'static Schema, query: &Query) -> Result<Vec<Row>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(column_list(schema)).push(" FROM ").push(schema.table).push(" WHERE ");
        push_filter(&mut qb, schema, &query.filter)?;

        if !query.order.is_empty() {
            qb.push(" ORDER BY ");
            for (i, (column, direction)) in query.order.iter().enumerate() {
                schema.kind_of(column)?;
                if i > 0 {
                    qb.push(", ");
                }
                qb.push(*column);
                qb.push(match direction {
                    Direction::Asc => " ASC",
                    Direction::Desc => " DESC",
                });
            }
        }
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }
        if query.offset > 0 {
            qb.push(" OFFSET ").push_bind(query.offset);
        }

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch", e))?;

        let decoded = rows
            .iter()
            .map(|r| decode_row(schema, r))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("fetch", e))?;
        Span::current().record("rows", decoded.len());
        Ok(decoded)
    }

    #[instrument(skip(self, schema, filter), fields(table = schema.table), err)]
    async fn count(&self, schema: &'static Schema, filter: &Filter) -> Result<i64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) AS total FROM ");
        qb.push(schema.table).push(" WHERE ");
        push_filter(&mut qb, schema, filter)?;

        let row = qb
            .build()
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count", e))?;
        row.try_get::<i64, _>("total").map_err(|e| map_sqlx_error("count", e))
    }

    #[instrument(skip(self, schema, row), fields(table = schema.table), err)]
    async fn upsert(&self, schema: &'static Schema, row: Row) -> Result<(), StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO ");
        qb.push(schema.table).push(" (").push(column_list(schema)).push(") VALUES (");
        for (i, column) in schema.columns.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            push_value(&mut qb, column.kind, row.value(column.name))?;
        }
        qb.push(") ON CONFLICT (").push(schema.key).push(")");
        let updates = schema
            .columns
            .iter()
            .filter(|c| c.name != schema.key)
            .map(|c| format!("{0} = EXCLUDED.{0}", c.name))
            .collect::<Vec<_>>()
            .join(", ");
        if updates.is_empty() {
            qb.push(" DO NOTHING");
        } else {
            qb.push(" DO UPDATE SET ").push(updates);
        }

        qb.build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("upsert", e))?;
        Ok(())
    }

    #[instrument(skip(self, schema, filter), fields(table = schema.table), err)]
    async fn delete(&self, schema: &'static Schema, filter: &Filter) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM ");
        qb.push(schema.table).push(" WHERE ");
        push_filter(&mut qb, schema, filter)?;

        let result = qb
            .build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::Column;

    static ARTICLES: Schema = Schema {
        table: "articulos",
        key: "referencia",
        columns: &[Column::text("referencia"), Column::text("descripcion"), Column::decimal("pvp")],
        unique: &[],
        order: &[("referencia", Direction::Asc)],
    };

    #[test]
    fn filters_render_placeholders_not_values() {
        let filter = Filter::search(&["referencia", "descripcion"], "50%_off")
            .and(Filter::gte("pvp", Decimal::ONE));
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM articulos WHERE ");
        push_filter(&mut qb, &ARTICLES, &filter).unwrap();

        let sql = qb.sql();
        assert_eq!(
            sql,
            "SELECT 1 FROM articulos WHERE ((CAST(referencia AS TEXT) ILIKE $1 OR CAST(descripcion AS TEXT) ILIKE $2) AND pvp >= $3)"
        );
        assert!(!sql.contains("off"));
    }

    #[test]
    fn like_patterns_escape_wildcards() {
        assert_eq!(escape_like("50%_a\\b"), "%50\\%\\_a\\\\b%");
    }

    #[test]
    fn unknown_filter_columns_fail_before_sql() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        match push_filter(&mut qb, &ARTICLES, &Filter::IsNull("nope")) {
            Err(StoreError::MissingColumn(c)) => assert_eq!(c, "articulos.nope"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }
}
