use std::collections::HashMap;
use std::sync::RwLock;

use super::database::Database;
use super::error::StoreError;
use super::query::{Filter, Query};
use super::row::Row;
use super::schema::Schema;

/// In-memory row store for tests/dev.
///
/// Rows keep insertion order; primary keys and the schema's unique keys are
/// enforced on upsert the way the SQL schema enforces them.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    tables: RwLock<HashMap<&'static str, Vec<Row>>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

fn check_columns(schema: &Schema, filter: &Filter) -> Result<(), StoreError> {
    for column in filter.columns() {
        schema.kind_of(column)?;
    }
    Ok(())
}

fn check_unique(schema: &Schema, rows: &[Row], row: &Row) -> Result<(), StoreError> {
    let key = row.value(schema.key);
    for columns in schema.unique {
        let clash = rows.iter().find(|other| {
            !other.value(schema.key).sql_eq(key) && columns.iter().all(|c| other.value(c).sql_eq(row.value(c)))
        });
        if clash.is_some() {
            return Err(StoreError::Conflict(format!(
                "duplicate key ({}) in {}",
                columns.join(", "),
                schema.table
            )));
        }
    }
    Ok(())
}

#[async_trait::async_trait]
impl Database for InMemoryDatabase {
    async fn fetch(&self, schema: &'static Schema, query: &Query) -> Result<Vec<Row>, StoreError> {
        check_columns(schema, &query.filter)?;
        for (column, _) in &query.order {
            schema.kind_of(column)?;
        }
        let tables = self.tables.read().map_err(|_| poisoned())?;
        let mut rows: Vec<Row> = tables
            .get(schema.table)
            .map(|rows| rows.iter().filter(|r| query.filter.matches(r)).cloned().collect())
            .unwrap_or_default();
        rows.sort_by(|a, b| query.compare(a, b));

        let offset = usize::try_from(query.offset).unwrap_or(0);
        let limit = query.limit.and_then(|l| usize::try_from(l).ok()).unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, schema: &'static Schema, filter: &Filter) -> Result<i64, StoreError> {
        check_columns(schema, filter)?;
        let tables = self.tables.read().map_err(|_| poisoned())?;
        let n = tables
            .get(schema.table)
            .map(|rows| rows.iter().filter(|r| filter.matches(r)).count())
            .unwrap_or(0);
        Ok(n as i64)
    }

    async fn upsert(&self, schema: &'static Schema, row: Row) -> Result<(), StoreError> {
        for column in schema.columns {
            if !row.contains(column.name) {
                return Err(StoreError::MissingColumn(format!("{}.{}", schema.table, column.name)));
            }
            if !column.nullable && row.value(column.name).is_null() {
                return Err(StoreError::Backend(format!(
                    "null value in column {}.{}",
                    schema.table, column.name
                )));
            }
        }

        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let rows = tables.entry(schema.table).or_default();
        check_unique(schema, rows, &row)?;

        let key = row.value(schema.key).clone();
        match rows.iter_mut().find(|r| r.value(schema.key).sql_eq(&key)) {
            Some(existing) => *existing = row,
            None => rows.push(row),
        }
        Ok(())
    }

    async fn delete(&self, schema: &'static Schema, filter: &Filter) -> Result<u64, StoreError> {
        check_columns(schema, filter)?;
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let Some(rows) = tables.get_mut(schema.table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| !filter.matches(r));
        Ok((before - rows.len()) as u64)
    }
}
