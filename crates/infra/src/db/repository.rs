use std::marker::PhantomData;
use std::sync::Arc;

use super::database::Database;
use super::error::StoreError;
use super::query::{Filter, Query};
use super::schema::Table;
use super::value::Value;

/// Typed access to the rows of one table.
///
/// `save` runs `Record::validate` before writing; checks that need other
/// records (`full_test`) are the caller's job.
pub struct Repository<T> {
    db: Arc<dyn Database>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Table> Repository<T> {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self {
            db,
            _record: PhantomData,
        }
    }

    fn key_filter(key: &T::Key) -> Filter {
        Filter::eq(T::SCHEMA.key, key.clone())
    }

    fn decode(rows: Vec<super::row::Row>) -> Result<Vec<T>, StoreError> {
        rows.iter().map(T::from_row).collect()
    }

    pub async fn get(&self, key: &T::Key) -> Result<Option<T>, StoreError> {
        self.first(Self::key_filter(key)).await
    }

    pub async fn exists(&self, key: &T::Key) -> Result<bool, StoreError> {
        Ok(self.db.count(T::SCHEMA, &Self::key_filter(key)).await? > 0)
    }

    /// Validate, then insert or update.
    pub async fn save(&self, record: &T) -> Result<(), StoreError> {
        record.validate()?;
        self.db.upsert(T::SCHEMA, record.to_row()).await
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, key: &T::Key) -> Result<bool, StoreError> {
        Ok(self.db.delete(T::SCHEMA, &Self::key_filter(key)).await? > 0)
    }

    pub async fn delete_where(&self, filter: Filter) -> Result<u64, StoreError> {
        self.db.delete(T::SCHEMA, &filter).await
    }

    /// Every row in the table's default order.
    pub async fn all(&self) -> Result<Vec<T>, StoreError> {
        self.find(self.ordered(Query::all())).await
    }

    /// Matching rows in the table's default order.
    pub async fn find_where(&self, filter: Filter) -> Result<Vec<T>, StoreError> {
        self.find(self.ordered(Query::filter(filter))).await
    }

    pub async fn find(&self, query: Query) -> Result<Vec<T>, StoreError> {
        Self::decode(self.db.fetch(T::SCHEMA, &query).await?)
    }

    pub async fn first(&self, filter: Filter) -> Result<Option<T>, StoreError> {
        let query = self.ordered(Query::filter(filter)).limit(1);
        Ok(self.find(query).await?.into_iter().next())
    }

    pub async fn count(&self, filter: Filter) -> Result<i64, StoreError> {
        self.db.count(T::SCHEMA, &filter).await
    }

    /// Largest value of an integer column among matching rows.
    pub async fn max_int(&self, column: &'static str, filter: Filter) -> Result<Option<i64>, StoreError> {
        let query = Query::filter(filter.and(Filter::NotNull(column)))
            .order_by_desc(column)
            .limit(1);
        let rows = self.db.fetch(T::SCHEMA, &query).await?;
        match rows.first() {
            Some(row) => match row.value(column) {
                Value::Int(n) => Ok(Some(*n)),
                _ => Err(StoreError::decode(column, "integer")),
            },
            None => Ok(None),
        }
    }

    /// Apply the table's default ordering when the query has none.
    pub fn ordered(&self, mut query: Query) -> Query {
        if query.order.is_empty() {
            query.order = T::SCHEMA.order.to_vec();
        }
        query
    }
}
