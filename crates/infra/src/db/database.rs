use std::sync::Arc;

use super::error::StoreError;
use super::query::{Filter, Query};
use super::row::Row;
use super::schema::Schema;

/// Row storage used by every repository.
///
/// Implementations: [`InMemoryDatabase`](super::InMemoryDatabase) for tests
/// and development, [`PostgresDatabase`](super::PostgresDatabase) for
/// production.
#[async_trait::async_trait]
pub trait Database: Send + Sync {
    async fn fetch(&self, schema: &'static Schema, query: &Query) -> Result<Vec<Row>, StoreError>;

    async fn count(&self, schema: &'static Schema, filter: &Filter) -> Result<i64, StoreError>;

    /// Insert the row, or replace the row with the same primary key.
    async fn upsert(&self, schema: &'static Schema, row: Row) -> Result<(), StoreError>;

    /// Delete matching rows and return how many were removed.
    async fn delete(&self, schema: &'static Schema, filter: &Filter) -> Result<u64, StoreError>;
}

#[async_trait::async_trait]
impl<D> Database for Arc<D>
where
    D: Database + ?Sized,
{
    async fn fetch(&self, schema: &'static Schema, query: &Query) -> Result<Vec<Row>, StoreError> {
        (**self).fetch(schema, query).await
    }

    async fn count(&self, schema: &'static Schema, filter: &Filter) -> Result<i64, StoreError> {
        (**self).count(schema, filter).await
    }

    async fn upsert(&self, schema: &'static Schema, row: Row) -> Result<(), StoreError> {
        (**self).upsert(schema, row).await
    }

    async fn delete(&self, schema: &'static Schema, filter: &Filter) -> Result<u64, StoreError> {
        (**self).delete(schema, filter).await
    }
}
