//! Row storage: typed values, table schemas, filters, the `Database` trait
//! with its in-memory and Postgres backends, and `Repository<T>`.

mod database;
mod error;
mod memory;
mod postgres;
mod query;
mod repository;
mod row;
mod schema;
mod value;

pub use database::Database;
pub use error::StoreError;
pub use memory::InMemoryDatabase;
pub use postgres::PostgresDatabase;
pub use query::{Direction, Filter, Query};
pub use repository::Repository;
pub use row::Row;
pub use schema::{Column, ColumnType, Schema, Table};
pub use value::{FromValue, Value};
