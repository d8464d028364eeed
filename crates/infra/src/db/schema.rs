//! Table metadata and the `Table` mapping trait.

use contaerp_core::Record;

use super::error::StoreError;
use super::query::Direction;
use super::row::Row;
use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Int,
    Decimal,
    Bool,
    Date,
    Time,
    Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
    pub nullable: bool,
}

impl Column {
    const fn of(name: &'static str, kind: ColumnType) -> Self {
        Self { name, kind, nullable: false }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::of(name, ColumnType::Text)
    }

    pub const fn int(name: &'static str) -> Self {
        Self::of(name, ColumnType::Int)
    }

    pub const fn decimal(name: &'static str) -> Self {
        Self::of(name, ColumnType::Decimal)
    }

    pub const fn bool(name: &'static str) -> Self {
        Self::of(name, ColumnType::Bool)
    }

    pub const fn date(name: &'static str) -> Self {
        Self::of(name, ColumnType::Date)
    }

    pub const fn time(name: &'static str) -> Self {
        Self::of(name, ColumnType::Time)
    }

    pub const fn uuid(name: &'static str) -> Self {
        Self::of(name, ColumnType::Uuid)
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Shape of one table: name, primary key, columns, unique keys and the
/// default ordering used by `Repository::all`.
#[derive(Debug)]
pub struct Schema {
    pub table: &'static str,
    pub key: &'static str,
    pub columns: &'static [Column],
    pub unique: &'static [&'static [&'static str]],
    pub order: &'static [(&'static str, Direction)],
}

impl Schema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column type for a filter or order column, failing on unknown names.
    pub fn kind_of(&self, name: &str) -> Result<ColumnType, StoreError> {
        self.column(name)
            .map(|c| c.kind)
            .ok_or_else(|| StoreError::MissingColumn(format!("{}.{}", self.table, name)))
    }
}

/// Mapping between a record and its table row.
pub trait Table: Record<Key: Into<Value> + Send + Sync> + Clone + Send + Sync + 'static {
    const SCHEMA: &'static Schema;

    fn to_row(&self) -> Row;

    fn from_row(row: &Row) -> Result<Self, StoreError>;
}
