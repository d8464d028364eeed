use std::collections::BTreeMap;
use std::str::FromStr;

use super::error::StoreError;
use super::value::{FromValue, Value};

/// A table row: column name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: BTreeMap<&'static str, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.values.insert(column, value.into());
        self
    }

    pub fn set(&mut self, column: &'static str, value: impl Into<Value>) {
        self.values.insert(column, value.into());
    }

    /// Raw value; `Null` when the column is absent.
    pub fn value(&self, column: &str) -> &Value {
        self.values.get(column).unwrap_or(&Value::Null)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn get<T: FromValue>(&self, column: &str) -> Result<T, StoreError> {
        let value = self
            .values
            .get(column)
            .ok_or_else(|| StoreError::MissingColumn(column.to_string()))?;
        T::from_value(value).ok_or_else(|| StoreError::decode(column, T::KIND))
    }

    /// Text column parsed with `FromStr` (enum tags, due terms).
    pub fn parse<T: FromStr>(&self, column: &str) -> Result<T, StoreError> {
        let text: String = self.get(column)?;
        text.parse()
            .map_err(|_| StoreError::decode(column, core::any::type_name::<T>()))
    }

    pub fn parse_opt<T: FromStr>(&self, column: &str) -> Result<Option<T>, StoreError> {
        let text: Option<String> = self.get(column)?;
        text.filter(|t| !t.is_empty())
            .map(|t| t.parse().map_err(|_| StoreError::decode(column, core::any::type_name::<T>())))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_reports_missing_and_mistyped_columns() {
        let row = Row::new().with("numero", 7i64).with("codigo", "2024A000007");

        assert_eq!(row.get::<i64>("numero").unwrap(), 7);
        match row.get::<i64>("codigo") {
            Err(StoreError::Decode { column, .. }) => assert_eq!(column, "codigo"),
            other => panic!("expected decode error, got {other:?}"),
        }
        match row.get::<String>("fecha") {
            Err(StoreError::MissingColumn(c)) => assert_eq!(c, "fecha"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn parse_uses_from_str() {
        let row = Row::new().with("n", "42").with("empty", Value::Null);
        assert_eq!(row.parse::<u32>("n").unwrap(), 42);
        assert_eq!(row.parse_opt::<u32>("empty").unwrap(), None);
    }
}
