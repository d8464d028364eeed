//! Filters and queries understood by every `Database` backend.

use core::cmp::Ordering;

use super::row::Row;
use super::value::Value;

/// Row predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    Eq(&'static str, Value),
    Ne(&'static str, Value),
    Gte(&'static str, Value),
    Lte(&'static str, Value),
    IsNull(&'static str),
    NotNull(&'static str),
    /// Case-insensitive substring match over any of the columns.
    Search(Vec<&'static str>, String),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    /// `column = value`; a null value becomes `IS NULL`.
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        match value.into() {
            Value::Null => Filter::IsNull(column),
            v => Filter::Eq(column, v),
        }
    }

    pub fn ne(column: &'static str, value: impl Into<Value>) -> Self {
        match value.into() {
            Value::Null => Filter::NotNull(column),
            v => Filter::Ne(column, v),
        }
    }

    pub fn gte(column: &'static str, value: impl Into<Value>) -> Self {
        Filter::Gte(column, value.into())
    }

    pub fn lte(column: &'static str, value: impl Into<Value>) -> Self {
        Filter::Lte(column, value.into())
    }

    pub fn search(columns: &[&'static str], text: impl Into<String>) -> Self {
        Filter::Search(columns.to_vec(), text.into())
    }

    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::All, f) | (f, Filter::All) => f,
            (Filter::And(mut fs), f) => {
                fs.push(f);
                Filter::And(fs)
            }
            (f, g) => Filter::And(vec![f, g]),
        }
    }

    pub fn or(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::Or(mut fs), f) => {
                fs.push(f);
                Filter::Or(fs)
            }
            (f, g) => Filter::Or(vec![f, g]),
        }
    }

    /// Columns referenced by the filter.
    pub fn columns(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns(&self, out: &mut Vec<&'static str>) {
        match self {
            Filter::All => {}
            Filter::Eq(c, _)
            | Filter::Ne(c, _)
            | Filter::Gte(c, _)
            | Filter::Lte(c, _)
            | Filter::IsNull(c)
            | Filter::NotNull(c) => out.push(c),
            Filter::Search(cs, _) => out.extend(cs.iter().copied()),
            Filter::And(fs) | Filter::Or(fs) => fs.iter().for_each(|f| f.collect_columns(out)),
        }
    }

    /// Evaluate against an in-memory row with SQL null semantics.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(c, v) => row.value(c).sql_eq(v),
            Filter::Ne(c, v) => {
                let current = row.value(c);
                !current.is_null() && !current.sql_eq(v)
            }
            Filter::Gte(c, v) => non_null_cmp(row.value(c), v).is_some_and(|o| o != Ordering::Less),
            Filter::Lte(c, v) => non_null_cmp(row.value(c), v).is_some_and(|o| o != Ordering::Greater),
            Filter::IsNull(c) => row.value(c).is_null(),
            Filter::NotNull(c) => !row.value(c).is_null(),
            Filter::Search(cs, text) => {
                let needle = text.to_lowercase();
                cs.iter()
                    .any(|c| row.value(c).as_text().is_some_and(|s| s.to_lowercase().contains(&needle)))
            }
            Filter::And(fs) => fs.iter().all(|f| f.matches(row)),
            Filter::Or(fs) => fs.iter().any(|f| f.matches(row)),
        }
    }
}

fn non_null_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    if a.is_null() || b.is_null() {
        return None;
    }
    a.compare(b)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Filter plus ordering and paging.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub filter: Filter,
    pub order: Vec<(&'static str, Direction)>,
    pub limit: Option<i64>,
    pub offset: i64,
}

impl Default for Query {
    fn default() -> Self {
        Self::all()
    }
}

impl Query {
    pub fn all() -> Self {
        Self {
            filter: Filter::All,
            order: Vec::new(),
            limit: None,
            offset: 0,
        }
    }

    pub fn filter(filter: Filter) -> Self {
        Self { filter, ..Self::all() }
    }

    pub fn order_by(mut self, column: &'static str) -> Self {
        self.order.push((column, Direction::Asc));
        self
    }

    pub fn order_by_desc(mut self, column: &'static str) -> Self {
        self.order.push((column, Direction::Desc));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset.max(0);
        self
    }

    /// One page of `size` rows starting at `offset`.
    pub fn page(self, offset: i64, size: i64) -> Self {
        self.offset(offset).limit(size)
    }

    /// Order two rows by this query's sort keys.
    pub fn compare(&self, a: &Row, b: &Row) -> Ordering {
        for (column, direction) in &self.order {
            let ord = a.value(column).compare(b.value(column)).unwrap_or(Ordering::Equal);
            let ord = match direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}
