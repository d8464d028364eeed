//! Orchestration across records.
//!
//! [`Services`] owns the database handle, the defaults every new record
//! starts from and the page size of the finders. Each submodule adds the
//! operations of one area as methods on it:
//!
//! - `stock`: stock movements and the article stock total
//! - `parties`: customer/supplier codes, finders and addresses
//! - `products`: article finders
//! - `fiscal_years`: the year a date falls in
//! - `subaccounts`: special accounts, party sub-accounts, running totals
//! - `entries`: journal entries with their postings
//! - `delivery_notes`: customer and supplier delivery notes
//! - `customer_invoices`, `supplier_invoices`: invoices, their entries and payments
//! - `invoices`: posting accounts shared by both invoice kinds
//!
//! There are no transactions: a cascade is a sequence of single-row writes
//! and stops at the first error.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use contaerp_core::{Defaults, DomainError};
use contaerp_documents::{next_number, DocumentHeader};
use contaerp_masters::Series;

use crate::config::Settings;
use crate::db::{Database, Filter, InMemoryDatabase, Query, Repository, StoreError, Table};

mod customer_invoices;
mod delivery_notes;
mod entries;
mod fiscal_years;
mod invoices;
mod parties;
mod products;
mod stock;
mod subaccounts;
mod supplier_invoices;

pub use entries::FixSummary;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Validation or business-rule failure; carries the messages to show.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(StoreError),

    #[error("{0} not found")]
    NotFound(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Invalid(domain) => ServiceError::Domain(domain),
            other => ServiceError::Store(other),
        }
    }
}

impl ServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound(what.into())
    }

    /// Human-readable messages, one per problem.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ServiceError::Domain(err) => err.messages(),
            other => vec![other.to_string()],
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result of a consistency check over one document or entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    /// Document code, or `entry N (year)` for journal entries.
    pub document: String,
    pub messages: Vec<String>,
}

impl Problem {
    fn from_result(document: impl Into<String>, result: ServiceResult<()>) -> Option<Self> {
        result.err().map(|err| Problem {
            document: document.into(),
            messages: err.messages(),
        })
    }
}

#[derive(Clone)]
pub struct Services {
    db: Arc<dyn Database>,
    defaults: Defaults,
    page_size: i64,
}

impl Services {
    pub fn new(db: Arc<dyn Database>, settings: &Settings) -> Self {
        Self {
            db,
            defaults: settings.defaults.clone(),
            page_size: settings.page_size,
        }
    }

    /// Services over a fresh in-memory database with default settings.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryDatabase::new()), &Settings::default())
    }

    pub fn repo<T: Table>(&self) -> Repository<T> {
        Repository::new(self.db.clone())
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// One page of `filter` in the table's default order.
    async fn page<T: Table>(&self, filter: Filter, offset: i64) -> ServiceResult<Vec<T>> {
        let repo = self.repo::<T>();
        let query = repo.ordered(Query::filter(filter)).page(offset, self.page_size);
        Ok(repo.find(query).await?)
    }

    async fn series(&self, codserie: &str) -> ServiceResult<Series> {
        self.repo::<Series>()
            .get(&codserie.to_string())
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("series {codserie}")))
    }

    /// Next free number for `header` in its (fiscal year, series) sequence of table `T`.
    async fn next_document_number<T: Table>(&self, header: &DocumentHeader) -> ServiceResult<i64> {
        let series = self.series(&header.codserie).await?;
        let max = self
            .repo::<T>()
            .max_int(
                "numero",
                Filter::eq("codejercicio", &header.codejercicio).and(Filter::eq("codserie", &header.codserie)),
            )
            .await?;
        Ok(next_number(max, series.numfactura))
    }

    /// Documents of table `T` that could duplicate one of `party` dated `fecha`.
    async fn same_day_documents<T: Table>(
        &self,
        party_column: &'static str,
        party: &str,
        fecha: NaiveDate,
    ) -> ServiceResult<Vec<T>> {
        Ok(self
            .repo::<T>()
            .find_where(Filter::eq(party_column, party).and(Filter::eq("fecha", fecha)))
            .await?)
    }
}
