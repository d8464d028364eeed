//! Inventory: warehouses and per-warehouse stock of each article.
//!
//! This crate contains the stock arithmetic only; moving stock against the
//! database (and keeping `articulo.stockfis` in sync) is done by
//! `contaerp-infra::services::stock`.

pub mod stock;
pub mod warehouse;

pub use stock::{total_quantity, Stock, StockId};
pub use warehouse::Warehouse;
