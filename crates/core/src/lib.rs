//! `contaerp-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod defaults;
pub mod error;
pub mod id;
pub mod money;
pub mod record;
pub mod validation;

pub use defaults::Defaults;
pub use error::{DomainError, DomainResult};
pub use record::Record;
pub use validation::Validator;

// Re-exported for `uuid_id!` expansions in downstream crates.
#[doc(hidden)]
pub use uuid;
