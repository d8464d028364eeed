//! Third parties: sales agents, customers, suppliers and their addresses.
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod address;
pub mod agent;
pub mod customer;
pub mod supplier;

mod contact;

pub use address::{AddressId, CustomerAddress, PostalAddress, SupplierAddress};
pub use agent::Agent;
pub use contact::{next_numeric_code, TaxRegime};
pub use customer::Customer;
pub use supplier::Supplier;
