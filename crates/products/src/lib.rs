//! Catalogue: articles, families and manufacturers.
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod article;
pub mod family;
pub mod manufacturer;

pub use article::Article;
pub use family::Family;
pub use manufacturer::Manufacturer;
