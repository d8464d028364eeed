//! Master data shared by every commercial and accounting record:
//! currencies, countries, taxes, document series and payment methods.
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod country;
pub mod currency;
pub mod payment_method;
pub mod series;
pub mod tax;

pub use country::Country;
pub use currency::Currency;
pub use payment_method::{DueTerm, PaymentMethod, ReceiptMode};
pub use series::Series;
pub use tax::Tax;
