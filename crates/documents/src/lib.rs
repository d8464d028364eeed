//! Business-document machinery shared by delivery notes and invoices.
//!
//! - `line`: a priced line with discount and taxes
//! - `totals`: header totals recomputed from lines
//! - `tax_breakdown`: per-tax summary lines, reconciled against the header
//! - `header`: fields every document carries, numbering and header checks
//! - `checks`: line/total consistency and duplicate detection used by `full_test`
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod checks;
pub mod header;
pub mod line;
pub mod numbering;
pub mod tax_breakdown;
pub mod totals;

pub use checks::{check_duplicates, check_lines, find_duplicates, BusinessDocument};
pub use header::{DocumentHeader, PartySnapshot};
pub use line::DocumentLine;
pub use numbering::{document_code, next_number};
pub use tax_breakdown::{breakdown_matches, tax_breakdown, TaxBreakdownLine};
pub use totals::DocumentTotals;
