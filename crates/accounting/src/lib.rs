//! Accounting module (double-entry ledger).
//!
//! Fiscal years, the chart of accounts, sub-accounts with running totals,
//! journal entries and their postings, and a builder for generated entries.
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod account;
pub mod builder;
pub mod entry;
pub mod fiscal_year;
pub mod subaccount;

pub use account::{Account, AccountId, SpecialAccount};
pub use builder::EntryBuilder;
pub use entry::{renumber, EntryDocumentType, JournalEntry, JournalEntryId, Posting, PostingId};
pub use fiscal_year::{calendar_code, FiscalYear, FiscalYearStatus};
pub use subaccount::{CustomerSubaccount, PartySubaccountId, Subaccount, SubaccountId, SupplierSubaccount};
