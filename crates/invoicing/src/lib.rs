//! Invoicing: customer and supplier invoices, their lines and tax lines, and
//! the journal entries they generate.
//!
//! Pure domain logic only: no IO, no persistence concerns.

mod checks;
pub mod customer_invoice;
pub mod lines;
pub mod posting;
pub mod status;
pub mod supplier_invoice;

pub use customer_invoice::{CustomerInvoice, CustomerInvoiceId, CustomerInvoiceLine, CustomerInvoiceTaxLine};
pub use lines::{InvoiceLine, InvoiceLineId, InvoiceTaxLine, InvoiceTaxLineId};
pub use posting::{
    customer_invoice_entry, customer_payment_entry, supplier_invoice_entry, supplier_payment_entry, PostingAccounts,
};
pub use status::InvoiceStatus;
pub use supplier_invoice::{SupplierInvoice, SupplierInvoiceId, SupplierInvoiceLine, SupplierInvoiceTaxLine};
