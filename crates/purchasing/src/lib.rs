//! Purchasing: supplier delivery notes (`albaran_proveedor`).
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod delivery_note;

pub use delivery_note::{
    CostReceipt, SupplierDeliveryNote, SupplierDeliveryNoteId, SupplierDeliveryNoteLine, SupplierNoteLineId,
};
