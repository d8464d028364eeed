//! Sales: customer delivery notes (`albaran_cliente`).
//!
//! Pure domain logic only: no IO, no persistence concerns. Stock movements and
//! numbering happen in `contaerp-infra` services.

pub mod delivery_note;

pub use delivery_note::{CustomerDeliveryNote, CustomerDeliveryNoteId, CustomerDeliveryNoteLine, DeliveryNoteLineId};
