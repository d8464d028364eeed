use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use contaerp_accounting::JournalEntryId;
use contaerp_core::{DomainError, DomainResult, Validator};

/// Payment and posting state shared by customer and supplier invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceStatus {
    pub vencimiento: NaiveDate,
    pub pagada: bool,
    pub anulada: bool,
    /// Entry generated for the invoice.
    pub idasiento: Option<JournalEntryId>,
    /// Entry generated for the payment.
    pub idasientop: Option<JournalEntryId>,
}

impl InvoiceStatus {
    pub fn new(vencimiento: NaiveDate) -> Self {
        Self {
            vencimiento,
            pagada: false,
            anulada: false,
            idasiento: None,
            idasientop: None,
        }
    }

    /// Invariant: cannot pay a void or already paid invoice.
    pub fn can_accept_payment(&self) -> bool {
        !self.anulada && !self.pagada
    }

    pub fn mark_paid(&mut self, idasientop: Option<JournalEntryId>) -> DomainResult<()> {
        if !self.can_accept_payment() {
            return Err(DomainError::invariant("cannot pay a void or already paid invoice"));
        }
        self.pagada = true;
        self.idasientop = idasientop;
        Ok(())
    }

    /// Undo a payment; returns the payment entry to delete.
    pub fn mark_unpaid(&mut self) -> DomainResult<Option<JournalEntryId>> {
        if !self.pagada {
            return Err(DomainError::conflict("invoice is not paid"));
        }
        self.pagada = false;
        Ok(self.idasientop.take())
    }

    pub fn void(&mut self) -> DomainResult<()> {
        if self.anulada {
            return Err(DomainError::conflict("invoice is already void"));
        }
        self.anulada = true;
        Ok(())
    }

    pub fn check(&self, v: &mut Validator, fecha: NaiveDate) {
        v.check(
            self.vencimiento >= fecha,
            format!("vencimiento {} is before the invoice date {fecha}", self.vencimiento),
        )
        .check(
            self.idasientop.is_none() || self.pagada,
            "an unpaid invoice cannot have a payment entry",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_status() -> InvoiceStatus {
        InvoiceStatus::new(NaiveDate::from_ymd_opt(2024, 7, 31).unwrap())
    }

    #[test]
    fn pay_and_unpay() {
        let mut status = test_status();
        let entry = JournalEntryId::new();
        status.mark_paid(Some(entry)).unwrap();
        assert!(status.pagada);
        match status.mark_paid(None) {
            Err(DomainError::InvariantViolation(_)) => {}
            other => panic!("expected InvariantViolation, got {other:?}"),
        }
        assert_eq!(status.mark_unpaid().unwrap(), Some(entry));
        assert!(status.idasientop.is_none());
        assert!(status.mark_unpaid().is_err());
    }

    #[test]
    fn void_invoices_cannot_be_paid() {
        let mut status = test_status();
        status.void().unwrap();
        assert!(!status.can_accept_payment());
        assert!(status.mark_paid(None).is_err());
        match status.void() {
            Err(DomainError::Conflict(msg)) => assert!(msg.contains("already void")),
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn due_date_cannot_precede_issue() {
        let status = test_status();
        let mut v = Validator::new();
        status.check(&mut v, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert!(v.is_ok());
        status.check(&mut v, NaiveDate::from_ymd_opt(2024, 8, 1).unwrap());
        assert_eq!(v.messages().len(), 1);
    }
}
