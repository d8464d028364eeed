use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use contaerp_core::{Defaults, DomainError, DomainResult, Record, Validator};
use contaerp_documents::{check_duplicates, check_lines, BusinessDocument, DocumentHeader, DocumentLine, DocumentTotals};
use contaerp_parties::Customer;

contaerp_core::uuid_id!(
    /// Customer delivery note identifier.
    CustomerDeliveryNoteId
);

contaerp_core::uuid_id!(
    /// Delivery note line identifier.
    DeliveryNoteLineId
);

/// Customer delivery note (`albaran_cliente`).
///
/// A note is pending (`ptefactura`) until an invoice picks it up; from then
/// on `idfactura` points at that invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDeliveryNote {
    pub id: CustomerDeliveryNoteId,
    pub header: DocumentHeader,
    /// Customer's own reference (order number, etc.).
    pub numero2: String,
    pub ptefactura: bool,
    pub idfactura: Option<Uuid>,
}

impl CustomerDeliveryNote {
    pub fn new(header: DocumentHeader) -> Self {
        Self {
            id: CustomerDeliveryNoteId::new(),
            header,
            numero2: String::new(),
            ptefactura: true,
            idfactura: None,
        }
    }

    pub fn for_customer(
        codejercicio: impl Into<String>,
        customer: &Customer,
        defaults: &Defaults,
        fecha: NaiveDate,
        hora: NaiveTime,
    ) -> Self {
        Self::new(DocumentHeader::for_customer(codejercicio, customer, defaults, fecha, hora))
    }

    pub fn is_invoiced(&self) -> bool {
        self.idfactura.is_some()
    }

    /// Recompute header totals from `lines`.
    pub fn set_lines(&mut self, lines: &[CustomerDeliveryNoteLine]) {
        self.header.set_totals(DocumentTotals::from_lines(lines));
    }

    pub fn mark_invoiced(&mut self, idfactura: Uuid) -> DomainResult<()> {
        if self.idfactura.is_some_and(|current| current != idfactura) {
            return Err(DomainError::conflict(format!(
                "delivery note {} is already invoiced",
                self.header.codigo
            )));
        }
        self.idfactura = Some(idfactura);
        self.ptefactura = false;
        Ok(())
    }

    /// Back to pending after its invoice was deleted.
    pub fn unlink_invoice(&mut self) {
        self.idfactura = None;
        self.ptefactura = true;
    }

    fn check(&self, v: &mut Validator, tax_free: bool) {
        self.header.check(v, tax_free);
        v.max_len("numero2", &self.numero2, 50).check(
            self.ptefactura == self.idfactura.is_none(),
            "ptefactura must be set exactly when the note has no invoice",
        );
    }

    /// Deep check: header, lines against totals, and likely duplicates among `siblings`.
    pub fn full_test(
        &self,
        lines: &[CustomerDeliveryNoteLine],
        siblings: &[CustomerDeliveryNote],
        tax_free: bool,
    ) -> DomainResult<()> {
        let mut v = Validator::new();
        self.check(&mut v, tax_free);
        v.check(
            lines.iter().all(|l| l.idalbaran == self.id),
            "a line belongs to another delivery note",
        );
        check_lines(&mut v, &self.header, lines, tax_free);
        check_duplicates(&mut v, self, siblings);
        v.finish()
    }
}

impl Record for CustomerDeliveryNote {
    type Key = CustomerDeliveryNoteId;

    fn key(&self) -> Self::Key {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        self.check(&mut v, false);
        v.finish()
    }
}

impl BusinessDocument for CustomerDeliveryNote {
    type Id = CustomerDeliveryNoteId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn header(&self) -> &DocumentHeader {
        &self.header
    }

    fn party_reference(&self) -> &str {
        &self.numero2
    }
}

/// Line of a customer delivery note (`lineasalbaranescli`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDeliveryNoteLine {
    pub id: DeliveryNoteLineId,
    pub idalbaran: CustomerDeliveryNoteId,
    pub line: DocumentLine,
}

impl CustomerDeliveryNoteLine {
    pub fn new(idalbaran: CustomerDeliveryNoteId, line: DocumentLine) -> Self {
        Self {
            id: DeliveryNoteLineId::new(),
            idalbaran,
            line,
        }
    }
}

impl AsRef<DocumentLine> for CustomerDeliveryNoteLine {
    fn as_ref(&self) -> &DocumentLine {
        &self.line
    }
}

impl Record for CustomerDeliveryNoteLine {
    type Key = DeliveryNoteLineId;

    fn key(&self) -> Self::Key {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        self.line.validate()
    }
}
