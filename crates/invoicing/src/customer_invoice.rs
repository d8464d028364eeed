use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use contaerp_accounting::FiscalYear;
use contaerp_core::{Defaults, DomainError, DomainResult, Record, Validator};
use contaerp_documents::{tax_breakdown, BusinessDocument, DocumentHeader, DocumentTotals};
use contaerp_masters::PaymentMethod;
use contaerp_parties::Customer;
use contaerp_sales::{CustomerDeliveryNote, CustomerDeliveryNoteId, CustomerDeliveryNoteLine};

use crate::checks::{check_invoice, InvoiceParts};
use crate::lines::{InvoiceLine, InvoiceTaxLine};
use crate::status::InvoiceStatus;

contaerp_core::uuid_id!(
    /// Customer invoice identifier.
    CustomerInvoiceId
);

pub type CustomerInvoiceLine = InvoiceLine<CustomerInvoiceId, CustomerDeliveryNoteId>;
pub type CustomerInvoiceTaxLine = InvoiceTaxLine<CustomerInvoiceId>;

/// Customer invoice (`factura_cliente`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInvoice {
    pub id: CustomerInvoiceId,
    pub header: DocumentHeader,
    /// Customer's own reference.
    pub numero2: String,
    pub status: InvoiceStatus,
    /// Invoice this one rectifies.
    pub idfacturarect: Option<CustomerInvoiceId>,
    pub codigorect: Option<String>,
}

impl CustomerInvoice {
    pub fn new(header: DocumentHeader) -> Self {
        let vencimiento = header.fecha;
        Self {
            id: CustomerInvoiceId::new(),
            header,
            numero2: String::new(),
            status: InvoiceStatus::new(vencimiento),
            idfacturarect: None,
            codigorect: None,
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

    /// Invoice the pending delivery notes of one customer.
    ///
    /// Lines are copied in note order and keep their note in `idalbaran`;
    /// every note is linked to the new invoice.
    pub fn from_delivery_notes(
        notes: &mut [CustomerDeliveryNote],
        note_lines: &[CustomerDeliveryNoteLine],
        codejercicio: impl Into<String>,
        fecha: NaiveDate,
        hora: NaiveTime,
    ) -> DomainResult<(Self, Vec<CustomerInvoiceLine>)> {
        let first = notes
            .first()
            .ok_or_else(|| DomainError::validation("no delivery notes to invoice"))?;

        let mut v = Validator::new();
        for note in notes.iter() {
            v.check(
                !note.is_invoiced(),
                format!("delivery note {} is already invoiced", note.header.codigo),
            )
            .check(
                note.header.party.code == first.header.party.code,
                format!("delivery note {} belongs to another customer", note.header.codigo),
            )
            .check(
                note.header.coddivisa == first.header.coddivisa && note.header.tasaconv == first.header.tasaconv,
                format!("delivery note {} uses another currency or rate", note.header.codigo),
            );
        }
        v.finish()?;

        let mut header = first.header.clone();
        header.codigo.clear();
        header.numero = 0;
        header.codejercicio = codejercicio.into();
        header.fecha = fecha;
        header.hora = hora;
        header.observaciones.clear();

        let mut invoice = Self::new(header);
        invoice.numero2 = first.numero2.clone();
        let id = invoice.id;
        let lines: Vec<CustomerInvoiceLine> = notes
            .iter()
            .flat_map(|note| {
                note_lines
                    .iter()
                    .filter(move |l| l.idalbaran == note.id)
                    .map(move |l| InvoiceLine::from_delivery_note(id, l.idalbaran, l.line.clone()))
            })
            .collect();
        invoice.set_lines(&lines);

        let idfactura = *invoice.id.as_uuid();
        for note in notes.iter_mut() {
            note.mark_invoiced(idfactura)?;
        }
        Ok((invoice, lines))
    }

    /// Take the payment method and its due date.
    pub fn apply_payment_method(&mut self, method: &PaymentMethod) {
        self.header.codpago = method.codpago.clone();
        self.status.vencimiento = method.due_date(self.header.fecha);
    }

    pub fn set_lines(&mut self, lines: &[CustomerInvoiceLine]) {
        self.header.set_totals(DocumentTotals::from_lines(lines));
    }

    /// Per-tax summary lines, reconciled against the header totals.
    pub fn tax_lines(&self, lines: &[CustomerInvoiceLine]) -> Vec<CustomerInvoiceTaxLine> {
        InvoiceTaxLine::from_breakdown(self.id, tax_breakdown(lines, &self.header.totals))
    }

    /// Move the invoice to `fecha`, which must lie in the open `fiscal_year`.
    ///
    /// Keeps the payment term. Returns `true` when the fiscal year changed and
    /// the invoice needs a new number.
    pub fn set_date(&mut self, fecha: NaiveDate, hora: NaiveTime, fiscal_year: &FiscalYear) -> DomainResult<bool> {
        fiscal_year.accepts(fecha)?;
        let term = self.status.vencimiento - self.header.fecha;
        self.header.fecha = fecha;
        self.header.hora = hora;
        self.status.vencimiento = fecha.checked_add_signed(term).unwrap_or(fecha);
        if self.header.codejercicio == fiscal_year.codejercicio {
            return Ok(false);
        }
        self.header.codejercicio = fiscal_year.codejercicio.clone();
        self.header.numero = 0;
        self.header.codigo.clear();
        Ok(true)
    }

    /// Blank rectifying invoice for this one; lines are added by the caller.
    pub fn rectifying(&self, fecha: NaiveDate, hora: NaiveTime) -> Self {
        let mut header = self.header.clone();
        header.codigo.clear();
        header.numero = 0;
        header.fecha = fecha;
        header.hora = hora;
        header.set_totals(DocumentTotals::default());
        let mut invoice = Self::new(header);
        invoice.idfacturarect = Some(self.id);
        invoice.codigorect = Some(self.header.codigo.clone());
        invoice
    }

    pub fn is_rectifying(&self) -> bool {
        self.idfacturarect.is_some()
    }

    /// Outstanding amount in document currency.
    pub fn outstanding(&self) -> Decimal {
        if self.status.pagada || self.status.anulada {
            Decimal::ZERO
        } else {
            self.header.totals.total
        }
    }

    fn check_own_fields(&self, v: &mut Validator) {
        v.max_len("numero2", &self.numero2, 50).check(
            self.idfacturarect.is_some() == self.codigorect.is_some(),
            "idfacturarect and codigorect must be set together",
        );
    }

    /// Deep check of the invoice with its lines, tax lines, sibling invoices
    /// of the customer and the amount of its journal entry.
    pub fn full_test(
        &self,
        lines: &[CustomerInvoiceLine],
        tax_lines: &[CustomerInvoiceTaxLine],
        siblings: &[CustomerInvoice],
        entry_importe: Option<Decimal>,
        tax_free: bool,
    ) -> DomainResult<()> {
        let mut v = Validator::new();
        self.check_own_fields(&mut v);
        v.check(
            lines.iter().all(|l| l.idfactura == self.id) && tax_lines.iter().all(|l| l.idfactura == self.id),
            "a line belongs to another invoice",
        );
        check_invoice(
            &mut v,
            self,
            &self.status,
            InvoiceParts {
                lines,
                tax_lines,
                entry_importe,
                tax_free,
            },
            siblings,
        );
        v.finish()
    }
}

impl Record for CustomerInvoice {
    type Key = CustomerInvoiceId;

    fn key(&self) -> Self::Key {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        self.header.check(&mut v, false);
        self.status.check(&mut v, self.header.fecha);
        self.check_own_fields(&mut v);
        v.finish()
    }
}

impl BusinessDocument for CustomerInvoice {
    type Id = CustomerInvoiceId;

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
