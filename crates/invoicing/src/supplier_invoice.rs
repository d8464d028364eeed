use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use contaerp_accounting::FiscalYear;
use contaerp_core::{Defaults, DomainError, DomainResult, Record, Validator};
use contaerp_documents::{tax_breakdown, BusinessDocument, DocumentHeader, DocumentTotals};
use contaerp_masters::PaymentMethod;
use contaerp_parties::Supplier;
use contaerp_purchasing::{SupplierDeliveryNote, SupplierDeliveryNoteId, SupplierDeliveryNoteLine};

use crate::checks::{check_invoice, InvoiceParts};
use crate::lines::{InvoiceLine, InvoiceTaxLine};
use crate::status::InvoiceStatus;

contaerp_core::uuid_id!(
    /// Supplier invoice identifier.
    SupplierInvoiceId
);

pub type SupplierInvoiceLine = InvoiceLine<SupplierInvoiceId, SupplierDeliveryNoteId>;
pub type SupplierInvoiceTaxLine = InvoiceTaxLine<SupplierInvoiceId>;

/// Supplier invoice (`factura_proveedor`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierInvoice {
    pub id: SupplierInvoiceId,
    pub header: DocumentHeader,
    /// Supplier's own invoice number.
    pub numproveedor: String,
    pub status: InvoiceStatus,
    /// Invoice this one rectifies.
    pub idfacturarect: Option<SupplierInvoiceId>,
    pub codigorect: Option<String>,
}

impl SupplierInvoice {
    pub fn new(header: DocumentHeader) -> Self {
        let vencimiento = header.fecha;
        Self {
            id: SupplierInvoiceId::new(),
            header,
            numproveedor: String::new(),
            status: InvoiceStatus::new(vencimiento),
            idfacturarect: None,
            codigorect: None,
        }
    }

    pub fn for_supplier(
        codejercicio: impl Into<String>,
        supplier: &Supplier,
        defaults: &Defaults,
        fecha: NaiveDate,
        hora: NaiveTime,
    ) -> Self {
        Self::new(DocumentHeader::for_supplier(codejercicio, supplier, defaults, fecha, hora))
    }

    /// Invoice the pending delivery notes of one supplier.
    ///
    /// Lines are copied in note order and keep their note in `idalbaran`;
    /// every note is linked to the new invoice.
    pub fn from_delivery_notes(
        notes: &mut [SupplierDeliveryNote],
        note_lines: &[SupplierDeliveryNoteLine],
        codejercicio: impl Into<String>,
        fecha: NaiveDate,
        hora: NaiveTime,
    ) -> DomainResult<(Self, Vec<SupplierInvoiceLine>)> {
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
                format!("delivery note {} belongs to another supplier", note.header.codigo),
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
        invoice.numproveedor = first.numproveedor.clone();
        let id = invoice.id;
        let lines: Vec<SupplierInvoiceLine> = notes
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

    pub fn set_lines(&mut self, lines: &[SupplierInvoiceLine]) {
        self.header.set_totals(DocumentTotals::from_lines(lines));
    }

    /// Per-tax summary lines, reconciled against the header totals.
    pub fn tax_lines(&self, lines: &[SupplierInvoiceLine]) -> Vec<SupplierInvoiceTaxLine> {
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
        v.max_len("numproveedor", &self.numproveedor, 50).check(
            self.idfacturarect.is_some() == self.codigorect.is_some(),
            "idfacturarect and codigorect must be set together",
        );
    }

    /// Deep check of the invoice with its lines, tax lines, sibling invoices
    /// of the supplier and the amount of its journal entry.
    pub fn full_test(
        &self,
        lines: &[SupplierInvoiceLine],
        tax_lines: &[SupplierInvoiceTaxLine],
        siblings: &[SupplierInvoice],
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

impl Record for SupplierInvoice {
    type Key = SupplierInvoiceId;

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

impl BusinessDocument for SupplierInvoice {
    type Id = SupplierInvoiceId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn header(&self) -> &DocumentHeader {
        &self.header
    }

    fn party_reference(&self) -> &str {
        &self.numproveedor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contaerp_accounting::JournalEntryId;
    use contaerp_documents::DocumentLine;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    }

    fn test_supplier() -> Supplier {
        Supplier::new("000001", "Aceros del Norte", &Defaults::default())
    }

    fn test_invoice() -> (SupplierInvoice, Vec<SupplierInvoiceLine>) {
        let mut invoice =
            SupplierInvoice::for_supplier("2024", &test_supplier(), &Defaults::default(), date(2024, 5, 20), noon());
        invoice.numproveedor = "AN/2024/118".to_string();
        invoice.header.irpf = dec!(15);
        invoice.header.assign_number(3);
        let lines = vec![InvoiceLine::new(
            invoice.id,
            DocumentLine::new("asesoría fiscal", dec!(1), dec!(400))
                .with_tax("IVA21", dec!(21), dec!(0))
                .with_irpf(dec!(15)),
        )];
        invoice.set_lines(&lines);
        (invoice, lines)
    }

    #[test]
    fn withholding_reduces_the_total() {
        let (invoice, lines) = test_invoice();
        assert_eq!(invoice.header.totals.totalirpf, dec!(60));
        assert_eq!(invoice.header.totals.total, dec!(424));
        let tax_lines = invoice.tax_lines(&lines);
        assert_eq!(tax_lines[0].totallinea, dec!(484));
    }

    #[test]
    fn entry_amount_includes_withholding() {
        let (mut invoice, lines) = test_invoice();
        let tax_lines = invoice.tax_lines(&lines);
        invoice.status.idasiento = Some(JournalEntryId::new());
        assert!(invoice.full_test(&lines, &tax_lines, &[], Some(dec!(484)), false).is_ok());
        assert!(invoice.full_test(&lines, &tax_lines, &[], Some(dec!(424)), false).is_err());
    }

    #[test]
    fn same_supplier_number_is_a_duplicate() {
        let (mut invoice, lines) = test_invoice();
        let tax_lines = invoice.tax_lines(&lines);
        invoice.status.idasiento = Some(JournalEntryId::new());
        let mut copy = invoice.clone();
        copy.id = SupplierInvoiceId::new();
        copy.header.assign_number(4);
        let msgs = invoice
            .full_test(&lines, &tax_lines, &[copy.clone()], Some(dec!(484)), false)
            .unwrap_err()
            .messages();
        assert_eq!(msgs.len(), 1, "{msgs:?}");
        assert!(msgs[0].starts_with("possible duplicate of 2024A000004 (2024-05-20"));

        copy.numproveedor = "AN/2024/119".to_string();
        assert!(invoice.full_test(&lines, &tax_lines, &[copy], Some(dec!(484)), false).is_ok());
    }

    #[test]
    fn invoice_from_supplier_notes() {
        let supplier = test_supplier();
        let mut note = SupplierDeliveryNote::for_supplier("2024", &supplier, &Defaults::default(), date(2024, 5, 2), noon());
        note.header.assign_number(1);
        let note_lines = vec![SupplierDeliveryNoteLine::new(
            note.id,
            DocumentLine::new("perfil L", dec!(20), dec!(4.75)).with_tax("IVA21", dec!(21), dec!(0)),
        )];
        note.set_lines(&note_lines);
        let mut notes = vec![note];
        let (invoice, lines) =
            SupplierInvoice::from_delivery_notes(&mut notes, &note_lines, "2024", date(2024, 5, 31), noon()).unwrap();
        assert_eq!(lines[0].idalbaran, Some(notes[0].id));
        assert_eq!(invoice.header.totals.total, dec!(114.95));
        assert!(notes[0].is_invoiced());
    }
}
