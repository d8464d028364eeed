//! Journal entries generated from invoices (`asiento_factura`).
//!
//! Amounts are taken from the invoice in its own currency; the builder
//! converts them with the invoice rate and absorbs the conversion rounding.
//! Negative amounts (rectifying invoices) post on the opposite side.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use contaerp_accounting::{EntryBuilder, EntryDocumentType, JournalEntry, Posting, Subaccount};
use contaerp_core::{DomainError, DomainResult};
use contaerp_documents::DocumentHeader;

use crate::customer_invoice::{CustomerInvoice, CustomerInvoiceTaxLine};
use crate::lines::InvoiceTaxLine;
use crate::supplier_invoice::{SupplierInvoice, SupplierInvoiceTaxLine};

/// Sub-accounts an invoice entry posts to, resolved in the invoice's fiscal year.
#[derive(Debug, Clone)]
pub struct PostingAccounts {
    /// Customer, supplier or creditor.
    pub party: Subaccount,
    /// `VENTAS` or `COMPRA`.
    pub goods: Subaccount,
    /// `IVAREP` or `IVASOP`, for taxes without their own sub-account.
    pub vat: Subaccount,
    /// Sub-accounts configured on taxes, by `codimpuesto`.
    pub vat_by_tax: Vec<(String, Subaccount)>,
    /// `IVARRE` or `IVASRE`.
    pub surcharge: Option<Subaccount>,
    /// `IRPFPR` or `IRPF`.
    pub withholding: Option<Subaccount>,
}

impl PostingAccounts {
    pub fn new(party: Subaccount, goods: Subaccount, vat: Subaccount) -> Self {
        Self {
            party,
            goods,
            vat,
            vat_by_tax: Vec::new(),
            surcharge: None,
            withholding: None,
        }
    }

    pub fn vat_for(&self, codimpuesto: Option<&str>) -> &Subaccount {
        codimpuesto
            .and_then(|code| self.vat_by_tax.iter().find(|(c, _)| c == code))
            .map(|(_, sub)| sub)
            .unwrap_or(&self.vat)
    }

    fn required<'a>(sub: &'a Option<Subaccount>, tag: &str, header: &DocumentHeader) -> DomainResult<&'a Subaccount> {
        sub.as_ref().ok_or_else(|| {
            DomainError::validation(format!(
                "no {tag} sub-account in fiscal year {} for invoice {}",
                header.codejercicio, header.codigo
            ))
        })
    }
}

fn debit<'b>(b: &'b mut EntryBuilder, sub: &Subaccount, amount: Decimal) -> &'b mut Posting {
    if amount.is_sign_negative() {
        b.credit(sub, -amount)
    } else {
        b.debit(sub, amount)
    }
}

fn credit<'b>(b: &'b mut EntryBuilder, sub: &Subaccount, amount: Decimal) -> &'b mut Posting {
    if amount.is_sign_negative() {
        b.debit(sub, -amount)
    } else {
        b.credit(sub, amount)
    }
}

fn builder(header: &DocumentHeader, label: &str, tipo: EntryDocumentType) -> EntryBuilder {
    EntryBuilder::new(
        header.codejercicio.clone(),
        header.fecha,
        format!("{label} {} - {}", header.codigo, header.party.nombre),
    )
    .document(tipo, header.codigo.clone(), header.party.cifnif.clone())
    .currency(header.coddivisa.clone(), header.tasaconv)
}

fn post_vat<F>(b: &mut EntryBuilder, accounts: &PostingAccounts, tax_lines: &[InvoiceTaxLine<F>], sales: bool) {
    for tax in tax_lines.iter().filter(|t| !t.totaliva.is_zero()) {
        let sub = accounts.vat_for(tax.codimpuesto.as_deref());
        let posting = if sales {
            credit(b, sub, tax.totaliva)
        } else {
            debit(b, sub, tax.totaliva)
        };
        posting.iva = tax.iva;
        posting.recargo = tax.recargo;
        posting.baseimponible = tax.neto;
        posting.set_counterpart(&accounts.party);
    }
}

/// Sales entry: Dr customer `total`, Dr withholding; Cr sales `neto`, Cr VAT per tax line, Cr surcharge.
pub fn customer_invoice_entry(
    invoice: &CustomerInvoice,
    tax_lines: &[CustomerInvoiceTaxLine],
    accounts: &PostingAccounts,
) -> DomainResult<(JournalEntry, Vec<Posting>)> {
    let h = &invoice.header;
    let mut b = builder(h, "Factura de cliente", EntryDocumentType::CustomerInvoice);

    debit(&mut b, &accounts.party, h.totals.total).set_counterpart(&accounts.goods);
    if !h.totals.totalirpf.is_zero() {
        let sub = PostingAccounts::required(&accounts.withholding, "IRPFPR", h)?;
        debit(&mut b, sub, h.totals.totalirpf);
    }
    credit(&mut b, &accounts.goods, h.totals.neto).set_counterpart(&accounts.party);
    post_vat(&mut b, accounts, tax_lines, true);
    if !h.totals.totalrecargo.is_zero() {
        let sub = PostingAccounts::required(&accounts.surcharge, "IVARRE", h)?;
        credit(&mut b, sub, h.totals.totalrecargo).set_counterpart(&accounts.party);
    }
    b.build()
}

/// Purchase entry: Dr purchases `neto`, Dr VAT per tax line, Dr surcharge; Cr supplier `total`, Cr withholding.
pub fn supplier_invoice_entry(
    invoice: &SupplierInvoice,
    tax_lines: &[SupplierInvoiceTaxLine],
    accounts: &PostingAccounts,
) -> DomainResult<(JournalEntry, Vec<Posting>)> {
    let h = &invoice.header;
    let mut b = builder(h, "Factura de proveedor", EntryDocumentType::SupplierInvoice);

    debit(&mut b, &accounts.goods, h.totals.neto).set_counterpart(&accounts.party);
    post_vat(&mut b, accounts, tax_lines, false);
    if !h.totals.totalrecargo.is_zero() {
        let sub = PostingAccounts::required(&accounts.surcharge, "IVASRE", h)?;
        debit(&mut b, sub, h.totals.totalrecargo).set_counterpart(&accounts.party);
    }
    credit(&mut b, &accounts.party, h.totals.total).set_counterpart(&accounts.goods);
    if !h.totals.totalirpf.is_zero() {
        let sub = PostingAccounts::required(&accounts.withholding, "IRPF", h)?;
        credit(&mut b, sub, h.totals.totalirpf);
    }
    b.build()
}

fn payment_builder(header: &DocumentHeader, label: &str, tipo: EntryDocumentType, fecha: NaiveDate, codejercicio: &str) -> EntryBuilder {
    EntryBuilder::new(
        codejercicio.to_string(),
        fecha,
        format!("{label} {} - {}", header.codigo, header.party.nombre),
    )
    .document(tipo, header.codigo.clone(), header.party.cifnif.clone())
    .currency(header.coddivisa.clone(), header.tasaconv)
}

/// Collection of a customer invoice: Dr cash / Cr customer.
pub fn customer_payment_entry(
    invoice: &CustomerInvoice,
    customer: &Subaccount,
    cash: &Subaccount,
    fecha: NaiveDate,
) -> DomainResult<(JournalEntry, Vec<Posting>)> {
    let h = &invoice.header;
    let mut b = payment_builder(h, "Cobro factura", EntryDocumentType::CustomerPayment, fecha, &cash.codejercicio);
    debit(&mut b, cash, h.totals.total).set_counterpart(customer);
    credit(&mut b, customer, h.totals.total).set_counterpart(cash);
    b.build()
}

/// Payment of a supplier invoice: Dr supplier / Cr cash.
pub fn supplier_payment_entry(
    invoice: &SupplierInvoice,
    supplier: &Subaccount,
    cash: &Subaccount,
    fecha: NaiveDate,
) -> DomainResult<(JournalEntry, Vec<Posting>)> {
    let h = &invoice.header;
    let mut b = payment_builder(h, "Pago factura", EntryDocumentType::SupplierPayment, fecha, &cash.codejercicio);
    debit(&mut b, supplier, h.totals.total).set_counterpart(cash);
    credit(&mut b, cash, h.totals.total).set_counterpart(supplier);
    b.build()
}
