use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use contaerp_core::{DomainResult, Record, Validator};
use contaerp_documents::{DocumentLine, TaxBreakdownLine};

contaerp_core::uuid_id!(
    /// Invoice line identifier.
    InvoiceLineId
);

contaerp_core::uuid_id!(
    /// Invoice tax line identifier.
    InvoiceTaxLineId
);

/// Invoice line: a document line, optionally copied from a delivery note line.
///
/// `F` is the invoice id type, `A` the delivery note id type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine<F, A> {
    pub id: InvoiceLineId,
    pub idfactura: F,
    pub idalbaran: Option<A>,
    pub line: DocumentLine,
}

impl<F, A> InvoiceLine<F, A> {
    pub fn new(idfactura: F, line: DocumentLine) -> Self {
        Self {
            id: InvoiceLineId::new(),
            idfactura,
            idalbaran: None,
            line,
        }
    }

    pub fn from_delivery_note(idfactura: F, idalbaran: A, line: DocumentLine) -> Self {
        Self {
            id: InvoiceLineId::new(),
            idfactura,
            idalbaran: Some(idalbaran),
            line,
        }
    }
}

impl<F, A> AsRef<DocumentLine> for InvoiceLine<F, A> {
    fn as_ref(&self) -> &DocumentLine {
        &self.line
    }
}

impl<F, A> Record for InvoiceLine<F, A> {
    type Key = InvoiceLineId;

    fn key(&self) -> Self::Key {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        self.line.validate()
    }
}

/// Stored per-tax summary of an invoice (`lineasivafact*`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTaxLine<F> {
    pub id: InvoiceTaxLineId,
    pub idfactura: F,
    pub codimpuesto: Option<String>,
    pub iva: Decimal,
    pub recargo: Decimal,
    pub neto: Decimal,
    pub totaliva: Decimal,
    pub totalrecargo: Decimal,
    pub totallinea: Decimal,
}

impl<F: Copy> InvoiceTaxLine<F> {
    pub fn from_breakdown(idfactura: F, breakdown: Vec<TaxBreakdownLine>) -> Vec<Self> {
        breakdown
            .into_iter()
            .map(|b| Self {
                id: InvoiceTaxLineId::new(),
                idfactura,
                codimpuesto: b.codimpuesto,
                iva: b.iva,
                recargo: b.recargo,
                neto: b.neto,
                totaliva: b.totaliva,
                totalrecargo: b.totalrecargo,
                totallinea: b.totallinea,
            })
            .collect()
    }
}

impl<F> InvoiceTaxLine<F> {
    pub fn as_breakdown(&self) -> TaxBreakdownLine {
        TaxBreakdownLine {
            codimpuesto: self.codimpuesto.clone(),
            iva: self.iva,
            recargo: self.recargo,
            neto: self.neto,
            totaliva: self.totaliva,
            totalrecargo: self.totalrecargo,
            totallinea: self.totallinea,
        }
    }
}

impl<F> Record for InvoiceTaxLine<F> {
    type Key = InvoiceTaxLineId;

    fn key(&self) -> Self::Key {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.optional_code("codimpuesto", self.codimpuesto.as_deref(), 10)
            .percentage("iva", self.iva)
            .percentage("recargo", self.recargo)
            .check(
                self.totallinea == self.neto + self.totaliva + self.totalrecargo,
                format!(
                    "totallinea {} does not equal neto {} + iva {} + recargo {}",
                    self.totallinea, self.neto, self.totaliva, self.totalrecargo
                ),
            );
        v.finish()
    }
}
