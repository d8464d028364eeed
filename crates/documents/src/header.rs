use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use contaerp_core::money::{round2, within_tolerance};
use contaerp_core::{Defaults, Validator};
use contaerp_parties::{Customer, PostalAddress, Supplier};

use crate::numbering::document_code;
use crate::totals::DocumentTotals;

/// Customer or supplier data copied onto a document when it is issued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartySnapshot {
    /// `codcliente` or `codproveedor`.
    pub code: String,
    pub nombre: String,
    pub cifnif: String,
    pub address: PostalAddress,
}

impl PartySnapshot {
    pub fn new(code: impl Into<String>, nombre: impl Into<String>, cifnif: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            nombre: nombre.into(),
            cifnif: cifnif.into(),
            address: PostalAddress::default(),
        }
    }
}

impl From<&Customer> for PartySnapshot {
    fn from(c: &Customer) -> Self {
        Self::new(&c.codcliente, &c.razonsocial, &c.cifnif)
    }
}

impl From<&Supplier> for PartySnapshot {
    fn from(s: &Supplier) -> Self {
        Self::new(&s.codproveedor, &s.razonsocial, &s.cifnif)
    }
}

/// Fields every business document carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHeader {
    pub codigo: String,
    /// 0 until the document is numbered on first save.
    pub numero: i64,
    pub codserie: String,
    pub codejercicio: String,
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
    pub party: PartySnapshot,
    pub codalmacen: String,
    pub coddivisa: String,
    /// Units of `coddivisa` per unit of company currency.
    pub tasaconv: Decimal,
    pub codpago: String,
    pub codagente: Option<String>,
    /// Withholding percentage of the series.
    pub irpf: Decimal,
    pub totals: DocumentTotals,
    /// `total` in company currency.
    pub totaleuros: Decimal,
    pub observaciones: String,
}

impl DocumentHeader {
    pub fn new(
        codejercicio: impl Into<String>,
        party: PartySnapshot,
        defaults: &Defaults,
        fecha: NaiveDate,
        hora: NaiveTime,
    ) -> Self {
        Self {
            codigo: String::new(),
            numero: 0,
            codserie: defaults.codserie.clone(),
            codejercicio: codejercicio.into(),
            fecha,
            hora,
            party,
            codalmacen: defaults.codalmacen.clone(),
            coddivisa: defaults.coddivisa.clone(),
            tasaconv: Decimal::ONE,
            codpago: defaults.codpago.clone(),
            codagente: None,
            irpf: Decimal::ZERO,
            totals: DocumentTotals::default(),
            totaleuros: Decimal::ZERO,
            observaciones: String::new(),
        }
    }

    /// Header for a sale, taking series, currency, payment method and agent from the customer.
    pub fn for_customer(
        codejercicio: impl Into<String>,
        customer: &Customer,
        defaults: &Defaults,
        fecha: NaiveDate,
        hora: NaiveTime,
    ) -> Self {
        let mut header = Self::new(codejercicio, customer.into(), defaults, fecha, hora);
        if let Some(codserie) = &customer.codserie {
            header.codserie = codserie.clone();
        }
        header.coddivisa = customer.coddivisa.clone();
        header.codpago = customer.codpago.clone();
        header.codagente = customer.codagente.clone();
        header
    }

    pub fn for_supplier(
        codejercicio: impl Into<String>,
        supplier: &Supplier,
        defaults: &Defaults,
        fecha: NaiveDate,
        hora: NaiveTime,
    ) -> Self {
        let mut header = Self::new(codejercicio, supplier.into(), defaults, fecha, hora);
        if let Some(codserie) = &supplier.codserie {
            header.codserie = codserie.clone();
        }
        header.coddivisa = supplier.coddivisa.clone();
        header.codpago = supplier.codpago.clone();
        header
    }

    pub fn is_numbered(&self) -> bool {
        self.numero > 0
    }

    pub fn assign_number(&mut self, numero: i64) {
        self.numero = numero;
        self.codigo = document_code(&self.codejercicio, &self.codserie, numero);
    }

    pub fn expected_totaleuros(&self) -> Decimal {
        self.totals
            .total
            .checked_div(self.tasaconv)
            .map(round2)
            .unwrap_or(self.totals.total)
    }

    pub fn set_totals(&mut self, totals: DocumentTotals) {
        self.totals = totals;
        self.totaleuros = self.expected_totaleuros();
    }

    /// Header checks shared by every document kind.
    ///
    /// `tax_free` is set when the series carries no tax.
    pub fn check(&self, v: &mut Validator, tax_free: bool) {
        v.code("codserie", &self.codserie, 2)
            .code("codejercicio", &self.codejercicio, 4)
            .code("codalmacen", &self.codalmacen, 4)
            .code("coddivisa", &self.coddivisa, 3)
            .code("codpago", &self.codpago, 10)
            .optional_code("codagente", self.codagente.as_deref(), 10)
            .code("party code", &self.party.code, 6)
            .text("nombre", &self.party.nombre, 1, 100)
            .max_len("cifnif", &self.party.cifnif, 30)
            .percentage("irpf", self.irpf)
            .positive("tasaconv", self.tasaconv);
        self.party.address.check(v);

        if self.is_numbered() {
            v.check(
                self.codigo == document_code(&self.codejercicio, &self.codserie, self.numero),
                format!("codigo {} does not match number {}", self.codigo, self.numero),
            );
        }
        v.check(
            self.totals.is_consistent(),
            format!(
                "total {} does not equal neto {} + iva {} - irpf {} + recargo {}",
                self.totals.total,
                self.totals.neto,
                self.totals.totaliva,
                self.totals.totalirpf,
                self.totals.totalrecargo
            ),
        );
        v.check(
            within_tolerance(self.totaleuros, self.expected_totaleuros()),
            format!(
                "totaleuros {} does not match total {} at rate {}",
                self.totaleuros, self.totals.total, self.tasaconv
            ),
        );
        if tax_free {
            v.check(
                self.totals.totaliva.is_zero() && self.totals.totalrecargo.is_zero(),
                format!("series {} carries no tax but the document has tax", self.codserie),
            );
        }
    }
}
