use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use contaerp_core::money::within_tolerance;
use contaerp_core::{DomainResult, Record, Validator};

use crate::account::{Account, AccountId};
use crate::entry::Posting;

contaerp_core::uuid_id!(
    /// Sub-account identifier.
    SubaccountId
);

contaerp_core::uuid_id!(
    /// Identifier of a customer/supplier to sub-account link.
    PartySubaccountId
);

/// Sub-account (`subcuenta`): the level postings are made against.
///
/// `debe`, `haber` and `saldo` are running totals over every posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subaccount {
    pub id: SubaccountId,
    pub codsubcuenta: String,
    pub idcuenta: AccountId,
    pub codcuenta: String,
    pub codejercicio: String,
    pub descripcion: String,
    pub coddivisa: String,
    pub codimpuesto: Option<String>,
    pub iva: Decimal,
    pub recargo: Decimal,
    pub debe: Decimal,
    pub haber: Decimal,
    pub saldo: Decimal,
}

impl Subaccount {
    pub fn new(
        account: &Account,
        codsubcuenta: impl Into<String>,
        descripcion: impl Into<String>,
        coddivisa: impl Into<String>,
    ) -> Self {
        Self {
            id: SubaccountId::new(),
            codsubcuenta: codsubcuenta.into(),
            idcuenta: account.id,
            codcuenta: account.codcuenta.clone(),
            codejercicio: account.codejercicio.clone(),
            descripcion: descripcion.into(),
            coddivisa: coddivisa.into(),
            codimpuesto: None,
            iva: Decimal::ZERO,
            recargo: Decimal::ZERO,
            debe: Decimal::ZERO,
            haber: Decimal::ZERO,
            saldo: Decimal::ZERO,
        }
    }

    /// Recompute running totals from every posting made against this sub-account.
    pub fn apply_totals<'a>(&mut self, postings: impl IntoIterator<Item = &'a Posting>) {
        let (debe, haber) = postings
            .into_iter()
            .filter(|p| p.idsubcuenta == self.id)
            .fold((Decimal::ZERO, Decimal::ZERO), |(d, h), p| (d + p.debe, h + p.haber));
        self.debe = debe;
        self.haber = haber;
        self.saldo = debe - haber;
    }

    /// Checks that need the owning fiscal year.
    pub fn check_length(&self, v: &mut Validator, longsubcuenta: u8) {
        v.check(
            self.codsubcuenta.len() == usize::from(longsubcuenta),
            format!(
                "sub-account {} must have {longsubcuenta} digits in fiscal year {}",
                self.codsubcuenta, self.codejercicio
            ),
        );
    }
}

impl Record for Subaccount {
    type Key = SubaccountId;

    fn key(&self) -> Self::Key {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.check(
            !self.codsubcuenta.is_empty() && self.codsubcuenta.chars().all(|c| c.is_ascii_digit()),
            format!("codsubcuenta '{}' must be digits only", self.codsubcuenta),
        )
        .check(
            self.codsubcuenta.starts_with(&self.codcuenta),
            format!(
                "sub-account {} does not belong to account {}",
                self.codsubcuenta, self.codcuenta
            ),
        )
        .code("codejercicio", &self.codejercicio, 4)
        .text("descripcion", &self.descripcion, 1, 255)
        .code("coddivisa", &self.coddivisa, 3)
        .optional_code("codimpuesto", self.codimpuesto.as_deref(), 10)
        .percentage("iva", self.iva)
        .percentage("recargo", self.recargo)
        .check(
            within_tolerance(self.saldo, self.debe - self.haber),
            format!("saldo {} does not equal debe - haber", self.saldo),
        );
        v.finish()
    }
}

/// Link between a customer and its sub-account in a fiscal year (`subcuentascli`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSubaccount {
    pub id: PartySubaccountId,
    pub codcliente: String,
    pub idsubcuenta: SubaccountId,
    pub codsubcuenta: String,
    pub codejercicio: String,
}

impl CustomerSubaccount {
    pub fn new(codcliente: impl Into<String>, subaccount: &Subaccount) -> Self {
        Self {
            id: PartySubaccountId::new(),
            codcliente: codcliente.into(),
            idsubcuenta: subaccount.id,
            codsubcuenta: subaccount.codsubcuenta.clone(),
            codejercicio: subaccount.codejercicio.clone(),
        }
    }
}

impl Record for CustomerSubaccount {
    type Key = PartySubaccountId;

    fn key(&self) -> Self::Key {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.code("codcliente", &self.codcliente, 6)
            .code("codejercicio", &self.codejercicio, 4);
        v.finish()
    }
}

/// Link between a supplier and its sub-account in a fiscal year (`subcuentasprov`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierSubaccount {
    pub id: PartySubaccountId,
    pub codproveedor: String,
    pub idsubcuenta: SubaccountId,
    pub codsubcuenta: String,
    pub codejercicio: String,
}

impl SupplierSubaccount {
    pub fn new(codproveedor: impl Into<String>, subaccount: &Subaccount) -> Self {
        Self {
            id: PartySubaccountId::new(),
            codproveedor: codproveedor.into(),
            idsubcuenta: subaccount.id,
            codsubcuenta: subaccount.codsubcuenta.clone(),
            codejercicio: subaccount.codejercicio.clone(),
        }
    }
}

impl Record for SupplierSubaccount {
    type Key = PartySubaccountId;

    fn key(&self) -> Self::Key {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.code("codproveedor", &self.codproveedor, 6)
            .code("codejercicio", &self.codejercicio, 4);
        v.finish()
    }
}
