//! Journal entries (`asiento`) and their postings (`partida`).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use contaerp_core::money::{within_tolerance, TOLERANCE};
use contaerp_core::{DomainError, DomainResult, Record, Validator};

use crate::fiscal_year::FiscalYear;
use crate::subaccount::{Subaccount, SubaccountId};

contaerp_core::uuid_id!(
    /// Journal entry identifier.
    JournalEntryId
);

contaerp_core::uuid_id!(
    /// Posting identifier.
    PostingId
);

/// What produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryDocumentType {
    Manual,
    CustomerInvoice,
    SupplierInvoice,
    CustomerPayment,
    SupplierPayment,
    Opening,
    Closing,
}

impl EntryDocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryDocumentType::Manual => "manual",
            EntryDocumentType::CustomerInvoice => "customer_invoice",
            EntryDocumentType::SupplierInvoice => "supplier_invoice",
            EntryDocumentType::CustomerPayment => "customer_payment",
            EntryDocumentType::SupplierPayment => "supplier_payment",
            EntryDocumentType::Opening => "opening",
            EntryDocumentType::Closing => "closing",
        }
    }
}

impl FromStr for EntryDocumentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(EntryDocumentType::Manual),
            "customer_invoice" => Ok(EntryDocumentType::CustomerInvoice),
            "supplier_invoice" => Ok(EntryDocumentType::SupplierInvoice),
            "customer_payment" => Ok(EntryDocumentType::CustomerPayment),
            "supplier_payment" => Ok(EntryDocumentType::SupplierPayment),
            "opening" => Ok(EntryDocumentType::Opening),
            "closing" => Ok(EntryDocumentType::Closing),
            other => Err(DomainError::validation(format!("unknown entry document type '{other}'"))),
        }
    }
}

/// Journal entry header.
///
/// `importe` is the entry amount: the sum of its debits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: JournalEntryId,
    /// 0 until numbered on first save.
    pub numero: i64,
    pub codejercicio: String,
    pub fecha: NaiveDate,
    pub concepto: String,
    pub importe: Decimal,
    /// Generated entries are not editable by hand.
    pub editable: bool,
    /// Code of the document that produced the entry.
    pub documento: String,
    pub tipodocumento: EntryDocumentType,
}

impl JournalEntry {
    pub fn new(codejercicio: impl Into<String>, fecha: NaiveDate, concepto: impl Into<String>) -> Self {
        Self {
            id: JournalEntryId::new(),
            numero: 0,
            codejercicio: codejercicio.into(),
            fecha,
            concepto: concepto.into(),
            importe: Decimal::ZERO,
            editable: true,
            documento: String::new(),
            tipodocumento: EntryDocumentType::Manual,
        }
    }

    /// Σdebe and Σhaber of `postings`.
    pub fn sums(postings: &[Posting]) -> (Decimal, Decimal) {
        postings
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(d, h), p| (d + p.debe, h + p.haber))
    }

    /// Deep check against the postings, the fiscal year and the sub-accounts they use.
    pub fn full_test(
        &self,
        postings: &[Posting],
        fiscal_year: Option<&FiscalYear>,
        subaccounts: &[Subaccount],
    ) -> DomainResult<()> {
        let mut v = Validator::new();
        v.merge(self.validate());
        v.check(!postings.is_empty(), format!("entry {} has no postings", self.numero));

        for (n, p) in postings.iter().enumerate() {
            let label = format!("posting {}", n + 1);
            v.merge_prefixed(&label, p.validate());
            v.check(p.idasiento == self.id, format!("{label}: belongs to another entry"));
            match subaccounts.iter().find(|s| s.id == p.idsubcuenta) {
                Some(sub) => {
                    v.check(
                        sub.codejercicio == self.codejercicio,
                        format!(
                            "{label}: sub-account {} belongs to fiscal year {}",
                            sub.codsubcuenta, sub.codejercicio
                        ),
                    );
                    v.check(
                        sub.codsubcuenta == p.codsubcuenta,
                        format!("{label}: sub-account code {} does not match {}", p.codsubcuenta, sub.codsubcuenta),
                    );
                }
                None => {
                    v.error(format!("{label}: sub-account {} not found", p.codsubcuenta));
                }
            }
        }

        let (debe, haber) = Self::sums(postings);
        v.check(
            within_tolerance(debe, haber),
            format!("entry {} is unbalanced: debe {debe}, haber {haber}", self.numero),
        );
        v.check(
            within_tolerance(self.importe, debe),
            format!("importe {} does not match the postings ({debe})", self.importe),
        );

        match fiscal_year {
            Some(year) => {
                v.check(
                    year.codejercicio == self.codejercicio,
                    format!("entry belongs to fiscal year {}, not {}", self.codejercicio, year.codejercicio),
                );
                if let Err(err) = year.accepts(self.fecha) {
                    v.merge(Err(err));
                }
            }
            None => {
                v.error(format!("fiscal year {} not found", self.codejercicio));
            }
        }
        v.finish()
    }

    /// Repair rounding drift.
    ///
    /// Recomputes `importe`. When debits and credits differ by at most one cent
    /// per posting, the difference goes to the largest posting on the short
    /// side. Returns whether any posting changed.
    pub fn fix(&mut self, postings: &mut [Posting]) -> DomainResult<bool> {
        let (debe, haber) = Self::sums(postings);
        let diff = debe - haber;
        if diff.is_zero() {
            self.importe = debe;
            return Ok(false);
        }

        let limit = TOLERANCE * Decimal::from(postings.len());
        if diff.abs() > limit {
            return Err(DomainError::invariant(format!(
                "entry {} is unbalanced by {diff}, more than rounding can explain",
                self.numero
            )));
        }

        let short_on_credit = diff.is_sign_positive();
        let target = postings
            .iter_mut()
            .filter(|p| if short_on_credit { !p.haber.is_zero() } else { !p.debe.is_zero() })
            .max_by_key(|p| if short_on_credit { p.haber } else { p.debe })
            .ok_or_else(|| DomainError::invariant(format!("entry {} has no posting to absorb {diff}", self.numero)))?;

        if short_on_credit {
            target.haber += diff;
        } else {
            target.debe -= diff;
        }

        let (debe, _) = Self::sums(postings);
        self.importe = debe;
        Ok(true)
    }
}

impl Record for JournalEntry {
    type Key = JournalEntryId;

    fn key(&self) -> Self::Key {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.code("codejercicio", &self.codejercicio, 4)
            .text("concepto", &self.concepto, 1, 255)
            .non_negative("importe", self.importe)
            .max_len("documento", &self.documento, 30)
            .check(self.numero >= 0, "numero must not be negative");
        v.finish()
    }
}

/// Assign consecutive numbers ordered by date, then by current number.
///
/// Returns the entries whose number changed.
pub fn renumber(entries: &mut [JournalEntry]) -> Vec<JournalEntryId> {
    entries.sort_by(|a, b| a.fecha.cmp(&b.fecha).then(a.numero.cmp(&b.numero)));
    let mut changed = Vec::new();
    for (n, entry) in entries.iter_mut().enumerate() {
        let numero = n as i64 + 1;
        if entry.numero != numero {
            entry.numero = numero;
            changed.push(entry.id);
        }
    }
    changed
}

/// One debit or credit line of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub id: PostingId,
    pub idasiento: JournalEntryId,
    pub idsubcuenta: SubaccountId,
    pub codsubcuenta: String,
    pub concepto: String,
    pub debe: Decimal,
    pub haber: Decimal,
    pub coddivisa: String,
    pub tasaconv: Decimal,
    /// Debit in the document currency.
    pub debeme: Decimal,
    /// Credit in the document currency.
    pub haberme: Decimal,
    pub iva: Decimal,
    pub recargo: Decimal,
    /// Taxable base, on VAT postings.
    pub baseimponible: Decimal,
    pub idcontrapartida: Option<SubaccountId>,
    pub codcontrapartida: Option<String>,
    pub documento: String,
    pub cifnif: String,
    /// Reconciled against a bank statement.
    pub punteada: bool,
}

impl Posting {
    fn blank(idasiento: JournalEntryId, subaccount: &Subaccount, concepto: impl Into<String>) -> Self {
        Self {
            id: PostingId::new(),
            idasiento,
            idsubcuenta: subaccount.id,
            codsubcuenta: subaccount.codsubcuenta.clone(),
            concepto: concepto.into(),
            debe: Decimal::ZERO,
            haber: Decimal::ZERO,
            coddivisa: subaccount.coddivisa.clone(),
            tasaconv: Decimal::ONE,
            debeme: Decimal::ZERO,
            haberme: Decimal::ZERO,
            iva: Decimal::ZERO,
            recargo: Decimal::ZERO,
            baseimponible: Decimal::ZERO,
            idcontrapartida: None,
            codcontrapartida: None,
            documento: String::new(),
            cifnif: String::new(),
            punteada: false,
        }
    }

    pub fn debit(idasiento: JournalEntryId, subaccount: &Subaccount, concepto: impl Into<String>, amount: Decimal) -> Self {
        let mut p = Self::blank(idasiento, subaccount, concepto);
        p.debe = amount;
        p.debeme = amount;
        p
    }

    pub fn credit(idasiento: JournalEntryId, subaccount: &Subaccount, concepto: impl Into<String>, amount: Decimal) -> Self {
        let mut p = Self::blank(idasiento, subaccount, concepto);
        p.haber = amount;
        p.haberme = amount;
        p
    }

    pub fn set_counterpart(&mut self, subaccount: &Subaccount) -> &mut Self {
        self.idcontrapartida = Some(subaccount.id);
        self.codcontrapartida = Some(subaccount.codsubcuenta.clone());
        self
    }

    /// Signed amount: debit positive, credit negative.
    pub fn amount(&self) -> Decimal {
        self.debe - self.haber
    }
}

impl Record for Posting {
    type Key = PostingId;

    fn key(&self) -> Self::Key {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.text("concepto", &self.concepto, 1, 255)
            .non_negative("debe", self.debe)
            .non_negative("haber", self.haber)
            .non_negative("debeme", self.debeme)
            .non_negative("haberme", self.haberme)
            .check(
                self.debe.is_zero() || self.haber.is_zero(),
                "a posting cannot have both debe and haber",
            )
            .code("coddivisa", &self.coddivisa, 3)
            .positive("tasaconv", self.tasaconv)
            .percentage("iva", self.iva)
            .percentage("recargo", self.recargo)
            .max_len("documento", &self.documento, 30)
            .max_len("cifnif", &self.cifnif, 30);
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, SpecialAccount};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_subaccounts() -> (Subaccount, Subaccount, Subaccount) {
        let caja = Account::special(SpecialAccount::Caja, "2024");
        let ventas = Account::special(SpecialAccount::Ventas, "2024");
        let iva = Account::special(SpecialAccount::Ivarep, "2024");
        (
            Subaccount::new(&caja, "5700000000", "Caja", "EUR"),
            Subaccount::new(&ventas, "7000000000", "Ventas", "EUR"),
            Subaccount::new(&iva, "4770000000", "IVA repercutido", "EUR"),
        )
    }

    fn test_entry() -> (JournalEntry, Vec<Posting>, Vec<Subaccount>) {
        let (caja, ventas, iva) = test_subaccounts();
        let mut entry = JournalEntry::new("2024", date(2024, 4, 2), "Venta al contado");
        entry.numero = 1;
        let postings = vec![
            Posting::debit(entry.id, &caja, "Venta al contado", dec!(121)),
            Posting::credit(entry.id, &ventas, "Venta al contado", dec!(100)),
            Posting::credit(entry.id, &iva, "IVA 21%", dec!(21)),
        ];
        entry.importe = dec!(121);
        (entry, postings, vec![caja, ventas, iva])
    }

    #[test]
    fn balanced_entry_passes_full_test() {
        let (entry, postings, subs) = test_entry();
        let year = FiscalYear::calendar("2024", 2024, 10).unwrap();
        assert!(entry.full_test(&postings, Some(&year), &subs).is_ok());
    }

    #[test]
    fn full_test_reports_each_problem() {
        let (mut entry, mut postings, subs) = test_entry();
        let mut year = FiscalYear::calendar("2024", 2024, 10).unwrap();
        year.close();
        postings[1].haber = dec!(90);
        entry.importe = dec!(100);
        let msgs = entry.full_test(&postings, Some(&year), &subs[..2]).unwrap_err().messages();
        assert!(msgs.iter().any(|m| m.contains("unbalanced")), "{msgs:?}");
        assert!(msgs.iter().any(|m| m.starts_with("importe")), "{msgs:?}");
        assert!(msgs.iter().any(|m| m.contains("closed")), "{msgs:?}");
        assert!(msgs.iter().any(|m| m.contains("not found")), "{msgs:?}");
    }

    #[test]
    fn missing_fiscal_year_is_reported() {
        let (entry, postings, subs) = test_entry();
        let msgs = entry.full_test(&postings, None, &subs).unwrap_err().messages();
        assert_eq!(msgs, vec!["fiscal year 2024 not found".to_string()]);
    }

    #[test]
    fn fix_moves_a_cent_to_the_largest_short_posting() {
        let (mut entry, mut postings, _) = test_entry();
        postings[0].debe = dec!(121.01);
        assert!(entry.fix(&mut postings).unwrap());
        assert_eq!(postings[1].haber, dec!(100.01));
        assert_eq!(postings[2].haber, dec!(21));
        assert_eq!(entry.importe, dec!(121.01));
        let (d, h) = JournalEntry::sums(&postings);
        assert_eq!(d, h);
    }

    #[test]
    fn fix_handles_a_short_debit_side() {
        let (mut entry, mut postings, _) = test_entry();
        postings[2].haber = dec!(21.02);
        assert!(entry.fix(&mut postings).unwrap());
        assert_eq!(postings[0].debe, dec!(121.02));
        assert_eq!(entry.importe, dec!(121.02));
    }

    #[test]
    fn fix_refuses_real_imbalances() {
        let (mut entry, mut postings, _) = test_entry();
        postings[0].debe = dec!(125);
        match entry.fix(&mut postings) {
            Err(DomainError::InvariantViolation(msg)) => assert!(msg.contains("unbalanced")),
            other => panic!("expected InvariantViolation, got {other:?}"),
        }
    }

    #[test]
    fn fix_on_balanced_entry_only_sets_importe() {
        let (mut entry, mut postings, _) = test_entry();
        entry.importe = Decimal::ZERO;
        assert!(!entry.fix(&mut postings).unwrap());
        assert_eq!(entry.importe, dec!(121));
    }

    #[test]
    fn posting_cannot_be_both_sides() {
        let (_, mut postings, _) = test_entry();
        postings[0].haber = dec!(1);
        assert!(postings[0].validate().is_err());
        assert_eq!(postings[1].amount(), dec!(-100));
    }

    #[test]
    fn renumber_orders_by_date() {
        let mut a = JournalEntry::new("2024", date(2024, 3, 1), "a");
        a.numero = 1;
        let mut b = JournalEntry::new("2024", date(2024, 1, 15), "b");
        b.numero = 2;
        let mut c = JournalEntry::new("2024", date(2024, 3, 1), "c");
        c.numero = 5;
        let mut entries = vec![a.clone(), b.clone(), c.clone()];
        let changed = renumber(&mut entries);
        assert_eq!(entries.iter().map(|e| e.concepto.as_str()).collect::<Vec<_>>(), ["b", "a", "c"]);
        assert_eq!(entries.iter().map(|e| e.numero).collect::<Vec<_>>(), [1, 2, 3]);
        assert_eq!(changed.len(), 3);
    }
}
