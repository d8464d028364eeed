use chrono::NaiveDate;
use rust_decimal::Decimal;

use contaerp_core::money::round2;
use contaerp_core::{DomainError, DomainResult, Record};

use crate::entry::{EntryDocumentType, JournalEntry, Posting};
use crate::subaccount::Subaccount;

/// Assembles a generated entry.
///
/// Amounts are given in the document currency; postings carry them in
/// `debeme`/`haberme` and in company currency in `debe`/`haber`. `build`
/// absorbs conversion rounding with [`JournalEntry::fix`], drops zero
/// postings and validates the result.
#[derive(Debug, Clone)]
pub struct EntryBuilder {
    entry: JournalEntry,
    postings: Vec<Posting>,
    coddivisa: String,
    tasaconv: Decimal,
    cifnif: String,
}

impl EntryBuilder {
    pub fn new(codejercicio: impl Into<String>, fecha: NaiveDate, concepto: impl Into<String>) -> Self {
        Self {
            entry: JournalEntry::new(codejercicio, fecha, concepto),
            postings: Vec::new(),
            coddivisa: String::new(),
            tasaconv: Decimal::ONE,
            cifnif: String::new(),
        }
    }

    /// Mark the entry as generated from a document.
    pub fn document(mut self, tipodocumento: EntryDocumentType, documento: impl Into<String>, cifnif: impl Into<String>) -> Self {
        self.entry.tipodocumento = tipodocumento;
        self.entry.documento = documento.into();
        self.entry.editable = false;
        self.cifnif = cifnif.into();
        self
    }

    pub fn currency(mut self, coddivisa: impl Into<String>, tasaconv: Decimal) -> Self {
        self.coddivisa = coddivisa.into();
        self.tasaconv = tasaconv;
        self
    }

    pub fn concepto(&self) -> &str {
        &self.entry.concepto
    }

    fn to_company(&self, amount: Decimal) -> Decimal {
        amount.checked_div(self.tasaconv).map(round2).unwrap_or(amount)
    }

    fn push(&mut self, mut posting: Posting) -> &mut Posting {
        if !self.coddivisa.is_empty() {
            posting.coddivisa = self.coddivisa.clone();
        }
        posting.tasaconv = self.tasaconv;
        posting.documento = self.entry.documento.clone();
        posting.cifnif = self.cifnif.clone();
        self.postings.push(posting);
        let last = self.postings.len() - 1;
        &mut self.postings[last]
    }

    /// Debit `amount` (document currency) to `subaccount`.
    pub fn debit(&mut self, subaccount: &Subaccount, amount: Decimal) -> &mut Posting {
        let company = self.to_company(amount);
        let mut posting = Posting::debit(self.entry.id, subaccount, self.entry.concepto.clone(), company);
        posting.debeme = amount;
        self.push(posting)
    }

    /// Credit `amount` (document currency) to `subaccount`.
    pub fn credit(&mut self, subaccount: &Subaccount, amount: Decimal) -> &mut Posting {
        let company = self.to_company(amount);
        let mut posting = Posting::credit(self.entry.id, subaccount, self.entry.concepto.clone(), company);
        posting.haberme = amount;
        self.push(posting)
    }

    pub fn build(self) -> DomainResult<(JournalEntry, Vec<Posting>)> {
        let Self { mut entry, mut postings, .. } = self;
        entry.fix(&mut postings)?;
        postings.retain(|p| !(p.debe.is_zero() && p.haber.is_zero()));
        if postings.is_empty() {
            return Err(DomainError::validation(format!("entry '{}' has nothing to post", entry.concepto)));
        }
        entry.validate()?;
        for p in &postings {
            p.validate()?;
        }
        Ok((entry, postings))
    }
}
