use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use tracing::{info, instrument, warn};

use contaerp_accounting::{renumber, FiscalYear, JournalEntry, JournalEntryId, Posting, Subaccount, SubaccountId};
use contaerp_documents::next_number;
use contaerp_invoicing::{CustomerInvoice, SupplierInvoice};

use super::{Problem, ServiceError, ServiceResult, Services};
use crate::db::{Filter, Query, Table};

/// Outcome of [`Services::fix_entries`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixSummary {
    /// Entries whose postings or amount were corrected.
    pub fixed: usize,
    /// Entries too far off to fix.
    pub failed: Vec<Problem>,
}

fn entry_label(entry: &JournalEntry) -> String {
    format!("entry {} ({})", entry.numero, entry.codejercicio)
}

fn year_filter(codejercicio: Option<&str>) -> Filter {
    codejercicio.map_or(Filter::All, |code| Filter::eq("codejercicio", code))
}

impl Services {
    /// Save an entry with its complete set of postings.
    ///
    /// Numbers the entry on first save, points every posting at it, sets
    /// `importe` and runs the deep check. Postings no longer in `postings` are
    /// deleted and every affected sub-account gets its totals refreshed.
    #[instrument(skip(self, entry, postings), fields(id = %entry.id, codejercicio = %entry.codejercicio), err)]
    pub async fn save_entry(&self, entry: &mut JournalEntry, postings: &mut [Posting]) -> ServiceResult<()> {
        let year = self.fiscal_year(&entry.codejercicio).await?;
        let entries = self.repo::<JournalEntry>();
        if entry.numero == 0 {
            let max = entries
                .max_int("numero", Filter::eq("codejercicio", &entry.codejercicio))
                .await?;
            entry.numero = next_number(max, 1);
        }
        for p in postings.iter_mut() {
            p.idasiento = entry.id;
        }
        entry.importe = JournalEntry::sums(postings).0;

        let subaccounts = self.subaccounts_of(postings).await?;
        entry.full_test(postings, Some(&year), &subaccounts)?;

        let repo = self.repo::<Posting>();
        let mut touched: BTreeSet<SubaccountId> = postings.iter().map(|p| p.idsubcuenta).collect();
        for old in repo.find_where(Filter::eq("idasiento", entry.id)).await? {
            if postings.iter().all(|p| p.id != old.id) {
                repo.delete(&old.id).await?;
                touched.insert(old.idsubcuenta);
            }
        }
        entries.save(entry).await?;
        for p in postings.iter() {
            repo.save(p).await?;
        }
        self.refresh_totals(touched).await?;
        info!(numero = entry.numero, importe = %entry.importe, "saved journal entry");
        Ok(())
    }

    /// Delete an entry with its postings.
    ///
    /// Invoices pointing at it lose the link; a deleted payment entry leaves
    /// its invoice unpaid.
    #[instrument(skip(self), err)]
    pub async fn delete_entry(&self, id: JournalEntryId) -> ServiceResult<bool> {
        let Some(entry) = self.repo::<JournalEntry>().get(&id).await? else {
            return Ok(false);
        };
        self.unlink_invoices::<CustomerInvoice>(id, |i| &mut i.status).await?;
        self.unlink_invoices::<SupplierInvoice>(id, |i| &mut i.status).await?;

        let postings = self.repo::<Posting>();
        let touched: Vec<SubaccountId> = postings
            .find_where(Filter::eq("idasiento", id))
            .await?
            .into_iter()
            .map(|p| p.idsubcuenta)
            .collect();
        postings.delete_where(Filter::eq("idasiento", id)).await?;
        self.repo::<JournalEntry>().delete(&id).await?;
        self.refresh_totals(touched).await?;
        info!(numero = entry.numero, codejercicio = %entry.codejercicio, "deleted journal entry");
        Ok(true)
    }

    async fn unlink_invoices<T: Table>(
        &self,
        id: JournalEntryId,
        status: impl Fn(&mut T) -> &mut contaerp_invoicing::InvoiceStatus,
    ) -> ServiceResult<()> {
        let repo = self.repo::<T>();
        let linked = repo
            .find_where(Filter::eq("idasiento", id).or(Filter::eq("idasientop", id)))
            .await?;
        for mut invoice in linked {
            let s = status(&mut invoice);
            if s.idasiento == Some(id) {
                s.idasiento = None;
            }
            if s.idasientop == Some(id) {
                s.idasientop = None;
                s.pagada = false;
            }
            repo.save(&invoice).await?;
        }
        Ok(())
    }

    pub async fn entry(&self, id: JournalEntryId) -> ServiceResult<JournalEntry> {
        self.repo::<JournalEntry>()
            .get(&id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("journal entry {id}")))
    }

    pub async fn entry_postings(&self, id: JournalEntryId) -> ServiceResult<Vec<Posting>> {
        let repo = self.repo::<Posting>();
        Ok(repo.find(repo.ordered(Query::filter(Filter::eq("idasiento", id)))).await?)
    }

    /// Entries whose concept or document contains `text`, or numbered `text`.
    pub async fn search_entries(&self, text: &str, offset: i64) -> ServiceResult<Vec<JournalEntry>> {
        let text = text.trim();
        let mut filter = Filter::search(&["concepto", "documento"], text);
        if let Ok(numero) = text.parse::<i64>() {
            filter = filter.or(Filter::eq("numero", numero));
        }
        self.page(filter, offset).await
    }

    pub async fn entries_of_year(&self, codejercicio: &str, offset: i64) -> ServiceResult<Vec<JournalEntry>> {
        self.page(Filter::eq("codejercicio", codejercicio), offset).await
    }

    async fn subaccounts_of(&self, postings: &[Posting]) -> ServiceResult<Vec<Subaccount>> {
        let repo = self.repo::<Subaccount>();
        let ids: BTreeSet<SubaccountId> = postings.iter().map(|p| p.idsubcuenta).collect();
        let mut subs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(sub) = repo.get(&id).await? {
                subs.push(sub);
            }
        }
        Ok(subs)
    }

    async fn test_entry(&self, entry: &JournalEntry) -> ServiceResult<()> {
        let postings = self.entry_postings(entry.id).await?;
        let year = self.repo::<FiscalYear>().get(&entry.codejercicio).await?;
        let subaccounts = self.subaccounts_of(&postings).await?;
        entry.full_test(&postings, year.as_ref(), &subaccounts)?;
        Ok(())
    }

    /// Deep check of a stored entry against its stored postings.
    pub async fn check_entry(&self, id: JournalEntryId) -> ServiceResult<()> {
        let entry = self.entry(id).await?;
        self.test_entry(&entry).await
    }

    /// Deep check of every entry, or of one fiscal year's.
    #[instrument(skip(self), err)]
    pub async fn check_entries(&self, codejercicio: Option<&str>) -> ServiceResult<Vec<Problem>> {
        let entries = self.repo::<JournalEntry>().find_where(year_filter(codejercicio)).await?;
        let mut problems = Vec::new();
        for entry in &entries {
            if let Some(problem) = Problem::from_result(entry_label(entry), self.test_entry(entry).await) {
                problems.push(problem);
            }
        }
        info!(checked = entries.len(), problems = problems.len(), "checked journal entries");
        Ok(problems)
    }

    /// Absorb rounding drift in a stored entry. Returns whether anything changed.
    #[instrument(skip(self), err)]
    pub async fn fix_entry(&self, id: JournalEntryId) -> ServiceResult<bool> {
        let mut entry = self.entry(id).await?;
        let mut postings = self.entry_postings(id).await?;
        let importe = entry.importe;
        let moved = entry.fix(&mut postings)?;
        if !moved && entry.importe == importe {
            return Ok(false);
        }
        self.fiscal_year(&entry.codejercicio).await?.accepts(entry.fecha)?;
        self.repo::<JournalEntry>().save(&entry).await?;
        if moved {
            let repo = self.repo::<Posting>();
            for p in &postings {
                repo.save(p).await?;
            }
            self.refresh_totals(postings.iter().map(|p| p.idsubcuenta)).await?;
        }
        warn!(numero = entry.numero, importe = %entry.importe, "fixed journal entry");
        Ok(true)
    }

    pub async fn fix_entries(&self, codejercicio: Option<&str>) -> ServiceResult<FixSummary> {
        let entries = self.repo::<JournalEntry>().find_where(year_filter(codejercicio)).await?;
        let mut summary = FixSummary::default();
        for entry in &entries {
            match self.fix_entry(entry.id).await {
                Ok(true) => summary.fixed += 1,
                Ok(false) => {}
                Err(err @ ServiceError::Domain(_)) => summary.failed.push(Problem {
                    document: entry_label(entry),
                    messages: err.messages(),
                }),
                Err(err) => return Err(err),
            }
        }
        Ok(summary)
    }

    /// Renumber a fiscal year's entries by date. Returns how many changed.
    #[instrument(skip(self), err)]
    pub async fn renumber_entries(&self, codejercicio: &str) -> ServiceResult<usize> {
        self.fiscal_year(codejercicio).await?;
        let repo = self.repo::<JournalEntry>();
        let mut entries = repo.find_where(Filter::eq("codejercicio", codejercicio)).await?;
        let changed: HashSet<JournalEntryId> = renumber(&mut entries).into_iter().collect();
        for entry in entries.iter().filter(|e| changed.contains(&e.id)) {
            repo.save(entry).await?;
        }
        info!(changed = changed.len(), "renumbered journal entries");
        Ok(changed.len())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use contaerp_accounting::SpecialAccount;
    use contaerp_core::DomainError;

    use super::super::fixtures::{date, seeded};
    use super::*;

    async fn accounts(services: &Services) -> (Subaccount, Subaccount) {
        let year = services.open_year(date(2024, 1, 1)).await.unwrap();
        let cash = services.special_subaccount(SpecialAccount::Caja, &year).await.unwrap();
        let sales = services.special_subaccount(SpecialAccount::Ventas, &year).await.unwrap();
        (cash, sales)
    }

    fn sale(cash: &Subaccount, sales: &Subaccount, fecha: chrono::NaiveDate, amount: rust_decimal::Decimal) -> (JournalEntry, Vec<Posting>) {
        let entry = JournalEntry::new("2024", fecha, "Venta al contado");
        let postings = vec![
            Posting::debit(entry.id, cash, "Venta", amount),
            Posting::credit(entry.id, sales, "Venta", amount),
        ];
        (entry, postings)
    }

    #[tokio::test]
    async fn entries_are_numbered_and_totals_refreshed() {
        let services = seeded().await;
        let (cash, sales) = accounts(&services).await;
        let (mut first, mut postings) = sale(&cash, &sales, date(2024, 2, 1), dec!(100));
        services.save_entry(&mut first, &mut postings).await.unwrap();
        let (mut second, mut more) = sale(&cash, &sales, date(2024, 2, 2), dec!(50));
        services.save_entry(&mut second, &mut more).await.unwrap();

        assert_eq!((first.numero, second.numero), (1, 2));
        assert_eq!(second.importe, dec!(50));
        let cash = services.repo::<Subaccount>().get(&cash.id).await.unwrap().unwrap();
        assert_eq!(cash.saldo, dec!(150));
        assert_eq!(services.entry_postings(first.id).await.unwrap().len(), 2);
        services.check_entry(first.id).await.unwrap();
    }

    #[tokio::test]
    async fn unbalanced_entries_are_refused() {
        let services = seeded().await;
        let (cash, sales) = accounts(&services).await;
        let (mut entry, mut postings) = sale(&cash, &sales, date(2024, 2, 1), dec!(100));
        postings[1].haber = dec!(90);
        match services.save_entry(&mut entry, &mut postings).await {
            Err(ServiceError::Domain(DomainError::Invalid(msgs))) => {
                assert!(msgs.iter().any(|m| m.contains("unbalanced")), "{msgs:?}")
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
        assert_eq!(services.repo::<JournalEntry>().count(Filter::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn removed_postings_are_deleted_on_save() {
        let services = seeded().await;
        let (cash, sales) = accounts(&services).await;
        let (mut entry, mut postings) = sale(&cash, &sales, date(2024, 2, 1), dec!(100));
        services.save_entry(&mut entry, &mut postings).await.unwrap();

        let mut split = vec![
            postings[0].clone(),
            Posting::credit(entry.id, &sales, "Venta 1", dec!(60)),
            Posting::credit(entry.id, &sales, "Venta 2", dec!(40)),
        ];
        services.save_entry(&mut entry, &mut split).await.unwrap();
        assert_eq!(entry.numero, 1);
        let stored = services.entry_postings(entry.id).await.unwrap();
        assert_eq!(stored.len(), 3);
        assert!(stored.iter().all(|p| p.id != postings[1].id));
    }

    #[tokio::test]
    async fn deleting_an_entry_unpays_its_invoice() {
        let services = seeded().await;
        let (cash, sales) = accounts(&services).await;
        let (mut entry, mut postings) = sale(&cash, &sales, date(2024, 2, 1), dec!(100));
        services.save_entry(&mut entry, &mut postings).await.unwrap();

        let customer = services
            .repo::<contaerp_parties::Customer>()
            .get(&"000001".to_string())
            .await
            .unwrap()
            .unwrap();
        let mut invoice = CustomerInvoice::for_customer("2024", &customer, services.defaults(), date(2024, 2, 1), chrono::NaiveTime::MIN);
        invoice.header.assign_number(1);
        invoice.status.mark_paid(Some(entry.id)).unwrap();
        services.repo::<CustomerInvoice>().save(&invoice).await.unwrap();

        assert!(services.delete_entry(entry.id).await.unwrap());
        let invoice = services.repo::<CustomerInvoice>().get(&invoice.id).await.unwrap().unwrap();
        assert!(!invoice.status.pagada);
        assert_eq!(invoice.status.idasientop, None);
        assert!(services.entry_postings(entry.id).await.unwrap().is_empty());
        let cash = services.repo::<Subaccount>().get(&cash.id).await.unwrap().unwrap();
        assert_eq!(cash.saldo, dec!(0));
        assert!(!services.delete_entry(entry.id).await.unwrap());
    }

    #[tokio::test]
    async fn renumbering_follows_dates() {
        let services = seeded().await;
        let (cash, sales) = accounts(&services).await;
        let (mut late, mut p1) = sale(&cash, &sales, date(2024, 5, 1), dec!(10));
        services.save_entry(&mut late, &mut p1).await.unwrap();
        let (mut early, mut p2) = sale(&cash, &sales, date(2024, 3, 1), dec!(20));
        services.save_entry(&mut early, &mut p2).await.unwrap();

        assert_eq!(services.renumber_entries("2024").await.unwrap(), 2);
        assert_eq!(services.entry(early.id).await.unwrap().numero, 1);
        assert_eq!(services.entry(late.id).await.unwrap().numero, 2);
        assert_eq!(services.renumber_entries("2024").await.unwrap(), 0);
        assert_eq!(services.search_entries("2", 0).await.unwrap()[0].id, late.id);
        assert_eq!(services.search_entries("contado", 0).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rounding_drift_is_fixed_and_reported() {
        let services = seeded().await;
        let (cash, sales) = accounts(&services).await;
        let (mut entry, mut postings) = sale(&cash, &sales, date(2024, 2, 1), dec!(100));
        services.save_entry(&mut entry, &mut postings).await.unwrap();

        let mut drifted = postings[1].clone();
        drifted.haber = dec!(99.99);
        services.repo::<Posting>().save(&drifted).await.unwrap();
        let problems = services.check_entries(Some("2024")).await.unwrap();
        assert_eq!(problems.len(), 0, "a cent is within tolerance");

        let summary = services.fix_entries(None).await.unwrap();
        assert_eq!(summary.fixed, 1);
        let (debe, haber) = JournalEntry::sums(&services.entry_postings(entry.id).await.unwrap());
        assert_eq!(debe, haber);

        let mut broken = services.entry_postings(entry.id).await.unwrap()[1].clone();
        broken.haber = dec!(10);
        services.repo::<Posting>().save(&broken).await.unwrap();
        let problems = services.check_entries(None).await.unwrap();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].document, "entry 1 (2024)");
        let summary = services.fix_entries(Some("2024")).await.unwrap();
        assert_eq!(summary.failed.len(), 1);
    }

    #[tokio::test]
    async fn entries_of_closed_years_are_left_alone() {
        let services = seeded().await;
        let (cash, sales) = accounts(&services).await;
        let (mut entry, mut postings) = sale(&cash, &sales, date(2024, 2, 1), dec!(100));
        services.save_entry(&mut entry, &mut postings).await.unwrap();

        let mut drifted = postings[1].clone();
        drifted.haber = dec!(99.99);
        services.repo::<Posting>().save(&drifted).await.unwrap();
        services.close_fiscal_year("2024").await.unwrap();

        match services.fix_entry(entry.id).await {
            Err(ServiceError::Domain(DomainError::Validation(msg))) => assert!(msg.contains("closed"), "{msg}"),
            other => panic!("expected Validation, got {other:?}"),
        }
        let stored = services.entry_postings(entry.id).await.unwrap();
        assert!(stored.iter().any(|p| p.haber == dec!(99.99)));

        let summary = services.fix_entries(Some("2024")).await.unwrap();
        assert_eq!(summary.fixed, 0);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].document, "entry 1 (2024)");
    }
}
