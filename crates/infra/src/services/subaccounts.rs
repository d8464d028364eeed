//! Special accounts, party sub-accounts and running totals.
//!
//! Accounts and sub-accounts are per fiscal year. The ones invoice posting
//! needs are created on first use from the special account defaults.

use std::collections::BTreeSet;

use tracing::{debug, info, instrument};

use contaerp_accounting::{
    Account, CustomerSubaccount, FiscalYear, Posting, SpecialAccount, Subaccount, SubaccountId, SupplierSubaccount,
};
use contaerp_parties::{Customer, Supplier};

use super::{ServiceError, ServiceResult, Services};
use crate::db::{Filter, Query};

impl Services {
    /// Account tagged `tag` in a fiscal year, created with its default code when missing.
    pub async fn special_account(&self, tag: SpecialAccount, codejercicio: &str) -> ServiceResult<Account> {
        let repo = self.repo::<Account>();
        let in_year = Filter::eq("codejercicio", codejercicio);
        if let Some(account) = repo.first(in_year.clone().and(Filter::eq("idcuentaesp", tag))).await? {
            return Ok(account);
        }
        if let Some(mut account) = repo.first(in_year.and(Filter::eq("codcuenta", tag.default_code()))).await? {
            account.idcuentaesp = Some(tag);
            repo.save(&account).await?;
            return Ok(account);
        }
        let account = Account::special(tag, codejercicio);
        repo.save(&account).await?;
        info!(%tag, codcuenta = %account.codcuenta, codejercicio, "created special account");
        Ok(account)
    }

    /// First sub-account of the special account `tag`, created when the account has none.
    pub async fn special_subaccount(&self, tag: SpecialAccount, year: &FiscalYear) -> ServiceResult<Subaccount> {
        let account = self.special_account(tag, &year.codejercicio).await?;
        let repo = self.repo::<Subaccount>();
        let query = repo.ordered(Query::filter(Filter::eq("idcuenta", account.id))).limit(1);
        if let Some(sub) = repo.find(query).await?.into_iter().next() {
            return Ok(sub);
        }
        let length = usize::from(year.longsubcuenta);
        let mut code = account.subaccount_code("", length)?;
        // 4770 pads to the same code as 477
        if self.subaccount_by_code(&code, &year.codejercicio).await?.is_some() {
            code = self.next_free_subaccount_code(&account, length).await?;
        }
        let sub = Subaccount::new(&account, code, tag.description(), &self.defaults().coddivisa);
        repo.save(&sub).await?;
        info!(codsubcuenta = %sub.codsubcuenta, "created special sub-account");
        Ok(sub)
    }

    pub async fn subaccount_by_code(&self, codsubcuenta: &str, codejercicio: &str) -> ServiceResult<Option<Subaccount>> {
        Ok(self
            .repo::<Subaccount>()
            .first(Filter::eq("codsubcuenta", codsubcuenta).and(Filter::eq("codejercicio", codejercicio)))
            .await?)
    }

    /// Sub-account of a customer in `year`, created under `CLIENT` and linked on first use.
    #[instrument(skip(self, year), fields(codejercicio = %year.codejercicio), err)]
    pub async fn customer_subaccount(&self, codcliente: &str, year: &FiscalYear) -> ServiceResult<Subaccount> {
        let links = self.repo::<CustomerSubaccount>();
        let link = links
            .first(Filter::eq("codcliente", codcliente).and(Filter::eq("codejercicio", &year.codejercicio)))
            .await?;
        if let Some(link) = &link {
            if let Some(sub) = self.repo::<Subaccount>().get(&link.idsubcuenta).await? {
                return Ok(sub);
            }
        }

        let customer = self
            .repo::<Customer>()
            .get(&codcliente.to_string())
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("customer {codcliente}")))?;
        let sub = self
            .party_subaccount(SpecialAccount::Client, codcliente, &customer.nombre, &customer.coddivisa, year)
            .await?;
        let mut new_link = CustomerSubaccount::new(codcliente, &sub);
        if let Some(stale) = link {
            new_link.id = stale.id;
        }
        links.save(&new_link).await?;
        Ok(sub)
    }

    /// Sub-account of a supplier in `year`, under `ACREED` for creditors and `PROVEE` otherwise.
    #[instrument(skip(self, year), fields(codejercicio = %year.codejercicio), err)]
    pub async fn supplier_subaccount(&self, codproveedor: &str, year: &FiscalYear) -> ServiceResult<Subaccount> {
        let links = self.repo::<SupplierSubaccount>();
        let link = links
            .first(Filter::eq("codproveedor", codproveedor).and(Filter::eq("codejercicio", &year.codejercicio)))
            .await?;
        if let Some(link) = &link {
            if let Some(sub) = self.repo::<Subaccount>().get(&link.idsubcuenta).await? {
                return Ok(sub);
            }
        }

        let supplier = self
            .repo::<Supplier>()
            .get(&codproveedor.to_string())
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("supplier {codproveedor}")))?;
        let tag = if supplier.acreedor {
            SpecialAccount::Acreed
        } else {
            SpecialAccount::Provee
        };
        let sub = self
            .party_subaccount(tag, codproveedor, &supplier.nombre, &supplier.coddivisa, year)
            .await?;
        let mut new_link = SupplierSubaccount::new(codproveedor, &sub);
        if let Some(stale) = link {
            new_link.id = stale.id;
        }
        links.save(&new_link).await?;
        Ok(sub)
    }

    /// Sub-account for a party: account code padded to the party code when it
    /// is numeric, otherwise the next free code under the account. An existing
    /// sub-account with that code is reused.
    async fn party_subaccount(
        &self,
        tag: SpecialAccount,
        party_code: &str,
        nombre: &str,
        coddivisa: &str,
        year: &FiscalYear,
    ) -> ServiceResult<Subaccount> {
        let account = self.special_account(tag, &year.codejercicio).await?;
        let length = usize::from(year.longsubcuenta);
        let numeric = !party_code.is_empty() && party_code.chars().all(|c| c.is_ascii_digit());
        let code = match numeric.then(|| account.subaccount_code(party_code, length)) {
            Some(Ok(code)) => code,
            _ => self.next_free_subaccount_code(&account, length).await?,
        };
        if let Some(existing) = self.subaccount_by_code(&code, &year.codejercicio).await? {
            debug!(codsubcuenta = %code, "linking existing sub-account");
            return Ok(existing);
        }
        let sub = Subaccount::new(&account, code, nombre, coddivisa);
        self.repo::<Subaccount>().save(&sub).await?;
        info!(codsubcuenta = %sub.codsubcuenta, party_code, "created party sub-account");
        Ok(sub)
    }

    async fn next_free_subaccount_code(&self, account: &Account, length: usize) -> ServiceResult<String> {
        let max = self
            .repo::<Subaccount>()
            .find_where(Filter::eq("idcuenta", account.id))
            .await?
            .iter()
            .filter_map(|s| s.codsubcuenta.get(account.codcuenta.len()..)?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Ok(account.subaccount_code(&(max + 1).to_string(), length)?)
    }

    /// Recompute `debe`, `haber` and `saldo` of the given sub-accounts from their postings.
    pub async fn refresh_totals(&self, ids: impl IntoIterator<Item = SubaccountId>) -> ServiceResult<()> {
        let subs = self.repo::<Subaccount>();
        let postings = self.repo::<Posting>();
        for id in ids.into_iter().collect::<BTreeSet<_>>() {
            let Some(mut sub) = subs.get(&id).await? else {
                continue;
            };
            let rows = postings.find_where(Filter::eq("idsubcuenta", id)).await?;
            sub.apply_totals(&rows);
            subs.save(&sub).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use contaerp_accounting::JournalEntry;

    use super::super::fixtures::{date, seeded};
    use super::*;

    async fn year(services: &Services) -> FiscalYear {
        services.open_year(date(2024, 6, 1)).await.unwrap()
    }

    #[tokio::test]
    async fn special_accounts_are_created_once() {
        let services = seeded().await;
        let year = year(&services).await;
        let vat = services.special_subaccount(SpecialAccount::Ivarep, &year).await.unwrap();
        assert_eq!(vat.codsubcuenta, "4770000000");
        let again = services.special_subaccount(SpecialAccount::Ivarep, &year).await.unwrap();
        assert_eq!(again.id, vat.id);
        assert_eq!(services.repo::<Account>().count(Filter::All).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn an_untagged_account_with_the_default_code_is_adopted() {
        let services = seeded().await;
        let year = year(&services).await;
        let plain = Account::new("570", "2024", "Caja, euros");
        services.repo::<Account>().save(&plain).await.unwrap();

        let cash = services.special_account(SpecialAccount::Caja, "2024").await.unwrap();
        assert_eq!(cash.id, plain.id);
        assert_eq!(cash.idcuentaesp, Some(SpecialAccount::Caja));
        assert_eq!(services.special_subaccount(SpecialAccount::Caja, &year).await.unwrap().codcuenta, "570");
    }

    #[tokio::test]
    async fn party_subaccounts_use_the_party_code() {
        let services = seeded().await;
        let year = year(&services).await;
        let customer = services.customer_subaccount("000001", &year).await.unwrap();
        assert_eq!(customer.codsubcuenta, "4300000001");
        assert_eq!(customer.descripcion, "Ferretería Sol");
        assert_eq!(services.customer_subaccount("000001", &year).await.unwrap().id, customer.id);
        assert_eq!(services.repo::<CustomerSubaccount>().count(Filter::All).await.unwrap(), 1);

        let supplier = services.supplier_subaccount("000001", &year).await.unwrap();
        assert_eq!(supplier.codsubcuenta, "4000000001");
    }

    #[tokio::test]
    async fn creditors_and_non_numeric_codes() {
        let services = seeded().await;
        let year = year(&services).await;
        let mut creditor = Supplier::new("LUZ", "Eléctrica del Sur", services.defaults());
        creditor.acreedor = true;
        services.repo::<Supplier>().save(&creditor).await.unwrap();

        let first = services.supplier_subaccount("LUZ", &year).await.unwrap();
        assert_eq!(first.codsubcuenta, "4100000001");

        let mut water = Supplier::new("AGUA", "Aguas de la Vega", services.defaults());
        water.acreedor = true;
        services.repo::<Supplier>().save(&water).await.unwrap();
        assert_eq!(services.supplier_subaccount("AGUA", &year).await.unwrap().codsubcuenta, "4100000002");

        match services.customer_subaccount("999999", &year).await {
            Err(ServiceError::NotFound(what)) => assert_eq!(what, "customer 999999"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn totals_follow_the_postings() {
        let services = seeded().await;
        let year = year(&services).await;
        let cash = services.special_subaccount(SpecialAccount::Caja, &year).await.unwrap();
        let sales = services.special_subaccount(SpecialAccount::Ventas, &year).await.unwrap();
        let entry = JournalEntry::new("2024", date(2024, 6, 1), "Venta al contado");
        let postings = [
            Posting::debit(entry.id, &cash, "Venta", dec!(120)),
            Posting::credit(entry.id, &sales, "Venta", dec!(120)),
        ];
        for p in &postings {
            services.repo::<Posting>().save(p).await.unwrap();
        }

        services.refresh_totals([cash.id, sales.id, cash.id]).await.unwrap();
        let cash = services.repo::<Subaccount>().get(&cash.id).await.unwrap().unwrap();
        assert_eq!((cash.debe, cash.haber, cash.saldo), (dec!(120), dec!(0), dec!(120)));
        let sales = services.subaccount_by_code(&sales.codsubcuenta, "2024").await.unwrap().unwrap();
        assert_eq!(sales.saldo, dec!(-120));
    }
}
