//! Pieces shared by customer and supplier invoices: the sub-accounts an
//! invoice entry posts to, the cash sub-account of a payment and the amount
//! of a stored entry.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tracing::warn;

use contaerp_accounting::{FiscalYear, JournalEntry, JournalEntryId, SpecialAccount, Subaccount};
use contaerp_documents::DocumentHeader;
use contaerp_invoicing::PostingAccounts;
use contaerp_masters::{PaymentMethod, Tax};

use super::{ServiceError, ServiceResult, Services};

/// Special accounts on the goods side of an invoice entry.
pub(super) struct Side {
    goods: SpecialAccount,
    vat: SpecialAccount,
    surcharge: SpecialAccount,
    withholding: SpecialAccount,
    /// Sales take the tax's output sub-account, purchases its input one.
    sales: bool,
}

pub(super) const SALES: Side = Side {
    goods: SpecialAccount::Ventas,
    vat: SpecialAccount::Ivarep,
    surcharge: SpecialAccount::Ivarre,
    withholding: SpecialAccount::Irpfpr,
    sales: true,
};

pub(super) const PURCHASES: Side = Side {
    goods: SpecialAccount::Compra,
    vat: SpecialAccount::Ivasop,
    surcharge: SpecialAccount::Ivasre,
    withholding: SpecialAccount::Irpf,
    sales: false,
};

impl Services {
    /// Sub-accounts for the entry of an invoice with `header`, whose tax lines use `tax_codes`.
    pub(super) async fn posting_accounts<'a>(
        &self,
        party: Subaccount,
        header: &DocumentHeader,
        tax_codes: impl IntoIterator<Item = Option<&'a str>>,
        year: &FiscalYear,
        side: &Side,
    ) -> ServiceResult<PostingAccounts> {
        let goods = self.special_subaccount(side.goods, year).await?;
        let vat = self.special_subaccount(side.vat, year).await?;
        let mut accounts = PostingAccounts::new(party, goods, vat);

        let codes: BTreeSet<&str> = tax_codes.into_iter().flatten().collect();
        let taxes = self.repo::<Tax>();
        for code in codes {
            let Some(tax) = taxes.get(&code.to_string()).await? else {
                continue;
            };
            let own = if side.sales { tax.codsubcuentarep } else { tax.codsubcuentasop };
            let Some(codsubcuenta) = own else {
                continue;
            };
            match self.subaccount_by_code(&codsubcuenta, &year.codejercicio).await? {
                Some(sub) => accounts.vat_by_tax.push((code.to_string(), sub)),
                None => warn!(codimpuesto = code, %codsubcuenta, "tax sub-account missing in fiscal year"),
            }
        }

        if !header.totals.totalrecargo.is_zero() {
            accounts.surcharge = Some(self.special_subaccount(side.surcharge, year).await?);
        }
        if !header.totals.totalirpf.is_zero() {
            accounts.withholding = Some(self.special_subaccount(side.withholding, year).await?);
        }
        Ok(accounts)
    }

    pub(super) async fn payment_method(&self, codpago: &str) -> ServiceResult<PaymentMethod> {
        self.repo::<PaymentMethod>()
            .get(&codpago.to_string())
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("payment method {codpago}")))
    }

    /// Sub-account a payment goes through: the payment method's own, else `CAJA`.
    pub(super) async fn cash_subaccount(&self, codpago: &str, year: &FiscalYear) -> ServiceResult<Subaccount> {
        let method = self.payment_method(codpago).await?;
        if let Some(code) = &method.codsubcuenta {
            if let Some(sub) = self.subaccount_by_code(code, &year.codejercicio).await? {
                return Ok(sub);
            }
            warn!(codpago, codsubcuenta = %code, "payment sub-account missing, using CAJA");
        }
        self.special_subaccount(SpecialAccount::Caja, year).await
    }

    pub(super) async fn entry_importe(&self, id: Option<JournalEntryId>) -> ServiceResult<Option<Decimal>> {
        let Some(id) = id else {
            return Ok(None);
        };
        Ok(self.repo::<JournalEntry>().get(&id).await?.map(|e| e.importe))
    }

    /// Delete the entries an invoice points at, skipping the ones already gone.
    pub(super) async fn delete_entries(&self, ids: impl IntoIterator<Item = Option<JournalEntryId>>) -> ServiceResult<()> {
        for id in ids.into_iter().flatten() {
            self.delete_entry(id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use contaerp_core::Defaults;
    use contaerp_documents::PartySnapshot;

    use super::super::fixtures::{date, seeded};
    use super::*;

    #[tokio::test]
    async fn taxes_with_their_own_subaccount_post_there() {
        let services = seeded().await;
        let year = services.open_year(date(2024, 1, 1)).await.unwrap();
        let general = services.special_subaccount(SpecialAccount::Ivarep, &year).await.unwrap();
        let vat = services.special_account(SpecialAccount::Ivarep, "2024").await.unwrap();
        let reduced = Subaccount::new(&vat, "4770000010", "IVA repercutido 10%", "EUR");
        services.repo::<Subaccount>().save(&reduced).await.unwrap();
        let mut tax = Tax::new("IVA10", "IVA 10%", dec!(10), dec!(1.4));
        tax.codsubcuentarep = Some("4770000010".to_string());
        services.repo::<Tax>().save(&tax).await.unwrap();

        let party = services.customer_subaccount("000001", &year).await.unwrap();
        let mut header = DocumentHeader::new(
            "2024",
            PartySnapshot::new("000001", "Ferretería Sol", "B12345678"),
            &Defaults::default(),
            date(2024, 1, 1),
            chrono::NaiveTime::MIN,
        );
        header.totals.totalrecargo = dec!(1.4);
        let accounts = services
            .posting_accounts(party, &header, [Some("IVA10"), Some("IVA21"), None], &year, &SALES)
            .await
            .unwrap();
        assert_eq!(accounts.vat_for(Some("IVA10")).id, reduced.id);
        assert_eq!(accounts.vat_for(Some("IVA21")).id, general.id);
        assert_eq!(accounts.surcharge.as_ref().unwrap().codcuenta, "4770");
        assert!(accounts.withholding.is_none());
    }

    #[tokio::test]
    async fn payments_use_the_method_subaccount_when_present() {
        let services = seeded().await;
        let year = services.open_year(date(2024, 1, 1)).await.unwrap();
        assert_eq!(services.cash_subaccount("CONT", &year).await.unwrap().codcuenta, "570");

        let banks = contaerp_accounting::Account::new("572", "2024", "Bancos");
        services.repo::<contaerp_accounting::Account>().save(&banks).await.unwrap();
        let bank = Subaccount::new(&banks, "5720000001", "Banco Sabadell", "EUR");
        services.repo::<Subaccount>().save(&bank).await.unwrap();
        let mut transfer = services.payment_method("TRANS").await.unwrap();
        transfer.codsubcuenta = Some("5720000001".to_string());
        services.repo::<PaymentMethod>().save(&transfer).await.unwrap();
        assert_eq!(services.cash_subaccount("TRANS", &year).await.unwrap().id, bank.id);

        match services.cash_subaccount("XX", &year).await {
            Err(ServiceError::NotFound(what)) => assert_eq!(what, "payment method XX"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
