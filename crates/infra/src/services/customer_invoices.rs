//! Customer invoices.
//!
//! Creating an invoice numbers it, stores it with its tax lines and posts the
//! sales entry; an invoice whose entry is refused is removed again. Invoices
//! made from delivery notes link the notes once the invoice is stored.

use chrono::{NaiveDate, NaiveTime};
use tracing::{info, instrument, warn};

use contaerp_core::DomainError;
use contaerp_invoicing::{
    customer_invoice_entry, customer_payment_entry, CustomerInvoice, CustomerInvoiceId, CustomerInvoiceLine,
    CustomerInvoiceTaxLine, InvoiceLine,
};
use contaerp_masters::PaymentMethod;
use contaerp_parties::Customer;
use contaerp_sales::{CustomerDeliveryNote, CustomerDeliveryNoteId};

use super::invoices::SALES;
use super::{Problem, ServiceError, ServiceResult, Services};
use crate::db::{Filter, Query};

const SEARCH: &[&str] = &["codigo", "numero2", "nombrecliente", "cifnif", "observaciones"];

impl Services {
    /// Create an invoice with its complete set of lines.
    ///
    /// The invoice moves into the open fiscal year of its date and takes the
    /// due date of its payment method. A method that marks invoices paid also
    /// posts the collection.
    #[instrument(skip(self, invoice, lines), fields(codcliente = %invoice.header.party.code), err)]
    pub async fn create_customer_invoice(
        &self,
        invoice: &mut CustomerInvoice,
        lines: &mut [CustomerInvoiceLine],
    ) -> ServiceResult<()> {
        if self.repo::<CustomerInvoice>().exists(&invoice.id).await? {
            return Err(DomainError::conflict(format!("invoice {} already exists", invoice.header.codigo)).into());
        }
        if !self.repo::<Customer>().exists(&invoice.header.party.code).await? {
            return Err(ServiceError::not_found(format!("customer {}", invoice.header.party.code)));
        }
        let year = self.open_year(invoice.header.fecha).await?;
        let (fecha, hora) = (invoice.header.fecha, invoice.header.hora);
        invoice.set_date(fecha, hora, &year)?;

        let tax_free = self.series(&invoice.header.codserie).await?.siniva;
        for line in lines.iter_mut() {
            line.idfactura = invoice.id;
            if tax_free {
                line.line.clear_taxes();
            }
            line.line.recalculate();
        }
        invoice.set_lines(lines);
        let method = self.payment_method(&invoice.header.codpago).await?;
        invoice.apply_payment_method(&method);
        self.store_customer_invoice(invoice, lines, &method, tax_free).await
    }

    /// Invoice pending delivery notes of one customer on `fecha`.
    #[instrument(skip(self, ids), fields(notes = ids.len()), err)]
    pub async fn invoice_customer_notes(
        &self,
        ids: &[CustomerDeliveryNoteId],
        fecha: NaiveDate,
        hora: NaiveTime,
    ) -> ServiceResult<CustomerInvoice> {
        let mut notes = Vec::with_capacity(ids.len());
        let mut note_lines = Vec::new();
        for id in ids {
            notes.push(self.customer_note(*id).await?);
            note_lines.extend(self.customer_note_lines(*id).await?);
        }
        let year = self.open_year(fecha).await?;
        let (mut invoice, lines) =
            CustomerInvoice::from_delivery_notes(&mut notes, &note_lines, &year.codejercicio, fecha, hora)?;

        let tax_free = self.series(&invoice.header.codserie).await?.siniva;
        let method = self.payment_method(&invoice.header.codpago).await?;
        invoice.apply_payment_method(&method);
        self.store_customer_invoice(&mut invoice, &lines, &method, tax_free).await?;

        let repo = self.repo::<CustomerDeliveryNote>();
        for note in &notes {
            repo.save(note).await?;
        }
        Ok(invoice)
    }

    /// Full credit note of invoice `id`: same lines with opposite quantities.
    #[instrument(skip(self), err)]
    pub async fn rectify_customer_invoice(
        &self,
        id: CustomerInvoiceId,
        fecha: NaiveDate,
        hora: NaiveTime,
    ) -> ServiceResult<CustomerInvoice> {
        let original = self.customer_invoice(id).await?;
        if original.status.anulada {
            return Err(DomainError::conflict(format!("invoice {} is void", original.header.codigo)).into());
        }
        let mut rectifying = original.rectifying(fecha, hora);
        let mut lines: Vec<CustomerInvoiceLine> = self
            .customer_invoice_lines(id)
            .await?
            .into_iter()
            .map(|l| {
                let mut line = l.line;
                line.cantidad = -line.cantidad;
                InvoiceLine::new(rectifying.id, line)
            })
            .collect();
        self.create_customer_invoice(&mut rectifying, &mut lines).await?;
        Ok(rectifying)
    }

    async fn store_customer_invoice(
        &self,
        invoice: &mut CustomerInvoice,
        lines: &[CustomerInvoiceLine],
        method: &PaymentMethod,
        tax_free: bool,
    ) -> ServiceResult<()> {
        if !invoice.header.is_numbered() {
            let numero = self.next_document_number::<CustomerInvoice>(&invoice.header).await?;
            invoice.header.assign_number(numero);
        }
        let tax_lines = invoice.tax_lines(lines);
        self.repo::<CustomerInvoice>().save(invoice).await?;
        let line_repo = self.repo::<CustomerInvoiceLine>();
        for line in lines {
            line_repo.save(line).await?;
        }
        let tax_repo = self.repo::<CustomerInvoiceTaxLine>();
        for tax_line in &tax_lines {
            tax_repo.save(tax_line).await?;
        }

        if let Err(err) = self.post_customer_invoice(invoice, lines, &tax_lines, tax_free).await {
            warn!(codigo = %invoice.header.codigo, error = %err, "invoice entry refused, removing the invoice");
            self.delete_customer_invoice(invoice.id).await?;
            return Err(err);
        }
        info!(codigo = %invoice.header.codigo, total = %invoice.header.totals.total, "created customer invoice");

        if method.marks_paid() {
            let fecha = invoice.header.fecha;
            self.collect_customer_invoice(invoice, fecha).await?;
        }
        Ok(())
    }

    /// Generate and save the sales entry, then check the invoice against it.
    async fn post_customer_invoice(
        &self,
        invoice: &mut CustomerInvoice,
        lines: &[CustomerInvoiceLine],
        tax_lines: &[CustomerInvoiceTaxLine],
        tax_free: bool,
    ) -> ServiceResult<()> {
        let year = self.fiscal_year(&invoice.header.codejercicio).await?;
        let party = self.customer_subaccount(&invoice.header.party.code, &year).await?;
        let accounts = self
            .posting_accounts(
                party,
                &invoice.header,
                tax_lines.iter().map(|t| t.codimpuesto.as_deref()),
                &year,
                &SALES,
            )
            .await?;
        let (mut entry, mut postings) = customer_invoice_entry(invoice, tax_lines, &accounts)?;
        self.save_entry(&mut entry, &mut postings).await?;

        invoice.status.idasiento = Some(entry.id);
        let siblings = self
            .same_day_documents::<CustomerInvoice>("codcliente", &invoice.header.party.code, invoice.header.fecha)
            .await?;
        if let Err(err) = invoice.full_test(lines, tax_lines, &siblings, Some(entry.importe), tax_free) {
            invoice.status.idasiento = None;
            self.delete_entry(entry.id).await?;
            return Err(err.into());
        }
        self.repo::<CustomerInvoice>().save(invoice).await?;
        Ok(())
    }

    async fn collect_customer_invoice(&self, invoice: &mut CustomerInvoice, fecha: NaiveDate) -> ServiceResult<()> {
        if !invoice.status.can_accept_payment() {
            return Err(DomainError::invariant(format!(
                "cannot pay invoice {}: it is void or already paid",
                invoice.header.codigo
            ))
            .into());
        }
        let year = self.open_year(fecha).await?;
        let party = self.customer_subaccount(&invoice.header.party.code, &year).await?;
        let cash = self.cash_subaccount(&invoice.header.codpago, &year).await?;
        let (mut entry, mut postings) = customer_payment_entry(invoice, &party, &cash, fecha)?;
        self.save_entry(&mut entry, &mut postings).await?;
        invoice.status.mark_paid(Some(entry.id))?;
        self.repo::<CustomerInvoice>().save(invoice).await?;
        info!(codigo = %invoice.header.codigo, asiento = entry.numero, "customer invoice collected");
        Ok(())
    }

    /// Record the collection of invoice `id` on `fecha` with its payment entry.
    #[instrument(skip(self), err)]
    pub async fn pay_customer_invoice(&self, id: CustomerInvoiceId, fecha: NaiveDate) -> ServiceResult<CustomerInvoice> {
        let mut invoice = self.customer_invoice(id).await?;
        self.collect_customer_invoice(&mut invoice, fecha).await?;
        Ok(invoice)
    }

    /// Undo the collection of invoice `id` and delete its payment entry.
    #[instrument(skip(self), err)]
    pub async fn unpay_customer_invoice(&self, id: CustomerInvoiceId) -> ServiceResult<CustomerInvoice> {
        let mut invoice = self.customer_invoice(id).await?;
        let payment = invoice.status.mark_unpaid()?;
        self.repo::<CustomerInvoice>().save(&invoice).await?;
        self.delete_entries([payment]).await?;
        Ok(invoice)
    }

    /// Void invoice `id`: its entries are deleted and the payment undone.
    #[instrument(skip(self), err)]
    pub async fn void_customer_invoice(&self, id: CustomerInvoiceId) -> ServiceResult<CustomerInvoice> {
        let mut invoice = self.customer_invoice(id).await?;
        invoice.status.void()?;
        let payment = if invoice.status.pagada {
            invoice.status.mark_unpaid()?
        } else {
            None
        };
        let entries = [invoice.status.idasiento.take(), payment];
        self.repo::<CustomerInvoice>().save(&invoice).await?;
        self.delete_entries(entries).await?;
        info!(codigo = %invoice.header.codigo, "voided customer invoice");
        Ok(invoice)
    }

    /// Delete invoice `id` with its lines and entries; its delivery notes are pending again.
    #[instrument(skip(self), err)]
    pub async fn delete_customer_invoice(&self, id: CustomerInvoiceId) -> ServiceResult<bool> {
        let repo = self.repo::<CustomerInvoice>();
        let Some(invoice) = repo.get(&id).await? else {
            return Ok(false);
        };
        self.delete_entries([invoice.status.idasiento, invoice.status.idasientop]).await?;

        let notes = self.repo::<CustomerDeliveryNote>();
        for mut note in notes.find_where(Filter::eq("idfactura", *id.as_uuid())).await? {
            note.unlink_invoice();
            notes.save(&note).await?;
        }
        self.repo::<CustomerInvoiceLine>()
            .delete_where(Filter::eq("idfactura", id))
            .await?;
        self.repo::<CustomerInvoiceTaxLine>()
            .delete_where(Filter::eq("idfactura", id))
            .await?;
        repo.delete(&id).await?;
        info!(codigo = %invoice.header.codigo, "deleted customer invoice");
        Ok(true)
    }

    pub async fn customer_invoice(&self, id: CustomerInvoiceId) -> ServiceResult<CustomerInvoice> {
        self.repo::<CustomerInvoice>()
            .get(&id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("customer invoice {id}")))
    }

    pub async fn customer_invoice_lines(&self, id: CustomerInvoiceId) -> ServiceResult<Vec<CustomerInvoiceLine>> {
        let repo = self.repo::<CustomerInvoiceLine>();
        Ok(repo.find(repo.ordered(Query::filter(Filter::eq("idfactura", id)))).await?)
    }

    pub async fn customer_invoice_tax_lines(&self, id: CustomerInvoiceId) -> ServiceResult<Vec<CustomerInvoiceTaxLine>> {
        let repo = self.repo::<CustomerInvoiceTaxLine>();
        Ok(repo.find(repo.ordered(Query::filter(Filter::eq("idfactura", id)))).await?)
    }

    pub async fn customer_invoices(&self, offset: i64) -> ServiceResult<Vec<CustomerInvoice>> {
        self.page(Filter::All, offset).await
    }

    pub async fn search_customer_invoices(&self, text: &str, offset: i64) -> ServiceResult<Vec<CustomerInvoice>> {
        self.page(Filter::search(SEARCH, text.trim()), offset).await
    }

    pub async fn customer_invoices_of(&self, codcliente: &str, offset: i64) -> ServiceResult<Vec<CustomerInvoice>> {
        self.page(Filter::eq("codcliente", codcliente), offset).await
    }

    /// Invoices waiting for collection, earliest due first.
    pub async fn unpaid_customer_invoices(&self, offset: i64) -> ServiceResult<Vec<CustomerInvoice>> {
        let query = Query::filter(Filter::eq("pagada", false).and(Filter::eq("anulada", false)))
            .order_by("vencimiento")
            .order_by("codigo")
            .page(offset, self.page_size());
        Ok(self.repo::<CustomerInvoice>().find(query).await?)
    }

    /// Deep check of a stored invoice against its lines, tax lines and entry.
    pub async fn check_customer_invoice(&self, id: CustomerInvoiceId) -> ServiceResult<()> {
        let invoice = self.customer_invoice(id).await?;
        let lines = self.customer_invoice_lines(id).await?;
        let tax_lines = self.customer_invoice_tax_lines(id).await?;
        let siblings = self
            .same_day_documents::<CustomerInvoice>("codcliente", &invoice.header.party.code, invoice.header.fecha)
            .await?;
        let entry_importe = self.entry_importe(invoice.status.idasiento).await?;
        let tax_free = self.series(&invoice.header.codserie).await?.siniva;
        invoice.full_test(&lines, &tax_lines, &siblings, entry_importe, tax_free)?;
        Ok(())
    }

    /// Check every invoice, or those of one fiscal year.
    pub async fn check_customer_invoices(&self, codejercicio: Option<&str>) -> ServiceResult<Vec<Problem>> {
        let filter = codejercicio.map_or(Filter::All, |code| Filter::eq("codejercicio", code));
        let mut problems = Vec::new();
        for invoice in self.repo::<CustomerInvoice>().find_where(filter).await? {
            let result = self.check_customer_invoice(invoice.id).await;
            problems.extend(Problem::from_result(&invoice.header.codigo, result));
        }
        Ok(problems)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use contaerp_accounting::JournalEntry;

    use super::super::delivery_notes::tests::{cement, customer_note, drill};
    use super::super::fixtures::{date, seeded};
    use super::*;

    async fn invoice_with(
        services: &Services,
        fecha: NaiveDate,
        codpago: &str,
        lines: Vec<contaerp_documents::DocumentLine>,
    ) -> CustomerInvoice {
        let customer = services.repo::<Customer>().get(&"000001".to_string()).await.unwrap().unwrap();
        let mut invoice = CustomerInvoice::for_customer("2024", &customer, services.defaults(), fecha, NaiveTime::MIN);
        invoice.header.codpago = codpago.to_string();
        let mut lines: Vec<_> = lines.into_iter().map(|l| InvoiceLine::new(invoice.id, l)).collect();
        services.create_customer_invoice(&mut invoice, &mut lines).await.unwrap();
        invoice
    }

    async fn saldo(services: &Services, codsubcuenta: &str) -> Decimal {
        services.subaccount_by_code(codsubcuenta, "2024").await.unwrap().unwrap().saldo
    }

    #[tokio::test]
    async fn creating_an_invoice_posts_the_sales_entry() {
        let services = seeded().await;
        let invoice = invoice_with(&services, date(2024, 3, 1), "TRANS", vec![drill(dec!(1))]).await;

        assert_eq!(invoice.header.codigo, "2024A000001");
        assert_eq!(invoice.header.totals.total, dec!(108.78));
        assert_eq!(invoice.status.vencimiento, date(2024, 3, 31));
        assert!(!invoice.status.pagada);
        let entry = services.entry(invoice.status.idasiento.unwrap()).await.unwrap();
        assert_eq!(entry.importe, dec!(108.78));
        assert_eq!(entry.numero, 1);
        assert_eq!(services.entry_postings(entry.id).await.unwrap().len(), 3);

        assert_eq!(saldo(&services, "4300000001").await, dec!(108.78));
        assert_eq!(saldo(&services, "7000000000").await, dec!(-89.9));
        assert_eq!(saldo(&services, "4770000000").await, dec!(-18.88));
        assert_eq!(services.customer_invoice_tax_lines(invoice.id).await.unwrap().len(), 1);
        services.check_customer_invoice(invoice.id).await.unwrap();
        assert!(services.check_customer_invoices(Some("2024")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn collecting_and_undoing_a_payment() {
        let services = seeded().await;
        let invoice = invoice_with(&services, date(2024, 3, 1), "TRANS", vec![drill(dec!(1))]).await;

        let paid = services.pay_customer_invoice(invoice.id, date(2024, 3, 20)).await.unwrap();
        assert!(paid.status.pagada);
        let payment = paid.status.idasientop.unwrap();
        assert_eq!(saldo(&services, "4300000001").await, dec!(0));
        assert_eq!(saldo(&services, "5700000000").await, dec!(108.78));
        match services.pay_customer_invoice(invoice.id, date(2024, 3, 21)).await {
            Err(ServiceError::Domain(DomainError::InvariantViolation(msg))) => assert!(msg.contains("already paid")),
            other => panic!("expected InvariantViolation, got {other:?}"),
        }

        let unpaid = services.unpay_customer_invoice(invoice.id).await.unwrap();
        assert!(!unpaid.status.pagada);
        assert!(matches!(services.entry(payment).await, Err(ServiceError::NotFound(_))));
        assert_eq!(saldo(&services, "4300000001").await, dec!(108.78));
        assert_eq!(services.unpaid_customer_invoices(0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cash_sales_are_born_paid() {
        let services = seeded().await;
        let invoice = invoice_with(&services, date(2024, 3, 1), "CONT", vec![drill(dec!(2))]).await;
        assert!(invoice.status.pagada);
        assert_eq!(invoice.status.vencimiento, date(2024, 4, 1));
        assert!(invoice.status.idasientop.is_some());
        assert_eq!(services.repo::<JournalEntry>().count(Filter::All).await.unwrap(), 2);
        assert!(services.unpaid_customer_invoices(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invoicing_notes_links_them_until_the_invoice_is_deleted() {
        let services = seeded().await;
        services.move_stock("CEMENTO", "ALG", dec!(100)).await.unwrap();
        let (first, _) = customer_note(&services, date(2024, 2, 10), vec![cement(dec!(10), dec!(6.5))]).await;
        let (second, _) = customer_note(&services, date(2024, 2, 12), vec![cement(dec!(20), dec!(6.5))]).await;

        let invoice = services
            .invoice_customer_notes(&[first.id, second.id], date(2024, 2, 29), NaiveTime::MIN)
            .await
            .unwrap();
        assert_eq!(invoice.header.totals.total, dec!(235.95));
        let lines = services.customer_invoice_lines(invoice.id).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].idalbaran, Some(first.id));
        assert!(services.pending_customer_notes("000001").await.unwrap().is_empty());
        let note = services.customer_note(second.id).await.unwrap();
        assert_eq!(note.idfactura, Some(*invoice.id.as_uuid()));
        services.check_customer_invoice(invoice.id).await.unwrap();

        match services.invoice_customer_notes(&[first.id], date(2024, 3, 1), NaiveTime::MIN).await {
            Err(ServiceError::Domain(DomainError::Invalid(msgs))) => assert!(msgs[0].contains("already invoiced")),
            other => panic!("expected Invalid, got {other:?}"),
        }

        assert!(services.delete_customer_invoice(invoice.id).await.unwrap());
        assert_eq!(services.pending_customer_notes("000001").await.unwrap().len(), 2);
        assert!(services.customer_invoice_lines(invoice.id).await.unwrap().is_empty());
        assert_eq!(services.repo::<JournalEntry>().count(Filter::All).await.unwrap(), 0);
        assert_eq!(saldo(&services, "4300000001").await, dec!(0));
        let stock = services.repo::<contaerp_products::Article>().get(&"CEMENTO".to_string()).await.unwrap().unwrap();
        assert_eq!(stock.stockfis, dec!(70));
        assert!(!services.delete_customer_invoice(invoice.id).await.unwrap());
    }

    #[tokio::test]
    async fn voiding_deletes_the_entries() {
        let services = seeded().await;
        let invoice = invoice_with(&services, date(2024, 3, 1), "CONT", vec![drill(dec!(1))]).await;

        let void = services.void_customer_invoice(invoice.id).await.unwrap();
        assert!(void.status.anulada && !void.status.pagada);
        assert!(void.status.idasiento.is_none() && void.status.idasientop.is_none());
        assert_eq!(services.repo::<JournalEntry>().count(Filter::All).await.unwrap(), 0);
        services.check_customer_invoice(invoice.id).await.unwrap();

        match services.void_customer_invoice(invoice.id).await {
            Err(ServiceError::Domain(DomainError::Conflict(_))) => {}
            other => panic!("expected Conflict, got {other:?}"),
        }
        assert!(services.pay_customer_invoice(invoice.id, date(2024, 3, 2)).await.is_err());
    }

    #[tokio::test]
    async fn a_credit_note_reverses_the_invoice() {
        let services = seeded().await;
        let invoice = invoice_with(&services, date(2024, 3, 1), "TRANS", vec![drill(dec!(1))]).await;

        let credit = services
            .rectify_customer_invoice(invoice.id, date(2024, 3, 10), NaiveTime::MIN)
            .await
            .unwrap();
        assert_eq!(credit.header.codigo, "2024A000002");
        assert_eq!(credit.codigorect.as_deref(), Some("2024A000001"));
        assert_eq!(credit.header.totals.total, dec!(-108.78));
        assert_eq!(services.entry(credit.status.idasiento.unwrap()).await.unwrap().importe, dec!(108.78));
        assert_eq!(saldo(&services, "4300000001").await, dec!(0));
        services.check_customer_invoice(credit.id).await.unwrap();
    }

    #[tokio::test]
    async fn checks_report_a_missing_entry() {
        let services = seeded().await;
        let invoice = invoice_with(&services, date(2024, 3, 1), "TRANS", vec![drill(dec!(1))]).await;
        let entry = invoice.status.idasiento.unwrap();
        services.repo::<JournalEntry>().delete(&entry).await.unwrap();

        let problems = services.check_customer_invoices(None).await.unwrap();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].document, "2024A000001");
        assert!(problems[0].messages[0].contains("not found"), "{:?}", problems[0].messages);
    }

    #[tokio::test]
    async fn finders() {
        let services = seeded().await;
        invoice_with(&services, date(2024, 3, 1), "TRANS", vec![drill(dec!(1))]).await;
        invoice_with(&services, date(2024, 3, 2), "TRANS", vec![drill(dec!(3))]).await;

        let all = services.customer_invoices(0).await.unwrap();
        assert_eq!(all[0].header.codigo, "2024A000002");
        assert_eq!(services.search_customer_invoices("Sol", 0).await.unwrap().len(), 2);
        assert_eq!(services.search_customer_invoices("2024A000001", 0).await.unwrap().len(), 1);
        assert_eq!(services.customer_invoices_of("000001", 0).await.unwrap().len(), 2);
        assert!(services.customer_invoices_of("000002", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_customers_are_refused() {
        let services = seeded().await;
        let mut stranger = Customer::new("000009", "Desconocido", services.defaults(), date(2020, 1, 1));
        stranger.codpago = "TRANS".to_string();
        let mut invoice = CustomerInvoice::for_customer("2024", &stranger, services.defaults(), date(2024, 3, 1), NaiveTime::MIN);
        let mut lines = vec![InvoiceLine::new(invoice.id, drill(dec!(1)))];
        match services.create_customer_invoice(&mut invoice, &mut lines).await {
            Err(ServiceError::NotFound(what)) => assert_eq!(what, "customer 000009"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
