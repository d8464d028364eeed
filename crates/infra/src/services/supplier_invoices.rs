//! Supplier invoices: the purchase side of `customer_invoices`.

use chrono::{NaiveDate, NaiveTime};
use tracing::{info, instrument, warn};

use contaerp_core::DomainError;
use contaerp_invoicing::{
    supplier_invoice_entry, supplier_payment_entry, InvoiceLine, SupplierInvoice, SupplierInvoiceId,
    SupplierInvoiceLine, SupplierInvoiceTaxLine,
};
use contaerp_masters::PaymentMethod;
use contaerp_parties::Supplier;
use contaerp_purchasing::{SupplierDeliveryNote, SupplierDeliveryNoteId};

use super::invoices::PURCHASES;
use super::{Problem, ServiceError, ServiceResult, Services};
use crate::db::{Filter, Query};

const SEARCH: &[&str] = &["codigo", "numproveedor", "nombre", "cifnif", "observaciones"];

impl Services {
    /// Create a supplier invoice with its complete set of lines.
    #[instrument(skip(self, invoice, lines), fields(codproveedor = %invoice.header.party.code), err)]
    pub async fn create_supplier_invoice(
        &self,
        invoice: &mut SupplierInvoice,
        lines: &mut [SupplierInvoiceLine],
    ) -> ServiceResult<()> {
        if self.repo::<SupplierInvoice>().exists(&invoice.id).await? {
            return Err(DomainError::conflict(format!("invoice {} already exists", invoice.header.codigo)).into());
        }
        if !self.repo::<Supplier>().exists(&invoice.header.party.code).await? {
            return Err(ServiceError::not_found(format!("supplier {}", invoice.header.party.code)));
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
        self.store_supplier_invoice(invoice, lines, &method, tax_free).await
    }

    #[instrument(skip(self, ids), fields(notes = ids.len()), err)]
    pub async fn invoice_supplier_notes(
        &self,
        ids: &[SupplierDeliveryNoteId],
        fecha: NaiveDate,
        hora: NaiveTime,
    ) -> ServiceResult<SupplierInvoice> {
        let mut notes = Vec::with_capacity(ids.len());
        let mut note_lines = Vec::new();
        for id in ids {
            notes.push(self.supplier_note(*id).await?);
            note_lines.extend(self.supplier_note_lines(*id).await?);
        }
        let year = self.open_year(fecha).await?;
        let (mut invoice, lines) =
            SupplierInvoice::from_delivery_notes(&mut notes, &note_lines, &year.codejercicio, fecha, hora)?;

        let tax_free = self.series(&invoice.header.codserie).await?.siniva;
        let method = self.payment_method(&invoice.header.codpago).await?;
        invoice.apply_payment_method(&method);
        self.store_supplier_invoice(&mut invoice, &lines, &method, tax_free).await?;

        let repo = self.repo::<SupplierDeliveryNote>();
        for note in &notes {
            repo.save(note).await?;
        }
        Ok(invoice)
    }

    /// Full credit note of supplier invoice `id`.
    #[instrument(skip(self), err)]
    pub async fn rectify_supplier_invoice(
        &self,
        id: SupplierInvoiceId,
        fecha: NaiveDate,
        hora: NaiveTime,
    ) -> ServiceResult<SupplierInvoice> {
        let original = self.supplier_invoice(id).await?;
        if original.status.anulada {
            return Err(DomainError::conflict(format!("invoice {} is void", original.header.codigo)).into());
        }
        let mut rectifying = original.rectifying(fecha, hora);
        let mut lines: Vec<SupplierInvoiceLine> = self
            .supplier_invoice_lines(id)
            .await?
            .into_iter()
            .map(|l| {
                let mut line = l.line;
                line.cantidad = -line.cantidad;
                InvoiceLine::new(rectifying.id, line)
            })
            .collect();
        self.create_supplier_invoice(&mut rectifying, &mut lines).await?;
        Ok(rectifying)
    }

    async fn store_supplier_invoice(
        &self,
        invoice: &mut SupplierInvoice,
        lines: &[SupplierInvoiceLine],
        method: &PaymentMethod,
        tax_free: bool,
    ) -> ServiceResult<()> {
        if !invoice.header.is_numbered() {
            let numero = self.next_document_number::<SupplierInvoice>(&invoice.header).await?;
            invoice.header.assign_number(numero);
        }
        let tax_lines = invoice.tax_lines(lines);
        self.repo::<SupplierInvoice>().save(invoice).await?;
        let line_repo = self.repo::<SupplierInvoiceLine>();
        for line in lines {
            line_repo.save(line).await?;
        }
        let tax_repo = self.repo::<SupplierInvoiceTaxLine>();
        for tax_line in &tax_lines {
            tax_repo.save(tax_line).await?;
        }

        if let Err(err) = self.post_supplier_invoice(invoice, lines, &tax_lines, tax_free).await {
            warn!(codigo = %invoice.header.codigo, error = %err, "invoice entry refused, removing the invoice");
            self.delete_supplier_invoice(invoice.id).await?;
            return Err(err);
        }
        info!(codigo = %invoice.header.codigo, total = %invoice.header.totals.total, "created supplier invoice");

        if method.marks_paid() {
            let fecha = invoice.header.fecha;
            self.settle_supplier_invoice(invoice, fecha).await?;
        }
        Ok(())
    }

    async fn post_supplier_invoice(
        &self,
        invoice: &mut SupplierInvoice,
        lines: &[SupplierInvoiceLine],
        tax_lines: &[SupplierInvoiceTaxLine],
        tax_free: bool,
    ) -> ServiceResult<()> {
        let year = self.fiscal_year(&invoice.header.codejercicio).await?;
        let party = self.supplier_subaccount(&invoice.header.party.code, &year).await?;
        let accounts = self
            .posting_accounts(
                party,
                &invoice.header,
                tax_lines.iter().map(|t| t.codimpuesto.as_deref()),
                &year,
                &PURCHASES,
            )
            .await?;
        let (mut entry, mut postings) = supplier_invoice_entry(invoice, tax_lines, &accounts)?;
        self.save_entry(&mut entry, &mut postings).await?;

        invoice.status.idasiento = Some(entry.id);
        let siblings = self
            .same_day_documents::<SupplierInvoice>("codproveedor", &invoice.header.party.code, invoice.header.fecha)
            .await?;
        if let Err(err) = invoice.full_test(lines, tax_lines, &siblings, Some(entry.importe), tax_free) {
            invoice.status.idasiento = None;
            self.delete_entry(entry.id).await?;
            return Err(err.into());
        }
        self.repo::<SupplierInvoice>().save(invoice).await?;
        Ok(())
    }

    async fn settle_supplier_invoice(&self, invoice: &mut SupplierInvoice, fecha: NaiveDate) -> ServiceResult<()> {
        if !invoice.status.can_accept_payment() {
            return Err(DomainError::invariant(format!(
                "cannot pay invoice {}: it is void or already paid",
                invoice.header.codigo
            ))
            .into());
        }
        let year = self.open_year(fecha).await?;
        let party = self.supplier_subaccount(&invoice.header.party.code, &year).await?;
        let cash = self.cash_subaccount(&invoice.header.codpago, &year).await?;
        let (mut entry, mut postings) = supplier_payment_entry(invoice, &party, &cash, fecha)?;
        self.save_entry(&mut entry, &mut postings).await?;
        invoice.status.mark_paid(Some(entry.id))?;
        self.repo::<SupplierInvoice>().save(invoice).await?;
        info!(codigo = %invoice.header.codigo, asiento = entry.numero, "supplier invoice paid");
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn pay_supplier_invoice(&self, id: SupplierInvoiceId, fecha: NaiveDate) -> ServiceResult<SupplierInvoice> {
        let mut invoice = self.supplier_invoice(id).await?;
        self.settle_supplier_invoice(&mut invoice, fecha).await?;
        Ok(invoice)
    }

    #[instrument(skip(self), err)]
    pub async fn unpay_supplier_invoice(&self, id: SupplierInvoiceId) -> ServiceResult<SupplierInvoice> {
        let mut invoice = self.supplier_invoice(id).await?;
        let payment = invoice.status.mark_unpaid()?;
        self.repo::<SupplierInvoice>().save(&invoice).await?;
        self.delete_entries([payment]).await?;
        Ok(invoice)
    }

    #[instrument(skip(self), err)]
    pub async fn void_supplier_invoice(&self, id: SupplierInvoiceId) -> ServiceResult<SupplierInvoice> {
        let mut invoice = self.supplier_invoice(id).await?;
        invoice.status.void()?;
        let payment = if invoice.status.pagada {
            invoice.status.mark_unpaid()?
        } else {
            None
        };
        let entries = [invoice.status.idasiento.take(), payment];
        self.repo::<SupplierInvoice>().save(&invoice).await?;
        self.delete_entries(entries).await?;
        info!(codigo = %invoice.header.codigo, "voided supplier invoice");
        Ok(invoice)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_supplier_invoice(&self, id: SupplierInvoiceId) -> ServiceResult<bool> {
        let repo = self.repo::<SupplierInvoice>();
        let Some(invoice) = repo.get(&id).await? else {
            return Ok(false);
        };
        self.delete_entries([invoice.status.idasiento, invoice.status.idasientop]).await?;

        let notes = self.repo::<SupplierDeliveryNote>();
        for mut note in notes.find_where(Filter::eq("idfactura", *id.as_uuid())).await? {
            note.unlink_invoice();
            notes.save(&note).await?;
        }
        self.repo::<SupplierInvoiceLine>()
            .delete_where(Filter::eq("idfactura", id))
            .await?;
        self.repo::<SupplierInvoiceTaxLine>()
            .delete_where(Filter::eq("idfactura", id))
            .await?;
        repo.delete(&id).await?;
        info!(codigo = %invoice.header.codigo, "deleted supplier invoice");
        Ok(true)
    }

    pub async fn supplier_invoice(&self, id: SupplierInvoiceId) -> ServiceResult<SupplierInvoice> {
        self.repo::<SupplierInvoice>()
            .get(&id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("supplier invoice {id}")))
    }

    pub async fn supplier_invoice_lines(&self, id: SupplierInvoiceId) -> ServiceResult<Vec<SupplierInvoiceLine>> {
        let repo = self.repo::<SupplierInvoiceLine>();
        Ok(repo.find(repo.ordered(Query::filter(Filter::eq("idfactura", id)))).await?)
    }

    pub async fn supplier_invoice_tax_lines(&self, id: SupplierInvoiceId) -> ServiceResult<Vec<SupplierInvoiceTaxLine>> {
        let repo = self.repo::<SupplierInvoiceTaxLine>();
        Ok(repo.find(repo.ordered(Query::filter(Filter::eq("idfactura", id)))).await?)
    }

    pub async fn supplier_invoices(&self, offset: i64) -> ServiceResult<Vec<SupplierInvoice>> {
        self.page(Filter::All, offset).await
    }

    pub async fn search_supplier_invoices(&self, text: &str, offset: i64) -> ServiceResult<Vec<SupplierInvoice>> {
        self.page(Filter::search(SEARCH, text.trim()), offset).await
    }

    pub async fn supplier_invoices_of(&self, codproveedor: &str, offset: i64) -> ServiceResult<Vec<SupplierInvoice>> {
        self.page(Filter::eq("codproveedor", codproveedor), offset).await
    }

    pub async fn unpaid_supplier_invoices(&self, offset: i64) -> ServiceResult<Vec<SupplierInvoice>> {
        let query = Query::filter(Filter::eq("pagada", false).and(Filter::eq("anulada", false)))
            .order_by("vencimiento")
            .order_by("codigo")
            .page(offset, self.page_size());
        Ok(self.repo::<SupplierInvoice>().find(query).await?)
    }

    pub async fn check_supplier_invoice(&self, id: SupplierInvoiceId) -> ServiceResult<()> {
        let invoice = self.supplier_invoice(id).await?;
        let lines = self.supplier_invoice_lines(id).await?;
        let tax_lines = self.supplier_invoice_tax_lines(id).await?;
        let siblings = self
            .same_day_documents::<SupplierInvoice>("codproveedor", &invoice.header.party.code, invoice.header.fecha)
            .await?;
        let entry_importe = self.entry_importe(invoice.status.idasiento).await?;
        let tax_free = self.series(&invoice.header.codserie).await?.siniva;
        invoice.full_test(&lines, &tax_lines, &siblings, entry_importe, tax_free)?;
        Ok(())
    }

    pub async fn check_supplier_invoices(&self, codejercicio: Option<&str>) -> ServiceResult<Vec<Problem>> {
        let filter = codejercicio.map_or(Filter::All, |code| Filter::eq("codejercicio", code));
        let mut problems = Vec::new();
        for invoice in self.repo::<SupplierInvoice>().find_where(filter).await? {
            let result = self.check_supplier_invoice(invoice.id).await;
            problems.extend(Problem::from_result(&invoice.header.codigo, result));
        }
        Ok(problems)
    }
}
