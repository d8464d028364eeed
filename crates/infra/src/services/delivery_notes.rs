//! Customer and supplier delivery notes.
//!
//! Saving a note numbers it, recomputes its totals and moves stock by the
//! difference between the stored lines and the new ones: customer notes take
//! stock out, supplier notes bring it in and update the average cost.
//! Invoiced notes are read-only.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{info, instrument};

use contaerp_core::DomainError;
use contaerp_documents::{DocumentHeader, DocumentLine};
use contaerp_parties::{Customer, Supplier};
use contaerp_products::Article;
use contaerp_purchasing::{SupplierDeliveryNote, SupplierDeliveryNoteId, SupplierDeliveryNoteLine};
use contaerp_sales::{CustomerDeliveryNote, CustomerDeliveryNoteId, CustomerDeliveryNoteLine};

use super::{ServiceError, ServiceResult, Services};
use crate::db::{Filter, Query, Table};

const CUSTOMER_NOTE_SEARCH: &[&str] = &["codigo", "numero2", "nombrecliente", "cifnif", "observaciones"];
const SUPPLIER_NOTE_SEARCH: &[&str] = &["codigo", "numproveedor", "nombre", "cifnif", "observaciones"];

/// Net stock change per (article, warehouse) of replacing the `old` lines with the `new` ones.
///
/// `outgoing` notes take stock out with their lines.
fn stock_moves(
    old: Option<(&str, Vec<&DocumentLine>)>,
    new: (&str, Vec<&DocumentLine>),
    outgoing: bool,
) -> Vec<(String, String, Decimal)> {
    let sign = if outgoing { Decimal::NEGATIVE_ONE } else { Decimal::ONE };
    let mut moves: BTreeMap<(String, String), Decimal> = BTreeMap::new();
    let mut add = |codalmacen: &str, lines: Vec<&DocumentLine>, factor: Decimal| {
        for line in lines {
            if let Some(referencia) = &line.referencia {
                *moves.entry((referencia.clone(), codalmacen.to_string())).or_default() += line.cantidad * factor;
            }
        }
    };
    if let Some((codalmacen, lines)) = old {
        add(codalmacen, lines, -sign);
    }
    add(new.0, new.1, sign);
    moves
        .into_iter()
        .filter(|(_, delta)| !delta.is_zero())
        .map(|((referencia, codalmacen), delta)| (referencia, codalmacen, delta))
        .collect()
}

impl Services {
    async fn apply_stock_moves(&self, moves: Vec<(String, String, Decimal)>) -> ServiceResult<()> {
        // outflows first: they are the ones that can be refused
        let (out, inflow): (Vec<_>, Vec<_>) = moves.into_iter().partition(|(_, _, d)| d.is_sign_negative());
        for (referencia, codalmacen, delta) in out.into_iter().chain(inflow) {
            self.move_line_stock(Some(&referencia), &codalmacen, delta).await?;
        }
        Ok(())
    }

    /// Move the header into its open fiscal year and recompute the line amounts.
    ///
    /// Returns whether the series is tax free; its lines lose their taxes.
    async fn prepare_note(&self, header: &mut DocumentHeader, lines: &mut [&mut DocumentLine]) -> ServiceResult<bool> {
        let year = self.open_year(header.fecha).await?;
        if header.codejercicio != year.codejercicio {
            header.codejercicio = year.codejercicio.clone();
            header.numero = 0;
            header.codigo.clear();
        }
        let tax_free = self.series(&header.codserie).await?.siniva;
        for line in lines.iter_mut() {
            if tax_free {
                line.clear_taxes();
            }
            line.recalculate();
        }
        Ok(tax_free)
    }

    async fn number_note<T: Table>(&self, header: &mut DocumentHeader) -> ServiceResult<()> {
        if !header.is_numbered() {
            let numero = self.next_document_number::<T>(header).await?;
            header.assign_number(numero);
        }
        Ok(())
    }

    async fn note_lines<L: Table>(&self, idalbaran: impl Into<crate::db::Value>) -> ServiceResult<Vec<L>> {
        let repo = self.repo::<L>();
        Ok(repo.find(repo.ordered(Query::filter(Filter::eq("idalbaran", idalbaran)))).await?)
    }

    // ---- customer notes ----

    /// Save a customer note with its complete set of lines.
    #[instrument(skip(self, note, lines), fields(id = %note.id, codcliente = %note.header.party.code), err)]
    pub async fn save_customer_note(
        &self,
        note: &mut CustomerDeliveryNote,
        lines: &mut [CustomerDeliveryNoteLine],
    ) -> ServiceResult<()> {
        let repo = self.repo::<CustomerDeliveryNote>();
        let stored = repo.get(&note.id).await?;
        if let Some(stored) = &stored {
            if stored.is_invoiced() {
                return Err(DomainError::conflict(format!(
                    "delivery note {} is invoiced and cannot be changed",
                    stored.header.codigo
                ))
                .into());
            }
        }
        if !self.repo::<Customer>().exists(&note.header.party.code).await? {
            return Err(ServiceError::not_found(format!("customer {}", note.header.party.code)));
        }

        let mut doc_lines: Vec<&mut DocumentLine> = lines.iter_mut().map(|l| &mut l.line).collect();
        let tax_free = self.prepare_note(&mut note.header, &mut doc_lines).await?;
        for line in lines.iter_mut() {
            line.idalbaran = note.id;
        }
        note.set_lines(lines);
        self.number_note::<CustomerDeliveryNote>(&mut note.header).await?;
        let siblings = self
            .same_day_documents::<CustomerDeliveryNote>("codcliente", &note.header.party.code, note.header.fecha)
            .await?;
        note.full_test(lines, &siblings, tax_free)?;

        let old_lines: Vec<CustomerDeliveryNoteLine> = self.note_lines(note.id).await?;
        let moves = stock_moves(
            stored
                .as_ref()
                .map(|s| (s.header.codalmacen.as_str(), old_lines.iter().map(|l| &l.line).collect())),
            (&note.header.codalmacen, lines.iter().map(|l| &l.line).collect()),
            true,
        );
        self.apply_stock_moves(moves).await?;

        repo.save(note).await?;
        let line_repo = self.repo::<CustomerDeliveryNoteLine>();
        for old in old_lines.iter().filter(|o| lines.iter().all(|l| l.id != o.id)) {
            line_repo.delete(&old.id).await?;
        }
        for line in lines.iter() {
            line_repo.save(line).await?;
        }
        info!(codigo = %note.header.codigo, total = %note.header.totals.total, "saved customer delivery note");
        Ok(())
    }

    /// Delete a pending customer note and put its stock back.
    #[instrument(skip(self), err)]
    pub async fn delete_customer_note(&self, id: CustomerDeliveryNoteId) -> ServiceResult<bool> {
        let repo = self.repo::<CustomerDeliveryNote>();
        let Some(note) = repo.get(&id).await? else {
            return Ok(false);
        };
        if note.is_invoiced() {
            return Err(DomainError::conflict(format!(
                "delivery note {} is invoiced and cannot be deleted",
                note.header.codigo
            ))
            .into());
        }
        let lines: Vec<CustomerDeliveryNoteLine> = self.note_lines(id).await?;
        let moves = stock_moves(
            Some((&note.header.codalmacen, lines.iter().map(|l| &l.line).collect())),
            (&note.header.codalmacen, Vec::new()),
            true,
        );
        self.apply_stock_moves(moves).await?;
        self.repo::<CustomerDeliveryNoteLine>()
            .delete_where(Filter::eq("idalbaran", id))
            .await?;
        repo.delete(&id).await?;
        info!(codigo = %note.header.codigo, "deleted customer delivery note");
        Ok(true)
    }

    pub async fn customer_note(&self, id: CustomerDeliveryNoteId) -> ServiceResult<CustomerDeliveryNote> {
        self.repo::<CustomerDeliveryNote>()
            .get(&id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("customer delivery note {id}")))
    }

    pub async fn customer_note_lines(&self, id: CustomerDeliveryNoteId) -> ServiceResult<Vec<CustomerDeliveryNoteLine>> {
        self.note_lines(id).await
    }

    pub async fn customer_notes(&self, offset: i64) -> ServiceResult<Vec<CustomerDeliveryNote>> {
        self.page(Filter::All, offset).await
    }

    pub async fn search_customer_notes(&self, text: &str, offset: i64) -> ServiceResult<Vec<CustomerDeliveryNote>> {
        self.page(Filter::search(CUSTOMER_NOTE_SEARCH, text.trim()), offset).await
    }

    pub async fn customer_notes_of(&self, codcliente: &str, offset: i64) -> ServiceResult<Vec<CustomerDeliveryNote>> {
        self.page(Filter::eq("codcliente", codcliente), offset).await
    }

    /// Notes of a customer still waiting for an invoice, oldest first.
    pub async fn pending_customer_notes(&self, codcliente: &str) -> ServiceResult<Vec<CustomerDeliveryNote>> {
        let query = Query::filter(Filter::eq("codcliente", codcliente).and(Filter::eq("ptefactura", true)))
            .order_by("fecha")
            .order_by("codigo");
        Ok(self.repo::<CustomerDeliveryNote>().find(query).await?)
    }

    /// Deep check of a stored customer note.
    pub async fn check_customer_note(&self, id: CustomerDeliveryNoteId) -> ServiceResult<()> {
        let note = self.customer_note(id).await?;
        let lines = self.customer_note_lines(id).await?;
        let siblings = self
            .same_day_documents::<CustomerDeliveryNote>("codcliente", &note.header.party.code, note.header.fecha)
            .await?;
        let tax_free = self.series(&note.header.codserie).await?.siniva;
        note.full_test(&lines, &siblings, tax_free)?;
        Ok(())
    }

    // ---- supplier notes ----

    /// Save a supplier note with its complete set of lines.
    ///
    /// New lines update the average cost of their article before the stock comes in.
    #[instrument(skip(self, note, lines), fields(id = %note.id, codproveedor = %note.header.party.code), err)]
    pub async fn save_supplier_note(
        &self,
        note: &mut SupplierDeliveryNote,
        lines: &mut [SupplierDeliveryNoteLine],
    ) -> ServiceResult<()> {
        let repo = self.repo::<SupplierDeliveryNote>();
        let stored = repo.get(&note.id).await?;
        if let Some(stored) = &stored {
            if stored.is_invoiced() {
                return Err(DomainError::conflict(format!(
                    "delivery note {} is invoiced and cannot be changed",
                    stored.header.codigo
                ))
                .into());
            }
        }
        if !self.repo::<Supplier>().exists(&note.header.party.code).await? {
            return Err(ServiceError::not_found(format!("supplier {}", note.header.party.code)));
        }

        let mut doc_lines: Vec<&mut DocumentLine> = lines.iter_mut().map(|l| &mut l.line).collect();
        let tax_free = self.prepare_note(&mut note.header, &mut doc_lines).await?;
        for line in lines.iter_mut() {
            line.idalbaran = note.id;
        }
        note.set_lines(lines);
        self.number_note::<SupplierDeliveryNote>(&mut note.header).await?;
        let siblings = self
            .same_day_documents::<SupplierDeliveryNote>("codproveedor", &note.header.party.code, note.header.fecha)
            .await?;
        note.full_test(lines, &siblings, tax_free)?;

        let old_lines: Vec<SupplierDeliveryNoteLine> = self.note_lines(note.id).await?;
        let new_lines: Vec<SupplierDeliveryNoteLine> = lines
            .iter()
            .filter(|l| old_lines.iter().all(|o| o.id != l.id))
            .cloned()
            .collect();
        let articles = self.repo::<Article>();
        for receipt in note.cost_receipts(&new_lines) {
            if let Some(mut article) = articles.get(&receipt.referencia).await? {
                article.receive_cost(receipt.cantidad, receipt.unit_cost);
                articles.save(&article).await?;
            }
        }
        let moves = stock_moves(
            stored
                .as_ref()
                .map(|s| (s.header.codalmacen.as_str(), old_lines.iter().map(|l| &l.line).collect())),
            (&note.header.codalmacen, lines.iter().map(|l| &l.line).collect()),
            false,
        );
        self.apply_stock_moves(moves).await?;

        repo.save(note).await?;
        let line_repo = self.repo::<SupplierDeliveryNoteLine>();
        for old in old_lines.iter().filter(|o| lines.iter().all(|l| l.id != o.id)) {
            line_repo.delete(&old.id).await?;
        }
        for line in lines.iter() {
            line_repo.save(line).await?;
        }
        info!(codigo = %note.header.codigo, total = %note.header.totals.total, "saved supplier delivery note");
        Ok(())
    }

    /// Delete a pending supplier note and take its stock back out.
    #[instrument(skip(self), err)]
    pub async fn delete_supplier_note(&self, id: SupplierDeliveryNoteId) -> ServiceResult<bool> {
        let repo = self.repo::<SupplierDeliveryNote>();
        let Some(note) = repo.get(&id).await? else {
            return Ok(false);
        };
        if note.is_invoiced() {
            return Err(DomainError::conflict(format!(
                "delivery note {} is invoiced and cannot be deleted",
                note.header.codigo
            ))
            .into());
        }
        let lines: Vec<SupplierDeliveryNoteLine> = self.note_lines(id).await?;
        let moves = stock_moves(
            Some((&note.header.codalmacen, lines.iter().map(|l| &l.line).collect())),
            (&note.header.codalmacen, Vec::new()),
            false,
        );
        self.apply_stock_moves(moves).await?;
        self.repo::<SupplierDeliveryNoteLine>()
            .delete_where(Filter::eq("idalbaran", id))
            .await?;
        repo.delete(&id).await?;
        info!(codigo = %note.header.codigo, "deleted supplier delivery note");
        Ok(true)
    }

    pub async fn supplier_note(&self, id: SupplierDeliveryNoteId) -> ServiceResult<SupplierDeliveryNote> {
        self.repo::<SupplierDeliveryNote>()
            .get(&id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("supplier delivery note {id}")))
    }

    pub async fn supplier_note_lines(&self, id: SupplierDeliveryNoteId) -> ServiceResult<Vec<SupplierDeliveryNoteLine>> {
        self.note_lines(id).await
    }

    pub async fn supplier_notes(&self, offset: i64) -> ServiceResult<Vec<SupplierDeliveryNote>> {
        self.page(Filter::All, offset).await
    }

    pub async fn search_supplier_notes(&self, text: &str, offset: i64) -> ServiceResult<Vec<SupplierDeliveryNote>> {
        self.page(Filter::search(SUPPLIER_NOTE_SEARCH, text.trim()), offset).await
    }

    pub async fn supplier_notes_of(&self, codproveedor: &str, offset: i64) -> ServiceResult<Vec<SupplierDeliveryNote>> {
        self.page(Filter::eq("codproveedor", codproveedor), offset).await
    }

    pub async fn pending_supplier_notes(&self, codproveedor: &str) -> ServiceResult<Vec<SupplierDeliveryNote>> {
        let query = Query::filter(Filter::eq("codproveedor", codproveedor).and(Filter::eq("ptefactura", true)))
            .order_by("fecha")
            .order_by("codigo");
        Ok(self.repo::<SupplierDeliveryNote>().find(query).await?)
    }

    pub async fn check_supplier_note(&self, id: SupplierDeliveryNoteId) -> ServiceResult<()> {
        let note = self.supplier_note(id).await?;
        let lines = self.supplier_note_lines(id).await?;
        let siblings = self
            .same_day_documents::<SupplierDeliveryNote>("codproveedor", &note.header.party.code, note.header.fecha)
            .await?;
        let tax_free = self.series(&note.header.codserie).await?.siniva;
        note.full_test(&lines, &siblings, tax_free)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveTime;
    use rust_decimal_macros::dec;

    use contaerp_inventory::Stock;
    use contaerp_masters::Series;

    use super::super::fixtures::{date, seeded};
    use super::*;

    pub(crate) fn drill(qty: Decimal) -> DocumentLine {
        DocumentLine::new("Taladro percutor", qty, dec!(89.9))
            .with_reference("TALADRO")
            .with_tax("IVA21", dec!(21), dec!(0))
    }

    pub(crate) fn cement(qty: Decimal, price: Decimal) -> DocumentLine {
        DocumentLine::new("Saco de cemento", qty, price)
            .with_reference("CEMENTO")
            .with_tax("IVA21", dec!(21), dec!(0))
    }

    /// Pending customer note dated `fecha` with the given lines, saved.
    pub(crate) async fn customer_note(
        services: &Services,
        fecha: chrono::NaiveDate,
        lines: Vec<DocumentLine>,
    ) -> (CustomerDeliveryNote, Vec<CustomerDeliveryNoteLine>) {
        let customer = services.repo::<Customer>().get(&"000001".to_string()).await.unwrap().unwrap();
        let mut note = CustomerDeliveryNote::for_customer("2024", &customer, services.defaults(), fecha, NaiveTime::MIN);
        let mut lines: Vec<_> = lines
            .into_iter()
            .map(|l| CustomerDeliveryNoteLine::new(note.id, l))
            .collect();
        services.save_customer_note(&mut note, &mut lines).await.unwrap();
        (note, lines)
    }

    pub(crate) async fn supplier_note(
        services: &Services,
        fecha: chrono::NaiveDate,
        lines: Vec<DocumentLine>,
    ) -> (SupplierDeliveryNote, Vec<SupplierDeliveryNoteLine>) {
        let supplier = services.repo::<Supplier>().get(&"000001".to_string()).await.unwrap().unwrap();
        let mut note = SupplierDeliveryNote::for_supplier("2024", &supplier, services.defaults(), fecha, NaiveTime::MIN);
        let mut lines: Vec<_> = lines
            .into_iter()
            .map(|l| SupplierDeliveryNoteLine::new(note.id, l))
            .collect();
        services.save_supplier_note(&mut note, &mut lines).await.unwrap();
        (note, lines)
    }

    async fn stock(services: &Services, referencia: &str) -> Decimal {
        services.repo::<Article>().get(&referencia.to_string()).await.unwrap().unwrap().stockfis
    }

    #[test]
    fn moves_net_out_unchanged_lines() {
        let old = [drill(dec!(2)), cement(dec!(10), dec!(6.5))];
        let new = [drill(dec!(2)), cement(dec!(4), dec!(6.5))];
        let moves = stock_moves(
            Some(("ALG", old.iter().collect())),
            ("ALG", new.iter().collect()),
            true,
        );
        assert_eq!(moves, vec![("CEMENTO".to_string(), "ALG".to_string(), dec!(6))]);

        let moved = stock_moves(Some(("ALG", old.iter().collect())), ("VAL", old.iter().collect()), false);
        assert_eq!(moved.len(), 4);
    }

    #[tokio::test]
    async fn receiving_then_delivering_moves_stock_and_cost() {
        let services = seeded().await;
        let (received, lines) = supplier_note(&services, date(2024, 3, 1), vec![cement(dec!(100), dec!(3))]).await;
        assert_eq!(received.header.codigo, "2024A000001");
        assert_eq!(lines[0].idalbaran, received.id);
        assert_eq!(stock(&services, "CEMENTO").await, dec!(100));
        let article = services.repo::<Article>().get(&"CEMENTO".to_string()).await.unwrap().unwrap();
        assert_eq!(article.costemedio, dec!(3));

        supplier_note(&services, date(2024, 3, 2), vec![cement(dec!(100), dec!(4))]).await;
        let article = services.repo::<Article>().get(&"CEMENTO".to_string()).await.unwrap().unwrap();
        assert_eq!(article.costemedio, dec!(3.5));

        let (sold, _) = customer_note(&services, date(2024, 3, 5), vec![cement(dec!(30), dec!(6.5))]).await;
        assert_eq!(sold.header.codigo, "2024A000001");
        assert_eq!(sold.header.totals.total, dec!(235.95));
        assert_eq!(stock(&services, "CEMENTO").await, dec!(170));
    }

    #[tokio::test]
    async fn editing_a_note_moves_only_the_difference() {
        let services = seeded().await;
        services.move_stock("TALADRO", "ALG", dec!(5)).await.unwrap();
        let (mut note, mut lines) = customer_note(&services, date(2024, 4, 1), vec![drill(dec!(3))]).await;
        assert_eq!(stock(&services, "TALADRO").await, dec!(2));

        lines[0].line.cantidad = dec!(1);
        services.save_customer_note(&mut note, &mut lines).await.unwrap();
        assert_eq!(stock(&services, "TALADRO").await, dec!(4));
        assert_eq!(note.header.numero, 1);
        assert_eq!(note.header.totals.neto, dec!(89.9));

        let mut oversized = [CustomerDeliveryNoteLine::new(note.id, drill(dec!(9)))];
        match services
            .save_customer_note(&mut note, &mut oversized)
            .await
        {
            Err(ServiceError::Domain(DomainError::Validation(msg))) => assert!(msg.contains("not enough stock"), "{msg}"),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert_eq!(stock(&services, "TALADRO").await, dec!(4));
    }

    #[tokio::test]
    async fn deleting_a_note_restores_stock() {
        let services = seeded().await;
        let (received, _) = supplier_note(&services, date(2024, 3, 1), vec![cement(dec!(20), dec!(3))]).await;
        let (sold, _) = customer_note(&services, date(2024, 3, 2), vec![cement(dec!(5), dec!(6.5))]).await;
        assert!(services.delete_customer_note(sold.id).await.unwrap());
        assert_eq!(stock(&services, "CEMENTO").await, dec!(20));
        assert!(services.customer_note_lines(sold.id).await.unwrap().is_empty());

        assert!(services.delete_supplier_note(received.id).await.unwrap());
        assert_eq!(stock(&services, "CEMENTO").await, dec!(0));
        let rows = services.repo::<Stock>().all().await.unwrap();
        assert_eq!(rows[0].cantidad, dec!(0));
        assert!(!services.delete_supplier_note(received.id).await.unwrap());
    }

    #[tokio::test]
    async fn invoiced_notes_are_read_only() {
        let services = seeded().await;
        services.move_stock("TALADRO", "ALG", dec!(5)).await.unwrap();
        let (mut note, mut lines) = customer_note(&services, date(2024, 4, 1), vec![drill(dec!(1))]).await;
        note.mark_invoiced(uuid::Uuid::now_v7()).unwrap();
        services.repo::<CustomerDeliveryNote>().save(&note).await.unwrap();

        match services.delete_customer_note(note.id).await {
            Err(ServiceError::Domain(DomainError::Conflict(msg))) => assert!(msg.contains("invoiced")),
            other => panic!("expected Conflict, got {other:?}"),
        }
        match services.save_customer_note(&mut note, &mut lines).await {
            Err(ServiceError::Domain(DomainError::Conflict(_))) => {}
            other => panic!("expected Conflict, got {other:?}"),
        }
        assert!(services.pending_customer_notes("000001").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn tax_free_series_clear_line_taxes() {
        let services = seeded().await;
        let mut series = Series::new("X", "Exportación");
        series.siniva = true;
        services.repo::<Series>().save(&series).await.unwrap();
        services.move_stock("TALADRO", "ALG", dec!(5)).await.unwrap();

        let customer = services.repo::<Customer>().get(&"000001".to_string()).await.unwrap().unwrap();
        let mut note = CustomerDeliveryNote::for_customer("2024", &customer, services.defaults(), date(2024, 4, 1), NaiveTime::MIN);
        note.header.codserie = "X".to_string();
        let mut lines = vec![CustomerDeliveryNoteLine::new(note.id, drill(dec!(2)))];
        services.save_customer_note(&mut note, &mut lines).await.unwrap();

        assert_eq!(note.header.codigo, "2024X000001");
        assert_eq!(note.header.totals.totaliva, dec!(0));
        assert_eq!(note.header.totals.total, dec!(179.8));
        services.check_customer_note(note.id).await.unwrap();
    }

    #[tokio::test]
    async fn finders_and_duplicates() {
        let services = seeded().await;
        services.move_stock("TALADRO", "ALG", dec!(10)).await.unwrap();
        let (first, _) = customer_note(&services, date(2024, 4, 1), vec![drill(dec!(1))]).await;
        customer_note(&services, date(2024, 4, 2), vec![drill(dec!(1))]).await;

        let pending = services.pending_customer_notes("000001").await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, first.id);
        assert_eq!(services.search_customer_notes("2024A000002", 0).await.unwrap().len(), 1);
        assert_eq!(services.customer_notes_of("000001", 0).await.unwrap().len(), 2);

        let customer = services.repo::<Customer>().get(&"000001".to_string()).await.unwrap().unwrap();
        let mut twin = CustomerDeliveryNote::for_customer("2024", &customer, services.defaults(), date(2024, 4, 1), NaiveTime::MIN);
        let mut lines = vec![CustomerDeliveryNoteLine::new(twin.id, drill(dec!(1)))];
        match services.save_customer_note(&mut twin, &mut lines).await {
            Err(ServiceError::Domain(DomainError::Invalid(msgs))) => {
                assert!(msgs.iter().any(|m| m.contains("possible duplicate of 2024A000001")), "{msgs:?}")
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }
}
