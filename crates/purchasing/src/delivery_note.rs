use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use contaerp_core::money::{round_dp, PRICE_DECIMALS};
use contaerp_core::{Defaults, DomainError, DomainResult, Record, Validator};
use contaerp_documents::{check_duplicates, check_lines, BusinessDocument, DocumentHeader, DocumentLine, DocumentTotals};
use contaerp_parties::Supplier;

contaerp_core::uuid_id!(
    /// Supplier delivery note identifier.
    SupplierDeliveryNoteId
);

contaerp_core::uuid_id!(
    /// Supplier delivery note line identifier.
    SupplierNoteLineId
);

/// Supplier delivery note (`albaran_proveedor`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierDeliveryNote {
    pub id: SupplierDeliveryNoteId,
    pub header: DocumentHeader,
    /// Supplier's own document number.
    pub numproveedor: String,
    pub ptefactura: bool,
    pub idfactura: Option<Uuid>,
}

/// Units received for an article and their unit cost in company currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostReceipt {
    pub referencia: String,
    pub cantidad: Decimal,
    pub unit_cost: Decimal,
}

impl SupplierDeliveryNote {
    pub fn new(header: DocumentHeader) -> Self {
        Self {
            id: SupplierDeliveryNoteId::new(),
            header,
            numproveedor: String::new(),
            ptefactura: true,
            idfactura: None,
        }
    }

    pub fn for_supplier(
        codejercicio: impl Into<String>,
        supplier: &Supplier,
        defaults: &Defaults,
        fecha: NaiveDate,
        hora: NaiveTime,
    ) -> Self {
        Self::new(DocumentHeader::for_supplier(codejercicio, supplier, defaults, fecha, hora))
    }

    pub fn is_invoiced(&self) -> bool {
        self.idfactura.is_some()
    }

    pub fn set_lines(&mut self, lines: &[SupplierDeliveryNoteLine]) {
        self.header.set_totals(DocumentTotals::from_lines(lines));
    }

    pub fn mark_invoiced(&mut self, idfactura: Uuid) -> DomainResult<()> {
        if self.idfactura.is_some_and(|current| current != idfactura) {
            return Err(DomainError::conflict(format!(
                "delivery note {} is already invoiced",
                self.header.codigo
            )));
        }
        self.idfactura = Some(idfactura);
        self.ptefactura = false;
        Ok(())
    }

    pub fn unlink_invoice(&mut self) {
        self.idfactura = None;
        self.ptefactura = true;
    }

    /// Received quantities and net unit costs, for the article moving average.
    ///
    /// Lines without a reference or quantity are skipped.
    pub fn cost_receipts(&self, lines: &[SupplierDeliveryNoteLine]) -> Vec<CostReceipt> {
        lines
            .iter()
            .filter(|l| !l.line.cantidad.is_zero())
            .filter_map(|l| {
                let referencia = l.line.referencia.clone()?;
                let unit = l.line.pvptotal / l.line.cantidad;
                let unit_cost = unit.checked_div(self.header.tasaconv).unwrap_or(unit);
                Some(CostReceipt {
                    referencia,
                    cantidad: l.line.cantidad,
                    unit_cost: round_dp(unit_cost, PRICE_DECIMALS),
                })
            })
            .collect()
    }

    fn check(&self, v: &mut Validator, tax_free: bool) {
        self.header.check(v, tax_free);
        v.max_len("numproveedor", &self.numproveedor, 50).check(
            self.ptefactura == self.idfactura.is_none(),
            "ptefactura must be set exactly when the note has no invoice",
        );
    }

    pub fn full_test(
        &self,
        lines: &[SupplierDeliveryNoteLine],
        siblings: &[SupplierDeliveryNote],
        tax_free: bool,
    ) -> DomainResult<()> {
        let mut v = Validator::new();
        self.check(&mut v, tax_free);
        v.check(
            lines.iter().all(|l| l.idalbaran == self.id),
            "a line belongs to another delivery note",
        );
        check_lines(&mut v, &self.header, lines, tax_free);
        check_duplicates(&mut v, self, siblings);
        v.finish()
    }
}

impl Record for SupplierDeliveryNote {
    type Key = SupplierDeliveryNoteId;

    fn key(&self) -> Self::Key {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        self.check(&mut v, false);
        v.finish()
    }
}

impl BusinessDocument for SupplierDeliveryNote {
    type Id = SupplierDeliveryNoteId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn header(&self) -> &DocumentHeader {
        &self.header
    }

    fn party_reference(&self) -> &str {
        &self.numproveedor
    }
}

/// Line of a supplier delivery note (`lineasalbaranesprov`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierDeliveryNoteLine {
    pub id: SupplierNoteLineId,
    pub idalbaran: SupplierDeliveryNoteId,
    pub line: DocumentLine,
}

impl SupplierDeliveryNoteLine {
    pub fn new(idalbaran: SupplierDeliveryNoteId, line: DocumentLine) -> Self {
        Self {
            id: SupplierNoteLineId::new(),
            idalbaran,
            line,
        }
    }
}

impl AsRef<DocumentLine> for SupplierDeliveryNoteLine {
    fn as_ref(&self) -> &DocumentLine {
        &self.line
    }
}

impl Record for SupplierDeliveryNoteLine {
    type Key = SupplierNoteLineId;

    fn key(&self) -> Self::Key {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        self.line.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_note() -> SupplierDeliveryNote {
        let supplier = Supplier::new("000001", "Aceros del Norte", &Defaults::default());
        let mut note = SupplierDeliveryNote::for_supplier(
            "2024",
            &supplier,
            &Defaults::default(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            NaiveTime::from_hms_opt(8, 15, 0).unwrap(),
        );
        note.numproveedor = "AN-2024-0031".to_string();
        note.header.assign_number(1);
        note
    }

    fn test_lines(note: &SupplierDeliveryNote) -> Vec<SupplierDeliveryNoteLine> {
        vec![
            SupplierDeliveryNoteLine::new(
                note.id,
                DocumentLine::new("chapa 2mm", dec!(10), dec!(30))
                    .with_reference("CHAPA2")
                    .with_discount(dec!(10))
                    .with_tax("IVA21", dec!(21), dec!(0)),
            ),
            SupplierDeliveryNoteLine::new(note.id, DocumentLine::new("portes", dec!(1), dec!(15))),
        ]
    }

    #[test]
    fn receipts_use_net_unit_cost() {
        let mut note = test_note();
        let lines = test_lines(&note);
        note.set_lines(&lines);
        let receipts = note.cost_receipts(&lines);
        assert_eq!(
            receipts,
            vec![CostReceipt {
                referencia: "CHAPA2".to_string(),
                cantidad: dec!(10),
                unit_cost: dec!(27),
            }]
        );
    }

    #[test]
    fn receipts_convert_to_company_currency() {
        let mut note = test_note();
        note.header.coddivisa = "USD".to_string();
        note.header.tasaconv = dec!(1.25);
        let lines = test_lines(&note);
        let receipts = note.cost_receipts(&lines);
        assert_eq!(receipts[0].unit_cost, dec!(21.6));
    }

    #[test]
    fn full_test_accepts_consistent_note() {
        let mut note = test_note();
        let lines = test_lines(&note);
        note.set_lines(&lines);
        assert_eq!(note.header.totals.neto, dec!(285));
        assert_eq!(note.header.totals.totaliva, dec!(56.70));
        assert!(note.full_test(&lines, &[note.clone()], false).is_ok());
    }

    #[test]
    fn same_supplier_number_twice_is_a_duplicate() {
        let mut note = test_note();
        let lines = test_lines(&note);
        note.set_lines(&lines);
        let mut again = note.clone();
        again.id = SupplierDeliveryNoteId::new();
        again.header.assign_number(2);
        let err = note.full_test(&lines, &[again], false).unwrap_err();
        assert_eq!(err.messages().len(), 1);
    }

    #[test]
    fn invoiced_note_cannot_move_to_another_invoice() {
        let mut note = test_note();
        note.mark_invoiced(Uuid::now_v7()).unwrap();
        assert!(note.mark_invoiced(Uuid::now_v7()).is_err());
        assert!(note.validate().is_ok());
    }
}
