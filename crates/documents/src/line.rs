use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use contaerp_core::money::{percent_of, round2, within_tolerance};
use contaerp_core::{DomainResult, Validator};

/// A priced document line.
///
/// `pvpsindto` and `pvptotal` are stored; `recalculate` derives them from
/// quantity, unit price and discount, `validate` checks stored values still agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLine {
    pub referencia: Option<String>,
    pub descripcion: String,
    pub cantidad: Decimal,
    pub pvpunitario: Decimal,
    /// Discount percentage.
    pub dtopor: Decimal,
    /// `cantidad × pvpunitario`, before discount.
    pub pvpsindto: Decimal,
    /// Line net amount after discount.
    pub pvptotal: Decimal,
    pub codimpuesto: Option<String>,
    pub iva: Decimal,
    pub recargo: Decimal,
    pub irpf: Decimal,
}

impl AsRef<DocumentLine> for DocumentLine {
    fn as_ref(&self) -> &DocumentLine {
        self
    }
}

impl DocumentLine {
    pub fn new(descripcion: impl Into<String>, cantidad: Decimal, pvpunitario: Decimal) -> Self {
        let mut line = Self {
            referencia: None,
            descripcion: descripcion.into(),
            cantidad,
            pvpunitario,
            dtopor: Decimal::ZERO,
            pvpsindto: Decimal::ZERO,
            pvptotal: Decimal::ZERO,
            codimpuesto: None,
            iva: Decimal::ZERO,
            recargo: Decimal::ZERO,
            irpf: Decimal::ZERO,
        };
        line.recalculate();
        line
    }

    pub fn with_reference(mut self, referencia: impl Into<String>) -> Self {
        self.referencia = Some(referencia.into());
        self
    }

    pub fn with_tax(mut self, codimpuesto: impl Into<String>, iva: Decimal, recargo: Decimal) -> Self {
        self.codimpuesto = Some(codimpuesto.into());
        self.iva = iva;
        self.recargo = recargo;
        self
    }

    pub fn with_discount(mut self, dtopor: Decimal) -> Self {
        self.dtopor = dtopor;
        self.recalculate();
        self
    }

    pub fn with_irpf(mut self, irpf: Decimal) -> Self {
        self.irpf = irpf;
        self
    }

    /// Drop every tax from the line (tax-free series or exempt party).
    pub fn clear_taxes(&mut self) {
        self.codimpuesto = None;
        self.iva = Decimal::ZERO;
        self.recargo = Decimal::ZERO;
    }

    pub fn expected_pvpsindto(&self) -> Decimal {
        round2(self.cantidad * self.pvpunitario)
    }

    pub fn expected_pvptotal(&self) -> Decimal {
        round2(percent_of(self.expected_pvpsindto(), Decimal::ONE_HUNDRED - self.dtopor))
    }

    pub fn recalculate(&mut self) {
        self.pvpsindto = self.expected_pvpsindto();
        self.pvptotal = self.expected_pvptotal();
    }

    /// Unrounded VAT on this line.
    pub fn tax_amount(&self) -> Decimal {
        percent_of(self.pvptotal, self.iva)
    }

    /// Unrounded surcharge on this line.
    pub fn surcharge_amount(&self) -> Decimal {
        percent_of(self.pvptotal, self.recargo)
    }

    /// Unrounded withholding on this line.
    pub fn irpf_amount(&self) -> Decimal {
        percent_of(self.pvptotal, self.irpf)
    }

    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.text("descripcion", &self.descripcion, 1, 1000)
            .optional_code("referencia", self.referencia.as_deref(), 18)
            .optional_code("codimpuesto", self.codimpuesto.as_deref(), 10)
            .percentage("dtopor", self.dtopor)
            .percentage("iva", self.iva)
            .percentage("recargo", self.recargo)
            .percentage("irpf", self.irpf)
            .check(
                within_tolerance(self.pvpsindto, self.expected_pvpsindto()),
                format!(
                    "pvpsindto {} does not match {} x {}",
                    self.pvpsindto, self.cantidad, self.pvpunitario
                ),
            )
            .check(
                within_tolerance(self.pvptotal, self.expected_pvptotal()),
                format!(
                    "pvptotal {} does not match the discounted amount {}",
                    self.pvptotal,
                    self.expected_pvptotal()
                ),
            );
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn discount_applies_after_rounding_gross() {
        let line = DocumentLine::new("Folios", dec!(3), dec!(3.333)).with_discount(dec!(10));
        assert_eq!(line.pvpsindto, dec!(10.00));
        assert_eq!(line.pvptotal, dec!(9.00));
        assert!(line.validate().is_ok());
    }

    #[test]
    fn stale_amounts_are_reported() {
        let mut line = DocumentLine::new("Folios", dec!(2), dec!(5));
        line.cantidad = dec!(3);
        let err = line.validate().unwrap_err();
        assert_eq!(err.messages().len(), 2);
        line.recalculate();
        assert!(line.validate().is_ok());
    }

    #[test]
    fn negative_quantities_are_allowed_for_returns() {
        let line = DocumentLine::new("Devolución", dec!(-2), dec!(5)).with_tax("IVA21", dec!(21), dec!(0));
        assert_eq!(line.pvptotal, dec!(-10));
        assert_eq!(line.tax_amount(), dec!(-2.1));
    }

    #[test]
    fn clearing_taxes_keeps_amounts() {
        let mut line = DocumentLine::new("x", dec!(1), dec!(10)).with_tax("IVA21", dec!(21), dec!(5.2));
        line.clear_taxes();
        assert_eq!(line.iva, Decimal::ZERO);
        assert_eq!(line.recargo, Decimal::ZERO);
        assert_eq!(line.pvptotal, dec!(10));
    }
}
