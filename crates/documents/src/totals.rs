use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use contaerp_core::money::round2;

use crate::line::DocumentLine;

/// Header totals of a document.
///
/// `total = neto + totaliva − totalirpf + totalrecargo`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub neto: Decimal,
    pub totaliva: Decimal,
    pub totalrecargo: Decimal,
    pub totalirpf: Decimal,
    pub total: Decimal,
}

impl DocumentTotals {
    /// Totals from the parts; `total` is derived.
    pub fn new(neto: Decimal, totaliva: Decimal, totalrecargo: Decimal, totalirpf: Decimal) -> Self {
        Self {
            neto,
            totaliva,
            totalrecargo,
            totalirpf,
            total: compose_total(neto, totaliva, totalirpf, totalrecargo),
        }
    }

    /// Recompute totals from lines; each tax total is rounded once, over the whole document.
    pub fn from_lines<'a, L>(lines: impl IntoIterator<Item = &'a L>) -> Self
    where
        L: AsRef<DocumentLine> + 'a,
    {
        let mut neto = Decimal::ZERO;
        let mut iva = Decimal::ZERO;
        let mut recargo = Decimal::ZERO;
        let mut irpf = Decimal::ZERO;
        for line in lines {
            let line = line.as_ref();
            neto += line.pvptotal;
            iva += line.tax_amount();
            recargo += line.surcharge_amount();
            irpf += line.irpf_amount();
        }
        Self::new(round2(neto), round2(iva), round2(recargo), round2(irpf))
    }

    /// Whether the stored `total` agrees with its parts.
    pub fn is_consistent(&self) -> bool {
        self.total == compose_total(self.neto, self.totaliva, self.totalirpf, self.totalrecargo)
    }
}

pub fn compose_total(neto: Decimal, totaliva: Decimal, totalirpf: Decimal, totalrecargo: Decimal) -> Decimal {
    round2(neto + totaliva - totalirpf + totalrecargo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn totals_round_once_per_document() {
        let lines = vec![
            DocumentLine::new("a", dec!(1), dec!(0.05)).with_tax("IVA21", dec!(21), dec!(0)),
            DocumentLine::new("b", dec!(1), dec!(0.05)).with_tax("IVA21", dec!(21), dec!(0)),
        ];
        let t = DocumentTotals::from_lines(&lines);
        assert_eq!(t.neto, dec!(0.10));
        // 0.0105 + 0.0105 = 0.021, rounded once
        assert_eq!(t.totaliva, dec!(0.02));
        assert_eq!(t.total, dec!(0.12));
    }

    #[test]
    fn withholding_is_subtracted() {
        let lines = vec![
            DocumentLine::new("consultoría", dec!(1), dec!(1000))
                .with_tax("IVA21", dec!(21), dec!(0))
                .with_irpf(dec!(15)),
        ];
        let t = DocumentTotals::from_lines(&lines);
        assert_eq!(t.totaliva, dec!(210));
        assert_eq!(t.totalirpf, dec!(150));
        assert_eq!(t.total, dec!(1060));
        assert!(t.is_consistent());
    }

    #[test]
    fn tampered_total_is_inconsistent() {
        let mut t = DocumentTotals::new(dec!(100), dec!(21), dec!(5.2), dec!(0));
        assert_eq!(t.total, dec!(126.2));
        t.total = dec!(126.21);
        assert!(!t.is_consistent());
    }
}
