//! Per-tax summary of a document (`lineas_iva`).
//!
//! Each group rounds its own tax, so the sum of the groups can drift from
//! the header totals (rounded once over the whole document). The drift is
//! handed out one cent at a time, largest group first, until both agree.
//! At most one cent per group is absorbed; a wider gap, or a header amount
//! that is not a whole number of cents, leaves the groups as computed and
//! `breakdown_matches` reports the mismatch.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use contaerp_core::money::{percent_of, round2, TOLERANCE};

use crate::line::DocumentLine;
use crate::totals::DocumentTotals;

/// One tax group of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdownLine {
    pub codimpuesto: Option<String>,
    pub iva: Decimal,
    pub recargo: Decimal,
    pub neto: Decimal,
    pub totaliva: Decimal,
    pub totalrecargo: Decimal,
    /// `neto + totaliva + totalrecargo`.
    pub totallinea: Decimal,
}

impl TaxBreakdownLine {
    fn matches(&self, line: &DocumentLine) -> bool {
        self.codimpuesto == line.codimpuesto && self.iva == line.iva && self.recargo == line.recargo
    }

    fn refresh_total(&mut self) {
        self.totallinea = self.neto + self.totaliva + self.totalrecargo;
    }
}

/// Group `lines` by tax and reconcile the groups against `totals`.
///
/// Groups keep the order in which their tax first appears.
pub fn tax_breakdown<'a, L>(lines: impl IntoIterator<Item = &'a L>, totals: &DocumentTotals) -> Vec<TaxBreakdownLine>
where
    L: AsRef<DocumentLine> + 'a,
{
    let mut groups: Vec<TaxBreakdownLine> = Vec::new();
    for line in lines {
        let line = line.as_ref();
        match groups.iter_mut().find(|g| g.matches(line)) {
            Some(group) => group.neto += line.pvptotal,
            None => groups.push(TaxBreakdownLine {
                codimpuesto: line.codimpuesto.clone(),
                iva: line.iva,
                recargo: line.recargo,
                neto: line.pvptotal,
                totaliva: Decimal::ZERO,
                totalrecargo: Decimal::ZERO,
                totallinea: Decimal::ZERO,
            }),
        }
    }

    for g in &mut groups {
        g.neto = round2(g.neto);
        g.totaliva = round2(percent_of(g.neto, g.iva));
        g.totalrecargo = round2(percent_of(g.neto, g.recargo));
    }

    reconcile(&mut groups, totals.neto, |g| &mut g.neto);
    reconcile(&mut groups, totals.totaliva, |g| &mut g.totaliva);
    reconcile(&mut groups, totals.totalrecargo, |g| &mut g.totalrecargo);

    for g in &mut groups {
        g.refresh_total();
    }
    groups
}

/// Spread `target − Σ field` over the groups in cents, largest `neto` first.
///
/// Only rounding drift is absorbed: a gap wider than one cent per group, or
/// one below a cent, is a real inconsistency and is left for `full_test`.
fn reconcile<F>(groups: &mut [TaxBreakdownLine], target: Decimal, field: F)
where
    F: Fn(&mut TaxBreakdownLine) -> &mut Decimal,
{
    if groups.is_empty() {
        return;
    }
    let sum: Decimal = groups.iter_mut().map(|g| *field(g)).sum();
    let diff = target - sum;
    if diff.is_zero() || diff.round_dp(2) != diff {
        return;
    }
    let Some(cents) = (diff.abs() / TOLERANCE).to_usize() else {
        return;
    };
    if cents > groups.len() {
        return;
    }

    let mut order: Vec<usize> = (0..groups.len()).collect();
    order.sort_by(|a, b| groups[*b].neto.abs().cmp(&groups[*a].neto.abs()));

    let step = if diff.is_sign_positive() { TOLERANCE } else { -TOLERANCE };
    for idx in order.iter().take(cents) {
        *field(&mut groups[*idx]) += step;
    }
}

/// Whether stored breakdown lines add up to the header totals.
pub fn breakdown_matches(lines: &[TaxBreakdownLine], totals: &DocumentTotals) -> bool {
    let neto: Decimal = lines.iter().map(|l| l.neto).sum();
    let iva: Decimal = lines.iter().map(|l| l.totaliva).sum();
    let recargo: Decimal = lines.iter().map(|l| l.totalrecargo).sum();
    neto == totals.neto && iva == totals.totaliva && recargo == totals.totalrecargo
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn line(qty: Decimal, price: Decimal, tax: &str, iva: Decimal, recargo: Decimal) -> DocumentLine {
        DocumentLine::new("item", qty, price).with_tax(tax, iva, recargo)
    }

    #[test]
    fn groups_by_tax_in_first_seen_order() {
        let lines = vec![
            line(dec!(1), dec!(100), "IVA21", dec!(21), dec!(0)),
            line(dec!(2), dec!(10), "IVA10", dec!(10), dec!(0)),
            line(dec!(1), dec!(50), "IVA21", dec!(21), dec!(0)),
        ];
        let totals = DocumentTotals::from_lines(&lines);
        let groups = tax_breakdown(&lines, &totals);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].codimpuesto.as_deref(), Some("IVA21"));
        assert_eq!(groups[0].neto, dec!(150));
        assert_eq!(groups[0].totaliva, dec!(31.5));
        assert_eq!(groups[1].neto, dec!(20));
        assert_eq!(groups[1].totaliva, dec!(2));
        assert_eq!(groups[1].totallinea, dec!(22));
        assert!(breakdown_matches(&groups, &totals));
    }

    #[test]
    fn surcharge_splits_groups() {
        let lines = vec![
            line(dec!(1), dec!(100), "IVA21", dec!(21), dec!(5.2)),
            line(dec!(1), dec!(100), "IVA21", dec!(21), dec!(0)),
        ];
        let totals = DocumentTotals::from_lines(&lines);
        let groups = tax_breakdown(&lines, &totals);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].totalrecargo, dec!(5.2));
        assert_eq!(groups[0].totallinea, dec!(126.2));
    }

    #[test]
    fn rounding_drift_goes_to_the_largest_group() {
        let lines = vec![
            line(dec!(1), dec!(0.04), "A", dec!(10), dec!(0)),
            line(dec!(1), dec!(0.04), "B", dec!(10), dec!(0)),
            line(dec!(1), dec!(0.07), "C", dec!(10), dec!(0)),
        ];
        // header: round2(0.004 + 0.004 + 0.007) = 0.02; groups: 0.00 + 0.00 + 0.01
        let totals = DocumentTotals::from_lines(&lines);
        assert_eq!(totals.totaliva, dec!(0.02));
        let groups = tax_breakdown(&lines, &totals);
        assert_eq!(groups[0].totaliva, dec!(0.00));
        assert_eq!(groups[1].totaliva, dec!(0.00));
        assert_eq!(groups[2].totaliva, dec!(0.02));
        assert_eq!(groups[2].totallinea, dec!(0.09));
        assert!(breakdown_matches(&groups, &totals));
    }

    #[test]
    fn real_inconsistencies_are_not_hidden() {
        let lines = vec![line(dec!(1), dec!(100), "IVA21", dec!(21), dec!(0))];
        let mut totals = DocumentTotals::from_lines(&lines);
        totals.totaliva = dec!(25);
        let groups = tax_breakdown(&lines, &totals);
        assert_eq!(groups[0].totaliva, dec!(21));
        assert!(!breakdown_matches(&groups, &totals));
    }

    #[test]
    fn sub_cent_header_amounts_are_left_unreconciled() {
        let lines = vec![line(dec!(1), dec!(100), "IVA21", dec!(21), dec!(0))];
        let mut totals = DocumentTotals::from_lines(&lines);
        totals.totaliva = dec!(21.005);
        let groups = tax_breakdown(&lines, &totals);
        assert_eq!(groups[0].totaliva, dec!(21));
        assert_eq!(groups[0].totallinea, dec!(121));
        assert!(!breakdown_matches(&groups, &totals));

        totals.totaliva = dec!(20.999);
        assert_eq!(tax_breakdown(&lines, &totals)[0].totaliva, dec!(21));
    }

    #[test]
    fn empty_documents_have_no_groups() {
        let lines: Vec<DocumentLine> = Vec::new();
        assert!(tax_breakdown(&lines, &DocumentTotals::default()).is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: for any set of lines, the reconciled groups add up to the header totals.
        #[test]
        fn groups_always_add_up_to_header(
            raw in prop::collection::vec((1i64..50, 1i64..100_000, 0usize..4, any::<bool>()), 1..20)
        ) {
            let rates = [dec!(21), dec!(10), dec!(4), dec!(0)];
            let surcharges = [dec!(5.2), dec!(1.4), dec!(0.5), dec!(0)];
            let lines: Vec<DocumentLine> = raw
                .iter()
                .map(|(qty, cents, tax, rec)| {
                    let recargo = if *rec { surcharges[*tax] } else { Decimal::ZERO };
                    line(Decimal::from(*qty), Decimal::new(*cents, 3), &format!("T{tax}"), rates[*tax], recargo)
                })
                .collect();
            let totals = DocumentTotals::from_lines(&lines);
            let groups = tax_breakdown(&lines, &totals);
            prop_assert!(breakdown_matches(&groups, &totals));
            for g in &groups {
                prop_assert_eq!(g.totallinea, g.neto + g.totaliva + g.totalrecargo);
            }
        }

        /// Property: header amounts off by any fraction of a cent still yield whole-cent groups.
        #[test]
        fn drifted_headers_keep_groups_in_cents(
            raw in prop::collection::vec((1i64..50, 1i64..100_000, 0usize..4), 1..10),
            drift in -5_000i64..5_000,
        ) {
            let rates = [dec!(21), dec!(10), dec!(4), dec!(0)];
            let lines: Vec<DocumentLine> = raw
                .iter()
                .map(|(qty, cents, tax)| line(Decimal::from(*qty), Decimal::new(*cents, 3), &format!("T{tax}"), rates[*tax], Decimal::ZERO))
                .collect();
            let mut totals = DocumentTotals::from_lines(&lines);
            totals.totaliva += Decimal::new(drift, 4);
            let groups = tax_breakdown(&lines, &totals);
            for g in &groups {
                prop_assert_eq!(g.totaliva.round_dp(2), g.totaliva);
            }
        }
    }
}
