//! Consistency checks shared by delivery notes and invoices.

use contaerp_core::money::within_tolerance;
use contaerp_core::Validator;

use crate::header::DocumentHeader;
use crate::line::DocumentLine;
use crate::totals::DocumentTotals;

/// A document with a header, as seen by the shared checks.
pub trait BusinessDocument {
    type Id: Copy + Eq;

    fn id(&self) -> Self::Id;
    fn header(&self) -> &DocumentHeader;

    /// The party's own reference for the document (`numero2`, `numproveedor`).
    fn party_reference(&self) -> &str;
}

/// Check every line and compare the recomputed totals with the header.
pub fn check_lines<L: AsRef<DocumentLine>>(v: &mut Validator, header: &DocumentHeader, lines: &[L], tax_free: bool) {
    for (n, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        v.merge_prefixed(&format!("line {}", n + 1), line.validate());
        if tax_free {
            v.check(
                line.iva.is_zero() && line.recargo.is_zero(),
                format!("line {}: series {} carries no tax", n + 1, header.codserie),
            );
        }
    }

    let expected = DocumentTotals::from_lines(lines);
    let stored = &header.totals;
    for (field, stored, expected) in [
        ("neto", stored.neto, expected.neto),
        ("totaliva", stored.totaliva, expected.totaliva),
        ("totalrecargo", stored.totalrecargo, expected.totalrecargo),
        ("totalirpf", stored.totalirpf, expected.totalirpf),
        ("total", stored.total, expected.total),
    ] {
        v.check(
            within_tolerance(stored, expected),
            format!("{field} {stored} does not match the lines ({expected})"),
        );
    }
}

/// Other documents of the same kind that look like `doc` issued twice.
///
/// Same party, date, total and party reference.
pub fn find_duplicates<'a, D: BusinessDocument>(doc: &D, siblings: &'a [D]) -> Vec<&'a D> {
    let h = doc.header();
    siblings
        .iter()
        .filter(|other| other.id() != doc.id())
        .filter(|other| {
            let o = other.header();
            o.party.code == h.party.code
                && o.fecha == h.fecha
                && o.totals.total == h.totals.total
                && other.party_reference() == doc.party_reference()
        })
        .collect()
}

/// Add a message per likely duplicate of `doc`.
pub fn check_duplicates<D: BusinessDocument>(v: &mut Validator, doc: &D, siblings: &[D]) {
    for dup in find_duplicates(doc, siblings) {
        v.error(format!(
            "possible duplicate of {} ({} {})",
            dup.header().codigo,
            dup.header().fecha,
            dup.header().totals.total
        ));
    }
}
