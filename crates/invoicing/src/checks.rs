use rust_decimal::Decimal;

use contaerp_core::money::{round2, TOLERANCE};
use contaerp_core::{Record, Validator};
use contaerp_documents::tax_breakdown::breakdown_matches;
use contaerp_documents::{check_duplicates, check_lines, BusinessDocument, DocumentHeader, DocumentLine, TaxBreakdownLine};

use crate::lines::InvoiceTaxLine;
use crate::status::InvoiceStatus;

/// Amount the invoice entry should carry: gross amount (total plus withholding) in company currency.
pub(crate) fn expected_entry_amount(header: &DocumentHeader) -> Decimal {
    let gross = header.totals.total + header.totals.totalirpf;
    gross.checked_div(header.tasaconv).map(round2).unwrap_or(gross).abs()
}

pub(crate) struct InvoiceParts<'a, L, F> {
    pub lines: &'a [L],
    pub tax_lines: &'a [InvoiceTaxLine<F>],
    /// `importe` of the invoice entry, when it was found.
    pub entry_importe: Option<Decimal>,
    pub tax_free: bool,
}

/// Deep checks shared by customer and supplier invoices.
pub(crate) fn check_invoice<D, L, F>(
    v: &mut Validator,
    doc: &D,
    status: &InvoiceStatus,
    parts: InvoiceParts<'_, L, F>,
    siblings: &[D],
) where
    D: BusinessDocument,
    L: AsRef<DocumentLine>,
{
    let header = doc.header();
    header.check(v, parts.tax_free);
    status.check(v, header.fecha);
    check_lines(v, header, parts.lines, parts.tax_free);

    for (n, tax_line) in parts.tax_lines.iter().enumerate() {
        v.merge_prefixed(&format!("tax line {}", n + 1), tax_line.validate());
    }
    if !parts.lines.is_empty() && parts.tax_lines.is_empty() {
        v.error(format!("invoice {} has no tax lines", header.codigo));
    } else {
        let breakdown: Vec<TaxBreakdownLine> = parts.tax_lines.iter().map(InvoiceTaxLine::as_breakdown).collect();
        v.check(
            breakdown_matches(&breakdown, &header.totals),
            format!("tax lines of {} do not add up to the invoice totals", header.codigo),
        );
    }

    match (status.idasiento, parts.entry_importe) {
        (None, _) if !status.anulada => {
            v.error(format!("invoice {} has no journal entry", header.codigo));
        }
        (None, _) => {}
        (Some(_), None) => {
            v.error(format!("journal entry of invoice {} not found", header.codigo));
        }
        (Some(_), Some(importe)) => {
            let expected = expected_entry_amount(header);
            // conversion rounding may leave up to a cent per tax line
            let slack = TOLERANCE * Decimal::from(parts.tax_lines.len() + 2);
            v.check(
                (importe - expected).abs() <= slack,
                format!(
                    "journal entry amount {importe} does not match invoice {} ({expected})",
                    header.codigo
                ),
            );
        }
    }

    check_duplicates(v, doc, siblings);
}
