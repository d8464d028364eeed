/// Next document number in a (fiscal year, series) sequence.
///
/// One past the highest number in use, never below the series' first number.
pub fn next_number(current_max: Option<i64>, start: i64) -> i64 {
    let start = start.max(1);
    match current_max {
        Some(max) => (max + 1).max(start),
        None => start,
    }
}

/// Human-facing document code, e.g. `2024A000042`.
pub fn document_code(codejercicio: &str, codserie: &str, numero: i64) -> String {
    format!("{codejercicio}{codserie}{numero:06}")
}
