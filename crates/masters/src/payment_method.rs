use core::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use contaerp_core::{DomainError, DomainResult, Record, Validator};

/// Whether documents paid with a method are born pending or already paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptMode {
    Issued,
    Paid,
}

impl ReceiptMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReceiptMode::Issued => "issued",
            ReceiptMode::Paid => "paid",
        }
    }
}

impl FromStr for ReceiptMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "issued" => Ok(ReceiptMode::Issued),
            "paid" => Ok(ReceiptMode::Paid),
            other => Err(DomainError::validation(format!("unknown receipt mode '{other}'"))),
        }
    }
}

/// Due term written as `+Nday`, `+Nweek` or `+Nmonth` (plural accepted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DueTerm {
    Days(u32),
    Weeks(u32),
    Months(u32),
}

impl DueTerm {
    pub fn due_date(self, from: NaiveDate) -> Option<NaiveDate> {
        match self {
            DueTerm::Days(n) => from.checked_add_days(Days::new(n.into())),
            DueTerm::Weeks(n) => from.checked_add_days(Days::new(u64::from(n) * 7)),
            DueTerm::Months(n) => from.checked_add_months(Months::new(n)),
        }
    }
}

impl core::fmt::Display for DueTerm {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DueTerm::Days(n) => write!(f, "+{n}day"),
            DueTerm::Weeks(n) => write!(f, "+{n}week"),
            DueTerm::Months(n) => write!(f, "+{n}month"),
        }
    }
}

impl FromStr for DueTerm {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || DomainError::validation(format!("invalid due term '{s}'"));
        let rest = s.trim().strip_prefix('+').ok_or_else(bad)?;
        let split = rest.find(|c: char| !c.is_ascii_digit()).ok_or_else(bad)?;
        let (digits, unit) = rest.split_at(split);
        let n: u32 = digits.parse().map_err(|_| bad())?;
        match unit.trim_end_matches('s') {
            "day" => Ok(DueTerm::Days(n)),
            "week" => Ok(DueTerm::Weeks(n)),
            "month" => Ok(DueTerm::Months(n)),
            _ => Err(bad()),
        }
    }
}

/// Payment method (`forma_pago`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub codpago: String,
    pub descripcion: String,
    pub genrecibos: ReceiptMode,
    pub vencimiento: DueTerm,
    /// Cash or bank sub-account used for payment entries; falls back to `CAJA`.
    pub codsubcuenta: Option<String>,
    pub domiciliado: bool,
}

impl PaymentMethod {
    pub fn new(codpago: impl Into<String>, descripcion: impl Into<String>) -> Self {
        Self {
            codpago: codpago.into(),
            descripcion: descripcion.into(),
            genrecibos: ReceiptMode::Paid,
            vencimiento: DueTerm::Months(1),
            codsubcuenta: None,
            domiciliado: false,
        }
    }

    /// Due date of a document issued on `issued`; never before the issue date.
    pub fn due_date(&self, issued: NaiveDate) -> NaiveDate {
        self.vencimiento
            .due_date(issued)
            .filter(|d| *d >= issued)
            .unwrap_or(issued)
    }

    pub fn marks_paid(&self) -> bool {
        self.genrecibos == ReceiptMode::Paid
    }
}

impl Record for PaymentMethod {
    type Key = String;

    fn key(&self) -> String {
        self.codpago.clone()
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.code("codpago", &self.codpago, 10)
            .text("descripcion", &self.descripcion, 1, 50)
            .optional_code("codsubcuenta", self.codsubcuenta.as_deref(), 15);
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_and_prints_terms() {
        assert_eq!("+30day".parse::<DueTerm>().unwrap(), DueTerm::Days(30));
        assert_eq!("+2weeks".parse::<DueTerm>().unwrap(), DueTerm::Weeks(2));
        assert_eq!("+1month".parse::<DueTerm>().unwrap(), DueTerm::Months(1));
        assert_eq!(DueTerm::Months(3).to_string(), "+3month");
        assert!("30day".parse::<DueTerm>().is_err());
        assert!("+day".parse::<DueTerm>().is_err());
        assert!("+3years".parse::<DueTerm>().is_err());
    }

    #[test]
    fn month_terms_clamp_to_month_end() {
        let mut p = PaymentMethod::new("TRANS", "Transferencia");
        p.vencimiento = DueTerm::Months(1);
        assert_eq!(p.due_date(date(2015, 1, 31)), date(2015, 2, 28));
        p.vencimiento = DueTerm::Days(30);
        assert_eq!(p.due_date(date(2015, 12, 15)), date(2016, 1, 14));
    }

    #[test]
    fn cash_is_born_paid() {
        let cash = PaymentMethod::new("CONT", "Al contado");
        assert!(cash.marks_paid());
        assert!(cash.validate().is_ok());
    }
}
