use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use contaerp_core::{DomainError, DomainResult, Record, Validator};

use crate::entry::JournalEntryId;

/// Shortest and longest sub-account code a fiscal year may use.
pub const SUBACCOUNT_LENGTH: std::ops::RangeInclusive<u8> = 4..=15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiscalYearStatus {
    Open,
    Closed,
}

impl FiscalYearStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FiscalYearStatus::Open => "open",
            FiscalYearStatus::Closed => "closed",
        }
    }
}

impl FromStr for FiscalYearStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(FiscalYearStatus::Open),
            "closed" => Ok(FiscalYearStatus::Closed),
            other => Err(DomainError::validation(format!("unknown fiscal year status '{other}'"))),
        }
    }
}

/// Fiscal year (`ejercicio`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYear {
    pub codejercicio: String,
    pub nombre: String,
    pub fechainicio: NaiveDate,
    pub fechafin: NaiveDate,
    pub estado: FiscalYearStatus,
    /// Length of every sub-account code in this year.
    pub longsubcuenta: u8,
    pub idasientoapertura: Option<JournalEntryId>,
    pub idasientopyg: Option<JournalEntryId>,
    pub idasientocierre: Option<JournalEntryId>,
}

impl FiscalYear {
    pub fn new(
        codejercicio: impl Into<String>,
        nombre: impl Into<String>,
        fechainicio: NaiveDate,
        fechafin: NaiveDate,
        longsubcuenta: u8,
    ) -> Self {
        Self {
            codejercicio: codejercicio.into(),
            nombre: nombre.into(),
            fechainicio,
            fechafin,
            estado: FiscalYearStatus::Open,
            longsubcuenta,
            idasientoapertura: None,
            idasientopyg: None,
            idasientocierre: None,
        }
    }

    /// Open year running from January 1st to December 31st of `year`.
    pub fn calendar(codejercicio: impl Into<String>, year: i32, longsubcuenta: u8) -> DomainResult<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| DomainError::validation(format!("year {year} is out of range")))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| DomainError::validation(format!("year {year} is out of range")))?;
        Ok(Self::new(codejercicio, year.to_string(), start, end, longsubcuenta))
    }

    pub fn is_open(&self) -> bool {
        self.estado == FiscalYearStatus::Open
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.fechainicio <= date && date <= self.fechafin
    }

    pub fn close(&mut self) {
        self.estado = FiscalYearStatus::Closed;
    }

    pub fn reopen(&mut self) {
        self.estado = FiscalYearStatus::Open;
    }

    /// Refuse dates outside the year or when the year is closed.
    pub fn accepts(&self, date: NaiveDate) -> DomainResult<()> {
        if !self.contains(date) {
            return Err(DomainError::validation(format!(
                "date {date} is outside fiscal year {} ({} to {})",
                self.codejercicio, self.fechainicio, self.fechafin
            )));
        }
        if !self.is_open() {
            return Err(DomainError::validation(format!(
                "fiscal year {} is closed",
                self.codejercicio
            )));
        }
        Ok(())
    }
}

/// Code for a new calendar year: the year itself, or the next free numeric code.
pub fn calendar_code(date: NaiveDate, existing: &[String]) -> String {
    let year = date.year().to_string();
    if !existing.contains(&year) {
        return year;
    }
    let next = existing
        .iter()
        .filter_map(|c| c.parse::<u32>().ok())
        .max()
        .map_or(1, |max| max + 1);
    format!("{next:04}")
}

impl Record for FiscalYear {
    type Key = String;

    fn key(&self) -> Self::Key {
        self.codejercicio.clone()
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.code("codejercicio", &self.codejercicio, 4)
            .text("nombre", &self.nombre, 1, 100)
            .check(
                self.fechainicio <= self.fechafin,
                "fechainicio must not be after fechafin",
            )
            .check(
                SUBACCOUNT_LENGTH.contains(&self.longsubcuenta),
                format!(
                    "longsubcuenta must be between {} and {}",
                    SUBACCOUNT_LENGTH.start(),
                    SUBACCOUNT_LENGTH.end()
                ),
            );
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
    fn calendar_year_covers_the_whole_year() {
        let year = FiscalYear::calendar("2024", 2024, 10).unwrap();
        assert!(year.contains(date(2024, 1, 1)));
        assert!(year.contains(date(2024, 12, 31)));
        assert!(!year.contains(date(2025, 1, 1)));
        assert!(year.is_open());
        assert!(year.validate().is_ok());
    }

    #[test]
    fn closed_year_refuses_dates() {
        let mut year = FiscalYear::calendar("2024", 2024, 10).unwrap();
        assert!(year.accepts(date(2024, 6, 1)).is_ok());
        assert!(year.accepts(date(2023, 6, 1)).is_err());
        year.close();
        match year.accepts(date(2024, 6, 1)) {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("closed")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn subaccount_length_is_bounded() {
        let mut year = FiscalYear::calendar("2024", 2024, 3).unwrap();
        assert!(year.validate().is_err());
        year.longsubcuenta = 15;
        assert!(year.validate().is_ok());
        year.fechafin = date(2023, 1, 1);
        assert_eq!(year.validate().unwrap_err().messages().len(), 1);
    }

    #[test]
    fn calendar_code_prefers_the_year() {
        assert_eq!(calendar_code(date(2024, 5, 1), &[]), "2024");
        assert_eq!(calendar_code(date(2024, 5, 1), &["2023".to_string()]), "2024");
        assert_eq!(
            calendar_code(date(2024, 5, 1), &["2024".to_string(), "0007".to_string()]),
            "2025"
        );
    }

    #[test]
    fn status_round_trips_through_text() {
        assert_eq!("closed".parse::<FiscalYearStatus>().unwrap(), FiscalYearStatus::Closed);
        assert!("archived".parse::<FiscalYearStatus>().is_err());
    }
}
