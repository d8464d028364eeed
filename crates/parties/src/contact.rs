//! Pieces shared by customers and suppliers.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use contaerp_core::{DomainError, Validator};

/// VAT regime of a third party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxRegime {
    General,
    /// No VAT is charged on documents for this party.
    Exempt,
    /// Equivalence surcharge applies on top of VAT.
    Surcharge,
}

impl TaxRegime {
    pub fn as_str(self) -> &'static str {
        match self {
            TaxRegime::General => "general",
            TaxRegime::Exempt => "exempt",
            TaxRegime::Surcharge => "surcharge",
        }
    }
}

impl FromStr for TaxRegime {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(TaxRegime::General),
            "exempt" => Ok(TaxRegime::Exempt),
            "surcharge" => Ok(TaxRegime::Surcharge),
            other => Err(DomainError::validation(format!("unknown tax regime '{other}'"))),
        }
    }
}

/// Next numeric code after the largest numeric one in `existing`, padded to `width`.
///
/// Non-numeric codes are ignored.
pub fn next_numeric_code<'a>(existing: impl IntoIterator<Item = &'a str>, width: usize) -> String {
    let max = existing
        .into_iter()
        .filter_map(|c| c.trim().parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("{:0width$}", max + 1, width = width)
}

pub(crate) struct ContactFields<'a> {
    pub nombre: &'a str,
    pub razonsocial: &'a str,
    pub cifnif: &'a str,
    pub telefono1: &'a str,
    pub telefono2: &'a str,
    pub fax: &'a str,
    pub email: &'a str,
    pub web: &'a str,
}

pub(crate) fn check_contact(v: &mut Validator, c: &ContactFields<'_>) {
    v.text("nombre", c.nombre, 1, 100)
        .text("razonsocial", c.razonsocial, 1, 100)
        .max_len("cifnif", c.cifnif, 30)
        .max_len("telefono1", c.telefono1, 30)
        .max_len("telefono2", c.telefono2, 30)
        .max_len("fax", c.fax, 30)
        .email("email", c.email)
        .max_len("web", c.web, 250);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_code_skips_non_numeric() {
        let codes = ["000001", "000009", "ABC", "12"];
        assert_eq!(next_numeric_code(codes, 6), "000013");
        assert_eq!(next_numeric_code(Vec::<&str>::new(), 6), "000001");
    }

    #[test]
    fn regime_round_trips_through_str() {
        for r in [TaxRegime::General, TaxRegime::Exempt, TaxRegime::Surcharge] {
            assert_eq!(r.as_str().parse::<TaxRegime>().unwrap(), r);
        }
    }
}
