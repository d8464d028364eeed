use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use contaerp_core::money::{round2, round_dp, PRICE_DECIMALS};
use contaerp_core::{DomainResult, Record, Validator};

/// Currency (`divisa`).
///
/// Conversion rates are expressed as units of this currency per unit of the
/// company currency, so `company = amount / tasaconv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub coddivisa: String,
    pub descripcion: String,
    pub codiso: String,
    pub simbolo: String,
    /// Rate used on sales documents.
    pub tasaconv: Decimal,
    /// Rate used on purchase documents.
    pub tasaconv_compra: Decimal,
}

impl Currency {
    pub fn new(coddivisa: impl Into<String>, descripcion: impl Into<String>) -> Self {
        Self {
            coddivisa: coddivisa.into(),
            descripcion: descripcion.into(),
            codiso: String::new(),
            simbolo: String::new(),
            tasaconv: Decimal::ONE,
            tasaconv_compra: Decimal::ONE,
        }
    }

    pub fn rate(&self, purchase: bool) -> Decimal {
        if purchase { self.tasaconv_compra } else { self.tasaconv }
    }

    /// Convert an amount in this currency into the company currency.
    pub fn to_company(&self, amount: Decimal, purchase: bool) -> Decimal {
        to_company(amount, self.rate(purchase))
    }

    /// Convert an amount in the company currency into this currency.
    pub fn from_company(&self, amount: Decimal, purchase: bool) -> Decimal {
        round2(amount * self.rate(purchase))
    }
}

/// `round2(amount / rate)`; a non-positive rate leaves the amount unchanged.
pub fn to_company(amount: Decimal, rate: Decimal) -> Decimal {
    if rate <= Decimal::ZERO {
        return round2(amount);
    }
    round2(amount / rate)
}

/// Normalise a conversion rate before storing it.
pub fn normalize_rate(rate: Decimal) -> Decimal {
    round_dp(rate, PRICE_DECIMALS)
}

impl Record for Currency {
    type Key = String;

    fn key(&self) -> String {
        self.coddivisa.clone()
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.code("coddivisa", &self.coddivisa, 3)
            .text("descripcion", &self.descripcion, 1, 100)
            .max_len("simbolo", &self.simbolo, 10)
            .positive("tasaconv", self.tasaconv)
            .positive("tasaconv_compra", self.tasaconv_compra);
        v.check(
            self.codiso.is_empty()
                || (self.codiso.len() == 3 && self.codiso.chars().all(|c| c.is_ascii_alphanumeric())),
            "codiso must have exactly 3 letters or digits",
        );
        v.finish()
    }
}
