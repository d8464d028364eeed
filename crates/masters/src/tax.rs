use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use contaerp_core::money::{percent_of, round2};
use contaerp_core::{DomainResult, Record, Validator};

/// Tax type (`impuesto`): VAT rate plus equivalence surcharge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tax {
    pub codimpuesto: String,
    pub descripcion: String,
    pub iva: Decimal,
    pub recargo: Decimal,
    /// Sub-account for output VAT; falls back to the `IVAREP` special account.
    pub codsubcuentarep: Option<String>,
    /// Sub-account for input VAT; falls back to the `IVASOP` special account.
    pub codsubcuentasop: Option<String>,
}

impl Tax {
    pub fn new(codimpuesto: impl Into<String>, descripcion: impl Into<String>, iva: Decimal, recargo: Decimal) -> Self {
        Self {
            codimpuesto: codimpuesto.into(),
            descripcion: descripcion.into(),
            iva,
            recargo,
            codsubcuentarep: None,
            codsubcuentasop: None,
        }
    }

    pub fn tax_on(&self, base: Decimal) -> Decimal {
        round2(percent_of(base, self.iva))
    }

    pub fn surcharge_on(&self, base: Decimal) -> Decimal {
        round2(percent_of(base, self.recargo))
    }
}

impl Record for Tax {
    type Key = String;

    fn key(&self) -> String {
        self.codimpuesto.clone()
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.code("codimpuesto", &self.codimpuesto, 10)
            .text("descripcion", &self.descripcion, 1, 50)
            .percentage("iva", self.iva)
            .percentage("recargo", self.recargo)
            .optional_code("codsubcuentarep", self.codsubcuentarep.as_deref(), 15)
            .optional_code("codsubcuentasop", self.codsubcuentasop.as_deref(), 15);
        v.finish()
    }
}
