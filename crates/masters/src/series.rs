use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use contaerp_core::{DomainResult, Record, Validator};

/// Document series (`serie`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub codserie: String,
    pub descripcion: String,
    /// Documents of this series carry no VAT.
    pub siniva: bool,
    /// Default withholding percentage for documents of this series.
    pub irpf: Decimal,
    /// First document number to use.
    pub numfactura: i64,
}

impl Series {
    pub fn new(codserie: impl Into<String>, descripcion: impl Into<String>) -> Self {
        Self {
            codserie: codserie.into(),
            descripcion: descripcion.into(),
            siniva: false,
            irpf: Decimal::ZERO,
            numfactura: 1,
        }
    }
}

impl Record for Series {
    type Key = String;

    fn key(&self) -> String {
        self.codserie.clone()
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.code("codserie", &self.codserie, 2)
            .text("descripcion", &self.descripcion, 1, 100)
            .percentage("irpf", self.irpf)
            .check(self.numfactura >= 1, "numfactura must be at least 1");
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_series_is_valid() {
        assert!(Series::new("A", "Serie A").validate().is_ok());
    }

    #[test]
    fn start_number_must_be_positive() {
        let mut s = Series::new("R", "Rectificativas");
        s.numfactura = 0;
        assert!(s.validate().is_err());
    }
}
