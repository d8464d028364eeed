use serde::{Deserialize, Serialize};

use contaerp_core::{DomainResult, Record, Validator};

/// Manufacturer (`fabricante`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub codfabricante: String,
    pub nombre: String,
}

impl Manufacturer {
    pub fn new(codfabricante: impl Into<String>, nombre: impl Into<String>) -> Self {
        Self {
            codfabricante: codfabricante.into(),
            nombre: nombre.into(),
        }
    }
}

impl Record for Manufacturer {
    type Key = String;

    fn key(&self) -> String {
        self.codfabricante.clone()
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.code("codfabricante", &self.codfabricante, 8)
            .text("nombre", &self.nombre, 1, 100);
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_required() {
        assert!(Manufacturer::new("ACME", "").validate().is_err());
        assert!(Manufacturer::new("ACME", "Acme S.L.").validate().is_ok());
    }
}
