use serde::{Deserialize, Serialize};

use contaerp_core::{DomainResult, Record, Validator};

/// Country (`pais`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub codpais: String,
    /// ISO 3166-1 alpha-2 code, may be empty.
    pub codiso: String,
    pub nombre: String,
}

impl Country {
    pub fn new(codpais: impl Into<String>, nombre: impl Into<String>) -> Self {
        Self {
            codpais: codpais.into(),
            codiso: String::new(),
            nombre: nombre.into(),
        }
    }
}

impl Record for Country {
    type Key = String;

    fn key(&self) -> String {
        self.codpais.clone()
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.code("codpais", &self.codpais, 3)
            .text("nombre", &self.nombre, 1, 100)
            .check(
                self.codiso.is_empty()
                    || (self.codiso.len() == 2 && self.codiso.chars().all(|c| c.is_ascii_alphabetic())),
                "codiso must have exactly 2 letters",
            );
        v.finish()
    }
}
