use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use contaerp_core::{DomainResult, Record, Validator};

/// Sales agent (`agente`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub codagente: String,
    pub nombre: String,
    pub apellidos: String,
    pub dnicif: String,
    pub email: String,
    pub telefono: String,
    /// Commission percentage on sales.
    pub porcomision: Decimal,
    pub fechaalta: Option<NaiveDate>,
    pub fechabaja: Option<NaiveDate>,
}

impl Agent {
    pub fn new(codagente: impl Into<String>, nombre: impl Into<String>) -> Self {
        Self {
            codagente: codagente.into(),
            nombre: nombre.into(),
            apellidos: String::new(),
            dnicif: String::new(),
            email: String::new(),
            telefono: String::new(),
            porcomision: Decimal::ZERO,
            fechaalta: None,
            fechabaja: None,
        }
    }

    pub fn full_name(&self) -> String {
        let apellidos = self.apellidos.trim();
        if apellidos.is_empty() {
            self.nombre.trim().to_string()
        } else {
            format!("{} {}", self.nombre.trim(), apellidos)
        }
    }

    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.fechaalta.is_none_or(|alta| alta <= date) && self.fechabaja.is_none_or(|baja| date < baja)
    }
}

impl Record for Agent {
    type Key = String;

    fn key(&self) -> String {
        self.codagente.clone()
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.code("codagente", &self.codagente, 10)
            .text("nombre", &self.nombre, 1, 50)
            .max_len("apellidos", &self.apellidos, 100)
            .max_len("dnicif", &self.dnicif, 30)
            .max_len("telefono", &self.telefono, 30)
            .email("email", &self.email)
            .percentage("porcomision", self.porcomision);
        if let (Some(alta), Some(baja)) = (self.fechaalta, self.fechabaja) {
            v.check(baja >= alta, "fechabaja cannot be before fechaalta");
        }
        v.finish()
    }
}
