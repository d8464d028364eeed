use serde::{Deserialize, Serialize};

use contaerp_core::{DomainResult, Record, Validator};
use contaerp_parties::PostalAddress;

/// Warehouse (`almacen`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub codalmacen: String,
    pub nombre: String,
    pub address: PostalAddress,
    pub telefono: String,
    pub contacto: String,
    pub observaciones: String,
}

impl Warehouse {
    pub fn new(codalmacen: impl Into<String>, nombre: impl Into<String>) -> Self {
        Self {
            codalmacen: codalmacen.into(),
            nombre: nombre.into(),
            address: PostalAddress::default(),
            telefono: String::new(),
            contacto: String::new(),
            observaciones: String::new(),
        }
    }
}

impl Record for Warehouse {
    type Key = String;

    fn key(&self) -> String {
        self.codalmacen.clone()
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.code("codalmacen", &self.codalmacen, 4)
            .text("nombre", &self.nombre, 1, 100)
            .max_len("telefono", &self.telefono, 30)
            .max_len("contacto", &self.contacto, 100);
        self.address.check(&mut v);
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warehouse_code_is_short() {
        assert!(Warehouse::new("ALG", "Almacén general").validate().is_ok());
        assert!(Warehouse::new("CENTRAL", "Central").validate().is_err());
    }
}
