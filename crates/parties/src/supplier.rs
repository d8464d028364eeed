use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use contaerp_core::{Defaults, DomainResult, Record, Validator};

use crate::contact::{check_contact, ContactFields, TaxRegime};

/// Width of generated supplier codes.
pub const CODE_WIDTH: usize = 6;

/// Supplier (`proveedor`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub codproveedor: String,
    pub nombre: String,
    pub razonsocial: String,
    pub tipoidfiscal: String,
    pub cifnif: String,
    pub telefono1: String,
    pub telefono2: String,
    pub fax: String,
    pub email: String,
    pub web: String,
    pub codserie: Option<String>,
    pub coddivisa: String,
    pub codpago: String,
    pub regimeniva: TaxRegime,
    /// Creditor rather than goods supplier: posts to the creditors account.
    pub acreedor: bool,
    pub personafisica: bool,
    pub debaja: bool,
    pub fechabaja: Option<NaiveDate>,
    pub observaciones: String,
}

impl Supplier {
    pub fn new(codproveedor: impl Into<String>, nombre: impl Into<String>, defaults: &Defaults) -> Self {
        let nombre = nombre.into();
        Self {
            codproveedor: codproveedor.into(),
            razonsocial: nombre.clone(),
            nombre,
            tipoidfiscal: "NIF".to_string(),
            cifnif: String::new(),
            telefono1: String::new(),
            telefono2: String::new(),
            fax: String::new(),
            email: String::new(),
            web: String::new(),
            codserie: None,
            coddivisa: defaults.coddivisa.clone(),
            codpago: defaults.codpago.clone(),
            regimeniva: TaxRegime::General,
            acreedor: false,
            personafisica: false,
            debaja: false,
            fechabaja: None,
            observaciones: String::new(),
        }
    }

    pub fn is_exempt(&self) -> bool {
        self.regimeniva == TaxRegime::Exempt
    }
}

impl Record for Supplier {
    type Key = String;

    fn key(&self) -> String {
        self.codproveedor.clone()
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.code("codproveedor", &self.codproveedor, CODE_WIDTH);
        check_contact(
            &mut v,
            &ContactFields {
                nombre: &self.nombre,
                razonsocial: &self.razonsocial,
                cifnif: &self.cifnif,
                telefono1: &self.telefono1,
                telefono2: &self.telefono2,
                fax: &self.fax,
                email: &self.email,
                web: &self.web,
            },
        );
        v.code("coddivisa", &self.coddivisa, 3)
            .code("codpago", &self.codpago, 10)
            .optional_code("codserie", self.codserie.as_deref(), 2)
            .check(
                self.debaja || self.fechabaja.is_none(),
                "fechabaja can only be set on unsubscribed suppliers",
            );
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_supplier_is_valid() {
        let s = Supplier::new("000001", "Papelería Sol", &Defaults::default());
        assert!(s.validate().is_ok());
        assert!(!s.acreedor);
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut s = Supplier::new("000002", "x", &Defaults::default());
        s.nombre = String::new();
        s.razonsocial = String::new();
        assert_eq!(s.validate().unwrap_err().messages().len(), 2);
    }
}
