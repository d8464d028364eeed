use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use contaerp_core::{Defaults, DomainResult, Record, Validator};

use crate::contact::{check_contact, ContactFields, TaxRegime};

/// Width of generated customer codes.
pub const CODE_WIDTH: usize = 6;

/// Customer (`cliente`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub codcliente: String,
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
    pub codagente: Option<String>,
    pub regimeniva: TaxRegime,
    pub personafisica: bool,
    pub debaja: bool,
    pub fechabaja: Option<NaiveDate>,
    pub fechaalta: NaiveDate,
    pub observaciones: String,
}

impl Customer {
    /// New customer using the company defaults for currency and payment method.
    pub fn new(codcliente: impl Into<String>, nombre: impl Into<String>, defaults: &Defaults, today: NaiveDate) -> Self {
        let nombre = nombre.into();
        Self {
            codcliente: codcliente.into(),
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
            codagente: None,
            regimeniva: TaxRegime::General,
            personafisica: true,
            debaja: false,
            fechabaja: None,
            fechaalta: today,
            observaciones: String::new(),
        }
    }

    pub fn is_exempt(&self) -> bool {
        self.regimeniva == TaxRegime::Exempt
    }

    pub fn applies_surcharge(&self) -> bool {
        self.regimeniva == TaxRegime::Surcharge
    }

    /// Deactivate the customer as of `date`.
    pub fn unsubscribe(&mut self, date: NaiveDate) {
        self.debaja = true;
        self.fechabaja = Some(date);
    }

    pub fn resubscribe(&mut self) {
        self.debaja = false;
        self.fechabaja = None;
    }
}

impl Record for Customer {
    type Key = String;

    fn key(&self) -> String {
        self.codcliente.clone()
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.code("codcliente", &self.codcliente, CODE_WIDTH);
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
            .optional_code("codagente", self.codagente.as_deref(), 10)
            .check(
                self.debaja || self.fechabaja.is_none(),
                "fechabaja can only be set on unsubscribed customers",
            );
        if let Some(baja) = self.fechabaja {
            v.check(baja >= self.fechaalta, "fechabaja cannot be before fechaalta");
        }
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2015, 3, 1).unwrap()
    }

    fn customer() -> Customer {
        Customer::new("000001", "Ana García", &Defaults::default(), today())
    }

    #[test]
    fn new_customer_uses_defaults() {
        let c = customer();
        assert_eq!(c.razonsocial, "Ana García");
        assert_eq!(c.coddivisa, "EUR");
        assert_eq!(c.codpago, "CONT");
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_bad_code_and_email() {
        let mut c = customer();
        c.codcliente = "TOO-LONG".to_string();
        c.email = "ana@".to_string();
        let err = c.validate().unwrap_err();
        assert_eq!(err.messages().len(), 2);
    }

    #[test]
    fn unsubscribe_sets_and_clears_date() {
        let mut c = customer();
        c.unsubscribe(NaiveDate::from_ymd_opt(2015, 6, 1).unwrap());
        assert!(c.validate().is_ok());
        c.fechabaja = Some(NaiveDate::from_ymd_opt(2014, 1, 1).unwrap());
        assert!(c.validate().is_err());
        c.resubscribe();
        assert!(c.fechabaja.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn regime_drives_tax_behaviour() {
        let mut c = customer();
        assert!(!c.is_exempt());
        c.regimeniva = TaxRegime::Surcharge;
        assert!(c.applies_surcharge());
    }
}
