use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use contaerp_core::{DomainResult, Record, Validator};

contaerp_core::uuid_id!(
    /// Identifier of a customer or supplier address.
    AddressId
);

/// Postal address fields, also copied onto document headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub direccion: String,
    pub codpostal: String,
    pub ciudad: String,
    pub provincia: String,
    pub codpais: String,
    pub apartado: String,
}

impl PostalAddress {
    pub fn check(&self, v: &mut Validator) {
        v.max_len("direccion", &self.direccion, 100)
            .max_len("codpostal", &self.codpostal, 10)
            .max_len("ciudad", &self.ciudad, 100)
            .max_len("provincia", &self.provincia, 100)
            .max_len("apartado", &self.apartado, 10);
        if !self.codpais.is_empty() {
            v.code("codpais", &self.codpais, 3);
        }
    }
}

/// Address of a customer (`direccion_cliente`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerAddress {
    pub id: AddressId,
    pub codcliente: String,
    pub descripcion: String,
    pub address: PostalAddress,
    /// Default billing address of the customer.
    pub domfacturacion: bool,
    /// Default shipping address of the customer.
    pub domenvio: bool,
    pub fecha: NaiveDate,
}

/// Address of a supplier (`direccion_proveedor`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierAddress {
    pub id: AddressId,
    pub codproveedor: String,
    pub descripcion: String,
    pub address: PostalAddress,
    pub direccionppal: bool,
    pub fecha: NaiveDate,
}

impl CustomerAddress {
    pub fn new(codcliente: impl Into<String>, address: PostalAddress, fecha: NaiveDate) -> Self {
        Self {
            id: AddressId::new(),
            codcliente: codcliente.into(),
            descripcion: "Principal".to_string(),
            address,
            domfacturacion: true,
            domenvio: true,
            fecha,
        }
    }
}

impl SupplierAddress {
    pub fn new(codproveedor: impl Into<String>, address: PostalAddress, fecha: NaiveDate) -> Self {
        Self {
            id: AddressId::new(),
            codproveedor: codproveedor.into(),
            descripcion: "Principal".to_string(),
            address,
            direccionppal: true,
            fecha,
        }
    }
}

fn check_address(owner_field: &str, owner: &str, descripcion: &str, address: &PostalAddress) -> DomainResult<()> {
    let mut v = Validator::new();
    v.code(owner_field, owner, 6)
        .max_len("descripcion", descripcion, 100)
        .text("direccion", &address.direccion, 1, 100);
    address.check(&mut v);
    v.finish()
}

impl Record for CustomerAddress {
    type Key = AddressId;

    fn key(&self) -> AddressId {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        check_address("codcliente", &self.codcliente, &self.descripcion, &self.address)
    }
}

impl Record for SupplierAddress {
    type Key = AddressId;

    fn key(&self) -> AddressId {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        check_address("codproveedor", &self.codproveedor, &self.descripcion, &self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postal() -> PostalAddress {
        PostalAddress {
            direccion: "C/ Mayor 1".to_string(),
            codpostal: "46001".to_string(),
            ciudad: "Valencia".to_string(),
            provincia: "Valencia".to_string(),
            codpais: "ESP".to_string(),
            apartado: String::new(),
        }
    }

    #[test]
    fn address_requires_street() {
        let date = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let mut a = CustomerAddress::new("000001", postal(), date);
        assert!(a.validate().is_ok());
        a.address.direccion = String::new();
        assert!(a.validate().is_err());
    }

    #[test]
    fn supplier_address_checks_owner_code() {
        let date = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let a = SupplierAddress::new("", postal(), date);
        assert!(a.validate().is_err());
    }
}
