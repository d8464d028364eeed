use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use contaerp_core::{DomainError, DomainResult, Record, Validator};

contaerp_core::uuid_id!(
    /// Account identifier.
    AccountId
);

/// Tags marking the accounts generated entries post to (`cuentaesp`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpecialAccount {
    /// Customers.
    Client,
    /// Suppliers.
    Provee,
    /// Creditors.
    Acreed,
    /// Output VAT.
    Ivarep,
    /// Input VAT.
    Ivasop,
    /// Output equivalence surcharge.
    Ivarre,
    /// Input equivalence surcharge.
    Ivasre,
    /// Withholding we practise on purchases.
    Irpf,
    /// Withholding customers practise on our sales.
    Irpfpr,
    Ventas,
    Compra,
    Caja,
}

impl SpecialAccount {
    pub const ALL: [SpecialAccount; 12] = [
        SpecialAccount::Client,
        SpecialAccount::Provee,
        SpecialAccount::Acreed,
        SpecialAccount::Ivarep,
        SpecialAccount::Ivasop,
        SpecialAccount::Ivarre,
        SpecialAccount::Ivasre,
        SpecialAccount::Irpf,
        SpecialAccount::Irpfpr,
        SpecialAccount::Ventas,
        SpecialAccount::Compra,
        SpecialAccount::Caja,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialAccount::Client => "CLIENT",
            SpecialAccount::Provee => "PROVEE",
            SpecialAccount::Acreed => "ACREED",
            SpecialAccount::Ivarep => "IVAREP",
            SpecialAccount::Ivasop => "IVASOP",
            SpecialAccount::Ivarre => "IVARRE",
            SpecialAccount::Ivasre => "IVASRE",
            SpecialAccount::Irpf => "IRPF",
            SpecialAccount::Irpfpr => "IRPFPR",
            SpecialAccount::Ventas => "VENTAS",
            SpecialAccount::Compra => "COMPRA",
            SpecialAccount::Caja => "CAJA",
        }
    }

    /// Account code in the Spanish general chart, used when a year lacks the account.
    pub fn default_code(&self) -> &'static str {
        match self {
            SpecialAccount::Client => "430",
            SpecialAccount::Provee => "400",
            SpecialAccount::Acreed => "410",
            SpecialAccount::Ivarep => "477",
            SpecialAccount::Ivasop => "472",
            SpecialAccount::Ivarre => "4770",
            SpecialAccount::Ivasre => "4720",
            SpecialAccount::Irpf => "4751",
            SpecialAccount::Irpfpr => "473",
            SpecialAccount::Ventas => "700",
            SpecialAccount::Compra => "600",
            SpecialAccount::Caja => "570",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SpecialAccount::Client => "Clientes",
            SpecialAccount::Provee => "Proveedores",
            SpecialAccount::Acreed => "Acreedores por prestaciones de servicios",
            SpecialAccount::Ivarep => "Hacienda Pública, IVA repercutido",
            SpecialAccount::Ivasop => "Hacienda Pública, IVA soportado",
            SpecialAccount::Ivarre => "Hacienda Pública, recargo de equivalencia repercutido",
            SpecialAccount::Ivasre => "Hacienda Pública, recargo de equivalencia soportado",
            SpecialAccount::Irpf => "Hacienda Pública, acreedora por retenciones practicadas",
            SpecialAccount::Irpfpr => "Hacienda Pública, retenciones y pagos a cuenta",
            SpecialAccount::Ventas => "Ventas de mercaderías",
            SpecialAccount::Compra => "Compras de mercaderías",
            SpecialAccount::Caja => "Caja, euros",
        }
    }
}

impl fmt::Display for SpecialAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecialAccount {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SpecialAccount::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown special account '{s}'")))
    }
}

/// Ledger account (`cuenta`), grouping sub-accounts within a fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub codcuenta: String,
    pub codejercicio: String,
    pub descripcion: String,
    pub idcuentaesp: Option<SpecialAccount>,
    pub codepigrafe: String,
}

impl Account {
    pub fn new(codcuenta: impl Into<String>, codejercicio: impl Into<String>, descripcion: impl Into<String>) -> Self {
        Self {
            id: AccountId::new(),
            codcuenta: codcuenta.into(),
            codejercicio: codejercicio.into(),
            descripcion: descripcion.into(),
            idcuentaesp: None,
            codepigrafe: String::new(),
        }
    }

    /// Default account for `tag` in a fiscal year.
    pub fn special(tag: SpecialAccount, codejercicio: impl Into<String>) -> Self {
        let mut account = Self::new(tag.default_code(), codejercicio, tag.description());
        account.idcuentaesp = Some(tag);
        account
    }

    /// Sub-account code: account code, zero padding, then `suffix`, `length` digits in all.
    ///
    /// `subaccount_code("1", 10)` on account `430` gives `4300000001`.
    pub fn subaccount_code(&self, suffix: &str, length: usize) -> DomainResult<String> {
        let used = self.codcuenta.len() + suffix.len();
        if used > length {
            return Err(DomainError::validation(format!(
                "suffix '{suffix}' does not fit a {length}-digit sub-account of {}",
                self.codcuenta
            )));
        }
        Ok(format!("{}{}{}", self.codcuenta, "0".repeat(length - used), suffix))
    }
}

impl Record for Account {
    type Key = AccountId;

    fn key(&self) -> Self::Key {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.check(
            !self.codcuenta.is_empty()
                && self.codcuenta.len() <= 6
                && self.codcuenta.chars().all(|c| c.is_ascii_digit()),
            format!("codcuenta '{}' must be 1 to 6 digits", self.codcuenta),
        )
        .code("codejercicio", &self.codejercicio, 4)
        .text("descripcion", &self.descripcion, 1, 255)
        .max_len("codepigrafe", &self.codepigrafe, 6);
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subaccount_code_pads_between_account_and_suffix() {
        let account = Account::special(SpecialAccount::Client, "2024");
        assert_eq!(account.subaccount_code("1", 10).unwrap(), "4300000001");
        assert_eq!(account.subaccount_code("000042", 10).unwrap(), "4300000042");
        assert_eq!(account.subaccount_code("", 4).unwrap(), "4300");
        assert!(account.subaccount_code("12345678", 10).is_err());
    }

    #[test]
    fn account_code_is_numeric() {
        let mut account = Account::new("430", "2024", "Clientes");
        assert!(account.validate().is_ok());
        account.codcuenta = "43A".to_string();
        assert!(account.validate().is_err());
        account.codcuenta = "4300000".to_string();
        assert!(account.validate().is_err());
    }

    #[test]
    fn special_tags_parse_from_their_code() {
        for tag in SpecialAccount::ALL {
            assert_eq!(tag.as_str().parse::<SpecialAccount>().unwrap(), tag);
            assert!(Account::special(tag, "2024").validate().is_ok());
        }
        assert!("BANCO".parse::<SpecialAccount>().is_err());
    }
}
