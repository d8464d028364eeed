//! Default codes new records start from.

use serde::{Deserialize, Serialize};

/// Company-wide default codes.
///
/// Loaded by `contaerp-infra::config`; domain constructors take it explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub coddivisa: String,
    pub codpais: String,
    pub codserie: String,
    pub codalmacen: String,
    pub codpago: String,
    pub codimpuesto: String,
    /// Length of sub-account codes for new fiscal years.
    pub longsubcuenta: u8,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            coddivisa: "EUR".to_string(),
            codpais: "ESP".to_string(),
            codserie: "A".to_string(),
            codalmacen: "ALG".to_string(),
            codpago: "CONT".to_string(),
            codimpuesto: "IVA21".to_string(),
            longsubcuenta: 10,
        }
    }
}
