use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use contaerp_core::{DomainResult, Record, Validator};

contaerp_core::uuid_id!(
    /// Identifier of a stock row.
    StockId
);

/// Stock of one article in one warehouse (`stock`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: StockId,
    pub codalmacen: String,
    pub referencia: String,
    pub nombre: String,
    pub cantidad: Decimal,
    pub reservada: Decimal,
    /// Always `cantidad − reservada`.
    pub disponible: Decimal,
    pub pterecibir: Decimal,
    pub stockmin: Decimal,
    pub stockmax: Decimal,
    pub ubicacion: String,
}

impl Stock {
    pub fn new(codalmacen: impl Into<String>, referencia: impl Into<String>) -> Self {
        Self {
            id: StockId::new(),
            codalmacen: codalmacen.into(),
            referencia: referencia.into(),
            nombre: String::new(),
            cantidad: Decimal::ZERO,
            reservada: Decimal::ZERO,
            disponible: Decimal::ZERO,
            pterecibir: Decimal::ZERO,
            stockmin: Decimal::ZERO,
            stockmax: Decimal::ZERO,
            ubicacion: String::new(),
        }
    }

    pub fn set_quantity(&mut self, cantidad: Decimal) {
        self.cantidad = cantidad;
        self.disponible = self.cantidad - self.reservada;
    }

    pub fn add_quantity(&mut self, delta: Decimal) {
        self.set_quantity(self.cantidad + delta);
    }

    pub fn reserve(&mut self, quantity: Decimal) {
        self.reservada += quantity;
        self.disponible = self.cantidad - self.reservada;
    }
}

/// Sum of `cantidad` over the rows of one article.
pub fn total_quantity<'a>(rows: impl IntoIterator<Item = &'a Stock>, referencia: &str) -> Decimal {
    rows.into_iter()
        .filter(|s| s.referencia == referencia)
        .map(|s| s.cantidad)
        .sum()
}

impl Record for Stock {
    type Key = StockId;

    fn key(&self) -> StockId {
        self.id
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.code("codalmacen", &self.codalmacen, 4)
            .code("referencia", &self.referencia, 18)
            .max_len("ubicacion", &self.ubicacion, 30)
            .non_negative("reservada", self.reservada)
            .non_negative("pterecibir", self.pterecibir)
            .check(
                self.disponible == self.cantidad - self.reservada,
                "disponible must equal cantidad minus reservada",
            );
        v.finish()
    }
}
