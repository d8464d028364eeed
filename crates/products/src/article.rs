use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use contaerp_core::money::{percent_of, round2, round_dp, PRICE_DECIMALS};
use contaerp_core::{DomainResult, Record, Validator};

/// Article (`articulo`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub referencia: String,
    pub descripcion: String,
    pub codfamilia: Option<String>,
    pub codfabricante: Option<String>,
    pub codbarras: String,
    /// Sale price without tax.
    pub pvp: Decimal,
    /// Date `pvp` last changed.
    pub factualizado: NaiveDate,
    /// Moving average purchase cost.
    pub costemedio: Decimal,
    /// Last purchase cost.
    pub preciocoste: Decimal,
    pub codimpuesto: Option<String>,
    /// Physical stock summed over every warehouse.
    pub stockfis: Decimal,
    pub stockmin: Decimal,
    pub stockmax: Decimal,
    /// Allow selling without stock.
    pub controlstock: bool,
    /// Stock is not tracked at all (services).
    pub nostock: bool,
    pub bloqueado: bool,
    pub secompra: bool,
    pub sevende: bool,
    pub publico: bool,
    /// Equivalent reference, used to group interchangeable articles.
    pub equivalencia: Option<String>,
    pub observaciones: String,
}

impl Article {
    pub fn new(referencia: impl Into<String>, descripcion: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            referencia: referencia.into(),
            descripcion: descripcion.into(),
            codfamilia: None,
            codfabricante: None,
            codbarras: String::new(),
            pvp: Decimal::ZERO,
            factualizado: today,
            costemedio: Decimal::ZERO,
            preciocoste: Decimal::ZERO,
            codimpuesto: None,
            stockfis: Decimal::ZERO,
            stockmin: Decimal::ZERO,
            stockmax: Decimal::ZERO,
            controlstock: false,
            nostock: false,
            bloqueado: false,
            secompra: true,
            sevende: true,
            publico: false,
            equivalencia: None,
            observaciones: String::new(),
        }
    }

    /// Sale price including a tax rate.
    pub fn pvp_with_tax(&self, iva: Decimal) -> Decimal {
        round2(self.pvp + percent_of(self.pvp, iva))
    }

    /// Change the sale price; `factualizado` only moves when the price does.
    pub fn set_pvp(&mut self, value: Decimal, today: NaiveDate) {
        let value = round_dp(value, PRICE_DECIMALS);
        if value != self.pvp {
            self.pvp = value;
            self.factualizado = today;
        }
    }

    /// Set the sale price from a tax-included amount.
    pub fn set_pvp_with_tax(&mut self, value: Decimal, iva: Decimal, today: NaiveDate) {
        let divisor = Decimal::ONE_HUNDRED + iva;
        if divisor <= Decimal::ZERO {
            return;
        }
        self.set_pvp(value * Decimal::ONE_HUNDRED / divisor, today);
    }

    /// Fold a purchase of `quantity` units at `unit_cost` into the average cost.
    ///
    /// Must run before `stockfis` is increased by the same purchase.
    pub fn receive_cost(&mut self, quantity: Decimal, unit_cost: Decimal) {
        if quantity <= Decimal::ZERO {
            return;
        }
        let on_hand = self.stockfis.max(Decimal::ZERO);
        let units = on_hand + quantity;
        self.costemedio = round_dp(
            (on_hand * self.costemedio + quantity * unit_cost) / units,
            PRICE_DECIMALS,
        );
        self.preciocoste = unit_cost;
    }

    pub fn tracks_stock(&self) -> bool {
        !self.nostock
    }

    /// Whether `quantity` units can leave the warehouse given `available` units.
    pub fn can_sell(&self, quantity: Decimal, available: Decimal) -> bool {
        self.nostock || self.controlstock || available >= quantity
    }

    pub fn below_minimum(&self) -> bool {
        self.tracks_stock() && self.stockmin > Decimal::ZERO && self.stockfis < self.stockmin
    }
}

impl Record for Article {
    type Key = String;

    fn key(&self) -> String {
        self.referencia.clone()
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.code("referencia", &self.referencia, 18)
            .text("descripcion", &self.descripcion, 1, 1000)
            .max_len("codbarras", &self.codbarras, 18)
            .optional_code("codfamilia", self.codfamilia.as_deref(), 8)
            .optional_code("codfabricante", self.codfabricante.as_deref(), 8)
            .optional_code("codimpuesto", self.codimpuesto.as_deref(), 10)
            .optional_code("equivalencia", self.equivalencia.as_deref(), 18)
            .non_negative("pvp", self.pvp)
            .non_negative("costemedio", self.costemedio)
            .non_negative("preciocoste", self.preciocoste)
            .non_negative("stockmin", self.stockmin)
            .non_negative("stockmax", self.stockmax)
            .check(
                self.stockmax.is_zero() || self.stockmax >= self.stockmin,
                "stockmax cannot be lower than stockmin",
            );
        v.finish()
    }
}
