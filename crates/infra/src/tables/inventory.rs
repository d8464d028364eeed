use contaerp_inventory::{Stock, Warehouse};

use super::{put_address, read_address};
use crate::db::{Column, Direction, Row, Schema, StoreError, Table};

impl Table for Warehouse {
    const SCHEMA: &'static Schema = &Schema {
        table: "almacenes",
        key: "codalmacen",
        columns: &[
            Column::text("codalmacen"),
            Column::text("nombre"),
            Column::text("direccion"),
            Column::text("codpostal"),
            Column::text("ciudad"),
            Column::text("provincia"),
            Column::text("codpais"),
            Column::text("apartado"),
            Column::text("telefono"),
            Column::text("contacto"),
            Column::text("observaciones"),
        ],
        unique: &[],
        order: &[("codalmacen", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        let row = Row::new()
            .with("codalmacen", &self.codalmacen)
            .with("nombre", &self.nombre)
            .with("telefono", &self.telefono)
            .with("contacto", &self.contacto)
            .with("observaciones", &self.observaciones);
        put_address(row, &self.address)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            codalmacen: row.get("codalmacen")?,
            nombre: row.get("nombre")?,
            address: read_address(row)?,
            telefono: row.get("telefono")?,
            contacto: row.get("contacto")?,
            observaciones: row.get("observaciones")?,
        })
    }
}

impl Table for Stock {
    const SCHEMA: &'static Schema = &Schema {
        table: "stocks",
        key: "id",
        columns: &[
            Column::uuid("id"),
            Column::text("codalmacen"),
            Column::text("referencia"),
            Column::text("nombre"),
            Column::decimal("cantidad"),
            Column::decimal("reservada"),
            Column::decimal("disponible"),
            Column::decimal("pterecibir"),
            Column::decimal("stockmin"),
            Column::decimal("stockmax"),
            Column::text("ubicacion"),
        ],
        unique: &[&["referencia", "codalmacen"]],
        order: &[("referencia", Direction::Asc), ("codalmacen", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        Row::new()
            .with("id", self.id)
            .with("codalmacen", &self.codalmacen)
            .with("referencia", &self.referencia)
            .with("nombre", &self.nombre)
            .with("cantidad", self.cantidad)
            .with("reservada", self.reservada)
            .with("disponible", self.disponible)
            .with("pterecibir", self.pterecibir)
            .with("stockmin", self.stockmin)
            .with("stockmax", self.stockmax)
            .with("ubicacion", &self.ubicacion)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.get("id")?,
            codalmacen: row.get("codalmacen")?,
            referencia: row.get("referencia")?,
            nombre: row.get("nombre")?,
            cantidad: row.get("cantidad")?,
            reservada: row.get("reservada")?,
            disponible: row.get("disponible")?,
            pterecibir: row.get("pterecibir")?,
            stockmin: row.get("stockmin")?,
            stockmax: row.get("stockmax")?,
            ubicacion: row.get("ubicacion")?,
        })
    }
}
