use contaerp_products::{Article, Family, Manufacturer};

use crate::db::{Column, Direction, Row, Schema, StoreError, Table};

impl Table for Family {
    const SCHEMA: &'static Schema = &Schema {
        table: "familias",
        key: "codfamilia",
        columns: &[
            Column::text("codfamilia"),
            Column::text("descripcion"),
            Column::text("madre").nullable(),
        ],
        unique: &[],
        order: &[("descripcion", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        Row::new()
            .with("codfamilia", &self.codfamilia)
            .with("descripcion", &self.descripcion)
            .with("madre", self.madre.as_deref())
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            codfamilia: row.get("codfamilia")?,
            descripcion: row.get("descripcion")?,
            madre: row.get("madre")?,
        })
    }
}

impl Table for Manufacturer {
    const SCHEMA: &'static Schema = &Schema {
        table: "fabricantes",
        key: "codfabricante",
        columns: &[Column::text("codfabricante"), Column::text("nombre")],
        unique: &[],
        order: &[("nombre", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        Row::new()
            .with("codfabricante", &self.codfabricante)
            .with("nombre", &self.nombre)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            codfabricante: row.get("codfabricante")?,
            nombre: row.get("nombre")?,
        })
    }
}

impl Table for Article {
    const SCHEMA: &'static Schema = &Schema {
        table: "articulos",
        key: "referencia",
        columns: &[
            Column::text("referencia"),
            Column::text("descripcion"),
            Column::text("codfamilia").nullable(),
            Column::text("codfabricante").nullable(),
            Column::text("codbarras"),
            Column::decimal("pvp"),
            Column::date("factualizado"),
            Column::decimal("costemedio"),
            Column::decimal("preciocoste"),
            Column::text("codimpuesto").nullable(),
            Column::decimal("stockfis"),
            Column::decimal("stockmin"),
            Column::decimal("stockmax"),
            Column::bool("controlstock"),
            Column::bool("nostock"),
            Column::bool("bloqueado"),
            Column::bool("secompra"),
            Column::bool("sevende"),
            Column::bool("publico"),
            Column::text("equivalencia").nullable(),
            Column::text("observaciones"),
        ],
        unique: &[],
        order: &[("referencia", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        Row::new()
            .with("referencia", &self.referencia)
            .with("descripcion", &self.descripcion)
            .with("codfamilia", self.codfamilia.as_deref())
            .with("codfabricante", self.codfabricante.as_deref())
            .with("codbarras", &self.codbarras)
            .with("pvp", self.pvp)
            .with("factualizado", self.factualizado)
            .with("costemedio", self.costemedio)
            .with("preciocoste", self.preciocoste)
            .with("codimpuesto", self.codimpuesto.as_deref())
            .with("stockfis", self.stockfis)
            .with("stockmin", self.stockmin)
            .with("stockmax", self.stockmax)
            .with("controlstock", self.controlstock)
            .with("nostock", self.nostock)
            .with("bloqueado", self.bloqueado)
            .with("secompra", self.secompra)
            .with("sevende", self.sevende)
            .with("publico", self.publico)
            .with("equivalencia", self.equivalencia.as_deref())
            .with("observaciones", &self.observaciones)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            referencia: row.get("referencia")?,
            descripcion: row.get("descripcion")?,
            codfamilia: row.get("codfamilia")?,
            codfabricante: row.get("codfabricante")?,
            codbarras: row.get("codbarras")?,
            pvp: row.get("pvp")?,
            factualizado: row.get("factualizado")?,
            costemedio: row.get("costemedio")?,
            preciocoste: row.get("preciocoste")?,
            codimpuesto: row.get("codimpuesto")?,
            stockfis: row.get("stockfis")?,
            stockmin: row.get("stockmin")?,
            stockmax: row.get("stockmax")?,
            controlstock: row.get("controlstock")?,
            nostock: row.get("nostock")?,
            bloqueado: row.get("bloqueado")?,
            secompra: row.get("secompra")?,
            sevende: row.get("sevende")?,
            publico: row.get("publico")?,
            equivalencia: row.get("equivalencia")?,
            observaciones: row.get("observaciones")?,
        })
    }
}
