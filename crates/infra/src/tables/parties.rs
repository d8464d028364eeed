use contaerp_parties::{Agent, Customer, CustomerAddress, Supplier, SupplierAddress};

use super::{put_address, read_address};
use crate::db::{Column, Direction, Row, Schema, StoreError, Table};

impl Table for Agent {
    const SCHEMA: &'static Schema = &Schema {
        table: "agentes",
        key: "codagente",
        columns: &[
            Column::text("codagente"),
            Column::text("nombre"),
            Column::text("apellidos"),
            Column::text("dnicif"),
            Column::text("email"),
            Column::text("telefono"),
            Column::decimal("porcomision"),
            Column::date("fechaalta").nullable(),
            Column::date("fechabaja").nullable(),
        ],
        unique: &[],
        order: &[("nombre", Direction::Asc), ("apellidos", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        Row::new()
            .with("codagente", &self.codagente)
            .with("nombre", &self.nombre)
            .with("apellidos", &self.apellidos)
            .with("dnicif", &self.dnicif)
            .with("email", &self.email)
            .with("telefono", &self.telefono)
            .with("porcomision", self.porcomision)
            .with("fechaalta", self.fechaalta)
            .with("fechabaja", self.fechabaja)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            codagente: row.get("codagente")?,
            nombre: row.get("nombre")?,
            apellidos: row.get("apellidos")?,
            dnicif: row.get("dnicif")?,
            email: row.get("email")?,
            telefono: row.get("telefono")?,
            porcomision: row.get("porcomision")?,
            fechaalta: row.get("fechaalta")?,
            fechabaja: row.get("fechabaja")?,
        })
    }
}

impl Table for Customer {
    const SCHEMA: &'static Schema = &Schema {
        table: "clientes",
        key: "codcliente",
        columns: &[
            Column::text("codcliente"),
            Column::text("nombre"),
            Column::text("razonsocial"),
            Column::text("tipoidfiscal"),
            Column::text("cifnif"),
            Column::text("telefono1"),
            Column::text("telefono2"),
            Column::text("fax"),
            Column::text("email"),
            Column::text("web"),
            Column::text("codserie").nullable(),
            Column::text("coddivisa"),
            Column::text("codpago"),
            Column::text("codagente").nullable(),
            Column::text("regimeniva"),
            Column::bool("personafisica"),
            Column::bool("debaja"),
            Column::date("fechabaja").nullable(),
            Column::date("fechaalta"),
            Column::text("observaciones"),
        ],
        unique: &[],
        order: &[("nombre", Direction::Asc), ("codcliente", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        Row::new()
            .with("codcliente", &self.codcliente)
            .with("nombre", &self.nombre)
            .with("razonsocial", &self.razonsocial)
            .with("tipoidfiscal", &self.tipoidfiscal)
            .with("cifnif", &self.cifnif)
            .with("telefono1", &self.telefono1)
            .with("telefono2", &self.telefono2)
            .with("fax", &self.fax)
            .with("email", &self.email)
            .with("web", &self.web)
            .with("codserie", self.codserie.as_deref())
            .with("coddivisa", &self.coddivisa)
            .with("codpago", &self.codpago)
            .with("codagente", self.codagente.as_deref())
            .with("regimeniva", self.regimeniva)
            .with("personafisica", self.personafisica)
            .with("debaja", self.debaja)
            .with("fechabaja", self.fechabaja)
            .with("fechaalta", self.fechaalta)
            .with("observaciones", &self.observaciones)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            codcliente: row.get("codcliente")?,
            nombre: row.get("nombre")?,
            razonsocial: row.get("razonsocial")?,
            tipoidfiscal: row.get("tipoidfiscal")?,
            cifnif: row.get("cifnif")?,
            telefono1: row.get("telefono1")?,
            telefono2: row.get("telefono2")?,
            fax: row.get("fax")?,
            email: row.get("email")?,
            web: row.get("web")?,
            codserie: row.get("codserie")?,
            coddivisa: row.get("coddivisa")?,
            codpago: row.get("codpago")?,
            codagente: row.get("codagente")?,
            regimeniva: row.get("regimeniva")?,
            personafisica: row.get("personafisica")?,
            debaja: row.get("debaja")?,
            fechabaja: row.get("fechabaja")?,
            fechaalta: row.get("fechaalta")?,
            observaciones: row.get("observaciones")?,
        })
    }
}

impl Table for Supplier {
    const SCHEMA: &'static Schema = &Schema {
        table: "proveedores",
        key: "codproveedor",
        columns: &[
            Column::text("codproveedor"),
            Column::text("nombre"),
            Column::text("razonsocial"),
            Column::text("tipoidfiscal"),
            Column::text("cifnif"),
            Column::text("telefono1"),
            Column::text("telefono2"),
            Column::text("fax"),
            Column::text("email"),
            Column::text("web"),
            Column::text("codserie").nullable(),
            Column::text("coddivisa"),
            Column::text("codpago"),
            Column::text("regimeniva"),
            Column::bool("acreedor"),
            Column::bool("personafisica"),
            Column::bool("debaja"),
            Column::date("fechabaja").nullable(),
            Column::text("observaciones"),
        ],
        unique: &[],
        order: &[("nombre", Direction::Asc), ("codproveedor", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        Row::new()
            .with("codproveedor", &self.codproveedor)
            .with("nombre", &self.nombre)
            .with("razonsocial", &self.razonsocial)
            .with("tipoidfiscal", &self.tipoidfiscal)
            .with("cifnif", &self.cifnif)
            .with("telefono1", &self.telefono1)
            .with("telefono2", &self.telefono2)
            .with("fax", &self.fax)
            .with("email", &self.email)
            .with("web", &self.web)
            .with("codserie", self.codserie.as_deref())
            .with("coddivisa", &self.coddivisa)
            .with("codpago", &self.codpago)
            .with("regimeniva", self.regimeniva)
            .with("acreedor", self.acreedor)
            .with("personafisica", self.personafisica)
            .with("debaja", self.debaja)
            .with("fechabaja", self.fechabaja)
            .with("observaciones", &self.observaciones)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            codproveedor: row.get("codproveedor")?,
            nombre: row.get("nombre")?,
            razonsocial: row.get("razonsocial")?,
            tipoidfiscal: row.get("tipoidfiscal")?,
            cifnif: row.get("cifnif")?,
            telefono1: row.get("telefono1")?,
            telefono2: row.get("telefono2")?,
            fax: row.get("fax")?,
            email: row.get("email")?,
            web: row.get("web")?,
            codserie: row.get("codserie")?,
            coddivisa: row.get("coddivisa")?,
            codpago: row.get("codpago")?,
            regimeniva: row.get("regimeniva")?,
            acreedor: row.get("acreedor")?,
            personafisica: row.get("personafisica")?,
            debaja: row.get("debaja")?,
            fechabaja: row.get("fechabaja")?,
            observaciones: row.get("observaciones")?,
        })
    }
}

impl Table for CustomerAddress {
    const SCHEMA: &'static Schema = &Schema {
        table: "dirclientes",
        key: "id",
        columns: &[
            Column::uuid("id"),
            Column::text("codcliente"),
            Column::text("descripcion"),
            Column::text("direccion"),
            Column::text("codpostal"),
            Column::text("ciudad"),
            Column::text("provincia"),
            Column::text("codpais"),
            Column::text("apartado"),
            Column::bool("domfacturacion"),
            Column::bool("domenvio"),
            Column::date("fecha"),
        ],
        unique: &[],
        order: &[("codcliente", Direction::Asc), ("id", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        let row = Row::new()
            .with("id", self.id)
            .with("codcliente", &self.codcliente)
            .with("descripcion", &self.descripcion)
            .with("domfacturacion", self.domfacturacion)
            .with("domenvio", self.domenvio)
            .with("fecha", self.fecha);
        put_address(row, &self.address)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.get("id")?,
            codcliente: row.get("codcliente")?,
            descripcion: row.get("descripcion")?,
            address: read_address(row)?,
            domfacturacion: row.get("domfacturacion")?,
            domenvio: row.get("domenvio")?,
            fecha: row.get("fecha")?,
        })
    }
}

impl Table for SupplierAddress {
    const SCHEMA: &'static Schema = &Schema {
        table: "dirproveedores",
        key: "id",
        columns: &[
            Column::uuid("id"),
            Column::text("codproveedor"),
            Column::text("descripcion"),
            Column::text("direccion"),
            Column::text("codpostal"),
            Column::text("ciudad"),
            Column::text("provincia"),
            Column::text("codpais"),
            Column::text("apartado"),
            Column::bool("direccionppal"),
            Column::date("fecha"),
        ],
        unique: &[],
        order: &[("codproveedor", Direction::Asc), ("id", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        let row = Row::new()
            .with("id", self.id)
            .with("codproveedor", &self.codproveedor)
            .with("descripcion", &self.descripcion)
            .with("direccionppal", self.direccionppal)
            .with("fecha", self.fecha);
        put_address(row, &self.address)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.get("id")?,
            codproveedor: row.get("codproveedor")?,
            descripcion: row.get("descripcion")?,
            address: read_address(row)?,
            direccionppal: row.get("direccionppal")?,
            fecha: row.get("fecha")?,
        })
    }
}
