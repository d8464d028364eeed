//! Delivery notes and their lines.

use contaerp_purchasing::{SupplierDeliveryNote, SupplierDeliveryNoteLine};
use contaerp_sales::{CustomerDeliveryNote, CustomerDeliveryNoteLine};

use super::{put_header, put_line, read_header, read_line, CUSTOMER_PARTY, SUPPLIER_PARTY};
use crate::db::{Column, Direction, Row, Schema, StoreError, Table};

impl Table for CustomerDeliveryNote {
    const SCHEMA: &'static Schema = &Schema {
        table: "albaranescli",
        key: "id",
        columns: document_columns!(
            "codcliente", "nombrecliente";
            Column::text("numero2"),
            Column::bool("ptefactura"),
            Column::uuid("idfactura").nullable(),
        ),
        unique: &[&["codigo"]],
        order: &[("fecha", Direction::Desc), ("codigo", Direction::Desc)],
    };

    fn to_row(&self) -> Row {
        let row = Row::new()
            .with("id", self.id)
            .with("numero2", &self.numero2)
            .with("ptefactura", self.ptefactura)
            .with("idfactura", self.idfactura);
        put_header(row, &self.header, CUSTOMER_PARTY)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.get("id")?,
            header: read_header(row, CUSTOMER_PARTY)?,
            numero2: row.get("numero2")?,
            ptefactura: row.get("ptefactura")?,
            idfactura: row.get("idfactura")?,
        })
    }
}

impl Table for CustomerDeliveryNoteLine {
    const SCHEMA: &'static Schema = &Schema {
        table: "lineasalbaranescli",
        key: "id",
        columns: line_columns!(Column::uuid("idalbaran")),
        unique: &[],
        order: &[("id", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        put_line(Row::new().with("id", self.id).with("idalbaran", self.idalbaran), &self.line)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.get("id")?,
            idalbaran: row.get("idalbaran")?,
            line: read_line(row)?,
        })
    }
}

impl Table for SupplierDeliveryNote {
    const SCHEMA: &'static Schema = &Schema {
        table: "albaranesprov",
        key: "id",
        columns: document_columns!(
            "codproveedor", "nombre";
            Column::text("numproveedor"),
            Column::bool("ptefactura"),
            Column::uuid("idfactura").nullable(),
        ),
        unique: &[&["codigo"]],
        order: &[("fecha", Direction::Desc), ("codigo", Direction::Desc)],
    };

    fn to_row(&self) -> Row {
        let row = Row::new()
            .with("id", self.id)
            .with("numproveedor", &self.numproveedor)
            .with("ptefactura", self.ptefactura)
            .with("idfactura", self.idfactura);
        put_header(row, &self.header, SUPPLIER_PARTY)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.get("id")?,
            header: read_header(row, SUPPLIER_PARTY)?,
            numproveedor: row.get("numproveedor")?,
            ptefactura: row.get("ptefactura")?,
            idfactura: row.get("idfactura")?,
        })
    }
}

impl Table for SupplierDeliveryNoteLine {
    const SCHEMA: &'static Schema = &Schema {
        table: "lineasalbaranesprov",
        key: "id",
        columns: line_columns!(Column::uuid("idalbaran")),
        unique: &[],
        order: &[("id", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        put_line(Row::new().with("id", self.id).with("idalbaran", self.idalbaran), &self.line)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.get("id")?,
            idalbaran: row.get("idalbaran")?,
            line: read_line(row)?,
        })
    }
}
