//! Invoices, invoice lines and VAT lines.

use contaerp_invoicing::{
    CustomerInvoice, CustomerInvoiceLine, CustomerInvoiceTaxLine, InvoiceLine, InvoiceTaxLine, SupplierInvoice,
    SupplierInvoiceLine, SupplierInvoiceTaxLine,
};

use super::{put_header, put_line, put_status, read_header, read_line, read_status, CUSTOMER_PARTY, SUPPLIER_PARTY};
use crate::db::{Column, Direction, FromValue, Row, Schema, StoreError, Table, Value};

const INVOICE_LINE_COLUMNS: &[Column] = line_columns!(Column::uuid("idfactura"), Column::uuid("idalbaran").nullable());

const TAX_LINE_COLUMNS: &[Column] = &[
    Column::uuid("id"),
    Column::uuid("idfactura"),
    Column::text("codimpuesto").nullable(),
    Column::decimal("iva"),
    Column::decimal("recargo"),
    Column::decimal("neto"),
    Column::decimal("totaliva"),
    Column::decimal("totalrecargo"),
    Column::decimal("totallinea"),
];

fn put_invoice_line<F, A>(l: &InvoiceLine<F, A>) -> Row
where
    F: Copy + Into<Value>,
    A: Copy + Into<Value>,
{
    let row = Row::new()
        .with("id", l.id)
        .with("idfactura", l.idfactura)
        .with("idalbaran", l.idalbaran);
    put_line(row, &l.line)
}

fn read_invoice_line<F: FromValue, A: FromValue>(row: &Row) -> Result<InvoiceLine<F, A>, StoreError> {
    Ok(InvoiceLine {
        id: row.get("id")?,
        idfactura: row.get("idfactura")?,
        idalbaran: row.get("idalbaran")?,
        line: read_line(row)?,
    })
}

fn put_tax_line<F: Copy + Into<Value>>(t: &InvoiceTaxLine<F>) -> Row {
    Row::new()
        .with("id", t.id)
        .with("idfactura", t.idfactura)
        .with("codimpuesto", t.codimpuesto.as_deref())
        .with("iva", t.iva)
        .with("recargo", t.recargo)
        .with("neto", t.neto)
        .with("totaliva", t.totaliva)
        .with("totalrecargo", t.totalrecargo)
        .with("totallinea", t.totallinea)
}

fn read_tax_line<F: FromValue>(row: &Row) -> Result<InvoiceTaxLine<F>, StoreError> {
    Ok(InvoiceTaxLine {
        id: row.get("id")?,
        idfactura: row.get("idfactura")?,
        codimpuesto: row.get("codimpuesto")?,
        iva: row.get("iva")?,
        recargo: row.get("recargo")?,
        neto: row.get("neto")?,
        totaliva: row.get("totaliva")?,
        totalrecargo: row.get("totalrecargo")?,
        totallinea: row.get("totallinea")?,
    })
}

impl Table for CustomerInvoice {
    const SCHEMA: &'static Schema = &Schema {
        table: "facturascli",
        key: "id",
        columns: document_columns!(
            "codcliente", "nombrecliente";
            Column::text("numero2"),
            Column::date("vencimiento"),
            Column::bool("pagada"),
            Column::bool("anulada"),
            Column::uuid("idasiento").nullable(),
            Column::uuid("idasientop").nullable(),
            Column::uuid("idfacturarect").nullable(),
            Column::text("codigorect").nullable(),
        ),
        unique: &[&["codigo"]],
        order: &[("fecha", Direction::Desc), ("codigo", Direction::Desc)],
    };

    fn to_row(&self) -> Row {
        let row = Row::new()
            .with("id", self.id)
            .with("numero2", &self.numero2)
            .with("idfacturarect", self.idfacturarect)
            .with("codigorect", self.codigorect.as_deref());
        put_status(put_header(row, &self.header, CUSTOMER_PARTY), &self.status)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.get("id")?,
            header: read_header(row, CUSTOMER_PARTY)?,
            numero2: row.get("numero2")?,
            status: read_status(row)?,
            idfacturarect: row.get("idfacturarect")?,
            codigorect: row.get("codigorect")?,
        })
    }
}

impl Table for CustomerInvoiceLine {
    const SCHEMA: &'static Schema = &Schema {
        table: "lineasfacturascli",
        key: "id",
        columns: INVOICE_LINE_COLUMNS,
        unique: &[],
        order: &[("id", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        put_invoice_line(self)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        read_invoice_line(row)
    }
}

impl Table for CustomerInvoiceTaxLine {
    const SCHEMA: &'static Schema = &Schema {
        table: "lineasivafactcli",
        key: "id",
        columns: TAX_LINE_COLUMNS,
        unique: &[],
        order: &[("id", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        put_tax_line(self)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        read_tax_line(row)
    }
}

impl Table for SupplierInvoice {
    const SCHEMA: &'static Schema = &Schema {
        table: "facturasprov",
        key: "id",
        columns: document_columns!(
            "codproveedor", "nombre";
            Column::text("numproveedor"),
            Column::date("vencimiento"),
            Column::bool("pagada"),
            Column::bool("anulada"),
            Column::uuid("idasiento").nullable(),
            Column::uuid("idasientop").nullable(),
            Column::uuid("idfacturarect").nullable(),
            Column::text("codigorect").nullable(),
        ),
        unique: &[&["codigo"]],
        order: &[("fecha", Direction::Desc), ("codigo", Direction::Desc)],
    };

    fn to_row(&self) -> Row {
        let row = Row::new()
            .with("id", self.id)
            .with("numproveedor", &self.numproveedor)
            .with("idfacturarect", self.idfacturarect)
            .with("codigorect", self.codigorect.as_deref());
        put_status(put_header(row, &self.header, SUPPLIER_PARTY), &self.status)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.get("id")?,
            header: read_header(row, SUPPLIER_PARTY)?,
            numproveedor: row.get("numproveedor")?,
            status: read_status(row)?,
            idfacturarect: row.get("idfacturarect")?,
            codigorect: row.get("codigorect")?,
        })
    }
}

impl Table for SupplierInvoiceLine {
    const SCHEMA: &'static Schema = &Schema {
        table: "lineasfacturasprov",
        key: "id",
        columns: INVOICE_LINE_COLUMNS,
        unique: &[],
        order: &[("id", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        put_invoice_line(self)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        read_invoice_line(row)
    }
}

impl Table for SupplierInvoiceTaxLine {
    const SCHEMA: &'static Schema = &Schema {
        table: "lineasivafactprov",
        key: "id",
        columns: TAX_LINE_COLUMNS,
        unique: &[],
        order: &[("id", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        put_tax_line(self)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        read_tax_line(row)
    }
}
