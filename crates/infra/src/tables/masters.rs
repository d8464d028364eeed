use contaerp_masters::{Country, Currency, PaymentMethod, Series, Tax};

use crate::db::{Column, Direction, Row, Schema, StoreError, Table};

impl Table for Currency {
    const SCHEMA: &'static Schema = &Schema {
        table: "divisas",
        key: "coddivisa",
        columns: &[
            Column::text("coddivisa"),
            Column::text("descripcion"),
            Column::text("codiso"),
            Column::text("simbolo"),
            Column::decimal("tasaconv"),
            Column::decimal("tasaconv_compra"),
        ],
        unique: &[],
        order: &[("coddivisa", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        Row::new()
            .with("coddivisa", &self.coddivisa)
            .with("descripcion", &self.descripcion)
            .with("codiso", &self.codiso)
            .with("simbolo", &self.simbolo)
            .with("tasaconv", self.tasaconv)
            .with("tasaconv_compra", self.tasaconv_compra)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            coddivisa: row.get("coddivisa")?,
            descripcion: row.get("descripcion")?,
            codiso: row.get("codiso")?,
            simbolo: row.get("simbolo")?,
            tasaconv: row.get("tasaconv")?,
            tasaconv_compra: row.get("tasaconv_compra")?,
        })
    }
}

impl Table for Country {
    const SCHEMA: &'static Schema = &Schema {
        table: "paises",
        key: "codpais",
        columns: &[Column::text("codpais"), Column::text("codiso"), Column::text("nombre")],
        unique: &[],
        order: &[("nombre", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        Row::new()
            .with("codpais", &self.codpais)
            .with("codiso", &self.codiso)
            .with("nombre", &self.nombre)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            codpais: row.get("codpais")?,
            codiso: row.get("codiso")?,
            nombre: row.get("nombre")?,
        })
    }
}

impl Table for Tax {
    const SCHEMA: &'static Schema = &Schema {
        table: "impuestos",
        key: "codimpuesto",
        columns: &[
            Column::text("codimpuesto"),
            Column::text("descripcion"),
            Column::decimal("iva"),
            Column::decimal("recargo"),
            Column::text("codsubcuentarep").nullable(),
            Column::text("codsubcuentasop").nullable(),
        ],
        unique: &[],
        order: &[("codimpuesto", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        Row::new()
            .with("codimpuesto", &self.codimpuesto)
            .with("descripcion", &self.descripcion)
            .with("iva", self.iva)
            .with("recargo", self.recargo)
            .with("codsubcuentarep", self.codsubcuentarep.as_deref())
            .with("codsubcuentasop", self.codsubcuentasop.as_deref())
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            codimpuesto: row.get("codimpuesto")?,
            descripcion: row.get("descripcion")?,
            iva: row.get("iva")?,
            recargo: row.get("recargo")?,
            codsubcuentarep: row.get("codsubcuentarep")?,
            codsubcuentasop: row.get("codsubcuentasop")?,
        })
    }
}

impl Table for Series {
    const SCHEMA: &'static Schema = &Schema {
        table: "series",
        key: "codserie",
        columns: &[
            Column::text("codserie"),
            Column::text("descripcion"),
            Column::bool("siniva"),
            Column::decimal("irpf"),
            Column::int("numfactura"),
        ],
        unique: &[],
        order: &[("codserie", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        Row::new()
            .with("codserie", &self.codserie)
            .with("descripcion", &self.descripcion)
            .with("siniva", self.siniva)
            .with("irpf", self.irpf)
            .with("numfactura", self.numfactura)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            codserie: row.get("codserie")?,
            descripcion: row.get("descripcion")?,
            siniva: row.get("siniva")?,
            irpf: row.get("irpf")?,
            numfactura: row.get("numfactura")?,
        })
    }
}

impl Table for PaymentMethod {
    const SCHEMA: &'static Schema = &Schema {
        table: "formaspago",
        key: "codpago",
        columns: &[
            Column::text("codpago"),
            Column::text("descripcion"),
            Column::text("genrecibos"),
            Column::text("vencimiento"),
            Column::text("codsubcuenta").nullable(),
            Column::bool("domiciliado"),
        ],
        unique: &[],
        order: &[("descripcion", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        Row::new()
            .with("codpago", &self.codpago)
            .with("descripcion", &self.descripcion)
            .with("genrecibos", self.genrecibos)
            .with("vencimiento", self.vencimiento.to_string())
            .with("codsubcuenta", self.codsubcuenta.as_deref())
            .with("domiciliado", self.domiciliado)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            codpago: row.get("codpago")?,
            descripcion: row.get("descripcion")?,
            genrecibos: row.get("genrecibos")?,
            vencimiento: row.parse("vencimiento")?,
            codsubcuenta: row.get("codsubcuenta")?,
            domiciliado: row.get("domiciliado")?,
        })
    }
}
