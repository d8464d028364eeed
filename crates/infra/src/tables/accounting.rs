use contaerp_accounting::{
    Account, CustomerSubaccount, FiscalYear, JournalEntry, Posting, Subaccount, SupplierSubaccount,
};

use crate::db::{Column, Direction, Row, Schema, StoreError, Table};

impl Table for FiscalYear {
    const SCHEMA: &'static Schema = &Schema {
        table: "ejercicios",
        key: "codejercicio",
        columns: &[
            Column::text("codejercicio"),
            Column::text("nombre"),
            Column::date("fechainicio"),
            Column::date("fechafin"),
            Column::text("estado"),
            Column::int("longsubcuenta"),
            Column::uuid("idasientoapertura").nullable(),
            Column::uuid("idasientopyg").nullable(),
            Column::uuid("idasientocierre").nullable(),
        ],
        unique: &[],
        order: &[("fechainicio", Direction::Desc)],
    };

    fn to_row(&self) -> Row {
        Row::new()
            .with("codejercicio", &self.codejercicio)
            .with("nombre", &self.nombre)
            .with("fechainicio", self.fechainicio)
            .with("fechafin", self.fechafin)
            .with("estado", self.estado)
            .with("longsubcuenta", self.longsubcuenta)
            .with("idasientoapertura", self.idasientoapertura)
            .with("idasientopyg", self.idasientopyg)
            .with("idasientocierre", self.idasientocierre)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            codejercicio: row.get("codejercicio")?,
            nombre: row.get("nombre")?,
            fechainicio: row.get("fechainicio")?,
            fechafin: row.get("fechafin")?,
            estado: row.get("estado")?,
            longsubcuenta: row.get("longsubcuenta")?,
            idasientoapertura: row.get("idasientoapertura")?,
            idasientopyg: row.get("idasientopyg")?,
            idasientocierre: row.get("idasientocierre")?,
        })
    }
}

impl Table for Account {
    const SCHEMA: &'static Schema = &Schema {
        table: "co_cuentas",
        key: "id",
        columns: &[
            Column::uuid("id"),
            Column::text("codcuenta"),
            Column::text("codejercicio"),
            Column::text("descripcion"),
            Column::text("idcuentaesp").nullable(),
            Column::text("codepigrafe"),
        ],
        unique: &[&["codcuenta", "codejercicio"]],
        order: &[("codejercicio", Direction::Asc), ("codcuenta", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        Row::new()
            .with("id", self.id)
            .with("codcuenta", &self.codcuenta)
            .with("codejercicio", &self.codejercicio)
            .with("descripcion", &self.descripcion)
            .with("idcuentaesp", self.idcuentaesp)
            .with("codepigrafe", &self.codepigrafe)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.get("id")?,
            codcuenta: row.get("codcuenta")?,
            codejercicio: row.get("codejercicio")?,
            descripcion: row.get("descripcion")?,
            idcuentaesp: row.get("idcuentaesp")?,
            codepigrafe: row.get("codepigrafe")?,
        })
    }
}

impl Table for Subaccount {
    const SCHEMA: &'static Schema = &Schema {
        table: "co_subcuentas",
        key: "id",
        columns: &[
            Column::uuid("id"),
            Column::text("codsubcuenta"),
            Column::uuid("idcuenta"),
            Column::text("codcuenta"),
            Column::text("codejercicio"),
            Column::text("descripcion"),
            Column::text("coddivisa"),
            Column::text("codimpuesto").nullable(),
            Column::decimal("iva"),
            Column::decimal("recargo"),
            Column::decimal("debe"),
            Column::decimal("haber"),
            Column::decimal("saldo"),
        ],
        unique: &[&["codsubcuenta", "codejercicio"]],
        order: &[("codejercicio", Direction::Asc), ("codsubcuenta", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        Row::new()
            .with("id", self.id)
            .with("codsubcuenta", &self.codsubcuenta)
            .with("idcuenta", self.idcuenta)
            .with("codcuenta", &self.codcuenta)
            .with("codejercicio", &self.codejercicio)
            .with("descripcion", &self.descripcion)
            .with("coddivisa", &self.coddivisa)
            .with("codimpuesto", self.codimpuesto.as_deref())
            .with("iva", self.iva)
            .with("recargo", self.recargo)
            .with("debe", self.debe)
            .with("haber", self.haber)
            .with("saldo", self.saldo)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.get("id")?,
            codsubcuenta: row.get("codsubcuenta")?,
            idcuenta: row.get("idcuenta")?,
            codcuenta: row.get("codcuenta")?,
            codejercicio: row.get("codejercicio")?,
            descripcion: row.get("descripcion")?,
            coddivisa: row.get("coddivisa")?,
            codimpuesto: row.get("codimpuesto")?,
            iva: row.get("iva")?,
            recargo: row.get("recargo")?,
            debe: row.get("debe")?,
            haber: row.get("haber")?,
            saldo: row.get("saldo")?,
        })
    }
}

impl Table for CustomerSubaccount {
    const SCHEMA: &'static Schema = &Schema {
        table: "co_subcuentascli",
        key: "id",
        columns: &[
            Column::uuid("id"),
            Column::text("codcliente"),
            Column::uuid("idsubcuenta"),
            Column::text("codsubcuenta"),
            Column::text("codejercicio"),
        ],
        unique: &[&["codcliente", "codejercicio"]],
        order: &[("codejercicio", Direction::Asc), ("codcliente", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        Row::new()
            .with("id", self.id)
            .with("codcliente", &self.codcliente)
            .with("idsubcuenta", self.idsubcuenta)
            .with("codsubcuenta", &self.codsubcuenta)
            .with("codejercicio", &self.codejercicio)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.get("id")?,
            codcliente: row.get("codcliente")?,
            idsubcuenta: row.get("idsubcuenta")?,
            codsubcuenta: row.get("codsubcuenta")?,
            codejercicio: row.get("codejercicio")?,
        })
    }
}

impl Table for SupplierSubaccount {
    const SCHEMA: &'static Schema = &Schema {
        table: "co_subcuentasprov",
        key: "id",
        columns: &[
            Column::uuid("id"),
            Column::text("codproveedor"),
            Column::uuid("idsubcuenta"),
            Column::text("codsubcuenta"),
            Column::text("codejercicio"),
        ],
        unique: &[&["codproveedor", "codejercicio"]],
        order: &[("codejercicio", Direction::Asc), ("codproveedor", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        Row::new()
            .with("id", self.id)
            .with("codproveedor", &self.codproveedor)
            .with("idsubcuenta", self.idsubcuenta)
            .with("codsubcuenta", &self.codsubcuenta)
            .with("codejercicio", &self.codejercicio)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.get("id")?,
            codproveedor: row.get("codproveedor")?,
            idsubcuenta: row.get("idsubcuenta")?,
            codsubcuenta: row.get("codsubcuenta")?,
            codejercicio: row.get("codejercicio")?,
        })
    }
}

impl Table for JournalEntry {
    const SCHEMA: &'static Schema = &Schema {
        table: "co_asientos",
        key: "id",
        columns: &[
            Column::uuid("id"),
            Column::int("numero"),
            Column::text("codejercicio"),
            Column::date("fecha"),
            Column::text("concepto"),
            Column::decimal("importe"),
            Column::bool("editable"),
            Column::text("documento"),
            Column::text("tipodocumento"),
        ],
        unique: &[],
        order: &[("fecha", Direction::Desc), ("numero", Direction::Desc)],
    };

    fn to_row(&self) -> Row {
        Row::new()
            .with("id", self.id)
            .with("numero", self.numero)
            .with("codejercicio", &self.codejercicio)
            .with("fecha", self.fecha)
            .with("concepto", &self.concepto)
            .with("importe", self.importe)
            .with("editable", self.editable)
            .with("documento", &self.documento)
            .with("tipodocumento", self.tipodocumento)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.get("id")?,
            numero: row.get("numero")?,
            codejercicio: row.get("codejercicio")?,
            fecha: row.get("fecha")?,
            concepto: row.get("concepto")?,
            importe: row.get("importe")?,
            editable: row.get("editable")?,
            documento: row.get("documento")?,
            tipodocumento: row.get("tipodocumento")?,
        })
    }
}

impl Table for Posting {
    const SCHEMA: &'static Schema = &Schema {
        table: "co_partidas",
        key: "id",
        columns: &[
            Column::uuid("id"),
            Column::uuid("idasiento"),
            Column::uuid("idsubcuenta"),
            Column::text("codsubcuenta"),
            Column::text("concepto"),
            Column::decimal("debe"),
            Column::decimal("haber"),
            Column::text("coddivisa"),
            Column::decimal("tasaconv"),
            Column::decimal("debeme"),
            Column::decimal("haberme"),
            Column::decimal("iva"),
            Column::decimal("recargo"),
            Column::decimal("baseimponible"),
            Column::uuid("idcontrapartida").nullable(),
            Column::text("codcontrapartida").nullable(),
            Column::text("documento"),
            Column::text("cifnif"),
            Column::bool("punteada"),
        ],
        unique: &[],
        order: &[("idasiento", Direction::Asc), ("id", Direction::Asc)],
    };

    fn to_row(&self) -> Row {
        Row::new()
            .with("id", self.id)
            .with("idasiento", self.idasiento)
            .with("idsubcuenta", self.idsubcuenta)
            .with("codsubcuenta", &self.codsubcuenta)
            .with("concepto", &self.concepto)
            .with("debe", self.debe)
            .with("haber", self.haber)
            .with("coddivisa", &self.coddivisa)
            .with("tasaconv", self.tasaconv)
            .with("debeme", self.debeme)
            .with("haberme", self.haberme)
            .with("iva", self.iva)
            .with("recargo", self.recargo)
            .with("baseimponible", self.baseimponible)
            .with("idcontrapartida", self.idcontrapartida)
            .with("codcontrapartida", self.codcontrapartida.as_deref())
            .with("documento", &self.documento)
            .with("cifnif", &self.cifnif)
            .with("punteada", self.punteada)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.get("id")?,
            idasiento: row.get("idasiento")?,
            idsubcuenta: row.get("idsubcuenta")?,
            codsubcuenta: row.get("codsubcuenta")?,
            concepto: row.get("concepto")?,
            debe: row.get("debe")?,
            haber: row.get("haber")?,
            coddivisa: row.get("coddivisa")?,
            tasaconv: row.get("tasaconv")?,
            debeme: row.get("debeme")?,
            haberme: row.get("haberme")?,
            iva: row.get("iva")?,
            recargo: row.get("recargo")?,
            baseimponible: row.get("baseimponible")?,
            idcontrapartida: row.get("idcontrapartida")?,
            codcontrapartida: row.get("codcontrapartida")?,
            documento: row.get("documento")?,
            cifnif: row.get("cifnif")?,
            punteada: row.get("punteada")?,
        })
    }
}
