//! Row mappings for every record.
//!
//! Each submodule implements [`Table`](crate::db::Table) for the records of one
//! domain crate. Shared pieces (postal addresses, document headers, document
//! lines, invoice status) are written and read by the helpers below.

use uuid::Uuid;

use contaerp_accounting::{
    AccountId, EntryDocumentType, FiscalYearStatus, JournalEntryId, PartySubaccountId, PostingId, SpecialAccount,
    SubaccountId,
};
use contaerp_documents::{DocumentHeader, DocumentLine, DocumentTotals, PartySnapshot};
use contaerp_inventory::StockId;
use contaerp_invoicing::{CustomerInvoiceId, InvoiceLineId, InvoiceStatus, InvoiceTaxLineId, SupplierInvoiceId};
use contaerp_masters::ReceiptMode;
use contaerp_parties::{AddressId, PostalAddress, TaxRegime};
use contaerp_purchasing::{SupplierDeliveryNoteId, SupplierNoteLineId};
use contaerp_sales::{CustomerDeliveryNoteId, DeliveryNoteLineId};

use crate::db::{FromValue, Row, StoreError, Value};

/// UUID newtypes stored in `uuid` columns.
macro_rules! uuid_columns {
    ($($id:ty),* $(,)?) => {$(
        impl From<$id> for Value {
            fn from(id: $id) -> Self {
                Value::Uuid(id.into())
            }
        }

        impl FromValue for $id {
            const KIND: &'static str = "uuid";

            fn from_value(value: &Value) -> Option<Self> {
                Uuid::from_value(value).map(<$id>::from)
            }
        }
    )*};
}

/// Enum tags stored as their `as_str` text.
macro_rules! tag_columns {
    ($($tag:ty),* $(,)?) => {$(
        impl From<$tag> for Value {
            fn from(tag: $tag) -> Self {
                Value::Text(tag.as_str().to_string())
            }
        }

        impl FromValue for $tag {
            const KIND: &'static str = stringify!($tag);

            fn from_value(value: &Value) -> Option<Self> {
                value.as_text().and_then(|s| s.parse().ok())
            }
        }
    )*};
}

uuid_columns!(
    AddressId,
    StockId,
    CustomerDeliveryNoteId,
    DeliveryNoteLineId,
    SupplierDeliveryNoteId,
    SupplierNoteLineId,
    CustomerInvoiceId,
    SupplierInvoiceId,
    InvoiceLineId,
    InvoiceTaxLineId,
    AccountId,
    SubaccountId,
    PartySubaccountId,
    JournalEntryId,
    PostingId,
);

tag_columns!(TaxRegime, ReceiptMode, SpecialAccount, EntryDocumentType, FiscalYearStatus);

/// Columns of a business-document header; extra columns follow.
macro_rules! document_columns {
    ($code:literal, $name:literal; $($extra:expr),* $(,)?) => {
        &[
            Column::uuid("id"),
            Column::text("codigo"),
            Column::int("numero"),
            Column::text("codserie"),
            Column::text("codejercicio"),
            Column::date("fecha"),
            Column::time("hora"),
            Column::text($code),
            Column::text($name),
            Column::text("cifnif"),
            Column::text("direccion"),
            Column::text("codpostal"),
            Column::text("ciudad"),
            Column::text("provincia"),
            Column::text("codpais"),
            Column::text("apartado"),
            Column::text("codalmacen"),
            Column::text("coddivisa"),
            Column::decimal("tasaconv"),
            Column::text("codpago"),
            Column::text("codagente").nullable(),
            Column::decimal("irpf"),
            Column::decimal("neto"),
            Column::decimal("totaliva"),
            Column::decimal("totalrecargo"),
            Column::decimal("totalirpf"),
            Column::decimal("total"),
            Column::decimal("totaleuros"),
            Column::text("observaciones"),
            $($extra),*
        ]
    };
}

/// Columns of a document line; the owner columns come first.
macro_rules! line_columns {
    ($($owner:expr),* $(,)?) => {
        &[
            Column::uuid("id"),
            $($owner,)*
            Column::text("referencia").nullable(),
            Column::text("descripcion"),
            Column::decimal("cantidad"),
            Column::decimal("pvpunitario"),
            Column::decimal("dtopor"),
            Column::decimal("pvpsindto"),
            Column::decimal("pvptotal"),
            Column::text("codimpuesto").nullable(),
            Column::decimal("iva"),
            Column::decimal("recargo"),
            Column::decimal("irpf"),
        ]
    };
}

mod accounting;
mod documents;
mod inventory;
mod invoices;
mod masters;
mod parties;
mod products;

/// Column names of the party on a document header.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PartyColumns {
    pub code: &'static str,
    pub name: &'static str,
}

pub(crate) const CUSTOMER_PARTY: PartyColumns = PartyColumns {
    code: "codcliente",
    name: "nombrecliente",
};

pub(crate) const SUPPLIER_PARTY: PartyColumns = PartyColumns {
    code: "codproveedor",
    name: "nombre",
};

pub(crate) fn put_address(row: Row, a: &PostalAddress) -> Row {
    row.with("direccion", &a.direccion)
        .with("codpostal", &a.codpostal)
        .with("ciudad", &a.ciudad)
        .with("provincia", &a.provincia)
        .with("codpais", &a.codpais)
        .with("apartado", &a.apartado)
}

pub(crate) fn read_address(row: &Row) -> Result<PostalAddress, StoreError> {
    Ok(PostalAddress {
        direccion: row.get("direccion")?,
        codpostal: row.get("codpostal")?,
        ciudad: row.get("ciudad")?,
        provincia: row.get("provincia")?,
        codpais: row.get("codpais")?,
        apartado: row.get("apartado")?,
    })
}

pub(crate) fn put_header(row: Row, h: &DocumentHeader, party: PartyColumns) -> Row {
    let t = &h.totals;
    let row = row
        .with("codigo", &h.codigo)
        .with("numero", h.numero)
        .with("codserie", &h.codserie)
        .with("codejercicio", &h.codejercicio)
        .with("fecha", h.fecha)
        .with("hora", h.hora)
        .with(party.code, &h.party.code)
        .with(party.name, &h.party.nombre)
        .with("cifnif", &h.party.cifnif)
        .with("codalmacen", &h.codalmacen)
        .with("coddivisa", &h.coddivisa)
        .with("tasaconv", h.tasaconv)
        .with("codpago", &h.codpago)
        .with("codagente", h.codagente.as_deref())
        .with("irpf", h.irpf)
        .with("neto", t.neto)
        .with("totaliva", t.totaliva)
        .with("totalrecargo", t.totalrecargo)
        .with("totalirpf", t.totalirpf)
        .with("total", t.total)
        .with("totaleuros", h.totaleuros)
        .with("observaciones", &h.observaciones);
    put_address(row, &h.party.address)
}

pub(crate) fn read_header(row: &Row, party: PartyColumns) -> Result<DocumentHeader, StoreError> {
    Ok(DocumentHeader {
        codigo: row.get("codigo")?,
        numero: row.get("numero")?,
        codserie: row.get("codserie")?,
        codejercicio: row.get("codejercicio")?,
        fecha: row.get("fecha")?,
        hora: row.get("hora")?,
        party: PartySnapshot {
            code: row.get(party.code)?,
            nombre: row.get(party.name)?,
            cifnif: row.get("cifnif")?,
            address: read_address(row)?,
        },
        codalmacen: row.get("codalmacen")?,
        coddivisa: row.get("coddivisa")?,
        tasaconv: row.get("tasaconv")?,
        codpago: row.get("codpago")?,
        codagente: row.get("codagente")?,
        irpf: row.get("irpf")?,
        totals: DocumentTotals {
            neto: row.get("neto")?,
            totaliva: row.get("totaliva")?,
            totalrecargo: row.get("totalrecargo")?,
            totalirpf: row.get("totalirpf")?,
            total: row.get("total")?,
        },
        totaleuros: row.get("totaleuros")?,
        observaciones: row.get("observaciones")?,
    })
}

pub(crate) fn put_line(row: Row, l: &DocumentLine) -> Row {
    row.with("referencia", l.referencia.as_deref())
        .with("descripcion", &l.descripcion)
        .with("cantidad", l.cantidad)
        .with("pvpunitario", l.pvpunitario)
        .with("dtopor", l.dtopor)
        .with("pvpsindto", l.pvpsindto)
        .with("pvptotal", l.pvptotal)
        .with("codimpuesto", l.codimpuesto.as_deref())
        .with("iva", l.iva)
        .with("recargo", l.recargo)
        .with("irpf", l.irpf)
}

pub(crate) fn read_line(row: &Row) -> Result<DocumentLine, StoreError> {
    Ok(DocumentLine {
        referencia: row.get("referencia")?,
        descripcion: row.get("descripcion")?,
        cantidad: row.get("cantidad")?,
        pvpunitario: row.get("pvpunitario")?,
        dtopor: row.get("dtopor")?,
        pvpsindto: row.get("pvpsindto")?,
        pvptotal: row.get("pvptotal")?,
        codimpuesto: row.get("codimpuesto")?,
        iva: row.get("iva")?,
        recargo: row.get("recargo")?,
        irpf: row.get("irpf")?,
    })
}

pub(crate) fn put_status(row: Row, s: &InvoiceStatus) -> Row {
    row.with("vencimiento", s.vencimiento)
        .with("pagada", s.pagada)
        .with("anulada", s.anulada)
        .with("idasiento", s.idasiento)
        .with("idasientop", s.idasientop)
}

pub(crate) fn read_status(row: &Row) -> Result<InvoiceStatus, StoreError> {
    Ok(InvoiceStatus {
        vencimiento: row.get("vencimiento")?,
        pagada: row.get("pagada")?,
        anulada: row.get("anulada")?,
        idasiento: row.get("idasiento")?,
        idasientop: row.get("idasientop")?,
    })
}
