use tracing::{info, instrument};

use contaerp_core::DomainError;
use contaerp_invoicing::{CustomerInvoice, SupplierInvoice};
use contaerp_parties::{customer, next_numeric_code, supplier, Customer, CustomerAddress, Supplier, SupplierAddress};
use contaerp_sales::CustomerDeliveryNote;

use super::{ServiceResult, Services};
use crate::db::Filter;

const CUSTOMER_SEARCH: &[&str] = &["codcliente", "nombre", "razonsocial", "cifnif", "telefono1", "telefono2", "email"];
const SUPPLIER_SEARCH: &[&str] = &["codproveedor", "nombre", "razonsocial", "cifnif", "telefono1", "telefono2", "email"];

impl Services {
    pub async fn next_customer_code(&self) -> ServiceResult<String> {
        let codes: Vec<String> = self.repo::<Customer>().all().await?.into_iter().map(|c| c.codcliente).collect();
        Ok(next_numeric_code(codes.iter().map(String::as_str), customer::CODE_WIDTH))
    }

    pub async fn next_supplier_code(&self) -> ServiceResult<String> {
        let codes: Vec<String> = self.repo::<Supplier>().all().await?.into_iter().map(|s| s.codproveedor).collect();
        Ok(next_numeric_code(codes.iter().map(String::as_str), supplier::CODE_WIDTH))
    }

    /// Customers by name, one page at `offset`.
    pub async fn customers(&self, offset: i64) -> ServiceResult<Vec<Customer>> {
        self.page(Filter::All, offset).await
    }

    pub async fn search_customers(&self, text: &str, offset: i64) -> ServiceResult<Vec<Customer>> {
        self.page(Filter::search(CUSTOMER_SEARCH, text.trim()), offset).await
    }

    pub async fn suppliers(&self, offset: i64) -> ServiceResult<Vec<Supplier>> {
        self.page(Filter::All, offset).await
    }

    pub async fn search_suppliers(&self, text: &str, offset: i64) -> ServiceResult<Vec<Supplier>> {
        self.page(Filter::search(SUPPLIER_SEARCH, text.trim()), offset).await
    }

    pub async fn customer_addresses(&self, codcliente: &str) -> ServiceResult<Vec<CustomerAddress>> {
        Ok(self
            .repo::<CustomerAddress>()
            .find_where(Filter::eq("codcliente", codcliente))
            .await?)
    }

    pub async fn supplier_addresses(&self, codproveedor: &str) -> ServiceResult<Vec<SupplierAddress>> {
        Ok(self
            .repo::<SupplierAddress>()
            .find_where(Filter::eq("codproveedor", codproveedor))
            .await?)
    }

    /// Save an address; a billing or shipping flag moves off the customer's other addresses.
    #[instrument(skip(self, address), fields(codcliente = %address.codcliente), err)]
    pub async fn save_customer_address(&self, address: &CustomerAddress) -> ServiceResult<()> {
        let repo = self.repo::<CustomerAddress>();
        repo.save(address).await?;
        if !address.domfacturacion && !address.domenvio {
            return Ok(());
        }
        for mut other in self.customer_addresses(&address.codcliente).await? {
            if other.id == address.id {
                continue;
            }
            let before = (other.domfacturacion, other.domenvio);
            other.domfacturacion &= !address.domfacturacion;
            other.domenvio &= !address.domenvio;
            if (other.domfacturacion, other.domenvio) != before {
                repo.save(&other).await?;
            }
        }
        Ok(())
    }

    /// Save an address; a main address demotes the supplier's others.
    #[instrument(skip(self, address), fields(codproveedor = %address.codproveedor), err)]
    pub async fn save_supplier_address(&self, address: &SupplierAddress) -> ServiceResult<()> {
        let repo = self.repo::<SupplierAddress>();
        repo.save(address).await?;
        if !address.direccionppal {
            return Ok(());
        }
        for mut other in self.supplier_addresses(&address.codproveedor).await? {
            if other.id != address.id && other.direccionppal {
                other.direccionppal = false;
                repo.save(&other).await?;
            }
        }
        Ok(())
    }

    /// Delete a customer with its addresses. Customers with documents are kept.
    #[instrument(skip(self), err)]
    pub async fn delete_customer(&self, codcliente: &str) -> ServiceResult<bool> {
        let party = Filter::eq("codcliente", codcliente);
        let documents = self.repo::<CustomerInvoice>().count(party.clone()).await?
            + self.repo::<CustomerDeliveryNote>().count(party.clone()).await?;
        if documents > 0 {
            return Err(DomainError::conflict(format!("customer {codcliente} has {documents} documents")).into());
        }
        let addresses = self.repo::<CustomerAddress>().delete_where(party).await?;
        let deleted = self.repo::<Customer>().delete(&codcliente.to_string()).await?;
        if deleted {
            info!(addresses, "deleted customer");
        }
        Ok(deleted)
    }

    /// Delete a supplier with its addresses. Suppliers with invoices are kept.
    #[instrument(skip(self), err)]
    pub async fn delete_supplier(&self, codproveedor: &str) -> ServiceResult<bool> {
        let party = Filter::eq("codproveedor", codproveedor);
        let invoices = self.repo::<SupplierInvoice>().count(party.clone()).await?;
        if invoices > 0 {
            return Err(DomainError::conflict(format!("supplier {codproveedor} has {invoices} invoices")).into());
        }
        let addresses = self.repo::<SupplierAddress>().delete_where(party).await?;
        let deleted = self.repo::<Supplier>().delete(&codproveedor.to_string()).await?;
        if deleted {
            info!(addresses, "deleted supplier");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use contaerp_parties::PostalAddress;

    use super::super::fixtures::{date, seeded};
    use super::super::ServiceError;
    use super::*;

    fn street(direccion: &str) -> PostalAddress {
        PostalAddress {
            direccion: direccion.to_string(),
            ..PostalAddress::default()
        }
    }

    #[tokio::test]
    async fn codes_follow_the_largest_numeric_code() {
        let services = seeded().await;
        let mut odd = Customer::new("VIP", "Cliente especial", services.defaults(), date(2024, 1, 1));
        odd.codpago = "CONT".to_string();
        services.repo::<Customer>().save(&odd).await.unwrap();
        assert_eq!(services.next_customer_code().await.unwrap(), "000002");
        assert_eq!(services.next_supplier_code().await.unwrap(), "000002");
    }

    #[tokio::test]
    async fn search_matches_names_tax_ids_and_phones() {
        let services = seeded().await;
        let mut other = Customer::new("000002", "Bar Manolo", services.defaults(), date(2024, 1, 1));
        other.telefono1 = "961234567".to_string();
        services.repo::<Customer>().save(&other).await.unwrap();

        let found = services.search_customers("ferreter", 0).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].codcliente, "000001");
        assert_eq!(services.search_customers("B1234", 0).await.unwrap().len(), 1);
        assert_eq!(services.search_customers(" 9612 ", 0).await.unwrap()[0].codcliente, "000002");

        let page = services.customers(0).await.unwrap();
        assert_eq!(page[0].nombre, "Bar Manolo");
        assert_eq!(services.search_suppliers("aceros", 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn a_new_billing_address_takes_the_flag() {
        let services = seeded().await;
        let first = CustomerAddress::new("000001", street("C/ Mayor 1"), date(2024, 1, 1));
        services.save_customer_address(&first).await.unwrap();
        let mut second = CustomerAddress::new("000001", street("Av. del Puerto 8"), date(2024, 2, 1));
        second.domenvio = false;
        services.save_customer_address(&second).await.unwrap();

        let addresses = services.customer_addresses("000001").await.unwrap();
        let old = addresses.iter().find(|a| a.id == first.id).unwrap();
        assert!(!old.domfacturacion);
        assert!(old.domenvio);
    }

    #[tokio::test]
    async fn one_main_supplier_address() {
        let services = seeded().await;
        let first = SupplierAddress::new("000001", street("Pol. Ind. Norte 3"), date(2024, 1, 1));
        let second = SupplierAddress::new("000001", street("C/ Acero 12"), date(2024, 3, 1));
        services.save_supplier_address(&first).await.unwrap();
        services.save_supplier_address(&second).await.unwrap();

        let main: Vec<_> = services
            .supplier_addresses("000001")
            .await
            .unwrap()
            .into_iter()
            .filter(|a| a.direccionppal)
            .collect();
        assert_eq!(main.len(), 1);
        assert_eq!(main[0].id, second.id);
    }

    #[tokio::test]
    async fn deleting_a_customer_removes_its_addresses() {
        let services = seeded().await;
        services
            .save_customer_address(&CustomerAddress::new("000001", street("C/ Mayor 1"), date(2024, 1, 1)))
            .await
            .unwrap();
        assert!(services.delete_customer("000001").await.unwrap());
        assert!(services.customer_addresses("000001").await.unwrap().is_empty());
        assert!(!services.delete_customer("000001").await.unwrap());
    }

    #[tokio::test]
    async fn customers_with_documents_are_kept() {
        let services = seeded().await;
        let customer = services.repo::<Customer>().get(&"000001".to_string()).await.unwrap().unwrap();
        let mut note = CustomerDeliveryNote::for_customer(
            "2024",
            &customer,
            services.defaults(),
            date(2024, 4, 1),
            chrono::NaiveTime::MIN,
        );
        note.header.assign_number(1);
        services.repo::<CustomerDeliveryNote>().save(&note).await.unwrap();

        match services.delete_customer("000001").await {
            Err(ServiceError::Domain(DomainError::Conflict(msg))) => assert!(msg.contains("1 documents"), "{msg}"),
            other => panic!("expected Conflict, got {other:?}"),
        }
    }
}
