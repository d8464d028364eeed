use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use contaerp_core::DomainError;
use contaerp_inventory::{total_quantity, Stock, Warehouse};
use contaerp_products::Article;

use super::{ServiceError, ServiceResult, Services};
use crate::db::Filter;

impl Services {
    /// Apply `delta` to the stock of an article in a warehouse.
    ///
    /// Creates the stock row on first movement and recomputes the article's
    /// `stockfis`. Returns `None` for articles that do not track stock.
    #[instrument(skip(self), fields(%delta), err)]
    pub async fn move_stock(&self, referencia: &str, codalmacen: &str, delta: Decimal) -> ServiceResult<Option<Stock>> {
        let mut article = self
            .repo::<Article>()
            .get(&referencia.to_string())
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("article {referencia}")))?;
        if !article.tracks_stock() {
            debug!("article does not track stock");
            return Ok(None);
        }
        if !self.repo::<Warehouse>().exists(&codalmacen.to_string()).await? {
            return Err(ServiceError::not_found(format!("warehouse {codalmacen}")));
        }

        let stocks = self.repo::<Stock>();
        let mut stock = match stocks
            .first(Filter::eq("referencia", referencia).and(Filter::eq("codalmacen", codalmacen)))
            .await?
        {
            Some(stock) => stock,
            None => {
                let mut stock = Stock::new(codalmacen, referencia);
                stock.nombre = article.descripcion.clone();
                stock
            }
        };

        if delta.is_sign_negative() && !article.can_sell(-delta, stock.disponible) {
            return Err(DomainError::validation(format!(
                "not enough stock of {referencia} in {codalmacen}: {} available, {} requested",
                stock.disponible, -delta
            ))
            .into());
        }
        stock.add_quantity(delta);
        stocks.save(&stock).await?;

        let rows = stocks.find_where(Filter::eq("referencia", referencia)).await?;
        article.stockfis = total_quantity(&rows, referencia);
        self.repo::<Article>().save(&article).await?;
        if article.below_minimum() {
            info!(stockfis = %article.stockfis, stockmin = %article.stockmin, "article below minimum stock");
        }
        Ok(Some(stock))
    }

    /// Like [`move_stock`](Self::move_stock), but lines naming no known article are skipped.
    pub(super) async fn move_line_stock(&self, referencia: Option<&str>, codalmacen: &str, delta: Decimal) -> ServiceResult<()> {
        let Some(referencia) = referencia else {
            return Ok(());
        };
        if delta.is_zero() || !self.repo::<Article>().exists(&referencia.to_string()).await? {
            return Ok(());
        }
        self.move_stock(referencia, codalmacen, delta).await?;
        Ok(())
    }

    /// Stock rows of an article, one per warehouse.
    pub async fn stock_of(&self, referencia: &str) -> ServiceResult<Vec<Stock>> {
        Ok(self
            .repo::<Stock>()
            .find_where(Filter::eq("referencia", referencia))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::super::fixtures::seeded;
    use super::*;

    #[tokio::test]
    async fn movements_update_the_row_and_the_article_total() {
        let services = seeded().await;
        services
            .repo::<Warehouse>()
            .save(&Warehouse::new("VAL", "Valencia"))
            .await
            .unwrap();

        services.move_stock("TALADRO", "ALG", dec!(10)).await.unwrap();
        services.move_stock("TALADRO", "VAL", dec!(4)).await.unwrap();
        let stock = services.move_stock("TALADRO", "ALG", dec!(-3)).await.unwrap().unwrap();
        assert_eq!(stock.cantidad, dec!(7));
        assert_eq!(stock.disponible, dec!(7));
        assert_eq!(stock.nombre, "Taladro percutor");

        let article = services.repo::<Article>().get(&"TALADRO".to_string()).await.unwrap().unwrap();
        assert_eq!(article.stockfis, dec!(11));
        assert_eq!(services.stock_of("TALADRO").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn negative_stock_is_refused_unless_allowed() {
        let services = seeded().await;
        services.move_stock("CEMENTO", "ALG", dec!(2)).await.unwrap();
        match services.move_stock("CEMENTO", "ALG", dec!(-5)).await {
            Err(ServiceError::Domain(DomainError::Validation(msg))) => assert!(msg.contains("2 available"), "{msg}"),
            other => panic!("expected Validation, got {other:?}"),
        }

        let repo = services.repo::<Article>();
        let mut cement = repo.get(&"CEMENTO".to_string()).await.unwrap().unwrap();
        cement.controlstock = true;
        repo.save(&cement).await.unwrap();
        let stock = services.move_stock("CEMENTO", "ALG", dec!(-5)).await.unwrap().unwrap();
        assert_eq!(stock.cantidad, dec!(-3));
    }

    #[tokio::test]
    async fn untracked_articles_and_unknown_warehouses() {
        let services = seeded().await;
        let repo = services.repo::<Article>();
        let mut drill = repo.get(&"TALADRO".to_string()).await.unwrap().unwrap();
        drill.nostock = true;
        repo.save(&drill).await.unwrap();
        assert!(services.move_stock("TALADRO", "ALG", dec!(-1)).await.unwrap().is_none());
        assert!(services.stock_of("TALADRO").await.unwrap().is_empty());

        match services.move_stock("CEMENTO", "XXX", dec!(1)).await {
            Err(ServiceError::NotFound(what)) => assert_eq!(what, "warehouse XXX"),
            other => panic!("expected NotFound, got {other:?}"),
        }
        services.move_line_stock(Some("NOPE"), "ALG", dec!(1)).await.unwrap();
    }
}
