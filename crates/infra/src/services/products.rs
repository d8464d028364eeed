use rust_decimal::Decimal;
use tracing::instrument;

use contaerp_core::DomainError;
use contaerp_products::{Article, Family};

use super::{ServiceResult, Services};
use crate::db::Filter;

const ARTICLE_SEARCH: &[&str] = &["referencia", "descripcion", "codbarras", "equivalencia"];

impl Services {
    /// Articles matching `text`, optionally narrowed to a family and to articles with stock.
    pub async fn search_articles(
        &self,
        text: &str,
        codfamilia: Option<&str>,
        with_stock_only: bool,
        offset: i64,
    ) -> ServiceResult<Vec<Article>> {
        let mut filter = Filter::All;
        let text = text.trim();
        if !text.is_empty() {
            filter = filter.and(Filter::search(ARTICLE_SEARCH, text));
        }
        if let Some(codfamilia) = codfamilia {
            filter = filter.and(Filter::eq("codfamilia", codfamilia));
        }
        if with_stock_only {
            filter = filter.and(Filter::ne("stockfis", Decimal::ZERO));
        }
        self.page(filter, offset).await
    }

    pub async fn articles(&self, offset: i64) -> ServiceResult<Vec<Article>> {
        self.page(Filter::All, offset).await
    }

    pub async fn articles_by_family(&self, codfamilia: &str, offset: i64) -> ServiceResult<Vec<Article>> {
        self.page(Filter::eq("codfamilia", codfamilia), offset).await
    }

    pub async fn articles_by_manufacturer(&self, codfabricante: &str, offset: i64) -> ServiceResult<Vec<Article>> {
        self.page(Filter::eq("codfabricante", codfabricante), offset).await
    }

    /// Tracked articles whose stock is under their minimum.
    pub async fn articles_below_minimum(&self) -> ServiceResult<Vec<Article>> {
        let candidates = self
            .repo::<Article>()
            .find_where(Filter::eq("nostock", false).and(Filter::ne("stockmin", Decimal::ZERO)))
            .await?;
        Ok(candidates.into_iter().filter(Article::below_minimum).collect())
    }

    /// Save a family whose parent, when set, already exists.
    #[instrument(skip(self, family), fields(codfamilia = %family.codfamilia), err)]
    pub async fn save_family(&self, family: &Family) -> ServiceResult<()> {
        if let Some(madre) = &family.madre {
            if !self.repo::<Family>().exists(madre).await? {
                return Err(DomainError::validation(format!("parent family {madre} does not exist")).into());
            }
        }
        self.repo::<Family>().save(family).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::super::fixtures::seeded;
    use super::super::ServiceError;
    use super::*;

    #[tokio::test]
    async fn search_by_text_family_and_stock() {
        let services = seeded().await;
        services.save_family(&Family::new("HERR", "Herramientas")).await.unwrap();
        let repo = services.repo::<Article>();
        let mut drill = repo.get(&"TALADRO".to_string()).await.unwrap().unwrap();
        drill.codfamilia = Some("HERR".to_string());
        repo.save(&drill).await.unwrap();
        services.move_stock("CEMENTO", "ALG", dec!(40)).await.unwrap();

        assert_eq!(services.search_articles("saco", None, false, 0).await.unwrap().len(), 1);
        assert_eq!(services.search_articles("", None, false, 0).await.unwrap().len(), 2);
        let in_family = services.search_articles("", Some("HERR"), false, 0).await.unwrap();
        assert_eq!(in_family[0].referencia, "TALADRO");
        let stocked = services.search_articles("", None, true, 0).await.unwrap();
        assert_eq!(stocked.len(), 1);
        assert_eq!(stocked[0].referencia, "CEMENTO");
        assert_eq!(services.articles_by_family("HERR", 0).await.unwrap().len(), 1);
        assert!(services.articles_by_manufacturer("BOSCH", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn minimum_stock_report() {
        let services = seeded().await;
        let repo = services.repo::<Article>();
        let mut cement = repo.get(&"CEMENTO".to_string()).await.unwrap().unwrap();
        cement.stockmin = dec!(10);
        repo.save(&cement).await.unwrap();
        services.move_stock("CEMENTO", "ALG", dec!(4)).await.unwrap();

        let low = services.articles_below_minimum().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].stockfis, dec!(4));
    }

    #[tokio::test]
    async fn a_family_needs_an_existing_parent() {
        let services = seeded().await;
        let mut child = Family::new("BROC", "Brocas");
        child.madre = Some("HERR".to_string());
        match services.save_family(&child).await {
            Err(ServiceError::Domain(DomainError::Validation(msg))) => assert!(msg.contains("HERR")),
            other => panic!("expected Validation, got {other:?}"),
        }
        services.save_family(&Family::new("HERR", "Herramientas")).await.unwrap();
        services.save_family(&child).await.unwrap();
    }
}
