use chrono::{Datelike, NaiveDate};
use tracing::{info, instrument};

use contaerp_accounting::{calendar_code, FiscalYear};

use super::{ServiceError, ServiceResult, Services};
use crate::db::{Filter, Query};

impl Services {
    /// Fiscal year containing `date`.
    ///
    /// With `create`, a calendar year is opened when none contains the date.
    #[instrument(skip(self), err)]
    pub async fn fiscal_year_for(&self, date: NaiveDate, create: bool) -> ServiceResult<Option<FiscalYear>> {
        let repo = self.repo::<FiscalYear>();
        let found = repo
            .first(Filter::lte("fechainicio", date).and(Filter::gte("fechafin", date)))
            .await?;
        if found.is_some() || !create {
            return Ok(found);
        }

        let existing: Vec<String> = repo.all().await?.into_iter().map(|y| y.codejercicio).collect();
        let code = calendar_code(date, &existing);
        let year = FiscalYear::calendar(code, date.year(), self.defaults().longsubcuenta)?;
        repo.save(&year).await?;
        info!(codejercicio = %year.codejercicio, "opened fiscal year");
        Ok(Some(year))
    }

    /// Fiscal year that accepts documents dated `date`, creating it if needed.
    pub async fn open_year(&self, date: NaiveDate) -> ServiceResult<FiscalYear> {
        let year = self
            .fiscal_year_for(date, true)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("fiscal year for {date}")))?;
        year.accepts(date)?;
        Ok(year)
    }

    pub async fn fiscal_year(&self, codejercicio: &str) -> ServiceResult<FiscalYear> {
        self.repo::<FiscalYear>()
            .get(&codejercicio.to_string())
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("fiscal year {codejercicio}")))
    }

    /// Every fiscal year, most recent first.
    pub async fn fiscal_years(&self) -> ServiceResult<Vec<FiscalYear>> {
        let repo = self.repo::<FiscalYear>();
        Ok(repo.find(repo.ordered(Query::all())).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn close_fiscal_year(&self, codejercicio: &str) -> ServiceResult<FiscalYear> {
        let mut year = self.fiscal_year(codejercicio).await?;
        year.close();
        self.repo::<FiscalYear>().save(&year).await?;
        info!("closed fiscal year");
        Ok(year)
    }
}

#[cfg(test)]
mod tests {
    use contaerp_core::DomainError;

    use super::super::fixtures::date;
    use super::*;

    #[tokio::test]
    async fn a_calendar_year_is_opened_on_demand() {
        let services = Services::in_memory();
        assert!(services.fiscal_year_for(date(2024, 3, 1), false).await.unwrap().is_none());

        let year = services.fiscal_year_for(date(2024, 3, 1), true).await.unwrap().unwrap();
        assert_eq!(year.codejercicio, "2024");
        assert_eq!(year.fechainicio, date(2024, 1, 1));
        assert_eq!(year.longsubcuenta, 10);

        let again = services.fiscal_year_for(date(2024, 12, 31), true).await.unwrap().unwrap();
        assert_eq!(again, year);
        assert_eq!(services.fiscal_years().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn a_taken_code_falls_back_to_the_next_number() {
        let services = Services::in_memory();
        let odd = FiscalYear::new("2025", "Ejercicio partido", date(2023, 7, 1), date(2023, 12, 31), 10);
        services.repo::<FiscalYear>().save(&odd).await.unwrap();

        let year = services.fiscal_year_for(date(2025, 2, 1), true).await.unwrap().unwrap();
        assert_eq!(year.codejercicio, "2026");
        assert_eq!(year.nombre, "2025");
    }

    #[tokio::test]
    async fn closed_years_refuse_new_documents() {
        let services = Services::in_memory();
        services.open_year(date(2024, 5, 5)).await.unwrap();
        services.close_fiscal_year("2024").await.unwrap();

        match services.open_year(date(2024, 5, 6)).await {
            Err(ServiceError::Domain(DomainError::Validation(msg))) => assert!(msg.contains("closed"), "{msg}"),
            other => panic!("expected Validation, got {other:?}"),
        }
        match services.close_fiscal_year("1999").await {
            Err(ServiceError::NotFound(what)) => assert_eq!(what, "fiscal year 1999"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
