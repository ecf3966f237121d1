use crate::error::Result;
use crate::schema::{AccountSelector, AccountSummary, DailyLedgerRecord, DayDetailItem};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

/// Backend that owns the ledger data.
///
/// Implementations return records in whatever order the backend produces
/// them; nothing downstream relies on ordering.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Sparse daily records for `year`, possibly empty.
    async fn fetch_year(
        &self,
        year: i32,
        selector: &AccountSelector,
    ) -> Result<Vec<DailyLedgerRecord>>;

    /// Itemized transactions behind a single day.
    async fn fetch_day_detail(
        &self,
        date: NaiveDate,
        selector: &AccountSelector,
    ) -> Result<Vec<DayDetailItem>>;

    async fn fetch_accounts(&self) -> Result<Vec<AccountSummary>>;
}

#[async_trait]
impl<T: LedgerSource + ?Sized> LedgerSource for Arc<T> {
    async fn fetch_year(
        &self,
        year: i32,
        selector: &AccountSelector,
    ) -> Result<Vec<DailyLedgerRecord>> {
        (**self).fetch_year(year, selector).await
    }

    async fn fetch_day_detail(
        &self,
        date: NaiveDate,
        selector: &AccountSelector,
    ) -> Result<Vec<DayDetailItem>> {
        (**self).fetch_day_detail(date, selector).await
    }

    async fn fetch_accounts(&self) -> Result<Vec<AccountSummary>> {
        (**self).fetch_accounts().await
    }
}
