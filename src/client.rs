use crate::config::LedgerClientConfig;
use crate::error::{LedgerError, Result};
use crate::ingestion::{parse_detail_payload, parse_ledger_payload};
use crate::schema::{AccountSelector, AccountSummary, DailyLedgerRecord, DayDetailItem};
use crate::source::LedgerSource;
use crate::utils::date_key;
use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

#[derive(Clone)]
pub struct HttpLedgerSource {
    client: Client,
    config: LedgerClientConfig,
}

impl HttpLedgerSource {
    pub fn new(config: LedgerClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LedgerClientConfig {
        &self.config
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self.client.get(self.config.endpoint(path));
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_for_text(&self, request: RequestBuilder) -> Result<String> {
        let res = request.send().await?;
        let status = res.status();

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(LedgerError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(res.text().await?)
    }
}

#[async_trait]
impl LedgerSource for HttpLedgerSource {
    async fn fetch_year(
        &self,
        year: i32,
        selector: &AccountSelector,
    ) -> Result<Vec<DailyLedgerRecord>> {
        let request = self.get(&self.config.ledger_path).query(&[
            ("year", year.to_string()),
            ("accountId", selector.as_query_value().to_string()),
        ]);

        let body = self.send_for_text(request).await?;
        let records = parse_ledger_payload(&body)?;
        debug!(
            "Fetched {} ledger records for {} / {}",
            records.len(),
            year,
            selector
        );
        Ok(records)
    }

    async fn fetch_day_detail(
        &self,
        date: NaiveDate,
        selector: &AccountSelector,
    ) -> Result<Vec<DayDetailItem>> {
        let request = self.get(&self.config.detail_path).query(&[
            ("date", date_key(date)),
            ("accountId", selector.as_query_value().to_string()),
        ]);

        let body = self.send_for_text(request).await?;
        parse_detail_payload(&body)
    }

    async fn fetch_accounts(&self) -> Result<Vec<AccountSummary>> {
        let body = self
            .send_for_text(self.get(&self.config.accounts_path))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }
}
