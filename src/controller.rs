use crate::error::Result;
use crate::schema::{AccountSelector, AccountSummary, DailyLedgerRecord};
use crate::selection::{load_selector, save_selector, SelectionStore};
use crate::source::LedgerSource;
use crate::utils::year_days;
use crate::{LedgerConfig, LedgerProcessor, LedgerView};
use log::{debug, warn};

/// Identifies one issued ledger request. Only the most recently issued
/// ticket may update the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
    pub year: i32,
    pub selector: AccountSelector,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The view was recomputed from the response.
    Applied,
    /// The response matched the previous input; the view was kept.
    Unchanged,
    /// A newer request was issued meanwhile; the response was discarded.
    Stale,
}

/// View-model behind the ledger screen.
///
/// Every change of year or account issues a new [`RequestTicket`]. Responses
/// are applied only if their ticket is still the latest, so a slow answer for
/// an old selection can never overwrite a newer one.
pub struct LedgerController<S, P> {
    source: S,
    store: P,
    config: LedgerConfig,
    year: i32,
    selector: AccountSelector,
    generation: u64,
    view: LedgerView,
    last_input: Option<(i32, AccountSelector, Vec<DailyLedgerRecord>)>,
    notification: Option<String>,
}

impl<S: LedgerSource, P: SelectionStore> LedgerController<S, P> {
    /// Reads the persisted account selection and starts from a zeroed view.
    pub fn new(source: S, store: P, year: i32) -> Result<Self> {
        Self::with_config(source, store, year, LedgerConfig::default())
    }

    pub fn with_config(source: S, store: P, year: i32, config: LedgerConfig) -> Result<Self> {
        let selector = load_selector(&store);
        let view = LedgerView::empty(year, selector.clone())?;

        Ok(Self {
            source,
            store,
            config,
            year,
            selector,
            generation: 0,
            view,
            last_input: None,
            notification: None,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn selector(&self) -> &AccountSelector {
        &self.selector
    }

    pub fn view(&self) -> &LedgerView {
        &self.view
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Pending user-facing message from the last failed fetch, if any.
    pub fn take_notification(&mut self) -> Option<String> {
        self.notification.take()
    }

    pub fn begin_request(&mut self) -> RequestTicket {
        self.generation += 1;
        RequestTicket {
            generation: self.generation,
            year: self.year,
            selector: self.selector.clone(),
        }
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        ticket.generation == self.generation
    }

    pub async fn fetch(&self, ticket: &RequestTicket) -> Result<Vec<DailyLedgerRecord>> {
        self.source.fetch_year(ticket.year, &ticket.selector).await
    }

    /// Applies a fetch result for `ticket`.
    ///
    /// A failed fetch is treated as an empty record list, which produces a
    /// zeroed calendar, and leaves a notification for the user.
    pub fn apply(
        &mut self,
        ticket: &RequestTicket,
        response: Result<Vec<DailyLedgerRecord>>,
    ) -> Result<ApplyOutcome> {
        if !self.is_current(ticket) {
            debug!(
                "Discarding stale ledger response #{} for {} / {} (latest is #{})",
                ticket.generation, ticket.year, ticket.selector, self.generation
            );
            return Ok(ApplyOutcome::Stale);
        }

        let records = match response {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    "Ledger fetch for {} / {} failed: {}",
                    ticket.year, ticket.selector, e
                );
                self.notification = Some(format!(
                    "Não foi possível carregar o controle efetivo de {}: {}",
                    ticket.year, e
                ));
                Vec::new()
            }
        };

        let unchanged = matches!(
            &self.last_input,
            Some((year, selector, previous))
                if *year == ticket.year && *selector == ticket.selector && *previous == records
        );
        if unchanged {
            return Ok(ApplyOutcome::Unchanged);
        }

        self.view =
            LedgerProcessor::process(ticket.year, &ticket.selector, &records, &self.config)?;
        self.last_input = Some((ticket.year, ticket.selector.clone(), records));
        Ok(ApplyOutcome::Applied)
    }

    /// Re-fetches the current (year, account) pair and applies the result.
    pub async fn refresh(&mut self) -> Result<ApplyOutcome> {
        let ticket = self.begin_request();
        let response = self.fetch(&ticket).await;
        self.apply(&ticket, response)
    }

    /// Switches to `year` and reloads. An out-of-range year is rejected and
    /// leaves the current year and view untouched.
    pub async fn set_year(&mut self, year: i32) -> Result<ApplyOutcome> {
        year_days(year)?;
        self.year = year;
        self.refresh().await
    }

    /// Switches account, persists the choice, and reloads.
    pub async fn select_account(&mut self, selector: AccountSelector) -> Result<ApplyOutcome> {
        if let Err(e) = save_selector(&self.store, &selector) {
            warn!("Could not persist account selection '{}': {}", selector, e);
        }
        self.selector = selector;
        self.refresh().await
    }

    /// Options for the account picker: every listed account plus "all".
    /// A failed fetch yields just the "all" option.
    pub async fn account_choices(&self) -> Vec<(AccountSelector, String)> {
        let accounts: Vec<AccountSummary> = match self.source.fetch_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!("Failed to load account list: {}", e);
                Vec::new()
            }
        };

        std::iter::once((AccountSelector::All, "Todas as contas".to_string()))
            .chain(
                accounts
                    .into_iter()
                    .map(|a| (a.selector(), a.display_name)),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::schema::DayDetailItem;
    use crate::selection::{MemorySelectionStore, SELECTED_ACCOUNT_KEY};
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct StaticSource {
        records: Vec<DailyLedgerRecord>,
        fail: bool,
    }

    #[async_trait]
    impl LedgerSource for StaticSource {
        async fn fetch_year(
            &self,
            year: i32,
            _selector: &AccountSelector,
        ) -> Result<Vec<DailyLedgerRecord>> {
            if self.fail {
                return Err(LedgerError::Api {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(self
                .records
                .iter()
                .filter(|r| r.date.starts_with(&year.to_string()))
                .cloned()
                .collect())
        }

        async fn fetch_day_detail(
            &self,
            _date: NaiveDate,
            _selector: &AccountSelector,
        ) -> Result<Vec<DayDetailItem>> {
            Ok(Vec::new())
        }

        async fn fetch_accounts(&self) -> Result<Vec<AccountSummary>> {
            Ok(vec![AccountSummary {
                account_id: "A1".to_string(),
                display_name: "Caixa".to_string(),
            }])
        }
    }

    fn record(date: &str, revenue: f64) -> DailyLedgerRecord {
        DailyLedgerRecord {
            date: date.to_string(),
            account_id: Some("A1".to_string()),
            general_expenses: 0.0,
            fixed_cost: 0.0,
            contingency: 0.0,
            revenue,
            regulated_revenue: 0.0,
            daily_surplus: revenue,
            cumulative_surplus: revenue,
        }
    }

    fn source(records: Vec<DailyLedgerRecord>) -> StaticSource {
        StaticSource {
            records,
            fail: false,
        }
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut controller =
            LedgerController::new(source(vec![]), MemorySelectionStore::new(), 2023).unwrap();

        let old = controller.begin_request();
        let new = controller.begin_request();

        let applied = controller
            .apply(&new, Ok(vec![record("2023-05-05", 10.0)]))
            .unwrap();
        assert_eq!(applied, ApplyOutcome::Applied);

        let stale = controller
            .apply(&old, Ok(vec![record("2023-05-05", 999.0)]))
            .unwrap();
        assert_eq!(stale, ApplyOutcome::Stale);

        let may = controller.view().month(4).unwrap();
        assert_eq!(may.total_revenue, 10.0);
    }

    #[test]
    fn test_identical_input_is_not_recomputed() {
        let mut controller =
            LedgerController::new(source(vec![]), MemorySelectionStore::new(), 2023).unwrap();

        let first = controller.begin_request();
        controller
            .apply(&first, Ok(vec![record("2023-05-05", 10.0)]))
            .unwrap();
        let second = controller.begin_request();
        let outcome = controller
            .apply(&second, Ok(vec![record("2023-05-05", 10.0)]))
            .unwrap();

        assert_eq!(outcome, ApplyOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_failed_fetch_zeroes_view_and_notifies() {
        let mut controller = LedgerController::new(
            StaticSource {
                records: vec![],
                fail: true,
            },
            MemorySelectionStore::new(),
            2024,
        )
        .unwrap();

        let outcome = controller.refresh().await.unwrap();
        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(controller.view().rows.len(), 366);
        assert!(controller
            .view()
            .rows
            .iter()
            .all(|r| r.cumulative_total == 0.0));

        let message = controller.take_notification().unwrap();
        assert!(message.contains("2024"));
        assert!(controller.take_notification().is_none());
    }

    #[tokio::test]
    async fn test_selection_is_persisted_and_restored() {
        let store = MemorySelectionStore::new();
        let mut controller =
            LedgerController::new(source(vec![record("2023-01-02", 5.0)]), store, 2023).unwrap();
        assert_eq!(controller.selector(), &AccountSelector::All);

        controller
            .select_account(AccountSelector::Account("A1".to_string()))
            .await
            .unwrap();

        assert_eq!(
            controller.store.load(SELECTED_ACCOUNT_KEY).unwrap().as_deref(),
            Some("A1")
        );
        assert_eq!(controller.view().recorded_days(), 1);

        let restored = LedgerController::new(
            source(vec![]),
            MemorySelectionStore::with_entry(SELECTED_ACCOUNT_KEY, "A1"),
            2023,
        )
        .unwrap();
        assert_eq!(
            restored.selector(),
            &AccountSelector::Account("A1".to_string())
        );
    }

    #[tokio::test]
    async fn test_set_year_reloads() {
        let mut controller = LedgerController::new(
            source(vec![record("2023-01-02", 5.0), record("2024-07-01", 8.0)]),
            MemorySelectionStore::new(),
            2023,
        )
        .unwrap();

        controller.set_year(2024).await.unwrap();
        assert_eq!(controller.view().year, 2024);
        assert_eq!(controller.view().month(6).unwrap().total_revenue, 8.0);
    }

    #[tokio::test]
    async fn test_set_year_rejects_out_of_range_year() {
        let mut controller = LedgerController::new(
            source(vec![record("2023-01-02", 5.0)]),
            MemorySelectionStore::new(),
            2023,
        )
        .unwrap();
        controller.refresh().await.unwrap();

        let result = controller.set_year(i32::MAX).await;
        assert!(matches!(result, Err(LedgerError::InvalidYear(_))));
        assert_eq!(controller.year(), 2023);
        assert_eq!(controller.view().year, 2023);
        assert_eq!(controller.view().recorded_days(), 1);
    }

    #[tokio::test]
    async fn test_account_choices_include_all() {
        let controller =
            LedgerController::new(source(vec![]), MemorySelectionStore::new(), 2023).unwrap();
        let choices = controller.account_choices().await;

        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0].0, AccountSelector::All);
        assert_eq!(choices[1].0, AccountSelector::Account("A1".to_string()));
        assert_eq!(choices[1].1, "Caixa");
    }
}
