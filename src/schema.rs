use crate::utils::{coerce_amount, coerce_text};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Wire value standing for "every account combined".
pub const ALL_ACCOUNTS: &str = "all";

/// Which account's ledger is being viewed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccountSelector {
    #[default]
    All,
    Account(String),
}

impl AccountSelector {
    /// Interprets a selector value coming from the account picker or from
    /// persisted state. Blank input and `"all"` (any case) mean every account.
    pub fn from_choice(choice: &str) -> Self {
        let choice = choice.trim();
        if choice.is_empty() || choice.eq_ignore_ascii_case(ALL_ACCOUNTS) {
            Self::All
        } else {
            Self::Account(choice.to_string())
        }
    }

    pub fn as_query_value(&self) -> &str {
        match self {
            Self::All => ALL_ACCOUNTS,
            Self::Account(id) => id,
        }
    }

    /// Records without an account id are accepted by every selector.
    pub fn matches(&self, account_id: Option<&str>) -> bool {
        match (self, account_id) {
            (Self::All, _) => true,
            (Self::Account(_), None) => true,
            (Self::Account(wanted), Some(id)) => wanted == id,
        }
    }
}

impl From<String> for AccountSelector {
    fn from(value: String) -> Self {
        Self::from_choice(&value)
    }
}

impl From<AccountSelector> for String {
    fn from(value: AccountSelector) -> Self {
        value.as_query_value().to_string()
    }
}

impl fmt::Display for AccountSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_value())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyLedgerRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(
        with = "String",
        description = "Day of the record in YYYY-MM-DD format. A trailing time component is tolerated and ignored."
    )]
    pub date: String,

    #[serde(default, deserialize_with = "lenient_optional_string")]
    #[schemars(
        with = "Option<String>",
        description = "Account this record belongs to, or 'all' for the combined ledger"
    )]
    pub account_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_amount")]
    #[schemars(with = "f64", description = "General expenses paid on this day")]
    pub general_expenses: f64,

    #[serde(default, deserialize_with = "lenient_amount")]
    #[schemars(with = "f64", description = "Fixed costs paid on this day")]
    pub fixed_cost: f64,

    #[serde(default, deserialize_with = "lenient_amount")]
    #[schemars(with = "f64", description = "Contingency (unforeseen) expenses paid on this day")]
    pub contingency: f64,

    #[serde(default, deserialize_with = "lenient_amount")]
    #[schemars(with = "f64", description = "Ordinary revenue received on this day")]
    pub revenue: f64,

    #[serde(default, deserialize_with = "lenient_amount")]
    #[schemars(with = "f64", description = "Revenue from regulated services received on this day")]
    pub regulated_revenue: f64,

    #[serde(default, deserialize_with = "lenient_amount")]
    #[schemars(
        with = "f64",
        description = "Revenue minus expenses for this day, as computed by the server"
    )]
    pub daily_surplus: f64,

    #[serde(default, deserialize_with = "lenient_amount")]
    #[schemars(
        with = "f64",
        description = "Running total of daily surplus from January 1 through this day"
    )]
    pub cumulative_surplus: f64,
}

impl DailyLedgerRecord {
    pub fn total_expenses(&self) -> f64 {
        self.general_expenses + self.fixed_cost + self.contingency
    }

    pub fn total_revenue(&self) -> f64 {
        self.revenue + self.regulated_revenue
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&schemars::schema_for!(Vec<DailyLedgerRecord>))
    }
}

/// One itemized transaction behind a day's totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayDetailItem {
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "String", description = "Free-text category, e.g. 'Custo Fixo Mensal'")]
    pub category: String,

    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub subcategory: String,

    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    #[schemars(with = "String", description = "Entry direction, e.g. 'despesa' or 'entrada'")]
    pub kind: String,

    #[serde(default, deserialize_with = "lenient_optional_string")]
    #[schemars(with = "Option<String>", description = "Client or supplier display name")]
    pub counterparty_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_optional_string")]
    #[schemars(with = "Option<String>", description = "Installment position as 'n/total'")]
    pub installment_label: Option<String>,

    #[serde(default, deserialize_with = "lenient_amount")]
    #[schemars(with = "f64")]
    pub value: f64,
}

impl DayDetailItem {
    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&schemars::schema_for!(Vec<DayDetailItem>))
    }
}

/// Entry of the account picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    #[serde(deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub account_id: String,

    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub display_name: String,
}

impl AccountSummary {
    pub fn selector(&self) -> AccountSelector {
        AccountSelector::from_choice(&self.account_id)
    }
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_amount(&value))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_text(&value).unwrap_or_default())
}

fn lenient_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_text(&value).filter(|s| !s.trim().is_empty()))
}
