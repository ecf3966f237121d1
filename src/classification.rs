use crate::schema::DayDetailItem;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const FIXED_COST_MARKER: &str = "custo";
const CONTINGENCY_MARKER: &str = "imprevisto";
const REGULATED_MARKER: &str = "regulament";
const EXPENSE_MARKERS: [&str; 2] = ["despesa", "saida"];
const REVENUE_MARKERS: [&str; 2] = ["entrada", "receita"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DetailBucket {
    GeneralExpense,
    FixedCost,
    Contingency,
    Revenue,
    RegulatedRevenue,
    Unclassified,
}

impl DetailBucket {
    pub const DISPLAYED: [DetailBucket; 5] = [
        DetailBucket::GeneralExpense,
        DetailBucket::FixedCost,
        DetailBucket::Contingency,
        DetailBucket::Revenue,
        DetailBucket::RegulatedRevenue,
    ];

    pub fn is_expense(self) -> bool {
        matches!(
            self,
            Self::GeneralExpense | Self::FixedCost | Self::Contingency
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::GeneralExpense => "Despesas",
            Self::FixedCost => "Custo Fixo",
            Self::Contingency => "Imprevistos",
            Self::Revenue => "Receita",
            Self::RegulatedRevenue => "Receita Regulamentada",
            Self::Unclassified => "Não classificado",
        }
    }
}

/// Assigns a detail item to a display bucket by case-insensitive substring
/// match on its category and type text.
///
/// Rules, first match wins:
/// 1. category contains "custo" -> fixed cost, whatever the type says
/// 2. category contains "imprevisto" -> contingency
/// 3. type contains "despesa"/"saida" -> general expense
/// 4. category contains "regulament" -> regulated revenue
/// 5. type contains "entrada"/"receita" -> revenue
pub fn classify(item: &DayDetailItem) -> DetailBucket {
    let category = item.category.to_lowercase();
    let kind = strip_accents(&item.kind.to_lowercase());

    if category.contains(FIXED_COST_MARKER) {
        DetailBucket::FixedCost
    } else if category.contains(CONTINGENCY_MARKER) {
        DetailBucket::Contingency
    } else if EXPENSE_MARKERS.iter().any(|m| kind.contains(m)) {
        DetailBucket::GeneralExpense
    } else if category.contains(REGULATED_MARKER) {
        DetailBucket::RegulatedRevenue
    } else if REVENUE_MARKERS.iter().any(|m| kind.contains(m)) {
        DetailBucket::Revenue
    } else {
        DetailBucket::Unclassified
    }
}

// Folds the Portuguese accents seen in type labels ("Saída").
fn strip_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketDetail {
    pub bucket: DetailBucket,
    pub items: Vec<DayDetailItem>,
    pub total: f64,
}

/// Itemized view of a single day, grouped by display bucket.
///
/// Unclassified items are left out of every bucket; only their count is kept.
/// Totals here are informational and never feed the monthly aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBreakdown {
    pub date: NaiveDate,
    pub buckets: Vec<BucketDetail>,
    pub unclassified: usize,
}

impl DayBreakdown {
    pub fn empty(date: NaiveDate) -> Self {
        Self::from_items(date, Vec::new())
    }

    pub fn from_items(date: NaiveDate, items: Vec<DayDetailItem>) -> Self {
        let mut buckets: Vec<BucketDetail> = DetailBucket::DISPLAYED
            .iter()
            .map(|&bucket| BucketDetail {
                bucket,
                items: Vec::new(),
                total: 0.0,
            })
            .collect();
        let mut unclassified = 0;

        for item in items {
            let bucket = classify(&item);
            match buckets.iter_mut().find(|b| b.bucket == bucket) {
                Some(slot) => {
                    slot.total += item.value;
                    slot.items.push(item);
                }
                None => unclassified += 1,
            }
        }

        Self {
            date,
            buckets,
            unclassified,
        }
    }

    pub fn bucket(&self, bucket: DetailBucket) -> Option<&BucketDetail> {
        self.buckets.iter().find(|b| b.bucket == bucket)
    }

    pub fn items_in(&self, bucket: DetailBucket) -> &[DayDetailItem] {
        self.bucket(bucket).map(|b| b.items.as_slice()).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|b| b.items.is_empty())
    }
}
