use crate::classification::DayBreakdown;
use crate::schema::AccountSelector;
use crate::source::LedgerSource;
use chrono::NaiveDate;
use futures::future::join_all;
use log::{debug, warn};
use std::collections::{BTreeSet, HashMap};

/// Lazily loads and caches per-day transaction breakdowns.
///
/// Nothing is fetched until a day is asked for. A successful fetch is kept
/// for the lifetime of the resolver; a failed one resolves to an empty
/// breakdown and is retried on the next request for that day.
pub struct DetailResolver<S> {
    source: S,
    cache: HashMap<(NaiveDate, AccountSelector), DayBreakdown>,
}

impl<S: LedgerSource> DetailResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: HashMap::new(),
        }
    }

    pub fn cached(&self, date: NaiveDate, selector: &AccountSelector) -> Option<&DayBreakdown> {
        self.cache.get(&(date, selector.clone()))
    }

    pub fn cached_days(&self) -> usize {
        self.cache.len()
    }

    pub async fn resolve(&mut self, date: NaiveDate, selector: &AccountSelector) -> DayBreakdown {
        let key = (date, selector.clone());
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }

        match fetch_breakdown(&self.source, date, selector).await {
            Some(breakdown) => {
                self.cache.insert(key, breakdown.clone());
                breakdown
            }
            None => DayBreakdown::empty(date),
        }
    }

    /// Loads several days at once. Fetches run concurrently and may complete
    /// in any order. Each distinct uncached day is fetched once; repeated and
    /// already-cached days are skipped.
    pub async fn prefetch(&mut self, dates: &[NaiveDate], selector: &AccountSelector) -> usize {
        let missing: BTreeSet<NaiveDate> = dates
            .iter()
            .copied()
            .filter(|d| !self.cache.contains_key(&(*d, selector.clone())))
            .collect();

        let source = &self.source;
        let results = join_all(
            missing
                .iter()
                .map(|&date| async move { (date, fetch_breakdown(source, date, selector).await) }),
        )
        .await;

        let mut loaded = 0;
        for (date, breakdown) in results {
            if let Some(breakdown) = breakdown {
                self.cache.insert((date, selector.clone()), breakdown);
                loaded += 1;
            }
        }

        debug!("Prefetched {} of {} day details", loaded, missing.len());
        loaded
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

async fn fetch_breakdown<S: LedgerSource>(
    source: &S,
    date: NaiveDate,
    selector: &AccountSelector,
) -> Option<DayBreakdown> {
    match source.fetch_day_detail(date, selector).await {
        Ok(items) => {
            let breakdown = DayBreakdown::from_items(date, items);
            if breakdown.unclassified > 0 {
                debug!(
                    "{} detail items on {} matched no category",
                    breakdown.unclassified, date
                );
            }
            Some(breakdown)
        }
        Err(e) => {
            warn!("Failed to load details for {} / {}: {}", date, selector, e);
            None
        }
    }
}
