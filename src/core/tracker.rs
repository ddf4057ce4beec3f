use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    core::{
        cache::{CacheKey, StatsCache},
        services::{IncomeService, IncomeWrite},
        time::{Clock, SystemClock},
    },
    domain::{
        income::{IncomeEntry, IncomePatch, NewIncomeEntry},
        report::{MonthlyBreakdown, YearlyStats},
    },
    errors::{LedgerError, Result},
    storage::IncomeStore,
};

/// Entries and both stat shapes for one `(user, year)`.
#[derive(Debug, Clone, PartialEq)]
pub struct YearView {
    pub entries: Vec<IncomeEntry>,
    pub monthly: MonthlyBreakdown,
    pub yearly: YearlyStats,
}

/// Income read and write paths with a TTL cache in front of the store.
///
/// Every write invalidates the `(user, year)` keys it touched, so the next
/// read goes back to the store.
pub struct IncomeTracker {
    store: Arc<dyn IncomeStore>,
    cache: Arc<StatsCache>,
    clock: Arc<dyn Clock>,
}

impl IncomeTracker {
    pub fn new(store: Arc<dyn IncomeStore>, cache: Arc<StatsCache>) -> Self {
        Self::with_clock(store, cache, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn IncomeStore>,
        cache: Arc<StatsCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            cache,
            clock,
        }
    }

    pub fn cache(&self) -> &StatsCache {
        &self.cache
    }

    pub fn entries(&self, user_id: &str, year: i32) -> Result<Vec<IncomeEntry>> {
        let key = CacheKey::new(user_id, year);
        if let Some(entries) = self.cache.entries(&key) {
            return Ok(entries);
        }
        let entries = self.store.income_for_year(user_id, year)?;
        self.cache.store_entries(key, entries.clone());
        Ok(entries)
    }

    pub fn monthly_stats(&self, user_id: &str, year: i32) -> Result<MonthlyBreakdown> {
        let key = CacheKey::new(user_id, year);
        if let Some(stats) = self.cache.monthly_stats(&key) {
            return Ok(stats);
        }
        let (stats, _) = IncomeService::monthly_stats_checked(&self.entries(user_id, year)?);
        self.cache.store_monthly_stats(key, stats.clone());
        Ok(stats)
    }

    pub fn yearly_stats(&self, user_id: &str, year: i32) -> Result<YearlyStats> {
        let key = CacheKey::new(user_id, year);
        if let Some(stats) = self.cache.yearly_stats(&key) {
            return Ok(stats);
        }
        let stats = IncomeService::yearly_from_monthly(&self.monthly_stats(user_id, year)?);
        self.cache.store_yearly_stats(key, stats.clone());
        Ok(stats)
    }

    /// Loads all three shapes together, populating every cache slot.
    pub fn year_view(&self, user_id: &str, year: i32) -> Result<YearView> {
        Ok(YearView {
            entries: self.entries(user_id, year)?,
            monthly: self.monthly_stats(user_id, year)?,
            yearly: self.yearly_stats(user_id, year)?,
        })
    }

    /// Stores a new record, folding it into an existing one with the same key.
    pub fn add_entry(&self, user_id: &str, new_entry: NewIncomeEntry) -> Result<IncomeEntry> {
        let existing = self.store.find_income(&new_entry.key(user_id))?;
        let year = new_entry.year;
        let entry = match IncomeService::plan_write(user_id, existing, new_entry, self.clock.now())? {
            IncomeWrite::Insert(entry) => {
                self.store.insert_income(entry.clone())?;
                info!(entry_id = %entry.id, amount = %entry.amount, "income entry added");
                entry
            }
            IncomeWrite::Merge(entry) => {
                self.store.replace_income(entry.clone())?;
                info!(entry_id = %entry.id, amount = %entry.amount, "income entry merged");
                entry
            }
        };
        self.cache.invalidate(&CacheKey::new(user_id, year));
        Ok(entry)
    }

    /// Patches a record in place.
    ///
    /// When the patched record now shares its key with another record, the
    /// other record absorbs it and the patched record is removed; the
    /// surviving record is returned. If the removal fails the other record
    /// is put back as it was, and a failed restore is a
    /// [`LedgerError::PartialWrite`].
    pub fn update_entry(
        &self,
        user_id: &str,
        entry_id: Uuid,
        patch: IncomePatch,
    ) -> Result<IncomeEntry> {
        let mut entry = self
            .store
            .income_entry(user_id, entry_id)?
            .ok_or(LedgerError::IncomeEntryNotFound(entry_id))?;
        if patch.amount.is_some_and(|amount| amount.is_sign_negative() && !amount.is_zero()) {
            return Err(LedgerError::InvalidInput(
                "income amount must not be negative".into(),
            ));
        }
        let old_year = entry.year;
        let now = self.clock.now();
        patch.apply_to(&mut entry, now);

        let survivor = match self.store.find_income(&entry.key())? {
            Some(mut other) if other.id != entry.id => {
                let original = other.clone();
                other.absorb(entry.amount, entry.description.as_deref(), now);
                self.store.replace_income(other.clone())?;
                if let Err(err) = self.store.remove_income(user_id, entry.id) {
                    warn!(
                        entry_id = %entry.id,
                        merged_into = %other.id,
                        error = %err,
                        "merge removal failed; restoring absorbing entry"
                    );
                    return match self.store.replace_income(original) {
                        Ok(()) => Err(err),
                        Err(undo) => {
                            error!(
                                entry_id = %entry.id,
                                merged_into = %other.id,
                                error = %undo,
                                "compensation failed; income counted twice"
                            );
                            self.cache.invalidate(&CacheKey::new(user_id, old_year));
                            self.cache.invalidate(&CacheKey::new(user_id, other.year));
                            Err(LedgerError::PartialWrite(format!(
                                "income entry {} merged into {} but not removed: {}",
                                entry.id, other.id, err
                            )))
                        }
                    };
                }
                info!(
                    entry_id = %entry.id,
                    merged_into = %other.id,
                    "income entry merged after update"
                );
                other
            }
            _ => {
                self.store.replace_income(entry.clone())?;
                info!(entry_id = %entry.id, "income entry updated");
                entry
            }
        };

        self.cache.invalidate(&CacheKey::new(user_id, old_year));
        if survivor.year != old_year {
            self.cache.invalidate(&CacheKey::new(user_id, survivor.year));
        }
        Ok(survivor)
    }

    pub fn delete_entry(&self, user_id: &str, entry_id: Uuid) -> Result<IncomeEntry> {
        let removed = self
            .store
            .remove_income(user_id, entry_id)?
            .ok_or(LedgerError::IncomeEntryNotFound(entry_id))?;
        self.cache.invalidate(&CacheKey::new(user_id, removed.year));
        info!(entry_id = %removed.id, "income entry deleted");
        Ok(removed)
    }

    /// Drops every cached value for every user.
    pub fn sign_out(&self) {
        self.cache.clear();
        info!("income cache cleared on sign-out");
    }
}
