//! Read-through TTL cache for the income tracker, scoped by user and year.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::{
    config::Config,
    core::time::{Clock, SystemClock},
    domain::{
        income::IncomeEntry,
        report::{MonthlyBreakdown, YearlyStats},
    },
};

pub const DEFAULT_TTL_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub user_id: String,
    pub year: i32,
}

impl CacheKey {
    pub fn new(user_id: impl Into<String>, year: i32) -> Self {
        Self {
            user_id: user_id.into(),
            year,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSlot {
    Entries,
    MonthlyStats,
    YearlyStats,
}

#[derive(Debug, Clone)]
struct Stamped<T> {
    value: T,
    written_at: DateTime<Utc>,
}

impl<T: Clone> Stamped<T> {
    fn new(value: T, written_at: DateTime<Utc>) -> Self {
        Self { value, written_at }
    }

    fn fresh(&self, now: DateTime<Utc>, ttl: Duration) -> Option<T> {
        (now - self.written_at < ttl).then(|| self.value.clone())
    }
}

#[derive(Debug, Default)]
struct CacheSlots {
    entries: Option<Stamped<Vec<IncomeEntry>>>,
    monthly: Option<Stamped<MonthlyBreakdown>>,
    yearly: Option<Stamped<YearlyStats>>,
}

/// Three independently stamped slots per `(user, year)`.
///
/// A slot older than the TTL reads as a miss, exactly like an absent one.
/// Slots never evict on their own; `invalidate` and `clear` are the only
/// ways entries leave the map.
pub struct StatsCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    slots: Mutex<HashMap<CacheKey, CacheSlots>>,
}

impl fmt::Debug for StatsCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsCache")
            .field("ttl", &self.ttl)
            .field("keys", &self.len())
            .finish()
    }
}

impl Default for StatsCache {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_TTL_SECS), Arc::new(SystemClock))
    }
}

impl StatsCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self::new(config.cache_ttl(), clock)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn entries(&self, key: &CacheKey) -> Option<Vec<IncomeEntry>> {
        let now = self.clock.now();
        let hit = self
            .lock()
            .get(key)
            .and_then(|slots| slots.entries.as_ref())
            .and_then(|stamped| stamped.fresh(now, self.ttl));
        self.trace(key, CacheSlot::Entries, hit.is_some());
        hit
    }

    pub fn store_entries(&self, key: CacheKey, entries: Vec<IncomeEntry>) {
        let now = self.clock.now();
        self.lock().entry(key).or_default().entries = Some(Stamped::new(entries, now));
    }

    pub fn monthly_stats(&self, key: &CacheKey) -> Option<MonthlyBreakdown> {
        let now = self.clock.now();
        let hit = self
            .lock()
            .get(key)
            .and_then(|slots| slots.monthly.as_ref())
            .and_then(|stamped| stamped.fresh(now, self.ttl));
        self.trace(key, CacheSlot::MonthlyStats, hit.is_some());
        hit
    }

    pub fn store_monthly_stats(&self, key: CacheKey, stats: MonthlyBreakdown) {
        let now = self.clock.now();
        self.lock().entry(key).or_default().monthly = Some(Stamped::new(stats, now));
    }

    pub fn yearly_stats(&self, key: &CacheKey) -> Option<YearlyStats> {
        let now = self.clock.now();
        let hit = self
            .lock()
            .get(key)
            .and_then(|slots| slots.yearly.as_ref())
            .and_then(|stamped| stamped.fresh(now, self.ttl));
        self.trace(key, CacheSlot::YearlyStats, hit.is_some());
        hit
    }

    pub fn store_yearly_stats(&self, key: CacheKey, stats: YearlyStats) {
        let now = self.clock.now();
        self.lock().entry(key).or_default().yearly = Some(Stamped::new(stats, now));
    }

    /// Drops all three slots for one key.
    pub fn invalidate(&self, key: &CacheKey) {
        if self.lock().remove(key).is_some() {
            debug!(key = %key, "stats cache invalidated");
        }
    }

    /// Drops everything; called when the user signs out.
    pub fn clear(&self) {
        let mut guard = self.lock();
        let dropped = guard.len();
        guard.clear();
        debug!(dropped, "stats cache cleared");
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheSlots>> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn trace(&self, key: &CacheKey, slot: CacheSlot, hit: bool) {
        if hit {
            debug!(key = %key, ?slot, "stats cache hit");
        } else {
            debug!(key = %key, ?slot, "stats cache miss");
        }
    }
}
