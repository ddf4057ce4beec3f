use std::sync::Mutex;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, TimeZone, Utc};

use crate::{
    domain::report::ReportPeriod,
    errors::{LedgerError, Result},
};

/// Clock abstracts access to the current timestamp so services remain deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current UTC date. Defaults to `now().date_naive()`.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Real-time clock backed by the system UTC time source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard += by;
    }

    pub fn set(&self, at: DateTime<Utc>) {
        let mut guard = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Maps instants onto business days in a fixed-offset timezone.
///
/// Day buckets in reports and the bounds handed to the store for a period
/// both come from the same calendar, so they always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessCalendar {
    offset: FixedOffset,
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl BusinessCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Business day an instant falls on.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// First instant of a business day, in UTC.
    pub fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>> {
        date.and_hms_opt(0, 0, 0)
            .and_then(|midnight| self.offset.from_local_datetime(&midnight).single())
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| LedgerError::InvalidInput(format!("cannot resolve start of {}", date)))
    }

    /// Inclusive UTC bounds covering every instant of `period`.
    pub fn bounds(&self, period: &ReportPeriod) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.start_of_day(period.start)?;
        let after_end = period
            .end
            .succ_opt()
            .ok_or_else(|| LedgerError::InvalidInput(format!("{} has no next day", period.end)))?;
        let end = self.start_of_day(after_end)? - Duration::nanoseconds(1);
        Ok((start, end))
    }

    pub fn today(&self, clock: &dyn Clock) -> NaiveDate {
        self.local_date(clock.now())
    }
}
