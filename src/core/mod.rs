pub mod book;
pub mod cache;
pub mod services;
pub mod time;
pub mod tracker;

pub use book::CustomerBook;
pub use cache::{CacheKey, CacheSlot, StatsCache};
pub use time::{BusinessCalendar, Clock, ManualClock, SystemClock};
pub use tracker::{IncomeTracker, YearView};
