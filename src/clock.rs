//! Time source used by every TTL, live-window and day-boundary computation
//!
//! Reading the wall clock through a trait lets tests pin "now" and step it
//! forward without sleeping.

use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Source of the current instant
pub trait Clock: fmt::Debug + Send + Sync {
    /// The current instant
    fn now(&self) -> DateTime<Utc>;

    /// Midnight at the start of the current calendar day
    ///
    /// The default evaluates the day boundary in the local timezone.
    fn start_of_today(&self) -> DateTime<Utc> {
        let midnight = self.now().with_timezone(&Local).date_naive().and_time(NaiveTime::MIN);
        first_valid_after(midnight, |local| Local.from_local_datetime(local).earliest())
            .map(|start| start.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
    }
}

/// Longest DST gap searched for the start of a day
const MAX_GAP_MINUTES: i64 = 3 * 60;

/// The earliest minute at or after `local` that `resolve` accepts
///
/// A DST jump can skip midnight; the day then starts where the gap ends.
fn first_valid_after<T>(
    local: NaiveDateTime,
    resolve: impl Fn(&NaiveDateTime) -> Option<T>,
) -> Option<T> {
    (0..=MAX_GAP_MINUTES).find_map(|minutes| resolve(&(local + Duration::minutes(minutes))))
}

/// Reads the system wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
///
/// Day boundaries are evaluated in UTC so results do not depend on the
/// timezone of the machine running the tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock forward by `by`
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    /// Jumps the clock to `to`
    pub fn set(&self, to: DateTime<Utc>) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn start_of_today(&self) -> DateTime<Utc> {
        let now = self.now();
        Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN))
    }
}
