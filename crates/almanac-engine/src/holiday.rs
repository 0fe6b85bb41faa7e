//! Public-holiday lookup for WORK_DAY alarms.
//!
//! [`HolidayOracle`] answers "is this date a day off". [`HolidayCache`] is the
//! production oracle: it pulls one calendar year at a time from a
//! [`HolidaySource`], keeps it in memory, and falls back to the plain weekend
//! rule for dates the source did not list. The network transport itself is
//! left to the caller; [`parse_holiday_response`] decodes the JSON body of
//! the public API at [`HOLIDAY_API_URL`].

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Weekday};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::HolidayError;

/// Yearly holiday endpoint. `{year}` is replaced with the calendar year.
pub const HOLIDAY_API_URL: &str = "https://timor.tech/api/holiday/year/{year}";

/// [`HOLIDAY_API_URL`] for `year`.
pub fn holiday_api_url(year: i32) -> String {
    HOLIDAY_API_URL.replace("{year}", &year.to_string())
}

/// One entry from the holiday calendar. `is_holiday == false` marks a
/// make-up working day that falls on a weekend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayInfo {
    pub date: NaiveDate,
    pub is_holiday: bool,
    pub name: String,
    /// Pay multiplier for working that day.
    pub wage: u8,
}

/// Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

// ── Traits ──────────────────────────────────────────────────────────────────

/// Decides whether a date is a day off.
pub trait HolidayOracle {
    /// # Errors
    ///
    /// Returns a [`HolidayError`] when the answer depends on data that could
    /// not be obtained.
    fn is_holiday(&self, date: NaiveDate) -> Result<bool, HolidayError>;
}

impl<T: HolidayOracle + ?Sized> HolidayOracle for &T {
    fn is_holiday(&self, date: NaiveDate) -> Result<bool, HolidayError> {
        (**self).is_holiday(date)
    }
}

impl<T: HolidayOracle + ?Sized> HolidayOracle for Arc<T> {
    fn is_holiday(&self, date: NaiveDate) -> Result<bool, HolidayError> {
        (**self).is_holiday(date)
    }
}

/// Supplies the holiday calendar for one year at a time.
pub trait HolidaySource {
    /// # Errors
    ///
    /// Transport, status, or decoding failures.
    fn fetch_holidays_for_year(&self, year: i32) -> Result<Vec<HolidayInfo>, HolidayError>;
}

impl<T: HolidaySource + ?Sized> HolidaySource for Arc<T> {
    fn fetch_holidays_for_year(&self, year: i32) -> Result<Vec<HolidayInfo>, HolidayError> {
        (**self).fetch_holidays_for_year(year)
    }
}

/// Oracle that treats every weekend as a holiday and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendOracle;

impl HolidayOracle for WeekendOracle {
    fn is_holiday(&self, date: NaiveDate) -> Result<bool, HolidayError> {
        Ok(is_weekend(date))
    }
}

/// A fixed in-memory calendar, e.g. loaded from a file.
#[derive(Debug, Clone, Default)]
pub struct StaticHolidaySource {
    by_year: HashMap<i32, Vec<HolidayInfo>>,
}

impl StaticHolidaySource {
    pub fn new(holidays: impl IntoIterator<Item = HolidayInfo>) -> Self {
        let mut by_year: HashMap<i32, Vec<HolidayInfo>> = HashMap::new();
        for info in holidays {
            by_year.entry(info.date.year()).or_default().push(info);
        }
        Self { by_year }
    }
}

impl HolidaySource for StaticHolidaySource {
    fn fetch_holidays_for_year(&self, year: i32) -> Result<Vec<HolidayInfo>, HolidayError> {
        Ok(self.by_year.get(&year).cloned().unwrap_or_default())
    }
}

// ── Response parsing ────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct HolidayResponse {
    code: i64,
    #[serde(default)]
    holiday: Option<BTreeMap<String, RawHoliday>>,
}

#[derive(Deserialize)]
struct RawHoliday {
    holiday: bool,
    name: String,
    #[serde(default)]
    wage: u8,
    date: String,
}

/// Decode the body returned by [`HOLIDAY_API_URL`].
///
/// The body looks like
/// `{"code":0,"holiday":{"10-01":{"holiday":true,"name":"国庆节","wage":3,"date":"2024-10-01"}}}`.
/// Entries come back sorted by date.
///
/// # Errors
///
/// - [`HolidayError::Parse`] for malformed JSON or dates.
/// - [`HolidayError::Status`] when `code` is non-zero.
pub fn parse_holiday_response(body: &str) -> Result<Vec<HolidayInfo>, HolidayError> {
    let response: HolidayResponse =
        serde_json::from_str(body).map_err(|e| HolidayError::Parse(e.to_string()))?;
    if response.code != 0 {
        return Err(HolidayError::Status {
            code: response.code,
        });
    }
    let mut holidays = response
        .holiday
        .unwrap_or_default()
        .into_values()
        .map(|raw| {
            let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d")
                .map_err(|e| HolidayError::Parse(format!("date '{}': {e}", raw.date)))?;
            Ok(HolidayInfo {
                date,
                is_holiday: raw.holiday,
                name: raw.name,
                wage: raw.wage,
            })
        })
        .collect::<Result<Vec<_>, HolidayError>>()?;
    holidays.sort_by_key(|h| h.date);
    Ok(holidays)
}

// ── HolidayCache ────────────────────────────────────────────────────────────

/// Tuning for [`HolidayCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HolidayCacheConfig {
    /// How long an empty year is trusted before it is fetched again.
    /// Non-empty years are kept for the life of the cache.
    pub empty_retry_after: Duration,
}

impl Default for HolidayCacheConfig {
    fn default() -> Self {
        Self {
            empty_retry_after: Duration::days(1),
        }
    }
}

struct YearEntry {
    holidays: HashMap<(u32, u32), HolidayInfo>,
    refresh_at: Option<NaiveDateTime>,
}

type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Year-granular holiday cache in front of a [`HolidaySource`].
///
/// Safe to share across threads. Only one fetch per year runs at a time; a
/// concurrent lookup for the same year fails fast with
/// [`HolidayError::FetchInProgress`] instead of waiting.
pub struct HolidayCache<S> {
    source: S,
    config: HolidayCacheConfig,
    years: RwLock<HashMap<i32, YearEntry>>,
    in_flight: Mutex<HashSet<i32>>,
    clock: Clock,
}

impl<S> fmt::Debug for HolidayCache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let years = self.years.read().unwrap_or_else(PoisonError::into_inner);
        let mut cached: Vec<_> = years.keys().copied().collect();
        cached.sort_unstable();
        f.debug_struct("HolidayCache")
            .field("config", &self.config)
            .field("cached_years", &cached)
            .finish_non_exhaustive()
    }
}

/// Removes the year from the in-flight set when the fetch ends, however it
/// ends.
struct FetchGuard<'a> {
    in_flight: &'a Mutex<HashSet<i32>>,
    year: i32,
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.year);
    }
}

impl<S: HolidaySource> HolidayCache<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, HolidayCacheConfig::default())
    }

    pub fn with_config(source: S, config: HolidayCacheConfig) -> Self {
        Self {
            source,
            config,
            years: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashSet::new()),
            clock: Box::new(|| Local::now().naive_local()),
        }
    }

    /// Replace the wall clock used for refresh deadlines.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the cached data for `year`. Holidays dated in other years are
    /// ignored.
    pub fn store_year(&self, year: i32, holidays: Vec<HolidayInfo>) {
        let holidays: HashMap<(u32, u32), HolidayInfo> = holidays
            .into_iter()
            .filter(|h| h.date.year() == year)
            .map(|h| ((h.date.month(), h.date.day()), h))
            .collect();
        let refresh_at = holidays
            .is_empty()
            .then(|| (self.clock)() + self.config.empty_retry_after);
        self.years
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(year, YearEntry { holidays, refresh_at });
    }

    /// Fetch `year` from the source and store it. Returns the number of
    /// entries stored.
    ///
    /// # Errors
    ///
    /// [`HolidayError::FetchInProgress`] when another fetch for `year` is
    /// running, otherwise whatever the source returned.
    pub fn refresh_year(&self, year: i32) -> Result<usize, HolidayError> {
        let _guard = self.begin_fetch(year)?;
        let holidays = self.source.fetch_holidays_for_year(year)?;
        let count = holidays.len();
        self.store_year(year, holidays);
        info!("event=holiday_refresh module=holiday status=ok year={year} entries={count}");
        Ok(count)
    }

    /// The calendar entry for `date`, refreshing its year first when due.
    ///
    /// `Ok(None)` means the year is known and has no entry for the date.
    ///
    /// # Errors
    ///
    /// Refresh failures, but only while nothing is cached for the year.
    /// With stale data present the stale data is served.
    pub fn holiday_info(&self, date: NaiveDate) -> Result<Option<HolidayInfo>, HolidayError> {
        let year = date.year();
        if self.needs_refresh(year) {
            if let Err(err) = self.refresh_year(year) {
                if !self.has_year(year) {
                    warn!("event=holiday_refresh module=holiday status=error year={year} error=\"{err}\"");
                    return Err(err);
                }
                warn!("event=holiday_refresh module=holiday status=stale year={year} error=\"{err}\"");
            }
        }
        let years = self.years.read().unwrap_or_else(PoisonError::into_inner);
        Ok(years
            .get(&year)
            .and_then(|entry| entry.holidays.get(&(date.month(), date.day())))
            .cloned())
    }

    fn has_year(&self, year: i32) -> bool {
        self.years
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&year)
    }

    fn needs_refresh(&self, year: i32) -> bool {
        let years = self.years.read().unwrap_or_else(PoisonError::into_inner);
        match years.get(&year) {
            None => true,
            Some(entry) => entry.refresh_at.is_some_and(|at| at <= (self.clock)()),
        }
    }

    fn begin_fetch(&self, year: i32) -> Result<FetchGuard<'_>, HolidayError> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(year) {
            debug!("event=holiday_refresh module=holiday status=busy year={year}");
            return Err(HolidayError::FetchInProgress { year });
        }
        Ok(FetchGuard {
            in_flight: &self.in_flight,
            year,
        })
    }
}

impl<S: HolidaySource> HolidayOracle for HolidayCache<S> {
    /// Listed dates use the calendar's flag; unlisted dates use the weekend
    /// rule.
    fn is_holiday(&self, date: NaiveDate) -> Result<bool, HolidayError> {
        Ok(match self.holiday_info(date)? {
            Some(info) => info.is_holiday,
            None => is_weekend(date),
        })
    }
}
