//! Next-fire-time computation.
//!
//! Every function takes the reference instant `after` explicitly and never
//! reads the clock, so results are deterministic and idempotent: feeding a
//! result back in as `after` yields the same result.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, error};

use super::rule::{AlarmKind, AlarmRule, Recurrence};
use crate::error::{AlarmError, Result};
use crate::holiday::{is_weekend, HolidayOracle};

/// Days a WORK_DAY scan looks ahead.
pub const WORK_DAY_SCAN_DAYS: u32 = 30;
/// Months an EVERY_MONTH scan looks ahead, beyond the current one.
pub const EVERY_MONTH_SCAN_MONTHS: u32 = 12;
/// Years an EVERY_YEAR scan looks ahead, beyond the current one. Eight
/// covers the longest gap between leap years (1896 to 1904).
pub const EVERY_YEAR_SCAN_YEARS: u32 = 8;

// ── Options ─────────────────────────────────────────────────────────────────

/// What a WORK_DAY scan does when the holiday oracle fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HolidayFallback {
    /// Treat Saturdays and Sundays as holidays for that date.
    #[default]
    Weekend,
    /// Treat the date as a holiday and keep scanning.
    TreatAsHoliday,
    /// Stop and return the oracle's error.
    Propagate,
}

/// Knobs for [`next_fire_time_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NextFireOptions {
    pub fallback: HolidayFallback,
}

// ── Public API ──────────────────────────────────────────────────────────────

/// The earliest instant at or after `after` when `rule` fires, using the
/// default [`NextFireOptions`].
///
/// `Ok(None)` means the rule will never fire again, or that the record is
/// missing a field its kind needs. The `disabled` flag is not consulted.
///
/// # Examples
///
/// ```
/// use almanac_engine::alarm::{next_fire_time, AlarmId, AlarmKind, AlarmRuleBuilder};
/// use almanac_engine::holiday::WeekendOracle;
/// use chrono::{NaiveDate, NaiveTime};
///
/// let day = NaiveDate::from_ymd_opt(2024, 6, 26).unwrap();
/// let rule = AlarmRuleBuilder::new(AlarmId(1))
///     .kind(AlarmKind::OneTime)
///     .trigger_day(day)
///     .trigger_time(NaiveTime::from_hms_opt(7, 50, 0).unwrap())
///     .build()
///     .unwrap();
///
/// let before = day.and_hms_opt(7, 49, 0).unwrap();
/// let fire = next_fire_time(&rule, before, &WeekendOracle).unwrap();
/// assert_eq!(fire, Some(day.and_hms_opt(7, 50, 0).unwrap()));
///
/// let late = day.and_hms_opt(7, 51, 0).unwrap();
/// assert_eq!(next_fire_time(&rule, late, &WeekendOracle).unwrap(), None);
/// ```
///
/// # Errors
///
/// - [`AlarmError::ScanBoundExceeded`] if a bounded scan finds nothing.
/// - [`AlarmError::Holiday`] if the oracle fails and the fallback policy
///   propagates it. The default policy never does.
pub fn next_fire_time<O: HolidayOracle + ?Sized>(
    rule: &AlarmRule,
    after: NaiveDateTime,
    oracle: &O,
) -> Result<Option<NaiveDateTime>> {
    next_fire_time_with_options(rule, after, oracle, &NextFireOptions::default())
}

/// [`next_fire_time`] with explicit options.
///
/// # Errors
///
/// See [`next_fire_time`].
pub fn next_fire_time_with_options<O: HolidayOracle + ?Sized>(
    rule: &AlarmRule,
    after: NaiveDateTime,
    oracle: &O,
    options: &NextFireOptions,
) -> Result<Option<NaiveDateTime>> {
    let (Some(time), Some(recurrence)) = (rule.time_of_day(), rule.recurrence()) else {
        debug!(
            "event=next_fire module=alarm status=incomplete id={} kind={}",
            rule.id,
            rule.kind.label()
        );
        return Ok(None);
    };
    let next = recurrence.next_after(time, after, oracle, options)?;
    debug!(
        "event=next_fire module=alarm status=ok id={} kind={} after={after} next={next:?}",
        rule.id,
        recurrence.kind().label()
    );
    Ok(next)
}

impl Recurrence {
    /// The earliest instant at or after `after`, at `time` of day, that this
    /// recurrence allows.
    ///
    /// # Errors
    ///
    /// See [`next_fire_time`].
    pub fn next_after<O: HolidayOracle + ?Sized>(
        &self,
        time: NaiveTime,
        after: NaiveDateTime,
        oracle: &O,
        options: &NextFireOptions,
    ) -> Result<Option<NaiveDateTime>> {
        match *self {
            Recurrence::OneTime { day } => Ok(one_time(day, time, after)),
            Recurrence::EveryDay => Ok(Some(every_day(time, after))),
            Recurrence::EveryWeek { weekday } => Ok(Some(every_week(weekday, time, after))),
            Recurrence::WorkDay => work_day(time, after, oracle, options.fallback).map(Some),
            Recurrence::EveryMonth { day } => every_month(day, time, after).map(Some),
            Recurrence::EveryYear { month, day } => every_year(month, day, time, after).map(Some),
        }
    }
}

// ── Per-recurrence scans ────────────────────────────────────────────────────

fn one_time(day: NaiveDate, time: NaiveTime, after: NaiveDateTime) -> Option<NaiveDateTime> {
    let candidate = day.and_time(time);
    (candidate >= after).then_some(candidate)
}

/// Today at `time` if still ahead, else tomorrow.
fn every_day(time: NaiveTime, after: NaiveDateTime) -> NaiveDateTime {
    let today = after.date().and_time(time);
    if today >= after {
        today
    } else {
        today + Duration::days(1)
    }
}

fn every_week(weekday: chrono::Weekday, time: NaiveTime, after: NaiveDateTime) -> NaiveDateTime {
    let ahead = (i64::from(weekday.num_days_from_monday())
        - i64::from(after.weekday().num_days_from_monday()))
    .rem_euclid(7);
    let candidate = (after.date() + Duration::days(ahead)).and_time(time);
    if candidate >= after {
        candidate
    } else {
        candidate + Duration::weeks(1)
    }
}

fn work_day<O: HolidayOracle + ?Sized>(
    time: NaiveTime,
    after: NaiveDateTime,
    oracle: &O,
    fallback: HolidayFallback,
) -> Result<NaiveDateTime> {
    // The window starts on the date of `after`, even when today's slot
    // has already passed.
    let mut date = after.date();
    for _ in 0..WORK_DAY_SCAN_DAYS {
        let candidate = date.and_time(time);
        if candidate >= after && !is_day_off(oracle, date, fallback)? {
            return Ok(candidate);
        }
        date += Duration::days(1);
    }
    Err(scan_exceeded(AlarmKind::WorkDay, WORK_DAY_SCAN_DAYS))
}

/// The first month, starting with the month of `after`, that has `day`.
/// Months that lack it (31 in April, 30 in February) are skipped.
fn every_month(day: u32, time: NaiveTime, after: NaiveDateTime) -> Result<NaiveDateTime> {
    let first_of_month = after.date() - Duration::days(i64::from(after.day0()));
    (0..=EVERY_MONTH_SCAN_MONTHS)
        .filter_map(|m| first_of_month.checked_add_months(Months::new(m)))
        .filter_map(|month| month.with_day(day))
        .map(|date| date.and_time(time))
        .find(|candidate| *candidate >= after)
        .ok_or_else(|| scan_exceeded(AlarmKind::EveryMonth, EVERY_MONTH_SCAN_MONTHS))
}

/// The first year, starting with the year of `after`, that has the date.
/// February 29 only exists in leap years.
fn every_year(month: u32, day: u32, time: NaiveTime, after: NaiveDateTime) -> Result<NaiveDateTime> {
    let year = after.year();
    (0..=EVERY_YEAR_SCAN_YEARS as i32)
        .filter_map(|y| NaiveDate::from_ymd_opt(year + y, month, day))
        .map(|date| date.and_time(time))
        .find(|candidate| *candidate >= after)
        .ok_or_else(|| scan_exceeded(AlarmKind::EveryYear, EVERY_YEAR_SCAN_YEARS))
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn is_day_off<O: HolidayOracle + ?Sized>(
    oracle: &O,
    date: NaiveDate,
    fallback: HolidayFallback,
) -> Result<bool> {
    match oracle.is_holiday(date) {
        Ok(day_off) => Ok(day_off),
        Err(err) => {
            debug!("event=holiday_lookup module=alarm status=fallback date={date} policy={fallback:?} error=\"{err}\"");
            match fallback {
                HolidayFallback::Weekend => Ok(is_weekend(date)),
                HolidayFallback::TreatAsHoliday => Ok(true),
                HolidayFallback::Propagate => Err(AlarmError::Holiday(err)),
            }
        }
    }
}

fn scan_exceeded(kind: AlarmKind, horizon: u32) -> AlarmError {
    let recurrence = kind.label();
    error!("event=next_fire module=alarm status=scan_exceeded kind={recurrence} horizon={horizon}");
    AlarmError::ScanBoundExceeded {
        recurrence,
        horizon,
    }
}
