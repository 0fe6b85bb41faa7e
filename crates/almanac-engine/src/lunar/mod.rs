//! Chinese lunisolar calendar.
//!
//! Converts Gregorian dates into lunar dates, solar terms, the eight
//! characters (八字), auspicious-hour tables and lunar festivals. All
//! functions are pure lookups over the packed tables in [`tables`] and cover
//! the Gregorian years 1900-2100 (solar terms: 1901-2100). Inputs outside
//! that window yield `None` or an empty list, never an error.
//!
//! # Functions
//!
//! - [`leap_month_info`]: the leap month of a lunar year, if any
//! - [`lunar_month_days`]: length of a numbered lunar month
//! - [`lunar_new_year_date`]: Gregorian date of the lunar new year
//! - [`lunar_date_info`]: Gregorian date to lunar date
//! - [`solar_terms_date_list`]: the 24 solar terms of a year
//! - [`eight_chars`]: year/month/day/hour pillars and zodiac
//! - [`time_lucky_list`]: auspicious two-hour slots of a day
//! - [`lunar_festival_info`]: traditional festival falling on a date
//! - [`date_subtitle`]: the short label a calendar cell shows

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

pub mod eight_chars;
pub mod festival;
pub mod solar_terms;
pub mod tables;

pub use eight_chars::{
    clash_chinese_zodiac, eight_chars, time_lucky_list, ChineseZodiac, EightChars, Element,
    StemBranch, TimeLuckyInfo,
};
pub use festival::{lunar_festival_info, LunarFestival};
pub use solar_terms::{current_solar_term, solar_terms_date_list, SolarTerm, SolarTermKind};

const MONTH_NAMES: [&str; 12] = [
    "正月", "二月", "三月", "四月", "五月", "六月", "七月", "八月", "九月", "十月", "十一月",
    "十二月",
];

const DAY_NAMES: [&str; 30] = [
    "初一", "初二", "初三", "初四", "初五", "初六", "初七", "初八", "初九", "初十", "十一", "十二",
    "十三", "十四", "十五", "十六", "十七", "十八", "十九", "二十", "廿一", "廿二", "廿三", "廿四",
    "廿五", "廿六", "廿七", "廿八", "廿九", "三十",
];

// ── Types ───────────────────────────────────────────────────────────────────

/// One month of a lunar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LunarMonthInfo {
    /// Lunar year, numbered by the Gregorian year its new year falls in.
    pub year: i32,
    /// Month number, 1-12. A leap month carries the number of the month it follows.
    pub month: u32,
    /// 29 or 30.
    pub days: u32,
    pub is_leap: bool,
}

impl LunarMonthInfo {
    /// Month name without the leap marker, e.g. "正月".
    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month as usize).clamp(1, 12) - 1]
    }

    /// Month name with a leading "闰" for leap months.
    pub fn full_name(&self) -> String {
        if self.is_leap {
            format!("闰{}", self.month_name())
        } else {
            self.month_name().to_string()
        }
    }
}

/// A lunar date: the month it belongs to and the day within that month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LunarDateInfo {
    pub year_month: LunarMonthInfo,
    /// Day of the lunar month, 1-30.
    pub day: u32,
}

impl LunarDateInfo {
    pub fn year(&self) -> i32 {
        self.year_month.year
    }

    pub fn month(&self) -> u32 {
        self.year_month.month
    }

    pub fn days(&self) -> u32 {
        self.year_month.days
    }

    pub fn is_leap(&self) -> bool {
        self.year_month.is_leap
    }

    pub fn month_name(&self) -> &'static str {
        self.year_month.month_name()
    }

    /// Day name, e.g. "初一", "廿五".
    pub fn day_name(&self) -> &'static str {
        DAY_NAMES[(self.day as usize).clamp(1, 30) - 1]
    }
}

// ── Month tables ────────────────────────────────────────────────────────────

/// The leap month of lunar year `year`.
///
/// Returns `None` when the year has no leap month or lies outside 1900-2100.
///
/// # Examples
///
/// ```
/// use almanac_engine::lunar::{leap_month_info, LunarMonthInfo};
///
/// assert_eq!(leap_month_info(1902), None);
/// assert_eq!(
///     leap_month_info(1903),
///     Some(LunarMonthInfo { year: 1903, month: 5, days: 29, is_leap: true })
/// );
/// ```
pub fn leap_month_info(year: i32) -> Option<LunarMonthInfo> {
    let word = tables::lunar_month_word(year)?;
    let month = tables::leap_month_of(word);
    if !(1..=12).contains(&month) {
        return None;
    }
    Some(LunarMonthInfo {
        year,
        month,
        days: if tables::leap_month_is_long(word) { 30 } else { 29 },
        is_leap: true,
    })
}

/// Number of days in numbered month `month` of lunar year `year`.
///
/// Years outside 1900-2100 fall back to 29.
pub fn lunar_month_days(year: i32, month: u32) -> u32 {
    match tables::lunar_month_word(year) {
        Some(word) if tables::month_is_long(word, month) => 30,
        _ => 29,
    }
}

/// Gregorian date of the first day of lunar year `year`.
///
/// # Examples
///
/// ```
/// use almanac_engine::lunar::lunar_new_year_date;
/// use chrono::NaiveDate;
///
/// assert_eq!(lunar_new_year_date(1903), NaiveDate::from_ymd_opt(1903, 1, 29));
/// assert_eq!(lunar_new_year_date(2101), None);
/// ```
pub fn lunar_new_year_date(year: i32) -> Option<NaiveDate> {
    let (month, day) = tables::lunar_new_year_parts(year)?;
    NaiveDate::from_ymd_opt(year, month, day)
}

// ── lunar_date_info ─────────────────────────────────────────────────────────

/// Convert a Gregorian date to its lunar date.
///
/// Dates on or after the lunar new year of their Gregorian year are found by
/// walking forward from 正月; earlier dates walk backward from the twelfth
/// month of the previous lunar year. A leap month sits right after the
/// numbered month it repeats.
///
/// Returns `None` when the table rows the walk needs are unavailable, i.e.
/// before the lunar new year of 1900 or after 2100.
///
/// # Examples
///
/// ```
/// use almanac_engine::lunar::lunar_date_info;
/// use chrono::NaiveDate;
///
/// let info = lunar_date_info(NaiveDate::from_ymd_opt(1903, 2, 3).unwrap()).unwrap();
/// assert_eq!((info.year(), info.month(), info.days(), info.is_leap(), info.day), (1903, 1, 29, false, 6));
/// ```
pub fn lunar_date_info(date: NaiveDate) -> Option<LunarDateInfo> {
    let new_year = lunar_new_year_date(date.year())?;
    let span = (date - new_year).num_days();
    if span >= 0 {
        Some(walk_forward(date.year(), span))
    } else {
        tables::lunar_month_word(date.year() - 1)?;
        Some(walk_backward(date.year() - 1, span))
    }
}

/// Consume `span` days (>= 0) forward from the new year of `year`.
fn walk_forward(year: i32, mut span: i64) -> LunarDateInfo {
    let leap = leap_month_info(year);
    let mut month = 1;
    let mut days = 0;
    let mut is_leap = false;
    for _ in 1..=12 {
        days = lunar_month_days(year, month);
        if span < i64::from(days) {
            break;
        }
        span -= i64::from(days);
        if let Some(leap) = leap.filter(|l| l.month == month) {
            days = leap.days;
            if span < i64::from(days) {
                is_leap = true;
                break;
            }
            span -= i64::from(days);
        }
        month += 1;
    }
    LunarDateInfo {
        year_month: LunarMonthInfo {
            year,
            month,
            days,
            is_leap,
        },
        day: 1 + span as u32,
    }
}

/// Consume `span` days (< 0) backward from the end of lunar year `year`.
fn walk_backward(year: i32, mut span: i64) -> LunarDateInfo {
    let leap = leap_month_info(year);
    let mut month = 12;
    let mut days = 0;
    let mut is_leap = false;
    for _ in 1..=12 {
        if let Some(leap) = leap.filter(|l| l.month == month) {
            days = leap.days;
            if span.abs() <= i64::from(days) {
                is_leap = true;
                break;
            }
            span += i64::from(days);
        }
        days = lunar_month_days(year, month);
        if span.abs() <= i64::from(days) {
            break;
        }
        span += i64::from(days);
        month -= 1;
    }
    LunarDateInfo {
        year_month: LunarMonthInfo {
            year,
            month,
            days,
            is_leap,
        },
        day: (1 + i64::from(days) + span) as u32,
    }
}

// ── date_subtitle ───────────────────────────────────────────────────────────

/// Short label for a calendar cell: the festival name if one falls on
/// `date`, otherwise the solar term starting that day, otherwise the lunar
/// month name on the first of the month and the lunar day name elsewhere.
pub fn date_subtitle(date: NaiveDate) -> Option<String> {
    if let Some(festival) = lunar_festival_info(date) {
        return Some(festival.name.to_string());
    }
    if let Some(term) = solar_terms_date_list(date.year())
        .into_iter()
        .find(|t| t.date == date)
    {
        return Some(term.kind.name().to_string());
    }
    let info = lunar_date_info(date)?;
    if info.day == 1 {
        Some(info.year_month.full_name())
    } else {
        Some(info.day_name().to_string())
    }
}
