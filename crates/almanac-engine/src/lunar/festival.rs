//! Traditional festivals keyed on lunar month and day.

use chrono::NaiveDate;
use serde::Serialize;

use super::{lunar_date_info, LunarDateInfo};

/// Marks the last day of a lunar month in [`FESTIVALS`].
const LAST_DAY: i32 = -1;

/// `(lunar month, lunar day, name)`. A day of [`LAST_DAY`] matches the day
/// before the first of the *following* month, so `(1, LAST_DAY)` is the eve
/// of 正月初一. Order is significant: the first match wins.
const FESTIVALS: [(u32, i32, &str); 14] = [
    (1, LAST_DAY, "除夕"),
    (1, 1, "春节"),
    (1, 15, "元宵节"),
    (2, LAST_DAY, "送穷节"),
    (2, 2, "龙抬头"),
    (3, 3, "上巳节"),
    (5, 5, "端午节"),
    (7, 7, "七夕节"),
    (7, 15, "中元节"),
    (8, 15, "中秋节"),
    (9, 9, "重阳节"),
    (10, 1, "寒衣节"),
    (10, 15, "下元节"),
    (12, 8, "腊八节"),
];

/// A festival and the lunar date it falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LunarFestival {
    pub date: LunarDateInfo,
    pub name: &'static str,
}

/// The festival falling on `date`, if any. Leap months carry no festivals.
///
/// # Examples
///
/// ```
/// use almanac_engine::lunar::lunar_festival_info;
/// use chrono::NaiveDate;
///
/// let eve = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
/// assert_eq!(lunar_festival_info(eve).map(|f| f.name), Some("除夕"));
/// ```
pub fn lunar_festival_info(date: NaiveDate) -> Option<LunarFestival> {
    let today = lunar_date_info(date)?;
    let tomorrow = date.succ_opt().and_then(lunar_date_info);
    FESTIVALS
        .iter()
        .find(|&&(month, day, _)| {
            if day == LAST_DAY {
                tomorrow.is_some_and(|t| !t.is_leap() && t.day == 1 && t.month() == month)
            } else {
                !today.is_leap() && today.month() == month && i64::from(today.day) == i64::from(day)
            }
        })
        .map(|&(_, _, name)| LunarFestival { date: today, name })
}
