//! Western zodiac signs.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// The twelve Western zodiac signs, in calendar order from Aquarius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WesternZodiac {
    Aquarius,
    Pisces,
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
}

/// `(sign, month, day)` each sign starts on.
const SIGN_STARTS: [(WesternZodiac, u32, u32); 12] = [
    (WesternZodiac::Aquarius, 1, 20),
    (WesternZodiac::Pisces, 2, 19),
    (WesternZodiac::Aries, 3, 21),
    (WesternZodiac::Taurus, 4, 20),
    (WesternZodiac::Gemini, 5, 21),
    (WesternZodiac::Cancer, 6, 22),
    (WesternZodiac::Leo, 7, 23),
    (WesternZodiac::Virgo, 8, 23),
    (WesternZodiac::Libra, 9, 23),
    (WesternZodiac::Scorpio, 10, 24),
    (WesternZodiac::Sagittarius, 11, 23),
    (WesternZodiac::Capricorn, 12, 22),
];

impl WesternZodiac {
    pub fn name(self) -> &'static str {
        match self {
            WesternZodiac::Aquarius => "水瓶座",
            WesternZodiac::Pisces => "双鱼座",
            WesternZodiac::Aries => "白羊座",
            WesternZodiac::Taurus => "金牛座",
            WesternZodiac::Gemini => "双子座",
            WesternZodiac::Cancer => "巨蟹座",
            WesternZodiac::Leo => "狮子座",
            WesternZodiac::Virgo => "处女座",
            WesternZodiac::Libra => "天秤座",
            WesternZodiac::Scorpio => "天蝎座",
            WesternZodiac::Sagittarius => "射手座",
            WesternZodiac::Capricorn => "摩羯座",
        }
    }
}

/// A sign and the date its current cycle started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WesternZodiacInfo {
    pub sign: WesternZodiac,
    pub start_date: NaiveDate,
}

impl WesternZodiacInfo {
    pub fn name(&self) -> &'static str {
        self.sign.name()
    }
}

/// The Western zodiac sign of `date`. Dates before January 20 fall under the
/// Capricorn cycle that started in the previous December.
///
/// # Examples
///
/// ```
/// use almanac_engine::astrology::{western_zodiac_info, WesternZodiac};
/// use chrono::NaiveDate;
///
/// let info = western_zodiac_info(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
/// assert_eq!(info.sign, WesternZodiac::Capricorn);
/// assert_eq!(info.start_date, NaiveDate::from_ymd_opt(2023, 12, 22).unwrap());
/// ```
pub fn western_zodiac_info(date: NaiveDate) -> WesternZodiacInfo {
    let in_year = |year: i32| {
        SIGN_STARTS.iter().filter_map(move |&(sign, month, day)| {
            NaiveDate::from_ymd_opt(year, month, day)
                .map(|start_date| WesternZodiacInfo { sign, start_date })
        })
    };
    in_year(date.year())
        .filter(|info| info.start_date <= date)
        .last()
        .or_else(|| in_year(date.year() - 1).last())
        .unwrap_or(WesternZodiacInfo {
            sign: WesternZodiac::Capricorn,
            start_date: date,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sign_boundaries() {
        assert_eq!(western_zodiac_info(ymd(2024, 1, 19)).sign, WesternZodiac::Capricorn);
        assert_eq!(western_zodiac_info(ymd(2024, 1, 20)).sign, WesternZodiac::Aquarius);
        assert_eq!(western_zodiac_info(ymd(2024, 3, 20)).sign, WesternZodiac::Pisces);
        assert_eq!(western_zodiac_info(ymd(2024, 3, 21)).sign, WesternZodiac::Aries);
        assert_eq!(western_zodiac_info(ymd(2024, 12, 31)).sign, WesternZodiac::Capricorn);
    }

    #[test]
    fn test_start_date_of_cycle() {
        let info = western_zodiac_info(ymd(2024, 8, 1));
        assert_eq!(info.name(), "狮子座");
        assert_eq!(info.start_date, ymd(2024, 7, 23));

        let info = western_zodiac_info(ymd(2024, 1, 1));
        assert_eq!(info.start_date, ymd(2023, 12, 22));
    }
}
