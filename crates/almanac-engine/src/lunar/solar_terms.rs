//! The 24 solar terms (二十四节气).

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::tables;

/// One of the 24 solar terms, in calendar order from minor cold (小寒).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SolarTermKind {
    MinorCold,
    MajorCold,
    StartOfSpring,
    RainWater,
    AwakeningOfInsects,
    SpringEquinox,
    PureBrightness,
    GrainRain,
    StartOfSummer,
    GrainBuds,
    GrainInEar,
    SummerSolstice,
    MinorHeat,
    MajorHeat,
    StartOfAutumn,
    EndOfHeat,
    WhiteDew,
    AutumnEquinox,
    ColdDew,
    FrostsDescent,
    StartOfWinter,
    MinorSnow,
    MajorSnow,
    WinterSolstice,
}

impl SolarTermKind {
    pub const ALL: [SolarTermKind; 24] = [
        Self::MinorCold,
        Self::MajorCold,
        Self::StartOfSpring,
        Self::RainWater,
        Self::AwakeningOfInsects,
        Self::SpringEquinox,
        Self::PureBrightness,
        Self::GrainRain,
        Self::StartOfSummer,
        Self::GrainBuds,
        Self::GrainInEar,
        Self::SummerSolstice,
        Self::MinorHeat,
        Self::MajorHeat,
        Self::StartOfAutumn,
        Self::EndOfHeat,
        Self::WhiteDew,
        Self::AutumnEquinox,
        Self::ColdDew,
        Self::FrostsDescent,
        Self::StartOfWinter,
        Self::MinorSnow,
        Self::MajorSnow,
        Self::WinterSolstice,
    ];

    /// Position in [`SolarTermKind::ALL`], 0-23.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        const NAMES: [&str; 24] = [
            "小寒", "大寒", "立春", "雨水", "惊蛰", "春分", "清明", "谷雨", "立夏", "小满", "芒种",
            "夏至", "小暑", "大暑", "立秋", "处暑", "白露", "秋分", "寒露", "霜降", "立冬", "小雪",
            "大雪", "冬至",
        ];
        NAMES[self.index()]
    }
}

/// A solar term and the Gregorian date it begins on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SolarTerm {
    pub kind: SolarTermKind,
    pub date: NaiveDate,
}

/// The 24 solar terms of `year`, from minor cold in January to the winter
/// solstice in December. Two terms fall in each month.
///
/// Returns an empty list outside 1901-2100.
///
/// # Examples
///
/// ```
/// use almanac_engine::lunar::solar_terms_date_list;
/// use chrono::Datelike;
///
/// let days: Vec<u32> = solar_terms_date_list(1901).iter().map(|t| t.date.day()).collect();
/// assert_eq!(days[..4], [6, 21, 4, 19]);
/// assert!(solar_terms_date_list(1900).is_empty());
/// ```
pub fn solar_terms_date_list(year: i32) -> Vec<SolarTerm> {
    let Some(word) = tables::solar_term_word(year) else {
        return Vec::new();
    };
    SolarTermKind::ALL
        .iter()
        .enumerate()
        .filter_map(|(i, &kind)| {
            let month = (i / 2) as u32 + 1;
            NaiveDate::from_ymd_opt(year, month, tables::solar_term_day(word, i))
                .map(|date| SolarTerm { kind, date })
        })
        .collect()
}

/// The solar term in force on `date`, with the 1-based day count since it
/// began. Early-January dates before minor cold belong to the previous
/// year's winter solstice.
///
/// Returns `None` when the needed years are outside the table.
pub fn current_solar_term(date: NaiveDate) -> Option<(SolarTerm, u32)> {
    let term = solar_terms_date_list(date.year())
        .into_iter()
        .rev()
        .find(|t| t.date <= date)
        .or_else(|| solar_terms_date_list(date.year() - 1).pop())?;
    let day = (date - term.date).num_days() + 1;
    Some((term, day as u32))
}
