//! Stem-branch pillars (八字), zodiac animals and auspicious hours.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

use super::{lunar_new_year_date, solar_terms_date_list, tables};

const STEMS: [&str; 10] = ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"];
const BRANCHES: [&str; 12] = [
    "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
];
const ZODIAC_NAMES: [&str; 12] = [
    "鼠", "牛", "虎", "兔", "龙", "蛇", "马", "羊", "猴", "鸡", "狗", "猪",
];

/// Day pillar anchor: 2024-01-01 is 甲子.
const DAY_ANCHOR: (i32, u32, u32) = (2024, 1, 1);

// ── Stem / branch ───────────────────────────────────────────────────────────

/// The five elements (五行).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    pub fn name(self) -> &'static str {
        match self {
            Element::Wood => "木",
            Element::Fire => "火",
            Element::Earth => "土",
            Element::Metal => "金",
            Element::Water => "水",
        }
    }
}

/// A heavenly stem (0-9) paired with an earthly branch (0-11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StemBranch {
    pub stem_index: usize,
    pub branch_index: usize,
}

impl StemBranch {
    /// Build a pair, reducing both indices into their cycles.
    pub fn new(stem_index: usize, branch_index: usize) -> Self {
        Self {
            stem_index: stem_index % 10,
            branch_index: branch_index % 12,
        }
    }

    /// The pair at position `index` of the 60-cycle (0 = 甲子).
    pub fn from_cycle_index(index: usize) -> Self {
        Self::new(index % 10, index % 12)
    }

    /// Position of this pair in the 60-cycle.
    ///
    /// Only pairs of matching parity occur in the cycle; the result for a
    /// mismatched pair is unspecified.
    pub fn cycle_index(&self) -> usize {
        (6 * self.stem_index + 60 - (5 * self.branch_index) % 60) % 60
    }

    pub fn stem(&self) -> &'static str {
        STEMS[self.stem_index]
    }

    pub fn branch(&self) -> &'static str {
        BRANCHES[self.branch_index]
    }

    /// Combined name, e.g. "甲辰".
    pub fn name(&self) -> String {
        format!("{}{}", self.stem(), self.branch())
    }

    pub fn stem_element(&self) -> Element {
        use Element::*;
        [Wood, Wood, Fire, Fire, Earth, Earth, Metal, Metal, Water, Water][self.stem_index]
    }

    pub fn branch_element(&self) -> Element {
        use Element::*;
        [
            Water, Earth, Wood, Wood, Earth, Fire, Fire, Earth, Metal, Metal, Earth, Water,
        ][self.branch_index]
    }
}

// ── Zodiac ──────────────────────────────────────────────────────────────────

/// Zodiac animal of a year (or day).
///
/// `index` follows the popular convention where the animal changes at the
/// lunar new year; `trad_index` follows the year pillar, which changes at
/// the start of spring (立春).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChineseZodiac {
    pub index: usize,
    pub trad_index: usize,
}

impl ChineseZodiac {
    /// A zodiac whose two conventions agree.
    pub fn new(index: usize) -> Self {
        Self {
            index: index % 12,
            trad_index: index % 12,
        }
    }

    pub fn name(&self) -> &'static str {
        ZODIAC_NAMES[self.index]
    }

    pub fn trad_name(&self) -> &'static str {
        ZODIAC_NAMES[self.trad_index]
    }
}

/// The zodiac animal opposite `index` in the 12-cycle (相冲).
pub fn clash_chinese_zodiac(index: usize) -> ChineseZodiac {
    ChineseZodiac::new((index + 6) % 12)
}

// ── eight_chars ─────────────────────────────────────────────────────────────

/// The four pillars of a date-time plus its zodiac animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EightChars {
    pub year: StemBranch,
    pub month: StemBranch,
    pub day: StemBranch,
    pub hour: StemBranch,
    pub zodiac: ChineseZodiac,
}

impl EightChars {
    /// Zodiac animal of the day branch.
    pub fn day_zodiac(&self) -> ChineseZodiac {
        ChineseZodiac::new(self.day.branch_index)
    }
}

/// Compute the eight characters of `date_time`.
///
/// - Year pillar: changes at the start of spring, not at the lunar new year.
/// - Month pillar: one month per pair of solar terms; minor and major cold
///   belong to the previous year's twelfth month.
/// - Day pillar: 60-day cycle anchored at 2024-01-01 (甲子). The day starts
///   at 23:00.
/// - Hour pillar: two-hour slots starting at 23:00, stems keyed on the day stem.
///
/// Returns `None` outside the solar term window (1901-2100).
///
/// # Examples
///
/// ```
/// use almanac_engine::lunar::eight_chars;
/// use chrono::NaiveDate;
///
/// let dt = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap().and_hms_opt(1, 0, 0).unwrap();
/// let chars = eight_chars(dt).unwrap();
/// assert_eq!(chars.year.name(), "甲辰");
/// assert_eq!(chars.month.name(), "丙寅");
/// assert_eq!(chars.day.name(), "癸卯");
/// assert_eq!(chars.hour.name(), "癸丑");
/// assert_eq!((chars.zodiac.name(), chars.zodiac.trad_name()), ("兔", "龙"));
/// ```
pub fn eight_chars(date_time: NaiveDateTime) -> Option<EightChars> {
    let date = date_time.date();
    let terms = solar_terms_date_list(date.year());
    let spring_start = terms.get(2)?.date;
    let new_year = lunar_new_year_date(date.year())?;

    let pillar_year = if date >= spring_start {
        date.year()
    } else {
        date.year() - 1
    };
    let year_offset = i64::from(pillar_year) - 4;
    let year = StemBranch::new(
        year_offset.rem_euclid(10) as usize,
        year_offset.rem_euclid(12) as usize,
    );

    let term_index = match terms.iter().rposition(|t| t.date <= date) {
        Some(i) if i >= 2 => i,
        Some(i) => i + 24,
        None => 23,
    };
    let month_offset = term_index / 2 + 1;
    let month = StemBranch::new(
        month_offset + (year.stem_index % 5) * 2,
        month_offset,
    );

    let day_date = if date_time.hour() >= 23 {
        date.succ_opt()?
    } else {
        date
    };
    let anchor = NaiveDate::from_ymd_opt(DAY_ANCHOR.0, DAY_ANCHOR.1, DAY_ANCHOR.2)?;
    let span = (day_date - anchor).num_days();
    let day = StemBranch::new(
        span.rem_euclid(10) as usize,
        span.rem_euclid(12) as usize,
    );

    let slot = (date_time.hour() as usize + 1) / 2;
    let hour = StemBranch::new(slot + (day.stem_index % 5) * 2, slot);

    let branch = year.branch_index;
    let index = if date >= new_year && date < spring_start {
        (branch + 1) % 12
    } else if date >= spring_start && date < new_year {
        (branch + 11) % 12
    } else {
        branch
    };

    Some(EightChars {
        year,
        month,
        day,
        hour,
        zodiac: ChineseZodiac {
            index,
            trad_index: branch,
        },
    })
}

// ── time_lucky_list ─────────────────────────────────────────────────────────

/// Whether a two-hour slot is auspicious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeLuckyInfo {
    pub time: StemBranch,
    pub is_good: bool,
}

impl TimeLuckyInfo {
    /// "吉" or "凶".
    pub fn lucky_name(&self) -> &'static str {
        if self.is_good {
            "吉"
        } else {
            "凶"
        }
    }
}

/// Auspicious-hour table of `date`: twelve two-hour slots from 子 (23:00 of
/// the previous evening) followed by the 子 slot that opens the next day.
/// The thirteenth entry is read from the next day's mask.
///
/// Returns an empty list outside the solar term window.
pub fn time_lucky_list(date: NaiveDate) -> Vec<TimeLuckyInfo> {
    let Some(chars) = eight_chars(date.and_time(NaiveTime::MIN)) else {
        return Vec::new();
    };
    let day_index = chars.day.cycle_index();
    let first = chars.hour;

    let mut list: Vec<TimeLuckyInfo> = (0..12)
        .map(|slot| TimeLuckyInfo {
            time: StemBranch::new(first.stem_index + slot, first.branch_index + slot),
            is_good: tables::is_lucky_slot(day_index, slot),
        })
        .collect();
    list.push(TimeLuckyInfo {
        time: StemBranch::new(first.stem_index + 12, first.branch_index),
        is_good: tables::is_lucky_slot((day_index + 1) % 60, 0),
    });
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn summary(dt: NaiveDateTime) -> String {
        let c = eight_chars(dt).unwrap();
        format!(
            "{},{},{},{},{}-{}",
            c.year.name(),
            c.month.name(),
            c.day.name(),
            c.hour.name(),
            c.zodiac.name(),
            c.zodiac.trad_name()
        )
    }

    fn lucky_summary(date: NaiveDate) -> String {
        time_lucky_list(date)
            .iter()
            .map(|t| format!("{}{}", t.time.name(), t.lucky_name()))
            .collect()
    }

    #[test]
    fn test_eight_chars_known_dates() {
        assert_eq!(summary(at(2023, 2, 3, 0)), "壬寅,癸丑,壬辰,庚子,兔-虎");
        assert_eq!(summary(at(2023, 2, 4, 0)), "癸卯,甲寅,癸巳,壬子,兔-兔");
        assert_eq!(summary(at(2024, 1, 6, 0)), "癸卯,乙丑,己巳,甲子,兔-兔");
        assert_eq!(summary(at(2024, 2, 9, 1)), "甲辰,丙寅,癸卯,癸丑,兔-龙");
    }

    #[test]
    fn test_eight_chars_day_starts_at_23() {
        let late = eight_chars(at(2024, 1, 1, 23)).unwrap();
        let next = eight_chars(at(2024, 1, 2, 0)).unwrap();
        assert_eq!(late.day, next.day);
        assert_eq!(late.day.name(), "乙丑");
        // Slot 12 keyed on the next day's stem, not the 00:00 slot.
        assert_eq!(late.hour.name(), "戊子");
        assert_eq!(next.hour.name(), "丙子");
    }

    #[test]
    fn test_eight_chars_anchor_is_jiazi() {
        let chars = eight_chars(at(2024, 1, 1, 12)).unwrap();
        assert_eq!(chars.day.name(), "甲子");
        let before = eight_chars(at(2023, 12, 31, 12)).unwrap();
        assert_eq!(before.day.name(), "癸亥");
    }

    #[test]
    fn test_eight_chars_out_of_range() {
        assert!(eight_chars(at(1900, 6, 1, 0)).is_none());
        assert!(eight_chars(at(2101, 6, 1, 0)).is_none());
    }

    #[test]
    fn test_cycle_index_round_trip() {
        for i in 0..60 {
            assert_eq!(StemBranch::from_cycle_index(i).cycle_index(), i);
        }
    }

    #[test]
    fn test_clash_chinese_zodiac() {
        assert_eq!(clash_chinese_zodiac(0).name(), "马");
        assert_eq!(clash_chinese_zodiac(7).name(), "牛");
        assert_eq!(clash_chinese_zodiac(11).name(), "蛇");
    }

    #[test]
    fn test_elements() {
        let pair = StemBranch::new(0, 4);
        assert_eq!(pair.stem_element(), Element::Wood);
        assert_eq!(pair.branch_element(), Element::Earth);
        assert_eq!(StemBranch::new(9, 11).stem_element().name(), "水");
    }

    #[test]
    fn test_time_lucky_list() {
        let ymd = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(
            lucky_summary(ymd(2024, 7, 2)),
            "庚子吉辛丑凶壬寅吉癸卯吉甲辰凶乙巳凶丙午吉丁未吉戊申凶己酉吉庚戌凶辛亥凶壬子凶"
        );
        assert_eq!(
            lucky_summary(ymd(2025, 7, 3)),
            "壬子吉癸丑凶甲寅吉乙卯吉丙辰凶丁巳凶戊午吉己未吉庚申凶辛酉吉壬戌凶癸亥凶甲子凶"
        );
        assert_eq!(
            lucky_summary(ymd(2024, 7, 20)),
            "丙子吉丁丑凶戊寅吉己卯吉庚辰凶辛巳凶壬午吉癸未吉甲申凶乙酉吉丙戌凶丁亥凶戊子凶"
        );
        assert_eq!(
            lucky_summary(ymd(2024, 7, 21)),
            "戊子凶己丑凶庚寅吉辛卯凶壬辰吉癸巳吉甲午凶乙未凶丙申吉丁酉吉戊戌凶己亥吉庚子凶"
        );
        assert_eq!(time_lucky_list(ymd(2024, 7, 21)).len(), 13);
        assert!(time_lucky_list(ymd(2101, 1, 1)).is_empty());
    }
}
