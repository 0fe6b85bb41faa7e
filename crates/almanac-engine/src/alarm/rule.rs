//! Alarm records, their checked recurrence form, and construction helpers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::AlarmError;

/// Days from 0001-01-01 to 1970-01-01, for epoch-day conversion.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

const SECONDS_PER_DAY: u32 = 86_400;

/// Number of low id bits taken by the rolling counter.
const ID_COUNTER_BITS: u32 = 10;

// ── Ids ─────────────────────────────────────────────────────────────────────

/// Unique alarm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlarmId(pub u64);

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process-local id source: the millisecond clock in the high bits, a
/// rolling counter in the low 10 bits so ids minted within the same
/// millisecond still differ.
#[derive(Debug, Default)]
pub struct AlarmIdGenerator {
    counter: AtomicU64,
}

impl AlarmIdGenerator {
    pub const fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    /// Mint an id for the instant `now_millis` (milliseconds since the epoch).
    pub fn next_id(&self, now_millis: i64) -> AlarmId {
        let mask = (1u64 << ID_COUNTER_BITS) - 1;
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        AlarmId((now_millis as u64 & !mask) | (seq & mask))
    }

    /// Mint an id from the system clock.
    pub fn next_id_now(&self) -> AlarmId {
        self.next_id(Utc::now().timestamp_millis())
    }
}

// ── AlarmKind / AlarmRule ───────────────────────────────────────────────────

/// How an alarm repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmKind {
    OneTime,
    WorkDay,
    EveryDay,
    EveryWeek,
    EveryMonth,
    EveryYear,
}

impl AlarmKind {
    pub const ALL: [AlarmKind; 6] = [
        Self::OneTime,
        Self::WorkDay,
        Self::EveryDay,
        Self::EveryWeek,
        Self::EveryMonth,
        Self::EveryYear,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AlarmKind::OneTime => "ONE_TIME",
            AlarmKind::WorkDay => "WORK_DAY",
            AlarmKind::EveryDay => "EVERY_DAY",
            AlarmKind::EveryWeek => "EVERY_WEEK",
            AlarmKind::EveryMonth => "EVERY_MONTH",
            AlarmKind::EveryYear => "EVERY_YEAR",
        }
    }
}

/// A stored alarm as the persistence layer hands it over.
///
/// Trigger fields are optional; which ones matter depends on `kind`. Use
/// [`AlarmRule::recurrence`] to get the checked form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmRule {
    pub id: AlarmId,
    #[serde(default)]
    pub disabled: bool,
    pub kind: AlarmKind,
    #[serde(default)]
    pub title: String,
    /// Seconds since midnight, 0..86400.
    pub trigger_time: u32,
    /// Days since 1970-01-01 (ONE_TIME).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_day: Option<i64>,
    /// ISO weekday, 1 = Monday .. 7 = Sunday (EVERY_WEEK).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_weekday: Option<u32>,
    /// Day of month, 1..=31 (EVERY_MONTH, EVERY_YEAR).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_month_day: Option<u32>,
    /// Month, 1..=12 (EVERY_YEAR).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_month: Option<u32>,
}

/// The recurrence of an alarm with every field its kind needs present and
/// in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Recurrence {
    OneTime { day: NaiveDate },
    WorkDay,
    EveryDay,
    EveryWeek { weekday: Weekday },
    EveryMonth { day: u32 },
    EveryYear { month: u32, day: u32 },
}

impl Recurrence {
    pub fn kind(&self) -> AlarmKind {
        match self {
            Recurrence::OneTime { .. } => AlarmKind::OneTime,
            Recurrence::WorkDay => AlarmKind::WorkDay,
            Recurrence::EveryDay => AlarmKind::EveryDay,
            Recurrence::EveryWeek { .. } => AlarmKind::EveryWeek,
            Recurrence::EveryMonth { .. } => AlarmKind::EveryMonth,
            Recurrence::EveryYear { .. } => AlarmKind::EveryYear,
        }
    }
}

impl AlarmRule {
    /// Trigger time as a time of day, `None` when out of range.
    pub fn time_of_day(&self) -> Option<NaiveTime> {
        NaiveTime::from_num_seconds_from_midnight_opt(self.trigger_time, 0)
    }

    /// The ONE_TIME trigger date, if set.
    pub fn trigger_date(&self) -> Option<NaiveDate> {
        self.trigger_day.and_then(date_from_epoch_day)
    }

    /// Checked recurrence for this rule, or `None` when a field the kind
    /// requires is missing or out of range.
    pub fn recurrence(&self) -> Option<Recurrence> {
        let month_day = self.trigger_month_day.filter(|d| (1..=31).contains(d));
        Some(match self.kind {
            AlarmKind::OneTime => Recurrence::OneTime {
                day: self.trigger_date()?,
            },
            AlarmKind::WorkDay => Recurrence::WorkDay,
            AlarmKind::EveryDay => Recurrence::EveryDay,
            AlarmKind::EveryWeek => Recurrence::EveryWeek {
                weekday: self.trigger_weekday.and_then(weekday_from_iso)?,
            },
            AlarmKind::EveryMonth => Recurrence::EveryMonth { day: month_day? },
            AlarmKind::EveryYear => Recurrence::EveryYear {
                month: self.trigger_month.filter(|m| (1..=12).contains(m))?,
                day: month_day?,
            },
        })
    }
}

/// Days since 1970-01-01 of `date`.
pub fn epoch_day(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce() - EPOCH_DAYS_FROM_CE)
}

/// Inverse of [`epoch_day`].
pub fn date_from_epoch_day(day: i64) -> Option<NaiveDate> {
    let days = i32::try_from(day).ok()?.checked_add(EPOCH_DAYS_FROM_CE)?;
    NaiveDate::from_num_days_from_ce_opt(days)
}

fn weekday_from_iso(n: u32) -> Option<Weekday> {
    match n {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}

// ── Builder ─────────────────────────────────────────────────────────────────

/// Fluent constructor for [`AlarmRule`].
///
/// ```
/// use almanac_engine::alarm::{AlarmId, AlarmKind, AlarmRuleBuilder};
/// use chrono::NaiveTime;
///
/// let rule = AlarmRuleBuilder::new(AlarmId(1))
///     .kind(AlarmKind::EveryMonth)
///     .title("rent")
///     .trigger_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap())
///     .trigger_month_day(15)
///     .build()
///     .unwrap();
/// assert_eq!(rule.trigger_time, 9 * 3600);
/// ```
#[derive(Debug, Clone)]
pub struct AlarmRuleBuilder {
    rule: AlarmRule,
}

impl AlarmRuleBuilder {
    /// Start an enabled ONE_TIME rule at midnight with no trigger fields.
    pub fn new(id: AlarmId) -> Self {
        Self {
            rule: AlarmRule {
                id,
                disabled: false,
                kind: AlarmKind::OneTime,
                title: String::new(),
                trigger_time: 0,
                trigger_day: None,
                trigger_weekday: None,
                trigger_month_day: None,
                trigger_month: None,
            },
        }
    }

    /// Start from an existing rule, keeping its id.
    pub fn from_rule(rule: AlarmRule) -> Self {
        Self { rule }
    }

    /// The rule a fresh "add alarm" form starts with: one time, an hour
    /// after `now`.
    pub fn one_time_default(id: AlarmId, now: NaiveDateTime) -> Self {
        let at = now + chrono::Duration::hours(1);
        Self::new(id)
            .kind(AlarmKind::OneTime)
            .trigger_time(at.time())
            .trigger_day(at.date())
    }

    pub fn id(mut self, id: AlarmId) -> Self {
        self.rule.id = id;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.rule.disabled = disabled;
        self
    }

    pub fn kind(mut self, kind: AlarmKind) -> Self {
        self.rule.kind = kind;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.rule.title = title.into();
        self
    }

    /// Whole seconds of `time`; sub-second precision is dropped.
    pub fn trigger_time(mut self, time: NaiveTime) -> Self {
        self.rule.trigger_time = time.num_seconds_from_midnight();
        self
    }

    pub fn trigger_day(mut self, day: NaiveDate) -> Self {
        self.rule.trigger_day = Some(epoch_day(day));
        self
    }

    pub fn trigger_weekday(mut self, weekday: Weekday) -> Self {
        self.rule.trigger_weekday = Some(weekday.number_from_monday());
        self
    }

    pub fn trigger_month_day(mut self, day: u32) -> Self {
        self.rule.trigger_month_day = Some(day);
        self
    }

    pub fn trigger_month(mut self, month: u32) -> Self {
        self.rule.trigger_month = Some(month);
        self
    }

    /// Switch to `kind` and fill the trigger fields it needs from `date`,
    /// clearing the ones it does not use.
    pub fn kind_on(mut self, kind: AlarmKind, date: NaiveDate) -> Self {
        let rule = &mut self.rule;
        rule.kind = kind;
        rule.trigger_day = None;
        rule.trigger_weekday = None;
        rule.trigger_month_day = None;
        rule.trigger_month = None;
        match kind {
            AlarmKind::OneTime => rule.trigger_day = Some(epoch_day(date)),
            AlarmKind::EveryWeek => {
                rule.trigger_weekday = Some(date.weekday().number_from_monday())
            }
            AlarmKind::EveryMonth => rule.trigger_month_day = Some(date.day()),
            AlarmKind::EveryYear => {
                rule.trigger_month_day = Some(date.day());
                rule.trigger_month = Some(date.month());
            }
            AlarmKind::WorkDay | AlarmKind::EveryDay => {}
        }
        self
    }

    /// Finish the rule.
    ///
    /// # Errors
    ///
    /// Returns [`AlarmError::InvalidField`] when a set field is out of range.
    /// Missing fields are allowed; such rules simply never fire.
    pub fn build(self) -> Result<AlarmRule, AlarmError> {
        let rule = self.rule;
        if rule.trigger_time >= SECONDS_PER_DAY {
            return Err(AlarmError::InvalidField(format!(
                "trigger_time {} is not a second of the day",
                rule.trigger_time
            )));
        }
        if let Some(weekday) = rule.trigger_weekday.filter(|w| !(1..=7).contains(w)) {
            return Err(AlarmError::InvalidField(format!(
                "trigger_weekday {weekday} not in 1..=7"
            )));
        }
        if let Some(day) = rule.trigger_month_day.filter(|d| !(1..=31).contains(d)) {
            return Err(AlarmError::InvalidField(format!(
                "trigger_month_day {day} not in 1..=31"
            )));
        }
        if let Some(month) = rule.trigger_month.filter(|m| !(1..=12).contains(m)) {
            return Err(AlarmError::InvalidField(format!(
                "trigger_month {month} not in 1..=12"
            )));
        }
        Ok(rule)
    }
}
