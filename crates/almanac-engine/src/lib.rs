//! # almanac-engine
//!
//! Chinese-calendar computation and recurring-alarm scheduling.
//!
//! The engine converts Gregorian dates into the traditional lunisolar
//! calendar (lunar dates, solar terms, eight characters, auspicious hours,
//! festivals) and computes when a recurring alarm fires next, consulting a
//! public-holiday calendar for work-day alarms. All computation is pure and
//! takes its reference instant explicitly; no function reads the clock.
//!
//! ## Modules
//!
//! - [`lunar`]: lunar dates, solar terms, eight characters, festivals
//! - [`astrology`]: Western zodiac signs
//! - [`alarm`]: alarm rules, next-fire computation, storage and scheduling
//! - [`holiday`]: holiday oracle, year cache and API response parsing
//! - [`error`]: error types

pub mod alarm;
pub mod astrology;
pub mod error;
pub mod holiday;
pub mod lunar;

pub use alarm::{
    handle_wake, next_fire_time, next_fire_time_with_options, sync_alarm, AlarmId,
    AlarmIdGenerator, AlarmKind, AlarmRule, AlarmRuleBuilder, AlarmScheduler, AlarmStore,
    HolidayFallback, InMemoryAlarmStore, NextFireOptions, Recurrence, SyncOutcome,
};
pub use astrology::{western_zodiac_info, WesternZodiac, WesternZodiacInfo};
pub use error::{AlarmError, HolidayError, StoreError};
pub use holiday::{
    parse_holiday_response, HolidayCache, HolidayCacheConfig, HolidayInfo, HolidayOracle,
    HolidaySource, StaticHolidaySource, WeekendOracle, HOLIDAY_API_URL,
};
pub use lunar::{
    current_solar_term, date_subtitle, eight_chars, leap_month_info, lunar_date_info,
    lunar_festival_info, lunar_month_days, lunar_new_year_date, solar_terms_date_list,
    time_lucky_list, EightChars, LunarDateInfo, LunarMonthInfo, SolarTerm, SolarTermKind,
};
