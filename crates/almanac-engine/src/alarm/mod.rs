//! Recurring alarms: the rule model, next-fire computation, storage, and
//! the hand-off to a platform timer.

pub mod recurrence;
pub mod rule;
pub mod schedule;
pub mod store;

pub use recurrence::{
    next_fire_time, next_fire_time_with_options, HolidayFallback, NextFireOptions,
    EVERY_MONTH_SCAN_MONTHS, EVERY_YEAR_SCAN_YEARS, WORK_DAY_SCAN_DAYS,
};
pub use rule::{
    date_from_epoch_day, epoch_day, AlarmId, AlarmIdGenerator, AlarmKind, AlarmRule,
    AlarmRuleBuilder, Recurrence,
};
pub use schedule::{handle_wake, sync_alarm, sync_all, verify_wake, AlarmScheduler, SyncOutcome};
pub use store::{AlarmStore, InMemoryAlarmStore};
