//! Bridging alarm rules to a platform timer.
//!
//! The engine never keeps timers itself. An [`AlarmScheduler`] arms one
//! pending wake-up per alarm; [`sync_alarm`] keeps it in line with the rule
//! and [`handle_wake`] validates a delivered wake-up and arms the next one.

use chrono::{Duration, NaiveDateTime};
use log::{info, warn};

use super::recurrence::next_fire_time;
use super::rule::{AlarmId, AlarmRule};
use super::store::AlarmStore;
use crate::error::Result;
use crate::holiday::HolidayOracle;

/// A platform timer that can hold one pending wake-up per alarm id.
pub trait AlarmScheduler {
    /// Arm (or re-arm) the wake-up for `id` at `at`.
    fn schedule(&self, id: AlarmId, title: &str, at: NaiveDateTime);

    /// Drop any pending wake-up for `id`. A no-op if none is armed.
    fn cancel(&self, id: AlarmId);
}

/// What [`sync_alarm`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Scheduled(NaiveDateTime),
    /// The alarm is disabled.
    CancelledDisabled,
    /// The alarm will never fire again.
    CancelledExhausted,
}

/// Arm the scheduler for the next firing of `rule` at or after `now`, or
/// cancel it when the alarm is disabled or finished.
///
/// # Errors
///
/// Errors from [`next_fire_time`]. The scheduler is left untouched.
pub fn sync_alarm<O, S>(
    rule: &AlarmRule,
    now: NaiveDateTime,
    oracle: &O,
    scheduler: &S,
) -> Result<SyncOutcome>
where
    O: HolidayOracle + ?Sized,
    S: AlarmScheduler + ?Sized,
{
    if rule.disabled {
        scheduler.cancel(rule.id);
        info!("event=alarm_sync module=schedule status=disabled id={}", rule.id);
        return Ok(SyncOutcome::CancelledDisabled);
    }
    match next_fire_time(rule, now, oracle)? {
        Some(at) => {
            scheduler.schedule(rule.id, &rule.title, at);
            info!("event=alarm_sync module=schedule status=scheduled id={} at={at}", rule.id);
            Ok(SyncOutcome::Scheduled(at))
        }
        None => {
            scheduler.cancel(rule.id);
            info!("event=alarm_sync module=schedule status=exhausted id={}", rule.id);
            Ok(SyncOutcome::CancelledExhausted)
        }
    }
}

/// [`sync_alarm`] for every alarm in `store`, e.g. after boot. A failing
/// alarm is logged and skipped so the others still get armed.
pub fn sync_all<St, O, S>(
    store: &St,
    now: NaiveDateTime,
    oracle: &O,
    scheduler: &S,
) -> Vec<(AlarmId, Result<SyncOutcome>)>
where
    St: AlarmStore + ?Sized,
    O: HolidayOracle + ?Sized,
    S: AlarmScheduler + ?Sized,
{
    store
        .alarms()
        .iter()
        .map(|rule| {
            let outcome = sync_alarm(rule, now, oracle, scheduler);
            if let Err(err) = &outcome {
                warn!("event=alarm_sync module=schedule status=error id={} error=\"{err}\"", rule.id);
            }
            (rule.id, outcome)
        })
        .collect()
}

/// Whether a wake-up delivered for `expected` is still valid for `rule`:
/// the rule is enabled and `expected` is exactly its next firing.
///
/// # Errors
///
/// Errors from [`next_fire_time`].
pub fn verify_wake<O: HolidayOracle + ?Sized>(
    rule: &AlarmRule,
    expected: NaiveDateTime,
    oracle: &O,
) -> Result<bool> {
    if rule.disabled {
        return Ok(false);
    }
    Ok(next_fire_time(rule, expected, oracle)? == Some(expected))
}

/// Handle a wake-up for alarm `id` that was armed for `expected`.
///
/// Returns the rule to ring for, or `None` when the wake-up is stale (the
/// alarm was removed, disabled, or edited since). A valid wake-up re-arms
/// the alarm for its following firing.
///
/// # Errors
///
/// Errors from [`next_fire_time`].
pub fn handle_wake<St, O, S>(
    store: &St,
    id: AlarmId,
    expected: NaiveDateTime,
    oracle: &O,
    scheduler: &S,
) -> Result<Option<AlarmRule>>
where
    St: AlarmStore + ?Sized,
    O: HolidayOracle + ?Sized,
    S: AlarmScheduler + ?Sized,
{
    let Some(rule) = store.find(id) else {
        warn!("event=alarm_wake module=schedule status=missing id={id}");
        return Ok(None);
    };
    if !verify_wake(&rule, expected, oracle)? {
        warn!("event=alarm_wake module=schedule status=stale id={id} expected={expected}");
        return Ok(None);
    }
    sync_alarm(&rule, expected + Duration::seconds(1), oracle, scheduler)?;
    info!("event=alarm_wake module=schedule status=ring id={id}");
    Ok(Some(rule))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::{AlarmKind, AlarmRuleBuilder, InMemoryAlarmStore};
    use crate::holiday::WeekendOracle;
    use chrono::{NaiveDate, NaiveTime};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingScheduler {
        armed: Mutex<HashMap<AlarmId, NaiveDateTime>>,
        cancels: Mutex<Vec<AlarmId>>,
    }

    impl AlarmScheduler for RecordingScheduler {
        fn schedule(&self, id: AlarmId, _title: &str, at: NaiveDateTime) {
            self.armed.lock().unwrap().insert(id, at);
        }

        fn cancel(&self, id: AlarmId) {
            self.armed.lock().unwrap().remove(&id);
            self.cancels.lock().unwrap().push(id);
        }
    }

    impl RecordingScheduler {
        fn armed_at(&self, id: AlarmId) -> Option<NaiveDateTime> {
            self.armed.lock().unwrap().get(&id).copied()
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn daily(id: u64) -> AlarmRule {
        AlarmRuleBuilder::new(AlarmId(id))
            .kind(AlarmKind::EveryDay)
            .title("wake")
            .trigger_time(NaiveTime::from_hms_opt(7, 50, 0).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_sync_schedules_next_firing() {
        let scheduler = RecordingScheduler::default();
        let outcome = sync_alarm(&daily(1), at(2024, 6, 26, 8, 0), &WeekendOracle, &scheduler).unwrap();
        assert_eq!(outcome, SyncOutcome::Scheduled(at(2024, 6, 27, 7, 50)));
        assert_eq!(scheduler.armed_at(AlarmId(1)), Some(at(2024, 6, 27, 7, 50)));
    }

    #[test]
    fn test_sync_cancels_disabled_and_exhausted() {
        let scheduler = RecordingScheduler::default();
        let mut rule = daily(1);
        rule.disabled = true;
        assert_eq!(
            sync_alarm(&rule, at(2024, 6, 26, 8, 0), &WeekendOracle, &scheduler).unwrap(),
            SyncOutcome::CancelledDisabled
        );

        let past = AlarmRuleBuilder::new(AlarmId(2))
            .kind_on(AlarmKind::OneTime, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .build()
            .unwrap();
        assert_eq!(
            sync_alarm(&past, at(2024, 6, 26, 8, 0), &WeekendOracle, &scheduler).unwrap(),
            SyncOutcome::CancelledExhausted
        );
        assert_eq!(*scheduler.cancels.lock().unwrap(), vec![AlarmId(1), AlarmId(2)]);
    }

    #[test]
    fn test_verify_wake() {
        let rule = daily(1);
        assert!(verify_wake(&rule, at(2024, 6, 26, 7, 50), &WeekendOracle).unwrap());
        // Rule edited to a different time: stale wake-up
        assert!(!verify_wake(&rule, at(2024, 6, 26, 7, 45), &WeekendOracle).unwrap());
        let mut disabled = rule;
        disabled.disabled = true;
        assert!(!verify_wake(&disabled, at(2024, 6, 26, 7, 50), &WeekendOracle).unwrap());
    }

    #[test]
    fn test_handle_wake_rings_and_rearms() {
        let store = InMemoryAlarmStore::new();
        store.add(daily(1)).unwrap();
        let scheduler = RecordingScheduler::default();

        let rung = handle_wake(&store, AlarmId(1), at(2024, 6, 26, 7, 50), &WeekendOracle, &scheduler)
            .unwrap();
        assert_eq!(rung.map(|r| r.id), Some(AlarmId(1)));
        assert_eq!(scheduler.armed_at(AlarmId(1)), Some(at(2024, 6, 27, 7, 50)));
    }

    #[test]
    fn test_handle_wake_ignores_stale_and_missing() {
        let store = InMemoryAlarmStore::new();
        store.add(daily(1)).unwrap();
        let scheduler = RecordingScheduler::default();

        let stale = handle_wake(&store, AlarmId(1), at(2024, 6, 26, 7, 0), &WeekendOracle, &scheduler)
            .unwrap();
        assert!(stale.is_none());
        let missing = handle_wake(&store, AlarmId(9), at(2024, 6, 26, 7, 50), &WeekendOracle, &scheduler)
            .unwrap();
        assert!(missing.is_none());
        assert!(scheduler.armed.lock().unwrap().is_empty());
    }

    #[test]
    fn test_sync_all_arms_every_alarm() {
        let store = InMemoryAlarmStore::new();
        store.add(daily(1)).unwrap();
        store.add(daily(2)).unwrap();
        let scheduler = RecordingScheduler::default();
        let results = sync_all(&store, at(2024, 6, 26, 6, 0), &WeekendOracle, &scheduler);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
        assert_eq!(scheduler.armed_at(AlarmId(2)), Some(at(2024, 6, 26, 7, 50)));
    }
}
