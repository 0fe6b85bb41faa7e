//! Alarm persistence.

use std::sync::{Mutex, PoisonError};

use log::info;

use super::rule::{AlarmId, AlarmRule};
use crate::error::StoreError;

/// Storage for alarm rules. Implementations must be safe to call from
/// several threads.
pub trait AlarmStore {
    /// All alarms, in insertion order.
    fn alarms(&self) -> Vec<AlarmRule>;

    fn find(&self, id: AlarmId) -> Option<AlarmRule> {
        self.alarms().into_iter().find(|a| a.id == id)
    }

    /// # Errors
    ///
    /// [`StoreError::DuplicateId`] if an alarm with the same id exists.
    fn add(&self, rule: AlarmRule) -> Result<(), StoreError>;

    /// Replace the alarm with the same id.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if there is no such alarm.
    fn update(&self, rule: AlarmRule) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// [`StoreError::NotFound`] if there is no such alarm.
    fn remove(&self, id: AlarmId) -> Result<AlarmRule, StoreError>;

    /// Flip the `disabled` flag and return the updated rule.
    ///
    /// The default reads then writes; stores that can lock across both
    /// should override it.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if there is no such alarm.
    fn set_disabled(&self, id: AlarmId, disabled: bool) -> Result<AlarmRule, StoreError> {
        let mut rule = self.find(id).ok_or(StoreError::NotFound(id))?;
        rule.disabled = disabled;
        self.update(rule.clone())?;
        Ok(rule)
    }
}

/// [`AlarmStore`] kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryAlarmStore {
    alarms: Mutex<Vec<AlarmRule>>,
}

impl InMemoryAlarmStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_alarms<T>(&self, f: impl FnOnce(&mut Vec<AlarmRule>) -> T) -> T {
        let mut alarms = self.alarms.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut alarms)
    }
}

impl AlarmStore for InMemoryAlarmStore {
    fn alarms(&self) -> Vec<AlarmRule> {
        self.with_alarms(|alarms| alarms.clone())
    }

    fn find(&self, id: AlarmId) -> Option<AlarmRule> {
        self.with_alarms(|alarms| alarms.iter().find(|a| a.id == id).cloned())
    }

    fn add(&self, rule: AlarmRule) -> Result<(), StoreError> {
        let id = rule.id;
        self.with_alarms(|alarms| {
            if alarms.iter().any(|a| a.id == id) {
                return Err(StoreError::DuplicateId(id));
            }
            alarms.push(rule);
            Ok(())
        })?;
        info!("event=alarm_add module=store status=ok id={id}");
        Ok(())
    }

    fn update(&self, rule: AlarmRule) -> Result<(), StoreError> {
        let id = rule.id;
        self.with_alarms(|alarms| {
            let slot = alarms
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or(StoreError::NotFound(id))?;
            *slot = rule;
            Ok(())
        })?;
        info!("event=alarm_update module=store status=ok id={id}");
        Ok(())
    }

    fn remove(&self, id: AlarmId) -> Result<AlarmRule, StoreError> {
        let removed = self.with_alarms(|alarms| {
            let pos = alarms
                .iter()
                .position(|a| a.id == id)
                .ok_or(StoreError::NotFound(id))?;
            Ok(alarms.remove(pos))
        })?;
        info!("event=alarm_remove module=store status=ok id={id}");
        Ok(removed)
    }

    fn set_disabled(&self, id: AlarmId, disabled: bool) -> Result<AlarmRule, StoreError> {
        let rule = self.with_alarms(|alarms| {
            let slot = alarms
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or(StoreError::NotFound(id))?;
            slot.disabled = disabled;
            Ok(slot.clone())
        })?;
        info!("event=alarm_toggle module=store status=ok id={id} disabled={disabled}");
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::{AlarmKind, AlarmRuleBuilder};

    fn alarm(id: u64, title: &str) -> AlarmRule {
        AlarmRuleBuilder::new(AlarmId(id))
            .kind(AlarmKind::EveryDay)
            .title(title)
            .build()
            .unwrap()
    }

    #[test]
    fn test_add_find_and_order() {
        let store = InMemoryAlarmStore::new();
        store.add(alarm(2, "b")).unwrap();
        store.add(alarm(1, "a")).unwrap();
        let ids: Vec<u64> = store.alarms().iter().map(|a| a.id.0).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(store.find(AlarmId(1)).map(|a| a.title), Some("a".to_string()));
        assert_eq!(store.find(AlarmId(3)), None);
    }

    #[test]
    fn test_add_rejects_duplicate() {
        let store = InMemoryAlarmStore::new();
        store.add(alarm(1, "a")).unwrap();
        assert_eq!(
            store.add(alarm(1, "again")),
            Err(StoreError::DuplicateId(AlarmId(1)))
        );
        assert_eq!(store.alarms().len(), 1);
    }

    #[test]
    fn test_update_and_remove() {
        let store = InMemoryAlarmStore::new();
        store.add(alarm(1, "a")).unwrap();
        store.update(alarm(1, "renamed")).unwrap();
        assert_eq!(store.find(AlarmId(1)).unwrap().title, "renamed");
        assert_eq!(
            store.update(alarm(9, "x")),
            Err(StoreError::NotFound(AlarmId(9)))
        );

        let removed = store.remove(AlarmId(1)).unwrap();
        assert_eq!(removed.title, "renamed");
        assert!(store.alarms().is_empty());
        assert_eq!(store.remove(AlarmId(1)), Err(StoreError::NotFound(AlarmId(1))));
    }

    #[test]
    fn test_set_disabled() {
        let store = InMemoryAlarmStore::new();
        store.add(alarm(1, "a")).unwrap();
        let rule = store.set_disabled(AlarmId(1), true).unwrap();
        assert!(rule.disabled);
        assert!(store.find(AlarmId(1)).unwrap().disabled);
        assert!(store.set_disabled(AlarmId(2), true).is_err());
    }

    #[test]
    fn test_set_disabled_keeps_concurrent_update() {
        use std::sync::{Arc, Barrier};

        for _ in 0..200 {
            let store = Arc::new(InMemoryAlarmStore::new());
            store.add(alarm(1, "old")).unwrap();
            let barrier = Arc::new(Barrier::new(5));

            let togglers: Vec<_> = (0..4)
                .map(|i| {
                    let store = Arc::clone(&store);
                    let barrier = Arc::clone(&barrier);
                    std::thread::spawn(move || {
                        barrier.wait();
                        store.set_disabled(AlarmId(1), i % 2 == 0).unwrap();
                    })
                })
                .collect();
            barrier.wait();
            store.update(alarm(1, "new")).unwrap();
            for t in togglers {
                t.join().unwrap();
            }

            // A toggle never writes back a copy read before the rename.
            assert_eq!(store.find(AlarmId(1)).unwrap().title, "new");
        }
    }

    /// Store that only implements the required methods, to exercise the
    /// trait's default `set_disabled`.
    struct MinimalStore(InMemoryAlarmStore);

    impl AlarmStore for MinimalStore {
        fn alarms(&self) -> Vec<AlarmRule> {
            self.0.alarms()
        }

        fn add(&self, rule: AlarmRule) -> Result<(), StoreError> {
            self.0.add(rule)
        }

        fn update(&self, rule: AlarmRule) -> Result<(), StoreError> {
            self.0.update(rule)
        }

        fn remove(&self, id: AlarmId) -> Result<AlarmRule, StoreError> {
            self.0.remove(id)
        }
    }

    #[test]
    fn test_default_set_disabled() {
        let store = MinimalStore(InMemoryAlarmStore::new());
        store.add(alarm(1, "a")).unwrap();
        assert!(store.set_disabled(AlarmId(1), true).unwrap().disabled);
        assert_eq!(
            store.set_disabled(AlarmId(2), true),
            Err(StoreError::NotFound(AlarmId(2)))
        );
    }
}
