// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of every light seen since startup.
//!
//! # Locking
//!
//! The map is behind a read-write lock that is only held to look up or
//! insert a record. Each record has its own mutex, and every read or write
//! of a record goes through it. The map lock is always taken before a record
//! lock, never the other way around, and neither is held across an `.await`.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};

use crate::control::ControlPolicy;
use crate::device::{DeviceAddress, DeviceRecord, Observation};
use crate::state::LightState;

type SharedRecord = Arc<Mutex<DeviceRecord>>;

/// Address-keyed store of [`DeviceRecord`]s.
///
/// Records are created on first observation and never removed.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use lumenward::control::ControlPolicy;
/// use lumenward::device::{DeviceAddress, Observation};
/// use lumenward::registry::DeviceRegistry;
/// use lumenward::state::LightState;
///
/// let registry = DeviceRegistry::new();
/// let addr = DeviceAddress::new("d0:73:d5:00:00:01");
/// let policy = ControlPolicy::default();
///
/// let first = registry.observe(&addr, "Desk", LightState::new(), Utc::now(), &policy);
/// assert_eq!(first, Observation::Created);
///
/// let again = registry.observe(&addr, "Desk", LightState::new(), Utc::now(), &policy);
/// assert_eq!(again, Observation::Unchanged);
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: RwLock<HashMap<DeviceAddress, SharedRecord>>,
}

impl DeviceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a snapshot for `address`, creating the record if needed.
    ///
    /// `name` is only used when the record is created.
    pub fn observe(
        &self,
        address: &DeviceAddress,
        name: &str,
        state: LightState,
        now: DateTime<Utc>,
        policy: &ControlPolicy,
    ) -> Observation {
        if let Some(record) = self.handle(address) {
            return record.lock().observe(state, now, policy);
        }

        let mut devices = self.devices.write();
        match devices.entry(address.clone()) {
            // Another task created it between the read and write locks
            Entry::Occupied(entry) => entry.get().lock().observe(state, now, policy),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Mutex::new(DeviceRecord::new(
                    address.clone(),
                    name,
                    state,
                    now,
                ))));
                Observation::Created
            }
        }
    }

    /// Returns a copy of the record for `address`.
    #[must_use]
    pub fn get(&self, address: &DeviceAddress) -> Option<DeviceRecord> {
        self.handle(address).map(|record| record.lock().clone())
    }

    /// Returns copies of all records, ordered by address.
    #[must_use]
    pub fn list(&self) -> Vec<DeviceRecord> {
        self.handles()
            .into_iter()
            .map(|record| record.lock().clone())
            .collect()
    }

    /// Returns the number of known lights.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    /// Returns `true` if no light has been seen yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }

    /// Returns the shared handle for one record.
    pub(crate) fn handle(&self, address: &DeviceAddress) -> Option<SharedRecord> {
        self.devices.read().get(address).map(Arc::clone)
    }

    /// Returns shared handles for all records, ordered by address.
    ///
    /// The map lock is released before returning, so callers can lock
    /// records one at a time without blocking new registrations.
    pub(crate) fn handles(&self) -> Vec<SharedRecord> {
        let devices = self.devices.read();
        let mut entries: Vec<(&DeviceAddress, &SharedRecord)> = devices.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
            .into_iter()
            .map(|(_, record)| Arc::clone(record))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use chrono::{TimeDelta, TimeZone};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap()
    }

    fn addr(s: &str) -> DeviceAddress {
        DeviceAddress::new(s)
    }

    #[test]
    fn first_observation_creates_record() {
        let registry = DeviceRegistry::new();
        let policy = ControlPolicy::default();
        let state = LightState::new().with_brightness(16449).with_kelvin(2500);

        let outcome = registry.observe(&addr("a"), "Hall", state, t0(), &policy);
        assert_eq!(outcome, Observation::Created);

        let record = registry.get(&addr("a")).unwrap();
        assert_eq!(record.name(), "Hall");
        assert_eq!(record.last_state(), state);
        assert!(record.is_controlled());
    }

    #[test]
    fn later_observations_reuse_record_and_keep_name() {
        let registry = DeviceRegistry::new();
        let policy = ControlPolicy::default();
        let state = LightState::new();

        registry.observe(&addr("a"), "Hall", state, t0(), &policy);
        let outcome = registry.observe(
            &addr("a"),
            "Renamed",
            state.with_dim(1),
            t0() + TimeDelta::seconds(1),
            &policy,
        );

        assert!(matches!(outcome, Observation::Changed { .. }));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&addr("a")).unwrap().name(), "Hall");
    }

    #[test]
    fn get_unknown_is_none() {
        let registry = DeviceRegistry::new();
        assert!(registry.get(&addr("missing")).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn list_is_sorted_and_stable() {
        let registry = DeviceRegistry::new();
        let policy = ControlPolicy::default();
        for a in ["c", "a", "b"] {
            registry.observe(&addr(a), a, LightState::new(), t0(), &policy);
        }

        let first: Vec<String> = registry
            .list()
            .iter()
            .map(|r| r.address().to_string())
            .collect();
        let second: Vec<String> = registry
            .list()
            .iter()
            .map(|r| r.address().to_string())
            .collect();

        assert_eq!(first, vec!["a", "b", "c"]);
        assert_eq!(first, second);
    }

    #[test]
    fn concurrent_first_observations_create_one_record() {
        let registry = Arc::new(DeviceRegistry::new());
        let policy = ControlPolicy::default();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry.observe(&addr("a"), "Hall", LightState::new(), t0(), &policy)
                })
            })
            .collect();

        let created = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|o| *o == Observation::Created)
            .count();

        assert_eq!(created, 1);
        assert_eq!(registry.len(), 1);
    }
}
