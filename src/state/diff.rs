// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Field-by-field comparison of light snapshots.
//!
//! A [`StateDiff`] lists every field whose value differs between two
//! snapshots, in a fixed field order, each rendered as
//! `"<field> <before>-><after>"`. Comparison is exact; there is no
//! tolerance.
//!
//! # Examples
//!
//! ```
//! use lumenward::state::{LightState, diff};
//! use lumenward::types::PowerLevel;
//!
//! let off = LightState::new();
//! let on = off.with_power(PowerLevel::ON);
//!
//! let changes = diff(&off, &on);
//! assert!(changes.is_changed());
//! assert_eq!(changes.descriptions(), vec!["power 0->65535"]);
//!
//! assert!(!diff(&on, &on).is_changed());
//! ```

use std::fmt;

use super::LightState;

/// A snapshot field that can differ between two observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Hue.
    Hue,
    /// Saturation.
    Saturation,
    /// Brightness.
    Brightness,
    /// Color temperature.
    Kelvin,
    /// Dim level.
    Dim,
    /// Power level.
    Power,
}

impl Field {
    /// Every field, in the order differences are reported.
    pub const ALL: [Self; 6] = [
        Self::Hue,
        Self::Saturation,
        Self::Brightness,
        Self::Kelvin,
        Self::Dim,
        Self::Power,
    ];

    /// Returns the name used in change descriptions.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hue => "hue",
            Self::Saturation => "saturation",
            Self::Brightness => "brightness",
            Self::Kelvin => "kelvin",
            Self::Dim => "dim",
            Self::Power => "power",
        }
    }

    /// Reads this field out of a snapshot.
    #[must_use]
    pub fn read(&self, state: &LightState) -> i32 {
        match self {
            Self::Hue => i32::from(state.hue()),
            Self::Saturation => i32::from(state.saturation()),
            Self::Brightness => i32::from(state.brightness()),
            Self::Kelvin => i32::from(state.kelvin()),
            Self::Dim => i32::from(state.dim()),
            Self::Power => i32::from(state.power().value()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single differing field with its before and after values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldChange {
    field: Field,
    before: i32,
    after: i32,
}

impl FieldChange {
    /// Returns the field that changed.
    #[must_use]
    pub const fn field(&self) -> Field {
        self.field
    }

    /// Returns the value on the left-hand side of the comparison.
    #[must_use]
    pub const fn before(&self) -> i32 {
        self.before
    }

    /// Returns the value on the right-hand side of the comparison.
    #[must_use]
    pub const fn after(&self) -> i32 {
        self.after
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}->{}", self.field, self.before, self.after)
    }
}

/// Ordered list of differences between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateDiff {
    changes: Vec<FieldChange>,
}

impl StateDiff {
    /// Compares `left` and `right` on the given fields only.
    ///
    /// Differences are reported in the order of `fields`.
    #[must_use]
    pub fn on_fields(left: &LightState, right: &LightState, fields: &[Field]) -> Self {
        let changes = fields
            .iter()
            .filter_map(|&field| {
                let before = field.read(left);
                let after = field.read(right);
                (before != after).then_some(FieldChange {
                    field,
                    before,
                    after,
                })
            })
            .collect();
        Self { changes }
    }

    /// Returns `true` if at least one field differs.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Returns the number of differing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns `true` if no field differs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns `true` if `field` is among the differences.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.changes.iter().any(|c| c.field == field)
    }

    /// Iterates over the individual changes.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldChange> {
        self.changes.iter()
    }

    /// Returns the human-readable description of every change.
    #[must_use]
    pub fn descriptions(&self) -> Vec<String> {
        self.changes.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for StateDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, change) in self.changes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{change}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a StateDiff {
    type Item = &'a FieldChange;
    type IntoIter = std::slice::Iter<'a, FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Compares two snapshots on every field.
#[must_use]
pub fn diff(left: &LightState, right: &LightState) -> StateDiff {
    StateDiff::on_fields(left, right, &Field::ALL)
}
