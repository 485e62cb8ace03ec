// Custom slot map
// User-defined sub-hour boundaries, consulted when dragging without snap

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Hour (0-23) to ordered sub-hour offsets in minutes (1-59).
///
/// Stored on disk as a table keyed by hour strings (`"9" = [15, 30]`),
/// since TOML tables cannot have integer keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Vec<u32>>",
    into = "BTreeMap<String, Vec<u32>>"
)]
pub struct CustomSlotMap {
    hours: BTreeMap<u32, BTreeSet<u32>>,
}

impl CustomSlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offsets(mut self, hour: u32, offsets: impl IntoIterator<Item = u32>) -> Self {
        self.insert(hour, offsets);
        self
    }

    pub fn insert(&mut self, hour: u32, offsets: impl IntoIterator<Item = u32>) {
        self.hours.entry(hour).or_default().extend(offsets);
    }

    pub fn offsets(&self, hour: u32) -> impl Iterator<Item = u32> + '_ {
        self.hours.get(&hour).into_iter().flatten().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.hours.values().all(BTreeSet::is_empty)
    }

    /// Pick the valid minute closest to `minute` within `hour`.
    ///
    /// Candidates are 0 followed by the hour's offsets in ascending order; a
    /// candidate only replaces the current best when strictly closer, so the
    /// first one encountered wins an exact tie.
    pub fn nearest_minute(&self, hour: u32, minute: u32) -> u32 {
        let target = i64::from(minute);
        let mut best = 0u32;
        let mut best_distance = target.abs();

        for candidate in self.offsets(hour) {
            let distance = (target - i64::from(candidate)).abs();
            if distance < best_distance {
                best = candidate;
                best_distance = distance;
            }
        }

        best
    }

    pub fn validate(&self) -> Result<(), String> {
        for (hour, offsets) in &self.hours {
            if *hour > 23 {
                return Err(format!("Custom slot hour {} is out of range 0-23", hour));
            }
            if let Some(bad) = offsets.iter().find(|m| **m == 0 || **m > 59) {
                return Err(format!(
                    "Custom slot offset {} for hour {} must be within 1-59",
                    bad, hour
                ));
            }
        }
        Ok(())
    }
}

impl TryFrom<BTreeMap<String, Vec<u32>>> for CustomSlotMap {
    type Error = String;

    fn try_from(raw: BTreeMap<String, Vec<u32>>) -> Result<Self, Self::Error> {
        let mut map = CustomSlotMap::new();
        for (key, offsets) in raw {
            let hour: u32 = key
                .trim()
                .parse()
                .map_err(|_| format!("Custom slot key {:?} is not an hour", key))?;
            map.insert(hour, offsets);
        }
        Ok(map)
    }
}

impl From<CustomSlotMap> for BTreeMap<String, Vec<u32>> {
    fn from(map: CustomSlotMap) -> Self {
        map.hours
            .into_iter()
            .map(|(hour, offsets)| (hour.to_string(), offsets.into_iter().collect()))
            .collect()
    }
}
