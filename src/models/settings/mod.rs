// Settings module
// Engine configuration: grid scale, snap and slot capacity

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::slots::CustomSlotMap;

/// User-tunable gesture settings, persisted as TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Pixels representing one hour of the time axis
    pub hour_height: f32,
    /// Snap interval in minutes; 0 disables snapping
    pub snap_minutes: u32,
    /// Drops onto a slot already holding this many entries are rejected
    pub max_simultaneous_events: usize,
    pub custom_slots: CustomSlotMap,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            hour_height: 60.0,
            snap_minutes: 0,
            max_simultaneous_events: 3,
            custom_slots: CustomSlotMap::default(),
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.hour_height.is_finite() && self.hour_height > 0.0) {
            return Err(EngineError::Settings(format!(
                "Hour height must be a positive number of pixels, got {}",
                self.hour_height
            )));
        }

        if self.snap_minutes > 60 {
            return Err(EngineError::Settings(format!(
                "Snap interval must be between 0 and 60 minutes, got {}",
                self.snap_minutes
            )));
        }

        if self.max_simultaneous_events == 0 {
            return Err(EngineError::Settings(
                "Slot capacity must be at least 1".to_string(),
            ));
        }

        self.custom_slots.validate().map_err(EngineError::Settings)
    }

    /// Snap interval, or `None` when snapping is disabled.
    pub fn snap(&self) -> Option<u32> {
        (self.snap_minutes > 0).then_some(self.snap_minutes)
    }
}

/// Derive pixels-per-hour from a time scale of `minutes_per_slot` minutes
/// rendered `slot_height` pixels tall.
pub fn hour_height_for_scale(slot_height: f32, minutes_per_slot: u32) -> f32 {
    if minutes_per_slot == 0 {
        return slot_height;
    }
    slot_height * 60.0 / minutes_per_slot as f32
}
