// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback speed source and inter-step delay.

use std::cell::Cell;
use std::rc::Rc;

/// Range of the speed slider, independent of the configured delay
pub const SPEED_LIMIT: f32 = 2.0;

/// Live source of the signed playback speed.
///
/// The sign selects the direction (`>= 0` forward), the magnitude the rate.
pub trait SpeedSource {
    /// Current speed value
    fn speed(&self) -> f32;
}

/// Shared speed value, written by the UI and read by the controller.
///
/// Clones share the same value.
#[derive(Debug, Clone)]
pub struct SpeedControl {
    value: Rc<Cell<f32>>,
    limit: f32,
}

impl SpeedControl {
    /// Create a control clamped to `[-limit, limit]`
    pub fn new(initial: f32, limit: f32) -> Self {
        let limit = limit.abs();
        Self {
            value: Rc::new(Cell::new(initial.clamp(-limit, limit))),
            limit,
        }
    }

    /// Set the speed, clamped to the control range
    pub fn set(&self, speed: f32) {
        self.value.set(speed.clamp(-self.limit, self.limit));
    }

    /// Current speed
    pub fn get(&self) -> f32 {
        self.value.get()
    }

    /// Largest magnitude the control accepts
    pub fn limit(&self) -> f32 {
        self.limit
    }
}

impl Default for SpeedControl {
    fn default() -> Self {
        Self::new(1.0, SPEED_LIMIT)
    }
}

impl SpeedSource for SpeedControl {
    fn speed(&self) -> f32 {
        self.get()
    }
}

/// Delay between two steps: `max(0, max_delay - |speed|)`
pub fn step_delay(speed: f32, max_delay: f32) -> f32 {
    (max_delay - speed.abs()).max(0.0)
}
