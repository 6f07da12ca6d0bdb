// SPDX-License-Identifier: MIT OR Apache-2.0
//! Skip requests buffered while playback is running.

/// Direction of a step or skip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipDirection {
    /// Towards the end of the list
    Forward,
    /// Towards the start of the list
    Backward,
}

impl SkipDirection {
    /// The reverse direction
    pub fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// Direction selected by the sign of a speed value
    pub fn from_speed(speed: f32) -> Self {
        if speed >= 0.0 {
            Self::Forward
        } else {
            Self::Backward
        }
    }
}

/// Skip flags set by input and consumed once at the next step boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipFlags {
    /// Skip forward was requested
    pub forward: bool,
    /// Skip backward was requested
    pub backward: bool,
}

impl SkipFlags {
    /// Buffer a request
    pub fn request(&mut self, direction: SkipDirection) {
        match direction {
            SkipDirection::Forward => self.forward = true,
            SkipDirection::Backward => self.backward = true,
        }
    }

    /// Whether a request is buffered for a direction
    pub fn is_set(&self, direction: SkipDirection) -> bool {
        match direction {
            SkipDirection::Forward => self.forward,
            SkipDirection::Backward => self.backward,
        }
    }

    /// Whether any request is buffered
    pub fn any(&self) -> bool {
        self.forward || self.backward
    }

    /// Drop both requests
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
