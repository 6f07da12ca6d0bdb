// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cinema-mode playback for the assembly editor.
//!
//! This crate reveals or hides the items of an assembly one at a time:
//! - Playback list flattened from the station hierarchy
//! - State machine with listener table for entries and named events
//! - Frame-driven driver with fades, delays and buffered skips
//! - Seeking, single-step skipping and direction reversal
//!
//! ## Architecture
//!
//! The scene stays outside of this crate. It plugs in through
//! [`AssemblyHierarchy`] (read once per session to build the list) and
//! [`VisibilitySink`] (written every frame while a fade runs). The host
//! calls [`CinemaController::tick`] once per rendered frame.

pub mod config;
pub mod controller;
pub mod driver;
pub mod error;
pub mod item;
pub mod playlist;
pub mod skip;
pub mod speed;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{CinemaConfig, CONFIG_FILE_NAME};
pub use controller::CinemaController;
pub use driver::{DriverRequest, PlaybackDriver};
pub use error::{CinemaError, Result};
pub use item::{AssemblyHierarchy, ItemId, NodeKind, VisibilitySink};
pub use playlist::{station_at, PlaybackList, StationSummary};
pub use skip::{SkipDirection, SkipFlags};
pub use speed::{step_delay, SpeedControl, SpeedSource, SPEED_LIMIT};
pub use state::{
    CinemaEvent, CinemaState, CinemaStateMachine, Listener, ListenerId, Signal, Transition, Trigger,
};
