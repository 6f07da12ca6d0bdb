// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cinema mode for in-editor assembly preview.
//!
//! This module handles:
//! - Entering and exiting cinema mode
//! - Routing user input to the playback controller
//! - Fixed timestep ticking of the playback driver

use crate::preview::PreviewInput;
use crate::state::SceneData;
use assembly_editor_cinema::{
    CinemaConfig, CinemaController, CinemaState, SpeedControl, StationSummary, SPEED_LIMIT,
};

/// Maximum fixed ticks run in a single frame
const MAX_STEPS_PER_FRAME: u32 = 8;

/// Cinema mode manager - handles entering/exiting cinema mode
pub struct CinemaModeManager {
    controller: CinemaController,
    /// Shared with the controller; the UI slider writes it
    speed: SpeedControl,
    active: bool,
    stations: Vec<StationSummary>,
    /// Accumulated delta time for fixed timestep
    accumulated_time: f64,
    /// Fixed ticks run since entering
    pub frame_count: u64,
}

impl CinemaModeManager {
    /// Create an inactive manager
    pub fn new(config: CinemaConfig) -> Self {
        let speed = SpeedControl::new(1.0, SPEED_LIMIT);
        Self {
            controller: CinemaController::new(config, speed.clone()),
            speed,
            active: false,
            stations: Vec::new(),
            accumulated_time: 0.0,
            frame_count: 0,
        }
    }

    /// Enter cinema mode on a scene
    /// Returns the number of playable items
    pub fn enter(&mut self, scene: &mut SceneData) -> usize {
        if self.active {
            self.exit(scene);
        }

        self.speed.set(1.0);
        // The list is built from a snapshot; the live scene receives the opacity writes
        let hierarchy = scene.clone();
        let (count, stations) = self.controller.initialize(&hierarchy, scene);
        self.stations = stations;
        self.active = true;
        self.accumulated_time = 0.0;
        self.frame_count = 0;

        tracing::info!(
            "Entered cinema mode with {} items in {} stations",
            count,
            self.stations.len()
        );
        count
    }

    /// Exit cinema mode, finishing the step in flight first
    pub fn exit(&mut self, scene: &mut SceneData) {
        if !self.active {
            return;
        }

        if self.controller.state().is_running() {
            self.controller.halt(scene);
            tracing::info!("Halted playback on exit at index {}", self.controller.index());
        }
        self.controller.exit();
        self.stations.clear();
        self.active = false;
        tracing::info!("Exited cinema mode");
    }

    /// Whether cinema mode is active
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Playback controller
    pub fn controller(&self) -> &CinemaController {
        &self.controller
    }

    /// Mutable playback controller, for subscribing listeners
    pub fn controller_mut(&mut self) -> &mut CinemaController {
        &mut self.controller
    }

    /// Speed slider handle
    pub fn speed(&self) -> &SpeedControl {
        &self.speed
    }

    /// Name of the station containing the current item
    pub fn current_station(&self) -> Option<&str> {
        assembly_editor_cinema::station_at(&self.stations, self.controller.index())
            .and_then(|i| self.stations.get(i))
            .map(|s| s.name.as_str())
    }

    /// Apply a user input
    pub fn apply(&mut self, input: &PreviewInput, scene: &mut SceneData) {
        if !self.active {
            return;
        }

        match input {
            PreviewInput::Play => self.controller.play(scene, false),
            PreviewInput::Pause => self.controller.pause(),
            PreviewInput::SetSpeed(speed) => self.speed.set(*speed),
            PreviewInput::SkipTo(target) => self.controller.skip_to(*target, scene),
            PreviewInput::SkipForward => self.controller.skip_forward(scene),
            PreviewInput::SkipBackward => self.controller.skip_backward(scene),
            PreviewInput::SkipToStart => self.controller.skip_to_start(scene),
            PreviewInput::SkipToEnd => self.controller.skip_to_end(scene),
            PreviewInput::Exit => self.exit(scene),
        }
    }

    /// Advance playback by a frame delta
    /// Returns the number of fixed ticks run
    pub fn update(&mut self, delta_time: f64, fixed_timestep: f64, scene: &mut SceneData) -> u32 {
        if !self.active || fixed_timestep <= 0.0 {
            return 0;
        }

        self.accumulated_time += delta_time;

        let mut steps = 0;
        while self.accumulated_time >= fixed_timestep {
            self.accumulated_time -= fixed_timestep;
            self.controller.tick(fixed_timestep as f32, scene);
            self.frame_count += 1;
            steps += 1;

            if steps >= MAX_STEPS_PER_FRAME {
                self.accumulated_time = 0.0;
                break;
            }
        }

        steps
    }

    /// Get a status string for display
    pub fn status_text(&self) -> &'static str {
        if !self.active {
            return "Edit Mode";
        }
        match self.controller.state() {
            CinemaState::StoppedStart => "Cinema - At Start",
            CinemaState::StoppedEnd => "Cinema - At End",
            CinemaState::PlayingFw => "Cinema - Playing",
            CinemaState::PlayingBw => "Cinema - Playing Backward",
            CinemaState::SkippingFw | CinemaState::SkippingBw => "Cinema - Skipping",
            CinemaState::Paused => "Cinema - Paused",
        }
    }
}

impl Default for CinemaModeManager {
    fn default() -> Self {
        Self::new(CinemaConfig::default())
    }
}
