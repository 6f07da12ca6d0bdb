// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame-synchronous playback driver.
//!
//! The driver runs at most one step task at a time. A step fades a single
//! item in (forward) or out (backward), then, while playing, waits for the
//! speed-dependent delay before deciding what comes next. Everything
//! advances from [`PlaybackDriver::tick`], called once per rendered frame.
//!
//! Decisions that need a state change are handed back to the caller as a
//! [`DriverRequest`]; the driver never touches the state machine.

use crate::config::CinemaConfig;
use crate::item::VisibilitySink;
use crate::playlist::PlaybackList;
use crate::skip::{SkipDirection, SkipFlags};
use crate::speed::step_delay;
use crate::state::CinemaState;

/// State change asked for by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverRequest {
    /// The first item was hidden
    ReachStart,
    /// The last item was revealed
    ReachEnd,
    /// A single-step skip is done
    EndSkipping,
    /// A pause was requested during the step
    Pause,
    /// The speed sign no longer matches the playing direction
    SwitchDirection,
}

/// Identifies the task that was current when it was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TaskToken(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
enum StepPhase {
    Fade { progress: f32 },
    Wait { elapsed: f32, delay: f32 },
}

#[derive(Debug, Clone, Copy)]
struct StepTask {
    token: TaskToken,
    direction: SkipDirection,
    phase: StepPhase,
}

/// Playback cursor, input flags and the running step task
#[derive(Debug)]
pub struct PlaybackDriver {
    config: CinemaConfig,
    list: PlaybackList,
    /// Last fully visible item; during a fade, the item being faded
    index: isize,
    flags: SkipFlags,
    pause_requested: bool,
    generation: u64,
    task: Option<StepTask>,
}

impl PlaybackDriver {
    /// Create an idle driver with an empty list
    pub fn new(config: CinemaConfig) -> Self {
        Self {
            config,
            list: PlaybackList::default(),
            index: -1,
            flags: SkipFlags::default(),
            pause_requested: false,
            generation: 0,
            task: None,
        }
    }

    /// Install a new list and rewind to the start
    pub fn load(&mut self, list: PlaybackList) {
        self.cancel();
        self.list = list;
        self.index = -1;
        self.flags.clear();
        self.pause_requested = false;
    }

    /// Drop the list and all transient state
    pub fn unload(&mut self) {
        self.load(PlaybackList::default());
    }

    /// Current cursor, in `[-1, len - 1]`
    pub fn index(&self) -> isize {
        self.index
    }

    /// The frozen playback list
    pub fn list(&self) -> &PlaybackList {
        &self.list
    }

    /// Buffered skip requests
    pub fn flags(&self) -> SkipFlags {
        self.flags
    }

    /// Whether a step task is running
    pub fn is_busy(&self) -> bool {
        self.task.is_some_and(|t| self.is_current(t.token))
    }

    /// Ask the running step to stop at its next boundary
    pub fn request_pause(&mut self) {
        self.pause_requested = true;
    }

    /// Buffer a skip request for the running step
    pub fn request_skip(&mut self, direction: SkipDirection) {
        self.flags.request(direction);
    }

    /// Forget pending pause and skip requests
    pub fn clear_requests(&mut self) {
        self.flags.clear();
        self.pause_requested = false;
    }

    /// Invalidate the running task, if any
    pub fn cancel(&mut self) {
        if self.task.take().is_some() {
            tracing::trace!("Cancelled step task {}", self.generation);
        }
        self.generation += 1;
    }

    /// Complete the fade in flight at once and drop the task.
    ///
    /// The faded item ends fully shown (forward) or hidden (backward) and the
    /// cursor lands where the finished fade would have left it.
    pub fn settle(&mut self, sink: &mut dyn VisibilitySink) -> isize {
        if let Some(task) = self.task.take() {
            if self.is_current(task.token) && matches!(task.phase, StepPhase::Fade { .. }) {
                if let Some(item) = self.list.get(self.index) {
                    match task.direction {
                        SkipDirection::Forward => sink.show(item),
                        SkipDirection::Backward => {
                            sink.hide(item);
                            self.index -= 1;
                        }
                    }
                }
            }
        }
        self.cancel();
        self.clear_requests();
        self.index
    }

    fn is_current(&self, token: TaskToken) -> bool {
        token.0 == self.generation
    }

    fn interrupted(&self) -> bool {
        self.pause_requested || self.flags.any()
    }

    fn spawn(&mut self, direction: SkipDirection) {
        self.cancel();
        self.task = Some(StepTask {
            token: TaskToken(self.generation),
            direction,
            phase: StepPhase::Fade { progress: 0.0 },
        });
    }

    /// Begin a forward step: advance the cursor and start fading its item in
    pub fn start_forward(&mut self, sink: &mut dyn VisibilitySink) -> Option<DriverRequest> {
        self.cancel();
        if self.index >= self.list.last_index() {
            // Covers the empty list, whose last index is -1
            return Some(DriverRequest::ReachEnd);
        }

        self.index += 1;
        if let Some(item) = self.list.get(self.index) {
            sink.hide(item);
        }
        self.spawn(SkipDirection::Forward);
        tracing::trace!("Fading in item {}", self.index);
        None
    }

    /// Begin a backward step: start fading the item under the cursor out
    pub fn start_backward(&mut self, sink: &mut dyn VisibilitySink) -> Option<DriverRequest> {
        self.cancel();
        let Some(item) = self.list.get(self.index) else {
            return Some(DriverRequest::ReachStart);
        };

        sink.show(item);
        self.spawn(SkipDirection::Backward);
        tracing::trace!("Fading out item {}", self.index);
        None
    }

    /// Advance the running task by one frame
    pub fn tick(
        &mut self,
        dt: f32,
        state: CinemaState,
        speed: f32,
        sink: &mut dyn VisibilitySink,
    ) -> Option<DriverRequest> {
        let task = self.task?;
        if !self.is_current(task.token) {
            self.task = None;
            return None;
        }

        match task.phase {
            StepPhase::Fade { progress } => {
                let progress = if self.interrupted() {
                    1.0
                } else {
                    progress + self.config.fade_rate * dt.max(0.0)
                };

                let item = self.list.get(self.index);
                let fade_in = task.direction == SkipDirection::Forward;

                if progress < 1.0 {
                    if let Some(item) = item {
                        sink.set_opacity(item, if fade_in { progress } else { 1.0 - progress });
                    }
                    self.set_phase(StepPhase::Fade { progress });
                    return None;
                }

                // Never leave an item half faded once the step concludes
                if let Some(item) = item {
                    sink.set_opacity(item, if fade_in { 1.0 } else { 0.0 });
                }
                self.after_fade(task.direction, state, speed, sink)
            }
            StepPhase::Wait { elapsed, delay } => {
                if self.interrupted() {
                    return self.after_wait(task.direction, speed, sink);
                }
                let elapsed = elapsed + dt.max(0.0);
                if elapsed >= delay {
                    return self.after_wait(task.direction, speed, sink);
                }
                self.set_phase(StepPhase::Wait { elapsed, delay });
                None
            }
        }
    }

    fn set_phase(&mut self, phase: StepPhase) {
        if let Some(task) = self.task.as_mut() {
            task.phase = phase;
        }
    }

    fn after_fade(
        &mut self,
        direction: SkipDirection,
        state: CinemaState,
        speed: f32,
        sink: &mut dyn VisibilitySink,
    ) -> Option<DriverRequest> {
        match direction {
            SkipDirection::Forward => {
                if self.index >= self.list.last_index() {
                    self.task = None;
                    return Some(DriverRequest::ReachEnd);
                }
                if state == CinemaState::SkippingFw {
                    self.task = None;
                    return Some(DriverRequest::EndSkipping);
                }
            }
            SkipDirection::Backward => {
                self.index -= 1;
                if self.index <= -1 {
                    self.task = None;
                    return Some(DriverRequest::ReachStart);
                }
                if state == CinemaState::SkippingBw {
                    self.task = None;
                    return Some(DriverRequest::EndSkipping);
                }
            }
        }

        if !state.is_playing() {
            self.task = None;
            return None;
        }

        // Delay is sampled from the live speed when the wait begins
        let delay = step_delay(speed, self.config.max_delay);
        tracing::trace!("Waiting {:.2} after item {}", delay, self.index);
        self.set_phase(StepPhase::Wait { elapsed: 0.0, delay });

        if self.interrupted() {
            return self.after_wait(direction, speed, sink);
        }
        None
    }

    fn after_wait(
        &mut self,
        direction: SkipDirection,
        speed: f32,
        sink: &mut dyn VisibilitySink,
    ) -> Option<DriverRequest> {
        // A skip in the playing direction only hurries the current step along
        let reverse = direction.opposite();
        if self.flags.is_set(reverse) {
            self.skip_while_playing(reverse, sink);
        }
        self.flags.clear();

        if self.pause_requested {
            self.task = None;
            return Some(DriverRequest::Pause);
        }

        if SkipDirection::from_speed(speed) != direction {
            self.task = None;
            return Some(DriverRequest::SwitchDirection);
        }

        match direction {
            SkipDirection::Forward => self.start_forward(sink),
            SkipDirection::Backward => self.start_backward(sink),
        }
    }

    /// Move the cursor `skip_distance` positions without fading, stopping at the list bounds
    pub fn skip_while_playing(&mut self, direction: SkipDirection, sink: &mut dyn VisibilitySink) {
        let from = self.index;
        for _ in 0..self.config.skip_distance {
            match direction {
                SkipDirection::Forward => {
                    if self.index >= self.list.last_index() {
                        break;
                    }
                    self.index += 1;
                    if let Some(item) = self.list.get(self.index) {
                        sink.show(item);
                    }
                }
                SkipDirection::Backward => {
                    let Some(item) = self.list.get(self.index) else {
                        break;
                    };
                    sink.hide(item);
                    self.index -= 1;
                }
            }
        }
        tracing::debug!("Skipped {:?} while playing: {} -> {}", direction, from, self.index);
    }

    /// Show every item before `target` and hide the rest, leaving the cursor
    /// on the last visible item. Returns the new cursor.
    pub fn snap_to(&mut self, target: isize, sink: &mut dyn VisibilitySink) -> isize {
        self.cancel();
        let target = target.clamp(0, self.list.len() as isize);

        for (i, item) in self.list.iter().enumerate() {
            if (i as isize) < target {
                sink.show(item);
            } else {
                sink.hide(item);
            }
        }

        self.index = target - 1;
        self.index
    }
}
