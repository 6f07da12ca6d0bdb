// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cinema-mode state machine.
//!
//! The machine only decides whether a transition is legal and tells
//! listeners about it. It owns no timing logic: every operation returns a
//! [`Transition`] and the controller starts or cancels the driver based on
//! the state that was entered.

use crate::skip::SkipDirection;
use indexmap::IndexMap;
use uuid::Uuid;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CinemaState {
    /// Nothing visible, cursor before the first item
    #[default]
    StoppedStart,
    /// Everything visible, cursor on the last item
    StoppedEnd,
    /// Revealing items one after another
    PlayingFw,
    /// Hiding items one after another
    PlayingBw,
    /// Revealing a single item, then returning to the previous state
    SkippingFw,
    /// Hiding a single item, then returning to the previous state
    SkippingBw,
    /// Halted somewhere between start and end
    Paused,
}

impl CinemaState {
    /// Playing in either direction
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::PlayingFw | Self::PlayingBw)
    }

    /// Skipping in either direction
    pub fn is_skipping(&self) -> bool {
        matches!(self, Self::SkippingFw | Self::SkippingBw)
    }

    /// A driver step task runs in this state
    pub fn is_running(&self) -> bool {
        self.is_playing() || self.is_skipping()
    }

    /// Step direction of a running state
    pub fn direction(&self) -> Option<SkipDirection> {
        match self {
            Self::PlayingFw | Self::SkippingFw => Some(SkipDirection::Forward),
            Self::PlayingBw | Self::SkippingBw => Some(SkipDirection::Backward),
            Self::StoppedStart | Self::StoppedEnd | Self::Paused => None,
        }
    }

    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::StoppedStart => "Stopped (start)",
            Self::StoppedEnd => "Stopped (end)",
            Self::PlayingFw => "Playing",
            Self::PlayingBw => "Playing backwards",
            Self::SkippingFw => "Skipping forward",
            Self::SkippingBw => "Skipping backward",
            Self::Paused => "Paused",
        }
    }
}

/// Named events that do not change state by themselves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CinemaEvent {
    /// Backward playback hid the first item
    ReachedStart,
    /// Forward playback revealed the last item
    ReachedEnd,
    /// A single-step skip finished
    SkipEnded,
    /// Playback reversed without pausing
    DirectionSwitched,
    /// Skip forward was requested while playing
    SkippedForwardWhilePlaying,
    /// Skip backward was requested while playing
    SkippedBackwardWhilePlaying,
    /// Jumped to the start while halted
    SkippedToStart,
    /// Jumped to the end while halted
    SkippedToEnd,
    /// Jumped to the start while a step was running
    SkippedToStartWhilePlaying,
    /// Jumped to the end while a step was running
    SkippedToEndWhilePlaying,
}

/// What a listener is registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// A state was entered
    Entry(CinemaState),
    /// A named event fired
    Event(CinemaEvent),
}

/// Payload delivered to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    /// What fired
    pub trigger: Trigger,
    /// State before the operation
    pub previous: CinemaState,
    /// State after the operation
    pub current: CinemaState,
}

/// Handle returned by [`CinemaStateMachine::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub Uuid);

impl ListenerId {
    /// Create a new random listener ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener callback
pub type Listener = Box<dyn FnMut(&Signal)>;

/// Result of a state machine operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[must_use]
pub struct Transition {
    /// Event fired by the operation
    pub event: Option<CinemaEvent>,
    /// State entered by the operation
    pub entered: Option<CinemaState>,
}

impl Transition {
    /// The operation was ignored
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether the operation did anything
    pub fn is_none(&self) -> bool {
        self.event.is_none() && self.entered.is_none()
    }
}

/// Finite-state machine for cinema playback
pub struct CinemaStateMachine {
    current: CinemaState,
    /// State to return to when a single-step skip ends
    resume: CinemaState,
    listeners: IndexMap<Trigger, Vec<(ListenerId, Listener)>>,
}

impl CinemaStateMachine {
    /// Create a machine in `StoppedStart`
    pub fn new() -> Self {
        Self {
            current: CinemaState::StoppedStart,
            resume: CinemaState::StoppedStart,
            listeners: IndexMap::new(),
        }
    }

    /// Current state
    pub fn current(&self) -> CinemaState {
        self.current
    }

    /// Return to `StoppedStart` without notifying anyone
    pub fn reset(&mut self) {
        self.current = CinemaState::StoppedStart;
        self.resume = CinemaState::StoppedStart;
    }

    /// Register a listener; listeners run in registration order
    pub fn subscribe(&mut self, trigger: Trigger, listener: impl FnMut(&Signal) + 'static) -> ListenerId {
        let id = ListenerId::new();
        self.listeners
            .entry(trigger)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Remove a listener, returns false if it was not registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let mut removed = false;
        for handles in self.listeners.values_mut() {
            let before = handles.len();
            handles.retain(|(handle, _)| *handle != id);
            removed |= handles.len() != before;
        }
        removed
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    /// Start playing forward from `StoppedStart` or `Paused`
    pub fn play_forward(&mut self, forced: bool) -> Transition {
        self.play(CinemaState::PlayingFw, CinemaState::StoppedStart, forced)
    }

    /// Start playing backward from `StoppedEnd` or `Paused`
    pub fn play_backward(&mut self, forced: bool) -> Transition {
        self.play(CinemaState::PlayingBw, CinemaState::StoppedEnd, forced)
    }

    fn play(&mut self, target: CinemaState, stopped: CinemaState, forced: bool) -> Transition {
        if forced || self.current == stopped || self.current == CinemaState::Paused {
            self.enter(None, target)
        } else {
            self.ignore("play", target)
        }
    }

    /// Halt a playing machine
    pub fn pause(&mut self, forced: bool) -> Transition {
        if self.current.is_playing() || (forced && self.current != CinemaState::Paused) {
            self.enter(None, CinemaState::Paused)
        } else {
            self.ignore("pause", CinemaState::Paused)
        }
    }

    /// Backward playback or skipping hid the first item
    pub fn reach_start(&mut self, forced: bool) -> Transition {
        let legal = matches!(self.current, CinemaState::PlayingBw | CinemaState::SkippingBw);
        if legal || (forced && self.current != CinemaState::StoppedStart) {
            self.enter(Some(CinemaEvent::ReachedStart), CinemaState::StoppedStart)
        } else {
            self.ignore("reach start", CinemaState::StoppedStart)
        }
    }

    /// Forward playback or skipping revealed the last item
    pub fn reach_end(&mut self, forced: bool) -> Transition {
        let legal = matches!(self.current, CinemaState::PlayingFw | CinemaState::SkippingFw);
        if legal || (forced && self.current != CinemaState::StoppedEnd) {
            self.enter(Some(CinemaEvent::ReachedEnd), CinemaState::StoppedEnd)
        } else {
            self.ignore("reach end", CinemaState::StoppedEnd)
        }
    }

    /// Reverse playback direction without passing through `Paused`
    pub fn switch_direction(&mut self) -> Transition {
        match self.current {
            CinemaState::PlayingFw => self.enter(Some(CinemaEvent::DirectionSwitched), CinemaState::PlayingBw),
            CinemaState::PlayingBw => self.enter(Some(CinemaEvent::DirectionSwitched), CinemaState::PlayingFw),
            _ => self.ignore("switch direction", self.current),
        }
    }

    /// Step one item forward.
    ///
    /// While playing the request is only announced so the driver can buffer it.
    pub fn skip_forward(&mut self) -> Transition {
        match self.current {
            CinemaState::PlayingFw | CinemaState::PlayingBw => {
                self.fire(CinemaEvent::SkippedForwardWhilePlaying)
            }
            CinemaState::StoppedStart | CinemaState::Paused => {
                self.resume = self.current;
                self.enter(None, CinemaState::SkippingFw)
            }
            _ => self.ignore("skip forward", CinemaState::SkippingFw),
        }
    }

    /// Step one item backward.
    ///
    /// While playing the request is only announced so the driver can buffer it.
    pub fn skip_backward(&mut self) -> Transition {
        match self.current {
            CinemaState::PlayingFw | CinemaState::PlayingBw => {
                self.fire(CinemaEvent::SkippedBackwardWhilePlaying)
            }
            CinemaState::StoppedEnd | CinemaState::Paused => {
                self.resume = self.current;
                self.enter(None, CinemaState::SkippingBw)
            }
            _ => self.ignore("skip backward", CinemaState::SkippingBw),
        }
    }

    /// Jump to the start from any other state
    pub fn skip_to_start(&mut self) -> Transition {
        let event = match self.current {
            CinemaState::StoppedStart => return self.ignore("skip to start", CinemaState::StoppedStart),
            s if s.is_running() => CinemaEvent::SkippedToStartWhilePlaying,
            _ => CinemaEvent::SkippedToStart,
        };
        self.enter(Some(event), CinemaState::StoppedStart)
    }

    /// Jump to the end from any other state
    pub fn skip_to_end(&mut self) -> Transition {
        let event = match self.current {
            CinemaState::StoppedEnd => return self.ignore("skip to end", CinemaState::StoppedEnd),
            s if s.is_running() => CinemaEvent::SkippedToEndWhilePlaying,
            _ => CinemaEvent::SkippedToEnd,
        };
        self.enter(Some(event), CinemaState::StoppedEnd)
    }

    /// Finish a single-step skip and resume the state that preceded it.
    ///
    /// A skip that started at a boundary has moved the cursor off it, so it
    /// resumes into `Paused`.
    pub fn end_skipping(&mut self) -> Transition {
        if !self.current.is_skipping() {
            return self.ignore("end skipping", CinemaState::Paused);
        }
        let target = match self.resume {
            CinemaState::StoppedStart | CinemaState::StoppedEnd => CinemaState::Paused,
            other => other,
        };
        self.enter(Some(CinemaEvent::SkipEnded), target)
    }

    fn fire(&mut self, event: CinemaEvent) -> Transition {
        let state = self.current;
        tracing::debug!("Cinema event {:?} in {:?}", event, state);
        self.notify(Trigger::Event(event), state, state);
        Transition {
            event: Some(event),
            entered: None,
        }
    }

    fn enter(&mut self, event: Option<CinemaEvent>, target: CinemaState) -> Transition {
        let previous = self.current;
        self.current = target;
        tracing::debug!("Cinema state {:?} -> {:?}", previous, target);

        if let Some(event) = event {
            self.notify(Trigger::Event(event), previous, target);
        }
        self.notify(Trigger::Entry(target), previous, target);

        Transition {
            event,
            entered: Some(target),
        }
    }

    fn ignore(&self, operation: &str, target: CinemaState) -> Transition {
        tracing::debug!(
            "Ignoring {} in {:?} (target {:?})",
            operation,
            self.current,
            target
        );
        Transition::none()
    }

    fn notify(&mut self, trigger: Trigger, previous: CinemaState, current: CinemaState) {
        let Some(handles) = self.listeners.get_mut(&trigger) else {
            return;
        };
        let signal = Signal {
            trigger,
            previous,
            current,
        };
        for (_, listener) in handles.iter_mut() {
            listener(&signal);
        }
    }
}

impl Default for CinemaStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CinemaStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CinemaStateMachine")
            .field("current", &self.current)
            .field("resume", &self.resume)
            .field("listeners", &self.listener_count())
            .finish()
    }
}
