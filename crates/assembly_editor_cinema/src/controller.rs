// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cinema-mode controller.
//!
//! Ties the state machine to the driver. Every public command runs a state
//! machine operation and reacts to the state it entered: running states
//! start exactly one step task, halted states cancel it. All of this
//! happens before the command returns, so a cancelled task can never write
//! after its replacement has been started.

use crate::config::CinemaConfig;
use crate::driver::{DriverRequest, PlaybackDriver};
use crate::item::{AssemblyHierarchy, ItemId, VisibilitySink};
use crate::playlist::{PlaybackList, StationSummary};
use crate::skip::SkipDirection;
use crate::speed::SpeedSource;
use crate::state::{CinemaEvent, CinemaState, CinemaStateMachine, ListenerId, Signal, Transition, Trigger};

/// Public entry point for cinema playback
pub struct CinemaController {
    machine: CinemaStateMachine,
    driver: PlaybackDriver,
    speed: Box<dyn SpeedSource>,
}

impl CinemaController {
    /// Create a controller reading its speed from `speed`
    pub fn new(config: CinemaConfig, speed: impl SpeedSource + 'static) -> Self {
        Self {
            machine: CinemaStateMachine::new(),
            driver: PlaybackDriver::new(config),
            speed: Box::new(speed),
        }
    }

    /// Build the playback list, rewind and hide every item.
    ///
    /// Returns the number of playable items and the per-station summaries.
    pub fn initialize(
        &mut self,
        hierarchy: &impl AssemblyHierarchy,
        sink: &mut dyn VisibilitySink,
    ) -> (usize, Vec<StationSummary>) {
        let (list, stations) = PlaybackList::build(hierarchy);
        let count = list.len();

        self.driver.load(list);
        self.driver.snap_to(0, sink);
        self.machine.reset();

        tracing::info!("Cinema mode ready: {} items in {} stations", count, stations.len());
        (count, stations)
    }

    /// Tear down the session; a running step is cancelled and the state returns to `StoppedStart`
    pub fn exit(&mut self) {
        if self.machine.current().is_running() {
            tracing::info!("Leaving cinema mode while {}", self.machine.current().name());
        }
        self.driver.unload();
        self.machine.reset();
    }

    /// Current cursor: the last fully visible item, `-1` when nothing is visible
    pub fn index(&self) -> isize {
        self.driver.index()
    }

    /// Current state
    pub fn state(&self) -> CinemaState {
        self.machine.current()
    }

    /// Number of playable items
    pub fn count(&self) -> usize {
        self.driver.list().len()
    }

    /// Playable items in playback order
    pub fn items(&self) -> &[ItemId] {
        self.driver.list().items()
    }

    /// Current speed as read from the speed source
    pub fn speed(&self) -> f32 {
        self.speed.speed()
    }

    /// Register a listener for a state entry or a named event
    pub fn subscribe(&mut self, trigger: Trigger, listener: impl FnMut(&Signal) + 'static) -> ListenerId {
        self.machine.subscribe(trigger, listener)
    }

    /// Remove a listener
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.machine.unsubscribe(id)
    }

    /// Start playing in the direction given by the sign of the speed.
    ///
    /// Playing forward from the end rewinds first, playing backward from the
    /// start jumps to the end first. `seeking` forces the transition, which
    /// is how a seek resumes an interrupted playback.
    pub fn play(&mut self, sink: &mut dyn VisibilitySink, seeking: bool) {
        let transition = match SkipDirection::from_speed(self.speed.speed()) {
            SkipDirection::Forward => {
                if self.machine.current() == CinemaState::StoppedEnd {
                    self.skip_to_start(sink);
                }
                self.machine.play_forward(seeking)
            }
            SkipDirection::Backward => {
                if self.machine.current() == CinemaState::StoppedStart {
                    self.skip_to_end(sink);
                }
                self.machine.play_backward(seeking)
            }
        };
        self.react(transition, sink);
    }

    /// Ask the running step to halt at its next frame boundary
    pub fn pause(&mut self) {
        if self.machine.current().is_running() {
            self.driver.request_pause();
        } else {
            tracing::debug!("Ignoring pause in {:?}", self.machine.current());
        }
    }

    /// Finish the fade in flight and halt at that step boundary.
    ///
    /// Unlike [`pause`](Self::pause) this takes effect immediately, so no
    /// item is left half faded. The machine ends in `Paused`, or in
    /// `StoppedStart`/`StoppedEnd` when the finished step hit a bound.
    pub fn halt(&mut self, sink: &mut dyn VisibilitySink) {
        let state = self.machine.current();
        if !state.is_running() {
            tracing::debug!("Ignoring halt in {:?}", state);
            return;
        }

        let index = self.driver.settle(sink);
        let transition = if index < 0 {
            self.machine.reach_start(true)
        } else if index >= self.driver.list().last_index() {
            self.machine.reach_end(true)
        } else {
            self.machine.pause(true)
        };
        self.react(transition, sink);
    }

    /// Show every item before `target` and hide the rest.
    ///
    /// A running step is cancelled first. Afterwards the machine is in
    /// `StoppedStart`/`StoppedEnd` at the bounds, resumes playing if it was
    /// playing, and is `Paused` otherwise. Resumed forward playback fades in
    /// item `target` next; resumed backward playback fades out `target - 1`.
    pub fn skip_to(&mut self, target: isize, sink: &mut dyn VisibilitySink) {
        let target = target.clamp(0, self.count() as isize);
        if self.driver.index() == target - 1 {
            return;
        }

        let state = self.machine.current();
        let was_playing = state.is_playing();
        if state.is_running() {
            self.driver.cancel();
        }
        self.driver.clear_requests();

        let index = self.driver.snap_to(target, sink);
        tracing::debug!("Seeked to {} from {:?}", index, state);

        if index < 0 {
            let transition = self.machine.reach_start(true);
            self.react(transition, sink);
        } else if index >= self.driver.list().last_index() {
            let transition = self.machine.reach_end(true);
            self.react(transition, sink);
        } else if was_playing {
            self.play(sink, true);
        } else {
            let transition = self.machine.pause(true);
            self.react(transition, sink);
        }
    }

    /// Step one item forward, or buffer the request while playing
    pub fn skip_forward(&mut self, sink: &mut dyn VisibilitySink) {
        let transition = self.machine.skip_forward();
        self.react(transition, sink);
    }

    /// Step one item backward, or buffer the request while playing
    pub fn skip_backward(&mut self, sink: &mut dyn VisibilitySink) {
        let transition = self.machine.skip_backward();
        self.react(transition, sink);
    }

    /// Hide everything and stop at the start
    pub fn skip_to_start(&mut self, sink: &mut dyn VisibilitySink) {
        if self.machine.current() == CinemaState::StoppedStart {
            return;
        }
        self.driver.snap_to(0, sink);
        let transition = self.machine.skip_to_start();
        self.react(transition, sink);
    }

    /// Show everything and stop at the end
    pub fn skip_to_end(&mut self, sink: &mut dyn VisibilitySink) {
        if self.machine.current() == CinemaState::StoppedEnd {
            return;
        }
        let count = self.count() as isize;
        self.driver.snap_to(count, sink);
        let transition = self.machine.skip_to_end();
        self.react(transition, sink);
    }

    /// Advance playback by one frame of `dt` time units
    pub fn tick(&mut self, dt: f32, sink: &mut dyn VisibilitySink) {
        let state = self.machine.current();
        if let Some(request) = self.driver.tick(dt, state, self.speed.speed(), sink) {
            self.handle(request, sink);
        }
    }

    fn handle(&mut self, request: DriverRequest, sink: &mut dyn VisibilitySink) {
        let transition = match request {
            DriverRequest::ReachStart => self.machine.reach_start(false),
            DriverRequest::ReachEnd => self.machine.reach_end(false),
            DriverRequest::EndSkipping => self.machine.end_skipping(),
            DriverRequest::Pause => self.machine.pause(false),
            DriverRequest::SwitchDirection => self.machine.switch_direction(),
        };
        self.react(transition, sink);
    }

    fn react(&mut self, transition: Transition, sink: &mut dyn VisibilitySink) {
        match transition.event {
            Some(CinemaEvent::SkippedForwardWhilePlaying) => {
                self.driver.request_skip(SkipDirection::Forward);
            }
            Some(CinemaEvent::SkippedBackwardWhilePlaying) => {
                self.driver.request_skip(SkipDirection::Backward);
            }
            _ => {}
        }

        if let Some(state) = transition.entered {
            self.enter(state, sink);
        }
    }

    fn enter(&mut self, state: CinemaState, sink: &mut dyn VisibilitySink) {
        let request = match state.direction() {
            Some(SkipDirection::Forward) => self.driver.start_forward(sink),
            Some(SkipDirection::Backward) => self.driver.start_backward(sink),
            None => {
                self.driver.cancel();
                self.driver.clear_requests();
                None
            }
        };

        if let Some(request) = request {
            self.handle(request, sink);
        }
    }
}

impl std::fmt::Debug for CinemaController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CinemaController")
            .field("state", &self.machine.current())
            .field("index", &self.driver.index())
            .field("count", &self.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::NodeKind;
    use crate::speed::SpeedControl;
    use crate::test_support::{RecordingSink, TestHierarchy};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup(count: usize, speed: f32) -> (CinemaController, RecordingSink, Vec<ItemId>, SpeedControl) {
        let (hierarchy, leaves) = TestHierarchy::flat(count);
        let control = SpeedControl::new(speed, 2.0);
        let mut ctrl = CinemaController::new(CinemaConfig::default(), control.clone());
        let mut sink = RecordingSink::new();
        let (n, _) = ctrl.initialize(&hierarchy, &mut sink);
        assert_eq!(n, count);
        (ctrl, sink, leaves, control)
    }

    fn run_while(
        ctrl: &mut CinemaController,
        sink: &mut RecordingSink,
        dt: f32,
        mut keep_going: impl FnMut(&CinemaController) -> bool,
    ) {
        for _ in 0..10_000 {
            if !keep_going(ctrl) {
                return;
            }
            ctrl.tick(dt, sink);
        }
        panic!("playback did not settle: {ctrl:?}");
    }

    fn count_signals(ctrl: &mut CinemaController, trigger: Trigger) -> Rc<RefCell<usize>> {
        let counter = Rc::new(RefCell::new(0));
        let c = counter.clone();
        ctrl.subscribe(trigger, move |_| *c.borrow_mut() += 1);
        counter
    }

    #[test]
    fn test_initialize_hides_everything() {
        let (ctrl, sink, leaves, _) = setup(3, 1.0);
        assert_eq!(ctrl.index(), -1);
        assert_eq!(ctrl.state(), CinemaState::StoppedStart);
        assert_eq!(ctrl.items(), leaves.as_slice());
        assert_eq!(sink.opacities(&leaves), vec![0.0; 3]);
    }

    #[test]
    fn test_play_reveals_all_items_in_order() {
        let (mut ctrl, mut sink, leaves, _) = setup(4, 2.0);
        let ends = count_signals(&mut ctrl, Trigger::Event(CinemaEvent::ReachedEnd));

        ctrl.play(&mut sink, false);
        assert_eq!(ctrl.state(), CinemaState::PlayingFw);

        let mut seen = vec![-1];
        run_while(&mut ctrl, &mut sink, 0.1, |c| {
            if seen.last() != Some(&c.index()) {
                seen.push(c.index());
            }
            c.state() == CinemaState::PlayingFw
        });

        assert_eq!(seen, vec![-1, 0, 1, 2, 3]);
        assert_eq!(ctrl.state(), CinemaState::StoppedEnd);
        assert_eq!(ctrl.index(), 3);
        assert_eq!(*ends.borrow(), 1);
        assert_eq!(sink.opacities(&leaves), vec![1.0; 4]);
    }

    #[test]
    fn test_skip_to_while_stopped_pauses_mid_list() {
        let (mut ctrl, mut sink, leaves, _) = setup(5, 1.0);

        ctrl.skip_to(3, &mut sink);

        assert_eq!(sink.opacities(&leaves), vec![1.0, 1.0, 1.0, 0.0, 0.0]);
        assert_eq!(ctrl.index(), 2);
        assert_eq!(ctrl.state(), CinemaState::Paused);
    }

    #[test]
    fn test_skip_to_bounds_stop() {
        let (mut ctrl, mut sink, leaves, _) = setup(5, 1.0);

        ctrl.skip_to(99, &mut sink);
        assert_eq!(ctrl.state(), CinemaState::StoppedEnd);
        assert_eq!(ctrl.index(), 4);

        ctrl.skip_to(-4, &mut sink);
        assert_eq!(ctrl.state(), CinemaState::StoppedStart);
        assert_eq!(ctrl.index(), -1);
        assert_eq!(sink.opacities(&leaves), vec![0.0; 5]);
    }

    #[test]
    fn test_skip_to_current_position_is_noop() {
        let (mut ctrl, mut sink, _, _) = setup(5, 1.0);
        ctrl.skip_to(2, &mut sink);
        let writes = sink.writes.len();

        ctrl.skip_to(2, &mut sink);
        assert_eq!(sink.writes.len(), writes);
        assert_eq!(ctrl.index(), 1);
    }

    #[test]
    fn test_skip_to_while_playing_resumes_playback() {
        let (mut ctrl, mut sink, leaves, _) = setup(5, 1.0);
        ctrl.play(&mut sink, false);
        ctrl.tick(0.1, &mut sink);

        ctrl.skip_to(3, &mut sink);

        // Playback continues with the first hidden item
        assert_eq!(ctrl.state(), CinemaState::PlayingFw);
        assert_eq!(ctrl.index(), 3);
        assert_eq!(sink.opacities(&leaves), vec![1.0, 1.0, 1.0, 0.0, 0.0]);
        assert!(ctrl.driver.is_busy());
    }

    #[test]
    fn test_pause_twice_equals_once() {
        let (mut ctrl, mut sink, leaves, _) = setup(3, 1.0);
        ctrl.play(&mut sink, false);
        ctrl.tick(0.1, &mut sink);

        ctrl.pause();
        ctrl.pause();
        ctrl.tick(0.016, &mut sink);
        assert_eq!(ctrl.state(), CinemaState::Paused);
        assert_eq!(sink.get(leaves[0]), Some(1.0));

        ctrl.pause();
        ctrl.tick(0.016, &mut sink);
        assert_eq!(ctrl.state(), CinemaState::Paused);
        assert_eq!(ctrl.index(), 0);
    }

    #[test]
    fn test_pause_while_stopped_is_not_buffered() {
        let (mut ctrl, mut sink, _, _) = setup(3, 1.0);
        ctrl.pause();
        ctrl.play(&mut sink, false);
        ctrl.tick(0.016, &mut sink);
        assert_eq!(ctrl.state(), CinemaState::PlayingFw);
    }

    #[test]
    fn test_resume_from_pause_uses_speed_sign() {
        let (mut ctrl, mut sink, _, speed) = setup(4, 2.0);
        ctrl.skip_to(2, &mut sink);
        assert_eq!(ctrl.state(), CinemaState::Paused);

        speed.set(-1.0);
        ctrl.play(&mut sink, false);
        assert_eq!(ctrl.state(), CinemaState::PlayingBw);
        assert_eq!(ctrl.index(), 1);
    }

    #[test]
    fn test_direction_flip_skips_pause() {
        let (mut ctrl, mut sink, _, speed) = setup(5, 2.0);
        let entries = Rc::new(RefCell::new(Vec::new()));
        for state in [CinemaState::Paused, CinemaState::PlayingBw, CinemaState::StoppedStart] {
            let e = entries.clone();
            ctrl.subscribe(Trigger::Entry(state), move |s| e.borrow_mut().push(s.current));
        }

        ctrl.play(&mut sink, false);
        run_while(&mut ctrl, &mut sink, 0.1, |c| c.index() < 2);
        speed.set(-2.0);
        run_while(&mut ctrl, &mut sink, 0.1, |c| c.state() == CinemaState::PlayingFw);

        assert_eq!(ctrl.state(), CinemaState::PlayingBw);
        assert_eq!(entries.borrow().first(), Some(&CinemaState::PlayingBw));
    }

    #[test]
    fn test_direction_flip_backward_to_forward_skips_pause() {
        let (mut ctrl, mut sink, _, speed) = setup(5, -2.0);
        let entries = Rc::new(RefCell::new(Vec::new()));
        for state in [CinemaState::Paused, CinemaState::PlayingFw, CinemaState::StoppedStart] {
            let e = entries.clone();
            ctrl.subscribe(Trigger::Entry(state), move |s| e.borrow_mut().push(s.current));
        }

        ctrl.play(&mut sink, false);
        assert_eq!(ctrl.state(), CinemaState::PlayingBw);
        run_while(&mut ctrl, &mut sink, 0.1, |c| c.index() > 2);
        speed.set(2.0);
        run_while(&mut ctrl, &mut sink, 0.1, |c| c.state() == CinemaState::PlayingBw);

        assert_eq!(ctrl.state(), CinemaState::PlayingFw);
        assert_eq!(entries.borrow().first(), Some(&CinemaState::PlayingFw));
    }

    #[test]
    fn test_last_step_reaches_end_once() {
        let (mut ctrl, mut sink, leaves, _) = setup(5, 2.0);
        let ends = count_signals(&mut ctrl, Trigger::Event(CinemaEvent::ReachedEnd));
        ctrl.skip_to(4, &mut sink);
        assert_eq!(ctrl.index(), 3);

        ctrl.play(&mut sink, false);
        run_while(&mut ctrl, &mut sink, 0.05, |c| c.state().is_running());

        assert_eq!(*ends.borrow(), 1);
        assert_eq!(ctrl.state(), CinemaState::StoppedEnd);
        assert_eq!(ctrl.index(), 4);
        assert_eq!(sink.get(leaves[4]), Some(1.0));
    }

    #[test]
    fn test_backward_skip_while_playing_forward() {
        let (mut ctrl, mut sink, leaves, _) = setup(5, 1.0);
        ctrl.skip_to(1, &mut sink);
        ctrl.play(&mut sink, false);
        // Finish fading in item 1; the one-unit delay starts
        ctrl.tick(1.0, &mut sink);
        assert_eq!(ctrl.index(), 1);

        ctrl.skip_backward(&mut sink);
        assert_eq!(ctrl.state(), CinemaState::PlayingFw);
        assert!(ctrl.driver.flags().backward);

        ctrl.pause();
        ctrl.tick(0.016, &mut sink);

        assert_eq!(ctrl.index(), -1);
        assert_eq!(sink.get(leaves[0]), Some(0.0));
        assert_eq!(sink.get(leaves[1]), Some(0.0));
        assert!(!ctrl.driver.flags().any());
        assert_eq!(ctrl.state(), CinemaState::Paused);
    }

    #[test]
    fn test_forward_skip_while_playing_backward() {
        let (mut ctrl, mut sink, leaves, _) = setup(6, -1.0);
        ctrl.skip_to(2, &mut sink);
        ctrl.play(&mut sink, false);
        assert_eq!(ctrl.state(), CinemaState::PlayingBw);
        assert_eq!(ctrl.index(), 1);

        // Finish fading out item 1; the one-unit delay starts
        ctrl.tick(1.0, &mut sink);
        assert_eq!(ctrl.index(), 0);
        assert_eq!(sink.get(leaves[1]), Some(0.0));

        ctrl.skip_forward(&mut sink);
        assert_eq!(ctrl.state(), CinemaState::PlayingBw);
        assert!(ctrl.driver.flags().forward);
        ctrl.tick(0.016, &mut sink);

        // 0 -> 2 by the skip, then the next backward step begins on item 2
        assert_eq!(ctrl.state(), CinemaState::PlayingBw);
        assert_eq!(ctrl.index(), 2);
        assert_eq!(sink.get(leaves[1]), Some(1.0));
        assert_eq!(sink.get(leaves[2]), Some(1.0));
        assert_eq!(sink.get(leaves[3]), Some(0.0));
        assert!(!ctrl.driver.flags().any());
    }

    #[test]
    fn test_halt_finishes_fade_in_flight() {
        let (mut ctrl, mut sink, leaves, _) = setup(3, 1.0);
        ctrl.play(&mut sink, false);
        ctrl.tick(0.1, &mut sink);
        let partial = sink.get(leaves[0]).unwrap();
        assert!(partial > 0.0 && partial < 1.0);

        ctrl.halt(&mut sink);
        assert_eq!(ctrl.state(), CinemaState::Paused);
        assert_eq!(ctrl.index(), 0);
        assert_eq!(sink.opacities(&leaves), vec![1.0, 0.0, 0.0]);

        // Nothing runs after the halt
        ctrl.tick(1.0, &mut sink);
        assert_eq!(ctrl.index(), 0);
    }

    #[test]
    fn test_halt_backward_at_first_item_stops_at_start() {
        let (mut ctrl, mut sink, leaves, _) = setup(3, -1.0);
        ctrl.skip_to(1, &mut sink);
        ctrl.play(&mut sink, false);
        ctrl.tick(0.1, &mut sink);

        ctrl.halt(&mut sink);
        assert_eq!(ctrl.state(), CinemaState::StoppedStart);
        assert_eq!(ctrl.index(), -1);
        assert_eq!(sink.opacities(&leaves), vec![0.0; 3]);

        ctrl.halt(&mut sink);
        assert_eq!(ctrl.state(), CinemaState::StoppedStart);
    }

    #[test]
    fn test_backward_skip_then_playback_continues() {
        let (mut ctrl, mut sink, _, _) = setup(5, 1.0);
        ctrl.skip_to(3, &mut sink);
        ctrl.play(&mut sink, false);
        ctrl.tick(1.0, &mut sink);
        assert_eq!(ctrl.index(), 3);

        ctrl.skip_backward(&mut sink);
        ctrl.tick(0.016, &mut sink);

        // 3 -> 1 by the skip, then the next forward step begins on item 2
        assert_eq!(ctrl.state(), CinemaState::PlayingFw);
        assert_eq!(ctrl.index(), 2);
    }

    #[test]
    fn test_play_backward_from_start_jumps_to_end() {
        let (mut ctrl, mut sink, leaves, _) = setup(3, -1.0);
        let jumps = count_signals(&mut ctrl, Trigger::Event(CinemaEvent::SkippedToEnd));

        ctrl.play(&mut sink, false);

        assert_eq!(*jumps.borrow(), 1);
        assert_eq!(ctrl.state(), CinemaState::PlayingBw);
        assert_eq!(ctrl.index(), 2);
        assert_eq!(sink.opacities(&leaves), vec![1.0; 3]);
    }

    #[test]
    fn test_play_forward_from_end_rewinds() {
        let (mut ctrl, mut sink, leaves, _) = setup(3, 1.0);
        ctrl.skip_to_end(&mut sink);
        assert_eq!(ctrl.state(), CinemaState::StoppedEnd);

        ctrl.play(&mut sink, false);

        assert_eq!(ctrl.state(), CinemaState::PlayingFw);
        assert_eq!(ctrl.index(), 0);
        assert_eq!(sink.opacities(&leaves), vec![0.0; 3]);
    }

    #[test]
    fn test_backward_playback_reaches_start() {
        let (mut ctrl, mut sink, leaves, _) = setup(3, -2.0);
        let starts = count_signals(&mut ctrl, Trigger::Entry(CinemaState::StoppedStart));

        ctrl.play(&mut sink, false);
        run_while(&mut ctrl, &mut sink, 0.1, |c| c.state().is_running());

        assert_eq!(ctrl.state(), CinemaState::StoppedStart);
        assert_eq!(ctrl.index(), -1);
        assert_eq!(*starts.borrow(), 1);
        assert_eq!(sink.opacities(&leaves), vec![0.0; 3]);
    }

    #[test]
    fn test_single_step_skips() {
        let (mut ctrl, mut sink, leaves, _) = setup(3, 1.0);
        let ended = count_signals(&mut ctrl, Trigger::Event(CinemaEvent::SkipEnded));

        ctrl.skip_forward(&mut sink);
        assert_eq!(ctrl.state(), CinemaState::SkippingFw);
        ctrl.tick(1.0, &mut sink);
        assert_eq!(ctrl.state(), CinemaState::Paused);
        assert_eq!(ctrl.index(), 0);
        assert_eq!(sink.get(leaves[0]), Some(1.0));
        assert_eq!(*ended.borrow(), 1);

        ctrl.skip_backward(&mut sink);
        assert_eq!(ctrl.state(), CinemaState::SkippingBw);
        ctrl.tick(1.0, &mut sink);
        assert_eq!(ctrl.state(), CinemaState::StoppedStart);
        assert_eq!(ctrl.index(), -1);
        assert_eq!(sink.get(leaves[0]), Some(0.0));
    }

    #[test]
    fn test_skip_to_during_single_step_skip() {
        let (mut ctrl, mut sink, leaves, _) = setup(4, 1.0);
        ctrl.skip_forward(&mut sink);
        ctrl.tick(0.1, &mut sink);

        ctrl.skip_to(2, &mut sink);
        assert_eq!(ctrl.state(), CinemaState::Paused);
        assert!(!ctrl.driver.is_busy());

        // The cancelled fade never writes again
        ctrl.tick(0.1, &mut sink);
        assert_eq!(sink.opacities(&leaves), vec![1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_skip_to_start_while_playing() {
        let (mut ctrl, mut sink, leaves, _) = setup(3, 1.0);
        let jumps = count_signals(&mut ctrl, Trigger::Event(CinemaEvent::SkippedToStartWhilePlaying));
        ctrl.skip_to(2, &mut sink);
        ctrl.play(&mut sink, false);

        ctrl.skip_to_start(&mut sink);

        assert_eq!(*jumps.borrow(), 1);
        assert_eq!(ctrl.state(), CinemaState::StoppedStart);
        assert_eq!(ctrl.index(), -1);
        assert_eq!(sink.opacities(&leaves), vec![0.0; 3]);
    }

    #[test]
    fn test_empty_list() {
        let mut hierarchy = TestHierarchy::new();
        let station = hierarchy.station("Empty");
        hierarchy.child(station, "Nothing", NodeKind::ContainerGroup);
        let mut ctrl = CinemaController::new(CinemaConfig::default(), SpeedControl::default());
        let mut sink = RecordingSink::new();

        let (count, stations) = ctrl.initialize(&hierarchy, &mut sink);
        assert_eq!(count, 0);
        assert_eq!(stations.len(), 1);

        ctrl.play(&mut sink, false);
        assert_eq!(ctrl.state(), CinemaState::StoppedEnd);
        assert_eq!(ctrl.index(), -1);

        ctrl.skip_to(3, &mut sink);
        ctrl.tick(0.1, &mut sink);
        assert_eq!(ctrl.index(), -1);
        assert!(sink.writes.is_empty());
    }

    #[test]
    fn test_exit_tears_down() {
        let (mut ctrl, mut sink, _, _) = setup(3, 1.0);
        ctrl.play(&mut sink, false);

        ctrl.exit();
        let writes = sink.writes.len();
        ctrl.tick(0.1, &mut sink);

        assert_eq!(ctrl.state(), CinemaState::StoppedStart);
        assert_eq!(ctrl.index(), -1);
        assert_eq!(ctrl.count(), 0);
        assert_eq!(sink.writes.len(), writes);
    }

    #[test]
    fn test_index_stays_in_range_for_mixed_input() {
        let (mut ctrl, mut sink, leaves, speed) = setup(6, 1.0);
        let mut seed: u32 = 0x2545_f491;
        let mut next = move |bound: u32| {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            seed % bound
        };

        for _ in 0..3_000 {
            match next(9) {
                0 => ctrl.play(&mut sink, false),
                1 => ctrl.pause(),
                2 => ctrl.skip_to(next(10) as isize - 2, &mut sink),
                3 => ctrl.skip_forward(&mut sink),
                4 => ctrl.skip_backward(&mut sink),
                5 => speed.set(next(9) as f32 * 0.5 - 2.0),
                _ => ctrl.tick(next(40) as f32 * 0.01, &mut sink),
            }

            let index = ctrl.index();
            assert!((-1..=5).contains(&index), "index {index} out of range");

            if !ctrl.state().is_running() {
                for opacity in sink.opacities(&leaves) {
                    assert!(opacity == 0.0 || opacity == 1.0, "half-faded item while halted");
                }
            }
        }
    }
}
