// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless preview loop.

use crate::cinema_mode::CinemaModeManager;
use crate::preview::{PreviewInput, PreviewSettings};
use crate::state::SceneData;
use assembly_editor_cinema::{CinemaState, ListenerId, Trigger};
use std::cell::RefCell;
use std::rc::Rc;

const LOGGED_STATES: [CinemaState; 7] = [
    CinemaState::StoppedStart,
    CinemaState::StoppedEnd,
    CinemaState::PlayingFw,
    CinemaState::PlayingBw,
    CinemaState::SkippingFw,
    CinemaState::SkippingBw,
    CinemaState::Paused,
];

/// Outcome of a preview run
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewReport {
    /// Frames simulated
    pub frames: u64,
    /// States entered, in order
    pub entered: Vec<CinemaState>,
    /// State when the run ended
    pub final_state: CinemaState,
    /// Index when the run ended
    pub final_index: isize,
    /// Parts rendered when the run ended
    pub visible_parts: usize,
}

/// Replay the settings' script against a scene
pub fn run_preview(settings: &PreviewSettings, scene: &mut SceneData) -> PreviewReport {
    let mut manager = CinemaModeManager::new(settings.cinema.clone());
    manager.enter(scene);
    manager.speed().set(settings.initial_speed);

    let entered = Rc::new(RefCell::new(Vec::new()));
    let listeners: Vec<ListenerId> = LOGGED_STATES
        .iter()
        .map(|&state| {
            let entered = Rc::clone(&entered);
            manager.controller_mut().subscribe(Trigger::Entry(state), move |signal| {
                tracing::debug!("{} -> {}", signal.previous.name(), signal.current.name());
                entered.borrow_mut().push(signal.current);
            })
        })
        .collect();

    let frame_time = 1.0 / f64::from(settings.frame_rate);
    let script = settings.sorted_script();
    let mut next_input = 0;
    let mut frames = 0u64;
    let mut time = 0.0f64;

    while time <= f64::from(settings.duration) && manager.is_active() {
        while let Some(scripted) = script.get(next_input) {
            if f64::from(scripted.at) > time {
                break;
            }
            tracing::info!("t={:.2}s {:?}", time, scripted.input);
            manager.apply(&scripted.input, scene);
            next_input += 1;
            if scripted.input == PreviewInput::Exit {
                break;
            }
        }
        if !manager.is_active() {
            break;
        }

        manager.update(frame_time, frame_time, scene);
        frames += 1;
        time += frame_time;
    }

    let final_state = manager.controller().state();
    let final_index = manager.controller().index();
    tracing::info!(
        "Preview finished after {} frames ({} ticks): {} at index {} in station {:?} ({})",
        frames,
        manager.frame_count,
        final_state.name(),
        final_index,
        manager.current_station(),
        manager.status_text()
    );

    for id in listeners {
        manager.controller_mut().unsubscribe(id);
    }
    manager.exit(scene);

    let entered = entered.borrow().clone();
    PreviewReport {
        frames,
        entered,
        final_state,
        final_index,
        visible_parts: scene.visible_parts(),
    }
}
