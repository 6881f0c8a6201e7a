//! Game host / lifecycle controller
//!
//! Owns at most one session at a time: its simulation state, input
//! controller and drawing surface. Frames only advance a mounted, running
//! session; unmounting drops everything the session owned, so a stray
//! frame or late asset completion after teardown is a no-op.

use crate::consts::FIRST_FRAME_DT;
use crate::error::{AssetError, HostError};
use crate::platform::{InputController, PlatformCapability, Viewport};
use crate::renderer::{Frame, compose};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, GameStatus, TickInput, tick};

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Something the host can draw frames onto
pub trait Surface {
    /// Decoded pet image
    type Sprite;

    fn set_sprite(&mut self, sprite: Self::Sprite);
    /// Container size changed
    fn resize(&mut self, viewport: Viewport);
    fn present(&mut self, frame: &Frame);
    /// Session is being torn down; drop anything held
    fn release(&mut self);
}

/// Receives the final score once per session
pub type GameOverHandler = Box<dyn FnMut(u64) -> Result<(), HostError>>;

/// Identifies one mount; async completions carry it to detect staleness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

struct Session<S: Surface> {
    id: SessionId,
    state: GameState,
    input: InputController,
    surface: S,
    last_time: Option<f64>,
    assets_ready: bool,
    terminal_delivered: bool,
    failure: Option<AssetError>,
}

pub struct GameHost<S: Surface> {
    settings: Settings,
    capability: PlatformCapability,
    on_game_over: GameOverHandler,
    viewport: Viewport,
    session: Option<Session<S>>,
    next_session: u64,
}

impl<S: Surface> GameHost<S> {
    pub fn new(settings: Settings, capability: PlatformCapability, on_game_over: GameOverHandler) -> Self {
        Self {
            settings,
            capability,
            on_game_over,
            viewport: Viewport::default(),
            session: None,
            next_session: 1,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Start a new session on `surface`, tearing down any previous one first
    ///
    /// The session waits in `Loading` until `assets_ready`. If the platform
    /// can't run the game the session is mounted straight into `Failed`.
    pub fn mount(&mut self, mut surface: S, seed: u64) -> Result<SessionId, HostError> {
        self.unmount();

        let id = SessionId(self.next_session);
        self.next_session += 1;

        surface.resize(self.viewport);
        let mut session = Session {
            id,
            state: GameState::new(seed, self.settings.tuning.clone()),
            input: InputController::new(),
            surface,
            last_time: None,
            assets_ready: false,
            terminal_delivered: false,
            failure: None,
        };

        let capable = self.capability.ensure();
        if let Err(e) = &capable {
            log::error!("Session {} cannot start: {}", id.0, e);
            session.state.fail();
            session.failure = Some(e.clone());
        } else {
            log::info!("Session {} mounted (seed {})", id.0, seed);
        }

        let frame = compose(&session.state, &self.settings);
        session.surface.present(&frame);
        self.session = Some(session);

        capable.map(|_| id).map_err(HostError::from)
    }

    /// Asset loading finished for session `id`
    ///
    /// Returns false (and does nothing) if that session is no longer mounted.
    pub fn assets_ready(&mut self, id: SessionId, result: Result<S::Sprite, AssetError>) -> bool {
        let Some(session) = self.session.as_mut().filter(|s| s.id == id) else {
            log::debug!("Ignoring asset completion for stale session {}", id.0);
            return false;
        };

        match result {
            Ok(sprite) => {
                session.surface.set_sprite(sprite);
                session.assets_ready = true;
                if session.state.start() {
                    log::info!("Session {} running", id.0);
                }
            }
            Err(e) => {
                log::error!("Session {} failed to load assets: {}", id.0, e);
                session.state.fail();
                session.failure = Some(e);
            }
        }
        true
    }

    /// Advance one animation frame at timestamp `now_ms`
    ///
    /// Returns true while the frame loop should keep being scheduled.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        match session.state.status {
            GameStatus::Loading => return true,
            GameStatus::Over | GameStatus::Failed => return false,
            GameStatus::Running => {}
        }

        let dt = match session.last_time {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => FIRST_FRAME_DT,
        };
        session.last_time = Some(now_ms);

        let input = TickInput {
            direction: session.input.direction(),
        };
        let event = tick(&mut session.state, &input, dt);

        let frame = compose(&session.state, &self.settings);
        session.surface.present(&frame);

        match event {
            Some(GameEvent::GameOver { score }) => {
                self.deliver_game_over(score);
                false
            }
            None => true,
        }
    }

    /// Hand the final score to the handler, at most once per session
    fn deliver_game_over(&mut self, score: u64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.terminal_delivered {
            return;
        }
        session.terminal_delivered = true;
        session.input.clear();

        log::info!("Session {} over with score {}", session.id.0, score);
        if let Err(e) = (self.on_game_over)(score) {
            // The session is already stopped; nothing to roll back
            log::error!("Game over handler failed: {}", e);
        }
    }

    /// Tear down the current session, if any
    pub fn unmount(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.input.clear();
            session.surface.release();
            log::info!("Session {} unmounted", session.id.0);
        }
    }

    /// Replace the current session with a fresh one on the same surface
    ///
    /// A sprite already loaded stays on the surface, so the new session
    /// starts running immediately.
    pub fn restart(&mut self, seed: u64) -> Result<SessionId, HostError> {
        let Some(old) = self.session.take() else {
            return Err(HostError::NotMounted);
        };
        let had_assets = old.assets_ready;
        log::info!("Session {} restarting", old.id.0);

        let id = self.mount(old.surface, seed)?;
        if had_assets {
            if let Some(session) = self.session.as_mut() {
                session.assets_ready = true;
                session.state.start();
            }
        }
        Ok(id)
    }

    /// Container resized (CSS pixels, measured without the canvas)
    ///
    /// A zero height means the container is auto-height. Returns false when
    /// the viewport did not change.
    pub fn resize(&mut self, container_w: f32, container_h: f32, device_pixel_ratio: f32) -> bool {
        let viewport = Viewport::fit_container(container_w, container_h, device_pixel_ratio);
        if viewport == self.viewport {
            return false;
        }
        self.viewport = viewport;
        if let Some(session) = self.session.as_mut() {
            session.surface.resize(self.viewport);
            let frame = compose(&session.state, &self.settings);
            session.surface.present(&frame);
        }
        true
    }

    /// Replace settings. Display preferences apply from the next frame,
    /// tuning from the next session.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        if let Some(session) = self.session.as_mut() {
            let frame = compose(&session.state, &self.settings);
            session.surface.present(&frame);
        }
    }

    pub fn is_running(&self) -> bool {
        self.status() == Some(GameStatus::Running)
    }

    fn input_mut(&mut self) -> Option<&mut InputController> {
        self.session.as_mut().map(|s| &mut s.input)
    }

    pub fn press_left(&mut self) {
        if let Some(input) = self.input_mut() {
            input.press_left();
        }
    }

    pub fn press_right(&mut self) {
        if let Some(input) = self.input_mut() {
            input.press_right();
        }
    }

    /// Release the on-screen buttons
    pub fn release(&mut self) {
        if let Some(input) = self.input_mut() {
            input.release_buttons();
        }
    }

    /// Returns true if the key was consumed
    pub fn key_down(&mut self, key: &str) -> bool {
        self.input_mut().is_some_and(|input| input.key_down(key))
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        self.input_mut().is_some_and(|input| input.key_up(key))
    }

    /// Pointer pressed at a position relative to the displayed canvas (CSS px)
    pub fn pointer_down(&mut self, pointer_id: i32, canvas_x: f32, canvas_y: f32) {
        let logical = self.viewport.to_logical(canvas_x, canvas_y);
        if let Some(input) = self.input_mut() {
            input.pointer_down(pointer_id, logical.x);
        }
    }

    pub fn pointer_up(&mut self, pointer_id: i32) {
        if let Some(input) = self.input_mut() {
            input.pointer_up(pointer_id);
        }
    }

    /// Focus lost: drop held input so nothing sticks
    pub fn blur(&mut self) {
        if let Some(input) = self.input_mut() {
            input.clear();
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn status(&self) -> Option<GameStatus> {
        self.session.as_ref().map(|s| s.state.status)
    }

    pub fn score(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.state.score)
    }

    /// Why the current session failed to start
    pub fn failure(&self) -> Option<&AssetError> {
        self.session.as_ref().and_then(|s| s.failure.as_ref())
    }

    pub fn state(&self) -> Option<&GameState> {
        self.session.as_ref().map(|s| &s.state)
    }

    pub fn state_mut(&mut self) -> Option<&mut GameState> {
        self.session.as_mut().map(|s| &mut s.state)
    }
}

impl<S: Surface> Drop for GameHost<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Direction, ObstacleKind};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Log {
        presents: usize,
        last_frame_len: usize,
        releases: usize,
        sprite: Option<&'static str>,
        viewport: Option<Viewport>,
    }

    struct RecordingSurface(Rc<RefCell<Log>>);

    impl Surface for RecordingSurface {
        type Sprite = &'static str;

        fn set_sprite(&mut self, sprite: &'static str) {
            self.0.borrow_mut().sprite = Some(sprite);
        }

        fn resize(&mut self, viewport: Viewport) {
            self.0.borrow_mut().viewport = Some(viewport);
        }

        fn present(&mut self, frame: &Frame) {
            let mut log = self.0.borrow_mut();
            log.presents += 1;
            log.last_frame_len = frame.len();
        }

        fn release(&mut self) {
            self.0.borrow_mut().releases += 1;
        }
    }

    type Scores = Rc<RefCell<Vec<u64>>>;

    fn host(capability: PlatformCapability) -> (GameHost<RecordingSurface>, Scores) {
        let scores: Scores = Rc::default();
        let sink = scores.clone();
        let host = GameHost::new(
            Settings::default(),
            capability,
            Box::new(move |score| {
                sink.borrow_mut().push(score);
                Ok(())
            }),
        );
        (host, scores)
    }

    fn surface() -> (RecordingSurface, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        (RecordingSurface(log.clone()), log)
    }

    /// Mounted and running, one frame already drawn at t = 0
    fn running_host() -> (GameHost<RecordingSurface>, Scores, Rc<RefCell<Log>>) {
        let (mut host, scores) = host(PlatformCapability::Headless);
        let (surface, log) = surface();
        let id = host.mount(surface, 1).unwrap();
        assert!(host.assets_ready(id, Ok("pet.png")));
        assert!(host.frame(0.0));
        (host, scores, log)
    }

    fn crash(host: &mut GameHost<RecordingSurface>) {
        let state = host.state_mut().unwrap();
        let pos = state.player.pos;
        state.spawn_obstacle_at(ObstacleKind::Ball, pos, 0.0);
    }

    #[test]
    fn test_loading_until_assets_ready() {
        let (mut host, _) = host(PlatformCapability::Headless);
        let (surface, log) = surface();
        let id = host.mount(surface, 1).unwrap();
        assert_eq!(host.status(), Some(GameStatus::Loading));
        assert!(host.frame(0.0));
        assert_eq!(host.state().unwrap().time_ticks, 0);

        host.assets_ready(id, Ok("pet.png"));
        assert_eq!(host.status(), Some(GameStatus::Running));
        assert_eq!(log.borrow().sprite, Some("pet.png"));
    }

    #[test]
    fn test_missing_capability_fails_to_start() {
        let (mut host, scores) = host(PlatformCapability::Unavailable("no canvas".into()));
        let (surface, _log) = surface();
        let err = host.mount(surface, 1).unwrap_err();
        assert!(matches!(err, HostError::Asset(AssetError::CapabilityMissing(_))));
        assert_eq!(host.status(), Some(GameStatus::Failed));
        assert!(host.failure().is_some());
        assert!(!host.frame(16.0));
        assert!(scores.borrow().is_empty());
    }

    #[test]
    fn test_image_failure_is_distinct_from_game_over() {
        let (mut host, scores) = host(PlatformCapability::Headless);
        let (surface, _log) = surface();
        let id = host.mount(surface, 1).unwrap();
        host.assets_ready(
            id,
            Err(AssetError::ImageLoad {
                url: "pet.png".into(),
                reason: "404".into(),
            }),
        );
        assert_eq!(host.status(), Some(GameStatus::Failed));
        assert!(!host.frame(16.0));
        assert!(scores.borrow().is_empty());
    }

    #[test]
    fn test_game_over_delivered_exactly_once() {
        let (mut host, scores, _log) = running_host();
        for i in 1..20 {
            host.frame(i as f64 * 16.0);
        }
        let score = host.score().unwrap();
        crash(&mut host);
        assert!(!host.frame(20.0 * 16.0));
        assert_eq!(host.status(), Some(GameStatus::Over));

        for i in 21..40 {
            assert!(!host.frame(i as f64 * 16.0));
        }
        assert_eq!(*scores.borrow(), vec![score]);
    }

    #[test]
    fn test_failing_handler_does_not_corrupt_state() {
        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let mut host: GameHost<RecordingSurface> = GameHost::new(
            Settings::default(),
            PlatformCapability::Headless,
            Box::new(move |_| {
                *counter.borrow_mut() += 1;
                Err(HostError::Callback("network down".into()))
            }),
        );
        let (surface, _log) = surface();
        let id = host.mount(surface, 1).unwrap();
        host.assets_ready(id, Ok("pet.png"));
        host.frame(0.0);
        crash(&mut host);
        host.frame(16.0);
        host.frame(32.0);
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(host.status(), Some(GameStatus::Over));
    }

    #[test]
    fn test_unmount_mid_run_stops_everything() {
        let (mut host, scores, log) = running_host();
        host.frame(16.0);
        let presents = log.borrow().presents;

        host.unmount();
        assert_eq!(log.borrow().releases, 1);
        assert!(!host.is_mounted());

        // Erroneous frames after teardown: no draws, no events
        for i in 2..30 {
            assert!(!host.frame(i as f64 * 16.0));
        }
        assert_eq!(log.borrow().presents, presents);
        assert!(scores.borrow().is_empty());
    }

    #[test]
    fn test_stale_asset_completion_ignored() {
        let (mut host, _) = host(PlatformCapability::Headless);
        let (first, first_log) = surface();
        let stale = host.mount(first, 1).unwrap();

        // Remount before the first image finished loading
        let (second, second_log) = surface();
        let current = host.mount(second, 2).unwrap();
        assert_ne!(stale, current);
        assert_eq!(first_log.borrow().releases, 1);

        assert!(!host.assets_ready(stale, Ok("late.png")));
        assert_eq!(host.status(), Some(GameStatus::Loading));
        assert!(second_log.borrow().sprite.is_none());

        host.unmount();
        assert!(!host.assets_ready(current, Ok("late.png")));
    }

    #[test]
    fn test_button_controls_drive_player() {
        let (mut host, _, _log) = running_host();
        let x0 = host.state().unwrap().player.pos.x;
        host.press_left();
        host.frame(16.0);
        let x1 = host.state().unwrap().player.pos.x;
        assert!(x1 < x0);

        host.press_right();
        host.frame(32.0);
        assert!(host.state().unwrap().player.pos.x > x1);

        host.release();
        let x2 = host.state().unwrap().player.pos.x;
        host.frame(48.0);
        assert_eq!(host.state().unwrap().player.pos.x, x2);
    }

    #[test]
    fn test_pointer_uses_viewport_mapping() {
        let (mut host, _, log) = running_host();
        host.resize(400.0, 300.0, 2.0);
        assert_eq!(log.borrow().viewport.unwrap().scale, 0.5);

        // 150 CSS px = 300 logical: left half
        host.pointer_down(7, 150.0, 100.0);
        let x0 = host.state().unwrap().player.pos.x;
        host.frame(16.0);
        assert!(host.state().unwrap().player.pos.x < x0);
        host.pointer_up(7);

        // 250 CSS px = 500 logical: right half
        host.pointer_down(8, 250.0, 100.0);
        let x1 = host.state().unwrap().player.pos.x;
        host.frame(32.0);
        assert!(host.state().unwrap().player.pos.x > x1);
    }

    #[test]
    fn test_resize_only_redraws_on_change() {
        let (mut host, _, log) = running_host();
        assert!(host.resize(400.0, 300.0, 1.0));
        let presents = log.borrow().presents;
        assert!(!host.resize(400.0, 300.0, 1.0));
        assert_eq!(log.borrow().presents, presents);

        // Auto-height container: height follows the width
        assert!(host.resize(1200.0, 0.0, 1.0));
        assert_eq!(host.viewport().scale, 1.5);
    }

    #[test]
    fn test_set_settings_applies_display_then_tuning() {
        let (mut host, _, log) = running_host();
        let plain = log.borrow().last_frame_len;

        let mut settings = Settings::default();
        settings.show_hitboxes = true;
        settings.tuning.player_speed = 999.0;
        host.set_settings(settings);

        // Hitbox overlay shows right away (one extra shape for the player)
        assert_eq!(log.borrow().last_frame_len, plain + 1);
        assert_ne!(host.state().unwrap().player.speed, 999.0);

        host.restart(3).unwrap();
        assert_eq!(host.state().unwrap().player.speed, 999.0);
    }

    #[test]
    fn test_blur_releases_keys() {
        let (mut host, _, _log) = running_host();
        assert!(host.key_down("ArrowLeft"));
        host.blur();
        let x0 = host.state().unwrap().player.pos.x;
        host.frame(16.0);
        assert_eq!(host.state().unwrap().player.pos.x, x0);
    }

    #[test]
    fn test_restart_keeps_sprite_and_runs() {
        let (mut host, scores, log) = running_host();
        crash(&mut host);
        host.frame(16.0);
        assert_eq!(scores.borrow().len(), 1);

        let old = host.session_id().unwrap();
        let new = host.restart(2).unwrap();
        assert_ne!(old, new);
        assert_eq!(host.status(), Some(GameStatus::Running));
        assert_eq!(host.score(), Some(0));
        assert_eq!(log.borrow().releases, 0);
        assert_eq!(log.borrow().sprite, Some("pet.png"));

        crash(&mut host);
        host.frame(0.0);
        assert_eq!(scores.borrow().len(), 2);
    }

    #[test]
    fn test_restart_requires_mount() {
        let (mut host, _) = host(PlatformCapability::Headless);
        assert_eq!(host.restart(1), Err(HostError::NotMounted));
    }

    #[test]
    fn test_direction_sampled_each_frame() {
        let (mut host, _, _log) = running_host();
        host.key_down("d");
        let sampled = host.session.as_ref().unwrap().input.direction();
        assert_eq!(sampled, Direction::Right);
    }
}
