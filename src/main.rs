//! Pet Dodge entry point
//!
//! The browser build is driven from JS through `PetDodgeGame`. Natively this
//! runs a headless autopilot round and prints the result.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use pet_dodge::renderer::{Frame, svg_icon};
    use pet_dodge::{
        Direction, GameHost, GameState, HighScores, ObstacleKind, PlatformCapability, Settings, Surface, Viewport,
    };

    /// Simulated frame length (ms)
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after this much simulated time
    const MAX_SECONDS: f64 = 300.0;

    /// Counts frames instead of drawing them
    #[derive(Default)]
    struct NullSurface {
        frames: Rc<Cell<u64>>,
        commands: Rc<Cell<u64>>,
    }

    impl Surface for NullSurface {
        type Sprite = ();

        fn set_sprite(&mut self, _sprite: ()) {}

        fn resize(&mut self, viewport: Viewport) {
            log::debug!("Viewport scale {:.2}", viewport.scale);
        }

        fn present(&mut self, frame: &Frame) {
            self.frames.set(self.frames.get() + 1);
            self.commands.set(self.commands.get() + frame.len() as u64);
        }

        fn release(&mut self) {}
    }

    /// Step away from the closest obstacle that will reach the player's row
    fn steer(state: &GameState) -> Direction {
        let player = &state.player;
        let threat = state
            .obstacles
            .iter()
            .filter(|o| o.pos.y < player.pos.y + player.radius)
            .filter(|o| (o.pos.x - player.pos.x).abs() < o.radius + player.radius + 12.0)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

        let Some(threat) = threat else {
            return Direction::None;
        };
        let (min_x, max_x) = player.x_bounds();
        let go_left = if player.pos.x - min_x < threat.radius * 2.0 {
            false
        } else if max_x - player.pos.x < threat.radius * 2.0 {
            true
        } else {
            threat.pos.x >= player.pos.x
        };
        if go_left { Direction::Left } else { Direction::Right }
    }

    fn key_for(direction: Direction) -> Option<&'static str> {
        match direction {
            Direction::Left => Some("ArrowLeft"),
            Direction::Right => Some("ArrowRight"),
            Direction::None => None,
        }
    }

    pub fn run() {
        let seed = std::env::args()
            .nth(1)
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(42);
        log::info!("Pet Dodge (native) headless run, seed {}", seed);

        for kind in ObstacleKind::ALL {
            log::debug!("{} icon: {}", kind.as_str(), svg_icon(kind, 40.0));
        }

        let final_score = Rc::new(RefCell::new(None));
        let sink = final_score.clone();
        let mut host = GameHost::new(
            Settings::load(),
            PlatformCapability::detect(),
            Box::new(move |score| {
                *sink.borrow_mut() = Some(score);
                Ok(())
            }),
        );
        host.resize(1280.0, 720.0, 1.0);

        let surface = NullSurface::default();
        let frames = surface.frames.clone();
        let commands = surface.commands.clone();

        let id = match host.mount(surface, seed) {
            Ok(id) => id,
            Err(e) => {
                log::error!("Cannot start: {}", e);
                return;
            }
        };
        host.assets_ready(id, Ok(()));

        let mut held: Option<&'static str> = None;
        let mut now = 0.0;
        while now < MAX_SECONDS * 1000.0 {
            let wanted = host.state().map(steer).and_then(key_for);
            if wanted != held {
                if let Some(key) = held {
                    host.key_up(key);
                }
                if let Some(key) = wanted {
                    host.key_down(key);
                }
                held = wanted;
            }

            if !host.frame(now) {
                break;
            }
            now += FRAME_MS;
        }

        let score = (*final_score.borrow()).or(host.score()).unwrap_or(0);
        host.unmount();

        let mut board = HighScores::load();
        let rank = board.add_score(score, None, now);

        println!("Survived {:.1}s", now / 1000.0);
        println!("Score: {}", score);
        println!("Frames: {} ({} draw commands)", frames.get(), commands.get());
        if let Some(rank) = rank {
            println!("Rank on this device: #{}", rank);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `PetDodgeGame`, this is just to satisfy the compiler
}
