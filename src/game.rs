use std::{thread::sleep, time::{Duration, Instant}};

use crate::input::{InputResolver, InputSource};
use crate::render::{draw_state, Canvas};
use crate::state::{GameState, StepOutcome};

use anyhow::Result;
use log::info;
use rand::rngs::StdRng;

/// Monotonic time in seconds since some fixed point.
pub trait Clock {
    fn now(&self) -> f64;
}

pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { start: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Drives frames: clock, input, simulation, drawing, in that order.
pub struct SnakeGame<F: Canvas + InputSource, C: Clock> {
    frontend: F,
    clock: C,
    state: GameState,
    resolver: InputResolver,
    last_frame: f64,
    frame_pause: Duration,
}

impl<F: Canvas + InputSource, C: Clock> SnakeGame<F, C> {
    pub fn new(frontend: F, clock: C, rng: StdRng, frame_pause: Duration) -> Self {
        let last_frame = clock.now();
        SnakeGame {
            frontend,
            clock,
            state: GameState::new(rng),
            resolver: InputResolver::new(),
            last_frame,
            frame_pause,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_frontend(self) -> F {
        self.frontend
    }

    /// Runs until the exit control is seen.
    pub fn play(&mut self) -> Result<()> {
        info!("Game started");
        while self.frame()? {
            sleep(self.frame_pause);
        }
        info!("Exit requested");
        Ok(())
    }

    /// One frame. Returns false once the player asked to leave.
    pub fn frame(&mut self) -> Result<bool> {
        let now = self.clock.now();
        let dt = now - self.last_frame;
        self.last_frame = now;

        let controls = self.frontend.sample()?;
        let intent = self.resolver.resolve(&controls, &mut self.state);
        if intent.exit {
            return Ok(false);
        }

        // A restart this frame already zeroed the accumulator
        if !intent.restarted {
            match self.state.advance(dt) {
                Some(StepOutcome::Moved { ate_fruit: true }) => {
                    info!("Length is now {}", self.state.snake().len());
                }
                Some(StepOutcome::Crashed(_)) => {
                    info!(
                        "Stopped at {:?} heading {:?}",
                        self.state.head(),
                        self.state.committed()
                    );
                }
                _ => {}
            }
        }

        draw_state(&mut self.frontend, &self.state)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Control, ControlState};
    use crate::render::tests::RecordingCanvas;
    use crate::render::{Rgba, FRUIT_COLOR};
    use crate::snake::Direction;
    use crate::{Cell, SPAWN_CELL};

    use rand::SeedableRng;
    use std::cell::Cell as StdCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Clock the test moves by hand.
    #[derive(Clone, Default)]
    struct ManualClock(Rc<StdCell<f64>>);

    impl ManualClock {
        fn advance(&self, secs: f64) {
            self.0.set(self.0.get() + secs);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> f64 {
            self.0.get()
        }
    }

    /// Plays back queued control states, then reports nothing held.
    #[derive(Default)]
    struct ScriptedFrontend {
        canvas: RecordingCanvas,
        script: VecDeque<ControlState>,
    }

    impl InputSource for ScriptedFrontend {
        fn sample(&mut self) -> Result<ControlState> {
            Ok(self.script.pop_front().unwrap_or_default())
        }
    }

    impl Canvas for ScriptedFrontend {
        fn begin_frame(&mut self) {
            self.canvas.begin_frame();
        }

        fn draw_square(&mut self, cell: Cell, scale: f32, color: Rgba) {
            self.canvas.draw_square(cell, scale, color);
        }

        fn set_status(&mut self, text: &str) {
            self.canvas.set_status(text);
        }

        fn present(&mut self) -> Result<()> {
            self.canvas.present()
        }
    }

    fn new_game() -> (SnakeGame<ScriptedFrontend, ManualClock>, ManualClock) {
        let clock = ManualClock::default();
        let game = SnakeGame::new(
            ScriptedFrontend::default(),
            clock.clone(),
            StdRng::seed_from_u64(11),
            Duration::from_millis(0),
        );
        (game, clock)
    }

    fn press(game: &mut SnakeGame<ScriptedFrontend, ManualClock>, control: Control) {
        game.frontend.script.push_back(ControlState::default().with(control));
    }

    #[test]
    fn test_steps_once_per_interval() {
        let (mut game, clock) = new_game();
        press(&mut game, Control::Right);

        clock.advance(0.05);
        assert!(game.frame().unwrap());
        assert_eq!(game.state().head(), SPAWN_CELL);
        assert_eq!(game.state().requested(), Direction::Right);

        clock.advance(0.06);
        game.frame().unwrap();
        assert_eq!(game.state().head(), SPAWN_CELL.moved(Direction::Right));

        clock.advance(0.02);
        game.frame().unwrap();
        assert_eq!(game.state().head(), SPAWN_CELL.moved(Direction::Right));
        assert_eq!(game.frontend.canvas.frames, 3);
    }

    #[test]
    fn test_exit_stops_the_loop() {
        let (mut game, _clock) = new_game();
        press(&mut game, Control::Exit);
        game.play().unwrap();
        assert_eq!(game.frontend.canvas.frames, 0);

        press(&mut game, Control::Exit);
        assert!(!game.frame().unwrap());
    }

    #[test]
    fn test_restart_through_input() {
        let (mut game, clock) = new_game();
        press(&mut game, Control::Down);
        for _ in 0..12 {
            clock.advance(0.125);
            game.frame().unwrap();
        }
        assert!(game.state().is_game_over());
        assert!(game.frontend.canvas.squares.iter().all(|(_, _, c)| *c != FRUIT_COLOR));

        press(&mut game, Control::Restart);
        clock.advance(0.125);
        game.frame().unwrap();
        assert!(!game.state().is_game_over());
        assert_eq!(game.state().snake().body(), &[SPAWN_CELL]);
        assert_eq!(game.state().elapsed(), 0.0);
        assert!(game.frontend.canvas.squares.iter().any(|(_, _, c)| *c == FRUIT_COLOR));
    }
}
