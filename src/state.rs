use crate::{Cell, FRUIT_START, MOVE_INTERVAL, SPAWN_CELL};
use crate::snake::{Snake, Direction::{self, *}};

use log::{debug, info};
use rand::{rngs::StdRng, Rng};

/// What stopped the snake.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Crash {
    Wall,
    Body,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Moved { ate_fruit: bool },
    Crashed(Crash),
}

/// Everything the simulation owns: the snake, the fruit, both headings, the
/// game-over flag and the time accumulated towards the next step.
pub struct GameState {
    snake: Snake,
    fruit: Cell,
    requested: Direction,
    committed: Direction,
    game_over: bool,
    elapsed: f64,
    rng: StdRng,
}

impl GameState {
    pub fn new(rng: StdRng) -> Self {
        GameState {
            snake: Snake::new(SPAWN_CELL),
            fruit: FRUIT_START,
            requested: Stationary,
            committed: Stationary,
            game_over: false,
            elapsed: 0.0,
            rng,
        }
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn head(&self) -> Cell {
        self.snake.head()
    }

    pub fn fruit(&self) -> Cell {
        self.fruit
    }

    #[cfg(test)]
    pub fn requested(&self) -> Direction {
        self.requested
    }

    pub fn committed(&self) -> Direction {
        self.committed
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    #[cfg(test)]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Overwrites the pending heading. Only the last request before a step
    /// counts.
    pub fn request(&mut self, direction: Direction) {
        self.requested = direction;
    }

    pub fn restart(&mut self) {
        self.snake.reset(SPAWN_CELL);
        self.fruit = FRUIT_START;
        self.requested = Stationary;
        self.committed = Stationary;
        self.elapsed = 0.0;
        self.game_over = false;
    }

    /// Adds `dt` seconds to the accumulator and runs at most one step once the
    /// movement interval has been reached. Nothing steps after a crash.
    pub fn advance(&mut self, dt: f64) -> Option<StepOutcome> {
        self.elapsed += dt;

        if self.game_over || self.elapsed < MOVE_INTERVAL {
            return None;
        }

        self.elapsed = 0.0;
        Some(self.step())
    }

    /// One discrete move, regardless of the accumulator.
    pub fn step(&mut self) -> StepOutcome {
        if self.requested.is_opposite(self.committed) {
            self.requested = self.committed;
        }
        self.committed = self.requested;

        let old_head = self.snake.head();
        let new_head = old_head.moved(self.committed);
        self.snake.set_head(new_head);

        if !new_head.in_bounds() {
            return self.crash(old_head, Crash::Wall);
        }

        if self.snake.hits_body(new_head) {
            return self.crash(old_head, Crash::Body);
        }

        let ate_fruit = new_head == self.fruit;
        if ate_fruit {
            self.respawn_fruit();
            debug!("Fruit eaten at {:?}, next one at {:?}", new_head, self.fruit);
        }

        self.snake.drag_body(old_head, ate_fruit);
        StepOutcome::Moved { ate_fruit }
    }

    fn crash(&mut self, old_head: Cell, cause: Crash) -> StepOutcome {
        self.snake.set_head(old_head);
        self.game_over = true;
        info!("Game over ({:?}) with length {}", cause, self.snake.len());
        StepOutcome::Crashed(cause)
    }

    /// Picks a new fruit cell in [-10, 9] on both axes. Only the previous fruit
    /// cell is excluded; the snake may be sitting on the new one.
    fn respawn_fruit(&mut self) {
        let previous = self.fruit;
        loop {
            let x = self.rng.gen_range(-10..10);
            let y = self.rng.gen_range(-10..10);
            let cell = Cell::new(x, y);
            if cell != previous {
                self.fruit = cell;
                return;
            }
        }
    }
}
