use std::fmt;
use std::time::Duration;

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::chain::SegmentView;
use crate::config::RoundConfig;
use crate::features::{Distances, Features};
use crate::food::Food;
use crate::grid::{Grid, Position};
use crate::input::{Direction, GameInput};
use crate::predictor::Predictor;
use crate::snake::Snake;

/// Why a round left the running state.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StopReason {
    Requested,
    SelfCollision,
    /// The snake covers every cell; nowhere is left for food.
    BoardFull,
}

/// Round lifecycle: `Idle -> Running -> Stopped`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RoundStatus {
    Idle,
    Running,
    Stopped(StopReason),
}

/// Immutable picture of the round after a committed tick.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSnapshot {
    pub grid: Grid,
    pub segments: Vec<SegmentView>,
    pub food: Option<Position>,
    pub score: u32,
    pub speed: Duration,
    pub distances: Distances,
    pub heading: Direction,
    pub status: RoundStatus,
    pub tick_count: u64,
}

impl RoundSnapshot {
    /// Feature record as seen by predictors at this tick.
    #[must_use]
    pub fn features(&self) -> Features {
        Features {
            distances: self.distances,
            heading: self.heading,
            score: self.score,
        }
    }
}

/// Callback fired after every committed tick.
pub type TickCallback = Box<dyn FnMut(&RoundSnapshot)>;

/// Drives one game: owns the snake, food, score and tick timing.
pub struct RoundController {
    grid: Grid,
    config: RoundConfig,
    snake: Snake,
    food: Option<Food>,
    score: u32,
    speed: Duration,
    distances: Distances,
    status: RoundStatus,
    tick_count: u64,
    last_step_at: Duration,
    rng: StdRng,
    on_tick: Option<TickCallback>,
    autopilot: Option<Box<dyn Predictor>>,
}

impl fmt::Debug for RoundController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoundController")
            .field("grid", &self.grid)
            .field("config", &self.config)
            .field("snake", &self.snake)
            .field("food", &self.food)
            .field("score", &self.score)
            .field("speed", &self.speed)
            .field("status", &self.status)
            .field("tick_count", &self.tick_count)
            .field("autopilot", &self.autopilot.is_some())
            .finish_non_exhaustive()
    }
}

impl RoundController {
    /// Creates an idle round seeded from OS entropy.
    #[must_use]
    pub fn new(grid: Grid, config: RoundConfig) -> Self {
        Self::with_rng(grid, config, StdRng::from_entropy())
    }

    /// Creates a deterministic round for tests and reproducible simulations.
    #[must_use]
    pub fn new_with_seed(grid: Grid, config: RoundConfig, seed: u64) -> Self {
        Self::with_rng(grid, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(grid: Grid, config: RoundConfig, rng: StdRng) -> Self {
        Self {
            grid,
            config,
            snake: Snake::new(grid),
            food: None,
            score: 0,
            speed: config.initial_speed(),
            distances: Distances::default(),
            status: RoundStatus::Idle,
            tick_count: 0,
            last_step_at: Duration::ZERO,
            rng,
            on_tick: None,
            autopilot: None,
        }
    }

    /// Registers the callback fired after every committed tick.
    pub fn set_on_tick(&mut self, callback: impl FnMut(&RoundSnapshot) + 'static) {
        self.on_tick = Some(Box::new(callback));
    }

    /// Hands steering to `predictor`, consulted after every committed tick.
    pub fn set_autopilot(&mut self, predictor: impl Predictor + 'static) {
        self.autopilot = Some(Box::new(predictor));
    }

    pub fn clear_autopilot(&mut self) {
        self.autopilot = None;
    }

    /// Enters the running state, resetting first if a previous round ended.
    ///
    /// `now` is the frame timestamp the tick throttle measures from.
    pub fn start(&mut self, now: Duration) {
        match self.status {
            RoundStatus::Running => return,
            RoundStatus::Stopped(_) => self.reset(),
            RoundStatus::Idle => {}
        }

        if self.food.is_none() && !self.place_food() {
            self.status = RoundStatus::Stopped(StopReason::BoardFull);
            return;
        }

        self.refresh_distances();
        self.last_step_at = now;
        self.status = RoundStatus::Running;
        info!(
            "round started on {}x{} grid, self collision {}",
            self.grid.width,
            self.grid.height,
            if self.config.enable_self_collision {
                "on"
            } else {
                "off"
            }
        );
    }

    /// Stops a running round; no-op otherwise.
    pub fn stop(&mut self) {
        if self.status == RoundStatus::Running {
            self.halt(StopReason::Requested);
        }
    }

    /// Feeds one frame timestamp; steps when more than one interval has
    /// passed since the last step. Returns whether a step ran.
    pub fn on_frame(&mut self, now: Duration) -> bool {
        if self.status != RoundStatus::Running {
            return false;
        }
        if now.saturating_sub(self.last_step_at) <= self.speed {
            return false;
        }

        self.last_step_at = now;
        self.step();
        true
    }

    /// Runs one simulation step unconditionally (if running).
    pub fn step(&mut self) {
        if self.status != RoundStatus::Running {
            return;
        }

        self.tick_count += 1;
        self.snake.move_forward(self.grid);
        if let Err(error) = self.snake.chain().check_invariants() {
            panic!("segment chain corrupted after move: {error}");
        }

        self.refresh_distances();
        self.check_food_collision();
        if self.status == RoundStatus::Running {
            self.check_self_collision();
        }

        self.emit();
    }

    /// Applies one external input event.
    pub fn apply_input(&mut self, input: GameInput, now: Duration) {
        match input {
            GameInput::Direction(direction) => {
                self.snake.set_heading(direction, self.grid);
            }
            GameInput::Start => self.start(now),
            GameInput::Stop => self.stop(),
            GameInput::Toggle if self.is_running() => self.stop(),
            GameInput::Toggle => self.start(now),
            GameInput::Quit => {}
        }
    }

    /// Current feature record for predictors.
    #[must_use]
    pub fn features(&self) -> Features {
        Features {
            distances: self.distances,
            heading: self.snake.heading(),
            score: self.score,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            grid: self.grid,
            segments: self.snake.views(self.grid),
            food: self.food.map(|food| food.position),
            score: self.score,
            speed: self.speed,
            distances: self.distances,
            heading: self.snake.heading(),
            status: self.status,
            tick_count: self.tick_count,
        }
    }

    #[must_use]
    pub fn grid(&self) -> Grid {
        self.grid
    }

    #[must_use]
    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn snake_mut(&mut self) -> &mut Snake {
        &mut self.snake
    }

    #[must_use]
    pub fn food(&self) -> Option<Food> {
        self.food
    }

    /// Replaces the food; `None` clears it.
    ///
    /// # Panics
    ///
    /// Panics when the food would sit on the snake.
    pub fn set_food(&mut self, food: Option<Food>) {
        if let Some(food) = food {
            assert!(
                !self.snake.occupies(food.position),
                "food placed on the snake at {:?}",
                food.position
            );
        }
        self.food = food;
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn speed(&self) -> Duration {
        self.speed
    }

    #[must_use]
    pub fn distances(&self) -> Distances {
        self.distances
    }

    #[must_use]
    pub fn status(&self) -> RoundStatus {
        self.status
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == RoundStatus::Running
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    fn reset(&mut self) {
        self.snake.reset(self.grid);
        self.food = None;
        self.score = 0;
        self.speed = self.config.initial_speed();
        self.distances = Distances::default();
        self.tick_count = 0;
        self.status = RoundStatus::Idle;
    }

    fn refresh_distances(&mut self) {
        self.distances = match self.food {
            Some(food) => Distances::compute(
                self.snake.head(),
                food.position,
                self.snake.heading(),
                self.grid,
            ),
            None => Distances::default(),
        };
    }

    fn check_food_collision(&mut self) {
        let Some(food) = self.food else {
            return;
        };
        if self.snake.head() != food.position {
            return;
        }

        self.food = None;
        self.score += 1;
        self.snake.prepare_growth();
        self.speed = self.config.accelerate(self.speed);
        debug!(
            "food eaten at {:?}, score {}, interval {:?}",
            food.position, self.score, self.speed
        );

        if !self.place_food() {
            self.halt(StopReason::BoardFull);
        }
    }

    fn check_self_collision(&mut self) {
        if self.config.enable_self_collision && self.snake.head_overlaps_body() {
            self.halt(StopReason::SelfCollision);
        }
    }

    /// Spawns food on a free cell; false when the board is full.
    fn place_food(&mut self) -> bool {
        let Some(food) = Food::spawn(&mut self.rng, self.grid, &self.snake) else {
            return false;
        };
        self.set_food(Some(food));
        debug!("food placed at {:?}", food.position);
        true
    }

    fn halt(&mut self, reason: StopReason) {
        self.status = RoundStatus::Stopped(reason);
        info!(
            "round stopped ({reason:?}) after {} ticks with score {}",
            self.tick_count, self.score
        );
    }

    fn emit(&mut self) {
        if self.on_tick.is_some() {
            let snapshot = self.snapshot();
            if let Some(callback) = self.on_tick.as_mut() {
                callback(&snapshot);
            }
        }

        if self.status != RoundStatus::Running {
            return;
        }
        let features = self.features();
        if let Some(predictor) = self.autopilot.as_mut() {
            let direction = predictor.predict(&features);
            self.snake.set_heading(direction, self.grid);
        }
    }
}
