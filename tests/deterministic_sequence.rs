use std::time::Duration;

use torus_snake::chain::Role;
use torus_snake::config::RoundConfig;
use torus_snake::food::Food;
use torus_snake::game::{RoundController, RoundStatus, StopReason};
use torus_snake::grid::{Grid, Position};
use torus_snake::input::{Direction, GameInput};
use torus_snake::snake::Snake;

fn started(config: RoundConfig, seed: u64) -> RoundController {
    let mut round = RoundController::new_with_seed(Grid::new(11, 11), config, seed);
    round.start(Duration::ZERO);
    round
}

#[test]
fn reset_move_and_rejected_reversal() {
    let mut round = started(RoundConfig::default(), 42);
    round.set_food(Some(Food::new(Position::new(0, 0))));

    let views = round.snapshot().segments;
    let positions: Vec<Position> = views.iter().map(|view| view.position).collect();
    assert_eq!(
        positions,
        vec![Position::new(5, 5), Position::new(5, 6), Position::new(5, 7)]
    );
    assert_eq!(views[0].role, Role::Head);
    assert_eq!(views[1].role, Role::Body);
    assert_eq!(views[2].role, Role::Tail);

    round.step();
    assert_eq!(round.snake().head(), Position::new(5, 4));

    assert!(!round.snake_mut().move_down(Grid::new(11, 11)));
    assert_eq!(round.snake().heading(), Direction::Up);
    assert_eq!(round.distances().down, None);
}

#[test]
fn stepwise_food_collection_and_delayed_growth() {
    let mut round = started(RoundConfig::default(), 7);
    round.set_food(Some(Food::new(Position::new(5, 4))));

    round.step();
    assert_eq!(round.score(), 1);
    assert_eq!(round.snake().len(), 3);
    let food = round.food().expect("food respawns after being eaten");
    assert!(!round.snake().occupies(food.position));
    assert!(![Position::new(5, 4), Position::new(5, 5), Position::new(5, 6)]
        .contains(&food.position));

    round.set_food(Some(Food::new(Position::new(0, 0))));
    round.apply_input(GameInput::Direction(Direction::Left), Duration::ZERO);
    round.step();
    assert_eq!(round.snake().len(), 4);
    assert_eq!(round.snake().head(), Position::new(4, 4));
    assert_eq!(round.snake().tail(), Position::new(5, 6));
    assert!(round.is_running());
}

#[test]
fn chain_keeps_one_head_and_one_tail_through_a_long_run() {
    let mut round = started(
        RoundConfig {
            enable_self_collision: false,
            ..RoundConfig::default()
        },
        3,
    );
    let grid = round.grid();
    let turns = [Direction::Left, Direction::Down, Direction::Right, Direction::Up];

    for tick in 0..400 {
        if tick % 7 == 0 {
            round.snake_mut().set_heading(turns[(tick / 7) % turns.len()], grid);
        }
        let length_before = round.snake().len();
        let staged = matches!(
            round.snake().growth(),
            torus_snake::snake::Growth::Staged { .. }
        );

        round.step();

        let expected = if staged { length_before + 1 } else { length_before };
        assert_eq!(round.snake().len(), expected);
        assert!(round.snake().chain().check_invariants().is_ok());

        let segments = round.snapshot().segments;
        let heads = segments
            .iter()
            .filter(|view| matches!(view.role, Role::Head | Role::Single))
            .count();
        let tails = segments
            .iter()
            .filter(|view| matches!(view.role, Role::Tail | Role::Single))
            .count();
        assert_eq!((heads, tails), (1, 1));
        assert!(segments.iter().all(|view| view.position.is_within(grid)));

        if let Some(food) = round.food() {
            assert!(!round.snake().occupies(food.position));
        }
    }

    assert!(round.is_running());
}

#[test]
fn passing_through_body_without_self_collision() {
    let mut round = started(
        RoundConfig {
            enable_self_collision: false,
            ..RoundConfig::default()
        },
        9,
    );
    *round.snake_mut() = Snake::from_segments(
        &[
            Position::new(5, 5),
            Position::new(4, 5),
            Position::new(4, 6),
            Position::new(5, 6),
            Position::new(6, 6),
        ],
        Direction::Down,
    );
    round.set_food(Some(Food::new(Position::new(0, 0))));

    round.step();
    assert!(round.snake().head_overlaps_body());
    assert_eq!(round.status(), RoundStatus::Running);

    round.step();
    assert_eq!(round.status(), RoundStatus::Running);
}

#[test]
fn wrap_around_edges_while_running() {
    let mut round = started(RoundConfig::default(), 11);
    round.set_food(Some(Food::new(Position::new(9, 9))));
    for _ in 0..6 {
        round.step();
    }
    assert_eq!(round.snake().head(), Position::new(5, 10));

    let grid = round.grid();
    assert!(round.snake_mut().move_right(grid));
    for _ in 0..6 {
        round.step();
    }
    assert_eq!(round.snake().head(), Position::new(0, 10));
    assert!(round.is_running());
}

#[test]
fn autopilot_reaches_food() {
    let mut round = started(RoundConfig::default(), 5);
    round.set_autopilot(torus_snake::predictor::NearestFoodPredictor);
    round.set_food(Some(Food::new(Position::new(2, 8))));

    for _ in 0..20 {
        round.step();
        if round.score() > 0 {
            break;
        }
    }

    assert_eq!(round.score(), 1);
    assert_ne!(round.status(), RoundStatus::Stopped(StopReason::SelfCollision));
}
