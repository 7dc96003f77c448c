use crate::features::Features;
use crate::input::Direction;

/// Turns a feature record into the next heading for the autopilot.
///
/// The answer is applied like keyboard input, so a predicted reversal is
/// simply ignored by the snake.
pub trait Predictor {
    fn predict(&mut self, features: &Features) -> Direction;
}

impl<F> Predictor for F
where
    F: FnMut(&Features) -> Direction,
{
    fn predict(&mut self, features: &Features) -> Direction {
        self(features)
    }
}

/// Greedy autopilot heading for the neighbour closest to the food.
///
/// Ties go to the first direction in Up, Down, Left, Right order. With no
/// distances at all (no food) it keeps the current heading.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestFoodPredictor;

impl Predictor for NearestFoodPredictor {
    fn predict(&mut self, features: &Features) -> Direction {
        features
            .distances
            .iter()
            .fold(None, |best: Option<(Direction, u32)>, (direction, distance)| match best {
                Some((_, best_distance)) if best_distance <= distance => best,
                _ => Some((direction, distance)),
            })
            .map_or(features.heading, |(direction, _)| direction)
    }
}
