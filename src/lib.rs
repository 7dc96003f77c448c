//! Snake on a toroidal grid: a segment-chain simulation engine, a round
//! controller with tick throttling and food placement, a feature record for
//! autopilot predictors, and a ratatui front end.

pub mod chain;
pub mod config;
pub mod features;
pub mod food;
pub mod game;
pub mod grid;
pub mod input;
pub mod predictor;
pub mod recorder;
pub mod renderer;
pub mod snake;
