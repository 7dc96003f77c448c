use std::cell::RefCell;
use std::fs::{self, File};
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{LevelFilter, error, info, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use simplelog::{Config, WriteLogger};
use torus_snake::config::{
    DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, RoundConfig, default_log_path, load_round_config,
};
use torus_snake::game::{RoundController, RoundSnapshot};
use torus_snake::grid::Grid;
use torus_snake::input::{GameInput, map_key};
use torus_snake::predictor::NearestFoodPredictor;
use torus_snake::recorder::FeatureRecorder;
use torus_snake::renderer::{self, HudInfo};
use torus_snake::snake::INITIAL_LENGTH;

const FRAME_POLL: Duration = Duration::from_millis(16);

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Grid width in cells.
    #[arg(long, default_value_t = DEFAULT_GRID_WIDTH, value_parser = clap::value_parser!(u16).range(1..))]
    width: u16,

    /// Grid height in cells.
    #[arg(long, default_value_t = DEFAULT_GRID_HEIGHT, value_parser = clap::value_parser!(u16).range(1..))]
    height: u16,

    /// JSON round config; command-line flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Let the head pass through the body instead of ending the round.
    #[arg(long = "no-self-collision")]
    no_self_collision: bool,

    /// Steer with the nearest-food predictor instead of the keyboard.
    #[arg(long)]
    autopilot: bool,

    /// Seed for reproducible food placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Append per-tick feature records as JSON lines to this file.
    #[arg(long)]
    record: Option<PathBuf>,

    /// Log file; defaults to the platform data directory.
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if usize::from(cli.width) * usize::from(cli.height) < INITIAL_LENGTH {
        eprintln!(
            "a {}x{} grid is too small, the snake needs {INITIAL_LENGTH} cells",
            cli.width, cli.height
        );
        return ExitCode::FAILURE;
    }

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::FAILURE;
        }
    };

    let log_path = cli.log_file.clone().unwrap_or_else(default_log_path);
    if let Err(error) = init_logging(&log_path, cli.log_level) {
        eprintln!("Logging disabled, cannot open {}: {error}", log_path.display());
    }

    install_panic_hook();

    match run(&cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("terminal failure: {error}");
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<RoundConfig, torus_snake::config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_round_config(path)?,
        None => RoundConfig::default(),
    };
    if cli.no_self_collision {
        config.enable_self_collision = false;
    }
    Ok(config)
}

fn init_logging(path: &Path, level: LevelFilter) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    WriteLogger::init(level, Config::default(), file)
        .map_err(|error| io::Error::new(io::ErrorKind::AlreadyExists, error))
}

fn run(cli: &Cli, config: RoundConfig) -> io::Result<()> {
    let grid = Grid::new(cli.width, cli.height);
    let mut round = match cli.seed {
        Some(seed) => RoundController::new_with_seed(grid, config, seed),
        None => RoundController::new(grid, config),
    };
    if cli.autopilot {
        round.set_autopilot(NearestFoodPredictor);
    }

    let recorder = match &cli.record {
        Some(path) => Some(Rc::new(RefCell::new(FeatureRecorder::create(path)?))),
        None => None,
    };
    if let Some(recorder) = &recorder {
        let sink = Rc::clone(recorder);
        round.set_on_tick(move |snapshot| {
            if let Err(error) = sink
                .borrow_mut()
                .record(snapshot.tick_count, &snapshot.features())
            {
                warn!("dropping feature sample: {error}");
            }
        });
    }

    info!(
        "session on {}x{} grid, autopilot {}",
        grid.width, grid.height, cli.autopilot
    );

    let mut screen = Screen::open()?;
    let clock = Instant::now();
    let mut best_score = 0;

    loop {
        let snapshot = round.snapshot();
        best_score = best_score.max(snapshot.score);
        let hud = HudInfo {
            autopilot: cli.autopilot,
            best_score,
        };
        screen.draw(&snapshot, hud)?;

        if event::poll(FRAME_POLL)? {
            if let Event::Key(key) = event::read()? {
                match map_key(key) {
                    Some(GameInput::Quit) => break,
                    Some(GameInput::Direction(_)) if cli.autopilot => {}
                    Some(input) => round.apply_input(input, clock.elapsed()),
                    None => {}
                }
            }
        }

        round.on_frame(clock.elapsed());
    }

    if let Some(recorder) = recorder {
        let mut recorder = recorder.borrow_mut();
        recorder.flush()?;
        info!("recorded {} feature samples", recorder.samples());
    }

    Ok(())
}

/// Raw-mode alternate screen the round is drawn on; dropping it hands the
/// terminal back to the shell.
struct Screen {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl Screen {
    fn open() -> io::Result<Self> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)
            .and_then(|()| Terminal::new(CrosstermBackend::new(stdout)))
            .map(|terminal| Self { terminal })
            .inspect_err(|_| restore_terminal())
    }

    fn draw(&mut self, snapshot: &RoundSnapshot, hud: HudInfo) -> io::Result<()> {
        self.terminal
            .draw(|frame| renderer::render(frame, snapshot, hud))
            .map(drop)
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        error!("panic: {panic_info}");
        default_hook(panic_info);
    }));
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, Show, LeaveAlternateScreen);
}
