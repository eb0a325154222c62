/// Entry point and game loop.

mod ui;

use std::collections::VecDeque;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use escape_grid::config::GameConfig;
use escape_grid::error::ConfigError;
use escape_grid::sim::intent::{Intent, Reason};
use escape_grid::sim::session::GameSession;

use ui::gamepad::GamepadState;
use ui::input::{Command, InputState};
use ui::renderer::Renderer;
use ui::sound::{pick_cue, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

#[derive(Parser, Debug)]
#[command(author, version, about = "Collect every coin before the clock, the moves or the points run out")]
struct Cli {
    /// Config file (default: config.toml next to the executable, then in the CWD)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Board seed; the same seed always builds the same board
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, allow_negative_numbers = true)]
    walls: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    prizes: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    traps: Option<i64>,
    /// Print the generated board as TOML and exit
    #[arg(long)]
    dump_board: bool,
    #[arg(long)]
    no_sound: bool,
}

impl Cli {
    fn load_config(&self) -> Result<GameConfig, ConfigError> {
        let mut config = GameConfig::load(self.config.as_deref())?;
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(n) = self.walls {
            config.board.walls = n;
        }
        if let Some(n) = self.prizes {
            config.board.prizes = n;
        }
        if let Some(n) = self.traps {
            config.board.traps = n;
        }
        // Pin the seed so it can be logged and replayed
        config.seed.get_or_insert_with(rand::random);
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut session = match GameSession::from_config(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.dump_board {
        return match session.snapshot().to_toml() {
            Ok(text) => {
                print!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: cannot serialize board: {e}");
                ExitCode::FAILURE
            }
        };
    }

    if let Err(e) = init_tracing(&config) {
        eprintln!("Warning: cannot open log file {}: {e}", config.log_file.display());
    }
    info!(seed = ?config.seed, walls = config.board.walls, prizes = config.board.prizes, traps = config.board.traps, "starting");

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return ExitCode::FAILURE;
    }

    let sound = if cli.no_sound { None } else { SoundEngine::new() };

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!(error = %e, "game loop failed");
        eprintln!("Game error: {e}");
        return ExitCode::FAILURE;
    }

    let res = session.resources();
    println!();
    println!("Thanks for playing Escape Grid!");
    println!(
        "Final score: {}  ({}, {} steps, seed {})",
        res.score,
        session.summary(),
        session.player().steps,
        config.seed.unwrap_or_default(),
    );
    ExitCode::SUCCESS
}

/// Log to the configured file; the terminal belongs to the UI.
fn init_tracing(config: &GameConfig) -> io::Result<()> {
    let file = File::create(&config.log_file)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .compact()
        .init();
    Ok(())
}

fn game_loop(
    session: &mut GameSession,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> io::Result<()> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new(&config.gamepad);
    if gp.connected {
        info!("gamepad connected");
    }

    let tick_rate = Duration::from_millis(config.timing.tick_ms.max(1));
    let mut last_tick = Instant::now();

    // Keyboard, pad and timer all feed one queue, drained in order
    let mut pending: VecDeque<Intent> = VecDeque::new();
    let mut message = String::new();

    loop {
        kb.drain_events();
        let facing = session.player().facing;
        let mut commands = kb.commands(facing);
        commands.extend(gp.poll(facing));

        for cmd in commands {
            match cmd {
                Command::Quit => return Ok(()),
                Command::Play(intent) => pending.push_back(intent),
            }
        }

        if last_tick.elapsed() >= tick_rate {
            if !session.is_over() {
                pending.push_back(Intent::Tick);
            }
            last_tick = Instant::now();
        }

        while let Some(intent) = pending.pop_front() {
            let outcome = session.apply(intent);

            if let Some(sfx) = sound {
                if let Some(cue) = pick_cue(&outcome.events) {
                    sfx.play(cue);
                }
            }

            match outcome.reason {
                Reason::Moved => message.clear(),
                Reason::Restarted => {
                    last_tick = Instant::now();
                    message = outcome.reason.message().to_string();
                }
                other => {
                    let text = other.message();
                    if !text.is_empty() {
                        message = text.to_string();
                    }
                }
            }
        }

        renderer.render(&session.snapshot(), &message)?;
        std::thread::sleep(FRAME_SLEEP);
    }
}
