//! Emberfall terminal client.

mod app;
mod input;

use std::io;

use clap::Parser;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use ef_core::world::save::{default_save_path, load_game};
use ef_core::{GameLoop, SimulationState};

use app::App;

#[derive(Parser)]
#[command(name = "emberfall", about = "A turn-based dungeon crawl")]
struct Args {
    /// Character name.
    #[arg(short, long, default_value = "Wanderer")]
    name: String,

    /// RNG seed; random when omitted.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Resume from the saved game instead of starting fresh.
    #[arg(short, long)]
    load: bool,

    /// Wizard (debug) mode.
    #[arg(short, long)]
    wizard: bool,
}

fn build_state(args: &Args) -> Result<SimulationState, Box<dyn std::error::Error>> {
    let save_path = default_save_path(&args.name)?;

    let mut state = if args.load && save_path.exists() {
        load_game(&save_path)?
    } else {
        let seed = args.seed.unwrap_or_else(rand_seed);
        let mut state = SimulationState::new(args.name.clone(), seed);
        state.message("Welcome to Emberfall!");
        state
    };

    state.options.wizard = args.wizard;
    state.save_path = Some(save_path);
    Ok(state)
}

fn rand_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let state = build_state(&args)?;

    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let mut game = GameLoop::new(state, App::new(terminal));
    game.run();

    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;

    if game.state.player.is_dead {
        println!(
            "{} died on turn {}.",
            game.state.player.name,
            game.state.clock.turn()
        );
    } else {
        println!("Farewell, {}.", game.state.player.name);
    }
    Ok(())
}
