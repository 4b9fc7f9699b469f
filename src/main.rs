use canvas_arc::arc::{DEFAULT_END_ANGLE, DEFAULT_START_ANGLE};
use canvas_arc::{terminal, AngleState, Direction, Result};
use clap::Parser;
use log::info;
use std::io;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Initial start angle in radians
    #[arg(short, long, default_value_t = DEFAULT_START_ANGLE, allow_negative_numbers = true)]
    start: f64,

    /// Initial end angle in radians
    #[arg(short, long, default_value_t = DEFAULT_END_ANGLE, allow_negative_numbers = true)]
    end: f64,

    /// Initial anticlockwise flag: true, false or undefined
    #[arg(short, long, default_value_t = Direction::Unspecified)]
    direction: Direction,

    /// Preview in the terminal instead of opening a window
    #[arg(short, long)]
    terminal: bool,

    /// Print the arc() call and exit
    #[arg(short, long, conflicts_with = "terminal")]
    print: bool,
}

/// Main function
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let state = AngleState::new(args.start, args.end, args.direction);
    info!("starting with {:?}", state);

    if args.print {
        let mut stdout = io::stdout();
        terminal::print_readout(&mut stdout, &state)?;
        println!();
        return Ok(());
    }

    if args.terminal {
        return terminal::run(state);
    }

    run_window(state)
}

#[cfg(feature = "gui")]
fn run_window(state: AngleState) -> Result<()> {
    canvas_arc::widget::launch(state)
}

#[cfg(not(feature = "gui"))]
fn run_window(state: AngleState) -> Result<()> {
    log::warn!("built without the gui feature, falling back to the terminal preview");
    terminal::run(state)
}
