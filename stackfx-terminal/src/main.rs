/// stackfx terminal viewer - exploding burger stack
///
/// Controls:
///   - Mouse drag: Orbit the stack
///   - Mouse wheel / Up/Down: Scroll (assembles past the threshold)
///   - Space/Enter: Toggle assembled/exploded
///   - A/E: Snap assembled/exploded
///   - Q/ESC: Quit
use anyhow::Result;
use clap::Parser;
use stackfx_terminal::{Args, TerminalApp};

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they stay off the alternate screen
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    log::debug!("starting with {:?}", args);

    let mut app = TerminalApp::new(&args)?;
    app.run()?;

    println!("Thanks for stacking!");
    Ok(())
}
