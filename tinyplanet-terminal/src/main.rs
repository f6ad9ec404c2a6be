/// Tiny Planet Terminal Demo
///
/// Renders a synthetic panorama as a tiny planet in the terminal.
/// Usage: tinyplanet-terminal [mode=fit|crop|full] [texture=WxH] [plane=WxH] [rotation=X,Y,Z]
/// Controls:
///   - P: Toggle tiny planet / spherical perspective
///   - 1/2/3: Full / Crop / Fit scale mode
///   - WASD / Arrow Keys: Pan (perspective only)
///   - Q/ESC: Quit

use std::env;
use std::io;
use tinyplanet_core::PlanetConfig;
use tinyplanet_terminal::{to_io_error, TerminalApp};

fn main() -> io::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = PlanetConfig::parse(&args.join(" ")).map_err(to_io_error)?;
    log::info!("starting with {config:?}");

    println!("Tiny Planet Terminal Renderer - Loading...");
    let mut app = TerminalApp::new(config)?;

    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    app.run()?;

    println!("Thank you for using Tiny Planet Terminal Renderer!");
    Ok(())
}
