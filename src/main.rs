/*
 *  main.rs
 *
 *  ContribMon - GitHub contribution calendar for RGB LED matrices
 *	(c) 2026 the ContribMon authors
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use env_logger::Env;
use log::{error, info};
use tokio::signal::unix::{signal, SignalKind}; // Import specific Unix signals

use contribmon::config;
use contribmon::display::MockDriver;
use contribmon::input::NoInput;
use contribmon::{ContribMatrix, GithubClient};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Asynchronously waits for a SIGINT, SIGTERM, or SIGHUP signal.
async fn signal_handler() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

async fn shutdown() {
    if let Err(e) = signal_handler().await {
        error!("cannot install signal handlers: {}", e);
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = config::load()?;

    // Initialize the logger with the configured level (--debug forces debug)
    env_logger::Builder::from_env(Env::default().default_filter_or(settings.log_level.as_str()))
        .format_timestamp_secs()
        .init();

    info!("{} - {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_DESCRIPTION"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);
    info!("watching contributions of {}", settings.github.username);

    let source = GithubClient::new(&settings.github)?;
    let (width, height) = (settings.display.width, settings.display.height);

    #[cfg(feature = "emulator")]
    if settings.display.emulated {
        use contribmon::display::drivers::emulator::EmulatorDriver;
        use contribmon::display::emulator_window::{EmulatorWindow, EmulatorWindowConfig};
        use contribmon::input::LatchedInput;

        info!("Emulation mode enabled - {}x{} matrix in a desktop window", width, height);

        let driver = EmulatorDriver::new(width, height);
        let emulator_state = driver.state();
        let buttons = LatchedInput::new();
        let window_config = EmulatorWindowConfig {
            scale: settings.display.scale,
            ..Default::default()
        };

        let mut matrix = ContribMatrix::new(settings, source, Box::new(driver), Box::new(buttons.handle()))?;

        // refresh loop in background, window on main thread (required by winit)
        tokio::spawn(async move {
            matrix.run_until(shutdown()).await;
            std::process::exit(0);
        });

        let window = EmulatorWindow::new(emulator_state, buttons, window_config);
        return window.run();
    }

    #[cfg(not(feature = "emulator"))]
    if settings.display.emulated {
        error!("Emulation mode requested but not compiled with --features emulator");
        return Err("Build with --features emulator to use emulation mode".into());
    }

    // headless: frames go to the recording driver only
    info!("No matrix attached - running headless");
    let driver = MockDriver::new(width, height);
    let mut matrix = ContribMatrix::new(settings, source, Box::new(driver), Box::new(NoInput))?;
    matrix.run_until(shutdown()).await;

    Ok(())
}
