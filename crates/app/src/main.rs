//! `hdrive-sim [config.json]`
//!
//! Runs the demo routine on a simulated H-drive and logs where every wheel
//! ended up. Without a config file the built-in robot description is used.

mod config;
mod error;
mod routine;

use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use crate::config::RobotConfig;
use crate::error::AppError;

fn main() -> Result<(), AppError> {
    let config = match std::env::args().nth(1) {
        Some(path) => RobotConfig::load(&path)?,
        None => RobotConfig::default(),
    };

    let level: LevelFilter = config
        .log_level
        .parse()
        .map_err(|_| AppError::LogLevel(config.log_level.clone()))?;
    TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)?;

    info!(
        "H-drive: track {} in, wheels {} in, gear ratio {}",
        config.geometry.track_width, config.geometry.wheel_radius, config.geometry.gear_ratio
    );

    let mut drive = routine::build_drive(&config)?;
    let outcomes = routine::run(&mut drive)?;
    info!("routine finished: {:?}", outcomes);
    Ok(())
}
