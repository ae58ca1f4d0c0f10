use glquad::{AppConfig, AppError, Engine, GlutinPlatform, CONFIG_FILE};
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = AppConfig::load_or_default(Path::new(CONFIG_FILE));
    let level = config
        .as_ref()
        .map(|config| config.log_level)
        .unwrap_or(LevelFilter::Info);
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("Failed to initialise logger: {e}");
    }

    let result = config
        .map_err(AppError::from)
        .and_then(|config| Engine::new(config).run(&mut GlutinPlatform::new()));

    match result {
        Ok(stats) => {
            info!("Closed normally after {} frames", stats.frames);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            e.into()
        }
    }
}
