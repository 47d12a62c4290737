use color_eyre::owo_colors::OwoColorize;
use env_logger::Env;
use eyre::Report;
use log::{Level, LevelFilter};
use std::io::Write;

/// Environment variable which overrides the log filter, in `env_logger` syntax (e.g. `aamodels=debug`)
pub const LOG_ENV_VAR: &str = "AAMODELS_LOG";

/// Installs the colored error report handler and a logger printing `[L] target: message`.
///
/// Fails if either was installed before, e.g. by the application embedding this library.
pub fn global_init(filter_level: LevelFilter) -> Result<(), Report> {
  color_eyre::install()?;

  env_logger::Builder::new()
    .filter_level(filter_level)
    .parse_env(Env::new().filter(LOG_ENV_VAR))
    .is_test(cfg!(test))
    .format(|buf, record| {
      let level = match record.level() {
        Level::Error => "E".red().to_string(),
        Level::Warn => "W".yellow().to_string(),
        Level::Info => "I".cyan().to_string(),
        Level::Debug => "D".green().to_string(),
        Level::Trace => "T".dimmed().to_string(),
      };
      writeln!(buf, "[{level}] {}: {}", record.target().dimmed(), record.args())
    })
    .try_init()?;

  Ok(())
}
