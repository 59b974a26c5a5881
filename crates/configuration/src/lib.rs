use std::path::Path;

use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    LoggingSettings, ReportSettings, Settings, SimulationOverrides, SimulationSettings,
};

/// Prefix for environment overrides, e.g. `OTRISK__SIMULATION__TRIALS=500`.
pub const ENV_PREFIX: &str = "OTRISK";

/// Loads the application configuration.
///
/// Values are layered: built-in defaults, then the TOML file (the given `path`, or an
/// optional `otrisk.toml` in the working directory), then `OTRISK__*` environment
/// variables. The result is not validated here: callers apply their command-line
/// overrides first and then call [`Settings::validate`] on the sections they use.
pub fn load_config(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("otrisk").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;

    Ok(settings)
}
