use anyhow::{Context, Result};
use simple_logger::{set_up_color_terminal, SimpleLogger};

/// Installs the global logger. `tracing` events are forwarded to it through `log-always`.
pub fn init() -> Result<()> {
    set_up_color_terminal();
    let logger = SimpleLogger::new();
    logger.init().context("Failed to install logger")?;
    Ok(())
}
