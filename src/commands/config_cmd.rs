use crate::config::{Config, ResolvedConfig};
use crate::error::Result;
use crate::output::Printer;
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the current resolved configuration
    #[command(long_about = "Display the configuration with resolved values.\n\n\
        Shows values from all sources (CLI flags > env vars > config file > defaults).\n\n\
        Example:\n\
        pub config show")]
    Show,
    /// Set a config value (api_version, host, format)
    #[command(long_about = "Persist a configuration value to the config file.\n\n\
        Valid keys:\n\
          api_version   Cloud Partner Portal API version (default 2017-10-31)\n\
          host          API host (default https://cloudpartner.azure.com/)\n\
          format        Default output format: json, table, plain\n\n\
        Examples:\n\
        pub config set api_version 2017-10-31\n\
        pub config set format table")]
    Set {
        /// Config key to set
        key: String,
        /// Value to set
        value: String,
    },
    /// Show the config file path
    #[command(long_about = "Print the path to the config file.\n\n\
        Default: ~/.pub/config.json, or the value of --config.\n\n\
        Example:\n\
        pub config path")]
    Path,
}

pub fn handle(cmd: ConfigCommand, resolved: &ResolvedConfig, printer: &dyn Printer) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let display = serde_json::json!({
                "api_version": resolved.api_version,
                "host": resolved.host,
                "format": resolved.format,
                "config_file": resolved.path.to_string_lossy(),
            });
            printer.print(&display)?;
        }
        ConfigCommand::Set { key, value } => {
            let mut cfg = Config::load(&resolved.path)?;
            cfg.set(&key, value)?;
            cfg.save(&resolved.path)?;
            printer.success(&format!("Config '{key}' saved"));
        }
        ConfigCommand::Path => {
            println!("{}", resolved.path.to_string_lossy());
        }
    }
    Ok(())
}
