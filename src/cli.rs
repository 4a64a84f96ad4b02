use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Clone)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Enable verbose logging (-v for debug, -vv for trace)"
    )]
    pub verbose: u8,

    /// Path to the YAML configuration file
    #[arg(
        short = 'c',
        long = "config",
        value_name = "CONFIG_PATH",
        default_value = "config.yaml",
        help = "Configuration file path"
    )]
    pub config_path: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Command {
    /// Serve the rental price prediction API
    #[default]
    Serve,
    /// Serve the rental delay analytics
    Dashboard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serving_predictions() {
        let cli = Cli::parse_from(["getaround_pricing"]);
        assert_eq!(cli.command.unwrap_or_default(), Command::Serve);
        assert_eq!(cli.config_path, PathBuf::from("config.yaml"));
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn parses_dashboard_subcommand() {
        let cli = Cli::parse_from(["getaround_pricing", "-vv", "-c", "alt.yaml", "dashboard"]);
        assert_eq!(cli.command, Some(Command::Dashboard));
        assert_eq!(cli.config_path, PathBuf::from("alt.yaml"));
        assert_eq!(cli.verbose, 2);
    }
}
