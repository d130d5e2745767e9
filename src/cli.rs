//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

/// File name of the network settings looked up next to the executable.
pub const DEFAULT_SETTINGS_FILE: &str = "protocol.testnet.json";

#[derive(Debug, Parser)]
#[command(
    name = "chain-gateway",
    version,
    about = "Authenticated JSON gateway for a blockchain node"
)]
pub struct Cli {
    /// Network settings file (default: protocol.testnet.json next to the executable)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// The settings path given on the command line, or the default one.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }
}

/// `protocol.testnet.json` in the directory holding the executable, or in
/// the working directory when the executable path cannot be resolved.
pub fn default_config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_default()
        .join(DEFAULT_SETTINGS_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_flag() {
        let cli = Cli::parse_from(["chain-gateway", "-c", "/etc/privnet.json"]);
        assert_eq!(cli.config_path(), PathBuf::from("/etc/privnet.json"));
    }

    #[test]
    fn test_long_flag() {
        let cli = Cli::parse_from(["chain-gateway", "--config", "net.json"]);
        assert_eq!(cli.config, Some(PathBuf::from("net.json")));
    }

    #[test]
    fn test_default_path_points_at_settings_file() {
        let cli = Cli::parse_from(["chain-gateway"]);
        let path = cli.config_path();
        assert!(path.ends_with(DEFAULT_SETTINGS_FILE));
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["chain-gateway", "--nope"]).is_err());
    }
}
