//! Server configuration

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "sqlmap-gate")]
#[command(about = "Educational web front end for sqlmap against whitelisted targets")]
#[command(version)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "SG_BIND", default_value = "0.0.0.0:8080")]
    pub bind: String,

    /// Gate configuration file (TOML); built-in lab targets when omitted
    #[arg(short, long, env = "SG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for the log file
    #[arg(long, env = "SG_LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    /// Requests per minute per client on ordinary routes
    #[arg(long, env = "SG_DEFAULT_PER_MINUTE", default_value_t = 20)]
    pub default_per_minute: u32,

    /// Requests per minute per client on /run_sqlmap
    #[arg(long, env = "SG_SCAN_PER_MINUTE", default_value_t = 5)]
    pub scan_per_minute: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["sqlmap-gate"]).unwrap();
        assert_eq!(config.bind, "0.0.0.0:8080");
        assert_eq!(config.default_per_minute, 20);
        assert_eq!(config.scan_per_minute, 5);
        assert!(config.config.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::try_parse_from([
            "sqlmap-gate",
            "--bind",
            "127.0.0.1:9000",
            "-c",
            "gate.toml",
            "--scan-per-minute",
            "2",
        ])
        .unwrap();
        assert_eq!(config.bind, "127.0.0.1:9000");
        assert_eq!(config.config, Some(PathBuf::from("gate.toml")));
        assert_eq!(config.scan_per_minute, 2);
    }
}
