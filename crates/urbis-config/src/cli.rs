//! Command-line argument parsing for the urbis renderer.

use std::path::PathBuf;

use clap::Parser;

use crate::config::BackendSelection;
use crate::Config;

/// Urbis renderer command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "urbis", about = "Urbis city renderer")]
pub struct CliArgs {
    /// Graphics backend to initialize.
    #[arg(long, value_enum)]
    pub backend: Option<BackendSelection>,

    /// Device-local pool size in MiB.
    #[arg(long)]
    pub device_pool_mb: Option<u64>,

    /// Host-visible pool size in MiB.
    #[arg(long)]
    pub host_pool_mb: Option<u64>,

    /// Log per-frame visibility and arena stats.
    #[arg(long)]
    pub show_stats: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Number of frames to run before exiting (demo/tooling only).
    #[arg(long)]
    pub frames: Option<u32>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(backend) = args.backend {
            self.render.backend = backend;
        }
        if let Some(mb) = args.device_pool_mb {
            self.memory.device_pool_mb = mb;
        }
        if let Some(mb) = args.host_pool_mb {
            self.memory.host_pool_mb = mb;
        }
        if args.show_stats {
            self.debug.show_stats = true;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_args() -> CliArgs {
        CliArgs {
            backend: None,
            device_pool_mb: None,
            host_pool_mb: None,
            show_stats: false,
            log_level: None,
            frames: None,
            config: None,
        }
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            backend: Some(BackendSelection::OpenGl),
            device_pool_mb: Some(512),
            log_level: Some("debug".to_string()),
            ..no_args()
        };

        config.apply_cli_overrides(&args);

        assert_eq!(config.render.backend, BackendSelection::OpenGl);
        assert_eq!(config.memory.device_pool_mb, 512);
        assert_eq!(config.debug.log_level, "debug");
        // Untouched fields keep their loaded values.
        assert_eq!(config.memory.host_pool_mb, 64);
    }

    #[test]
    fn test_no_overrides_is_identity() {
        let mut config = Config::default();
        config.apply_cli_overrides(&no_args());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parses_from_argv() {
        let args =
            CliArgs::parse_from(["urbis", "--backend", "open-gl", "--host-pool-mb", "32"]);
        assert_eq!(args.backend, Some(BackendSelection::OpenGl));
        assert_eq!(args.host_pool_mb, Some(32));
        assert!(!args.show_stats);
    }
}
