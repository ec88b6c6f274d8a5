// Wed Jan 15 2026 - Alex

use crate::config::RunConfig;
use crate::engine::transport::TransportSpec;
use crate::hosts::discovery::DiscoverySpec;
use crate::utils::config::{ConfigError, ConfigFile};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "pssh")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Run one command on many hosts over ssh, in parallel", long_about = None)]
pub struct Args {
    /// Command to run on every host
    pub command: String,

    /// Resolve target hosts through the discovery program
    #[arg(short, long)]
    pub query: Option<String>,

    /// Comma-separated target hosts; wins over --query
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Seconds before every remaining host is given up on
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Passed to ssh as ConnectTimeout
    #[arg(long)]
    pub connect_timeout: Option<u64>,

    #[arg(long)]
    pub no_color: bool,

    /// Show ssh host-key warning banners in STDERR
    #[arg(long)]
    pub keep_ssh_warnings: bool,

    /// Named tuning profile (default, long, or one from the config file)
    #[arg(short, long)]
    pub profile: Option<String>,

    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Ticks before a pending host switches to live output
    #[arg(long)]
    pub slow_after: Option<u64>,

    /// Ticks between "still waiting" lines
    #[arg(long)]
    pub status_every: Option<u64>,

    /// Transport program
    #[arg(long)]
    pub ssh: Option<String>,

    /// Host discovery program
    #[arg(long)]
    pub discovery: Option<String>,

    #[arg(short, long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    pub fn validate(&self) -> Result<(), String> {
        if self.command.trim().is_empty() {
            return Err("Command must not be empty".to_string());
        }
        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }
        if self.status_every == Some(0) {
            return Err("Status cadence must be at least 1 tick".to_string());
        }
        if matches!(self.host.as_deref(), Some(h) if h.split(',').all(|h| h.trim().is_empty())) {
            return Err("--host needs at least one hostname".to_string());
        }
        Ok(())
    }

    /// File and profile first, then whatever was given on the command line.
    pub fn to_run_config(&self, file: &ConfigFile) -> Result<RunConfig, ConfigError> {
        let mut config = RunConfig::from_file(self.command.as_str(), file, self.profile.as_deref())?;

        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.connect_timeout {
            config = config.with_connect_timeout(secs);
        }
        if let Some(ticks) = self.slow_after {
            config = config.with_slow_after(ticks);
        }
        if let Some(ticks) = self.status_every {
            config = config.with_status_every(ticks);
        }
        if let Some(program) = &self.ssh {
            config = config.with_transport(TransportSpec {
                program: program.clone(),
                args: file.transport.args.clone(),
            });
        }
        if let Some(program) = &self.discovery {
            config = config.with_discovery(DiscoverySpec {
                program: program.clone(),
                args: file.discovery.args.clone(),
            });
        }
        if self.no_color {
            config = config.with_color(false);
        }
        if self.keep_ssh_warnings {
            config = config.with_keep_ssh_warnings(true);
        }

        config.validate()?;
        Ok(config)
    }
}
