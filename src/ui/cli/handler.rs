// Wed Jan 15 2026 - Alex

use super::args::Args;
use crate::config::RunConfig;
use crate::engine::scheduler::run_hosts;
use crate::engine::transport::{SshTransport, Transport};
use crate::error::PsshError;
use crate::hosts::HostSource;
use crate::ui::reporter::Reporter;
use crate::utils::config::ConfigFile;
use crate::utils::logging::LoggingUtils;
use anyhow::Context;
use std::io::Write;

pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const DISCOVERY_FAILED: i32 = 1;
    pub const USAGE: i32 = 2;
}

pub struct CommandHandler;

impl CommandHandler {
    pub fn new() -> Self {
        Self
    }

    /// Returns the process exit code. Per-host failures never change it.
    pub fn execute(&self, args: Args) -> anyhow::Result<i32> {
        self.setup_logging(&args);
        args.validate().map_err(|e| anyhow::anyhow!(e))?;

        let file = ConfigFile::locate(args.config.as_deref()).context("loading configuration")?;
        let config = args.to_run_config(&file)?;
        log::debug!("profile tuning: {:?}", config.poll);

        let source = HostSource::from_options(args.host.as_deref(), args.query.as_deref(), &config.default_hosts);
        let transport = SshTransport::new(config.transport.clone(), config.connect_timeout_secs);
        let colorizer = config.colorizer();
        colorizer.apply();
        let mut reporter = Reporter::stdout(colorizer, config.sanitizer());

        self.run(&config, &source, &transport, &mut reporter)
    }

    pub fn run<W: Write>(
        &self,
        config: &RunConfig,
        source: &HostSource,
        transport: &dyn Transport,
        reporter: &mut Reporter<W>,
    ) -> anyhow::Result<i32> {
        let hosts = match source.resolve(&config.discovery) {
            Ok(hosts) => hosts,
            Err(e) if e.is_discovery_failure() => {
                log::debug!("{}", e);
                let detail = match e {
                    PsshError::DiscoveryFailed(detail) => detail,
                    other => other.to_string(),
                };
                reporter.discovery_failed(&detail)?;
                return Ok(exit_codes::DISCOVERY_FAILED);
            }
            Err(e) => return Err(e.into()),
        };

        if source.is_query() {
            reporter.matched_hosts(&hosts)?;
        }

        let summary = run_hosts(config, transport, reporter, &hosts)?;
        log::info!(
            "{} hosts: {} completed ({} non-zero), {} failed to start, {} abandoned after {} ticks",
            summary.total(),
            summary.completed().len(),
            summary.failed_exit_count(),
            summary.spawn_failed().len(),
            summary.abandoned().len(),
            summary.ticks
        );

        Ok(exit_codes::SUCCESS)
    }

    fn setup_logging(&self, args: &Args) {
        LoggingUtils::init_logger(LoggingUtils::level_from_str(&args.log_level));
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
