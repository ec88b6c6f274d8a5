// Tue Jan 13 2026 - Alex

use crate::engine::transport::TransportSpec;
use crate::hosts::discovery::DiscoverySpec;
use crate::ui::color::Colorizer;
use crate::ui::sanitizer::Sanitizer;
use crate::utils::config::{ConfigError, ConfigFile, ProfileConfig};
use std::time::Duration;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_GRACE_TICKS: u64 = 2;

/// Run-wide settings, built once at startup and handed to every component by reference.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub command: String,
    pub transport: TransportSpec,
    pub discovery: DiscoverySpec,
    pub connect_timeout_secs: u64,
    pub poll: PollPolicy,
    pub color: bool,
    pub keep_ssh_warnings: bool,
    pub default_hosts: Vec<String>,
}

/// Timing knobs of the poll loop. Everything is counted in ticks; one tick is
/// one sweep over the active hosts preceded by a `tick_interval` sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub tick_interval: Duration,
    pub timeout: Duration,
    pub grace_ticks: u64,
    pub slow_after_ticks: u64,
    pub status_every_ticks: u64,
}

impl PollPolicy {
    pub fn from_profile(profile: &ProfileConfig) -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            timeout: Duration::from_secs(profile.timeout_secs),
            grace_ticks: DEFAULT_GRACE_TICKS,
            slow_after_ticks: profile.slow_after_ticks,
            status_every_ticks: profile.status_every_ticks,
        }
    }

    /// Number of ticks after which every remaining host is abandoned.
    pub fn deadline_ticks(&self) -> u64 {
        let interval = self.tick_interval.as_nanos().max(1);
        let ticks = (self.timeout.as_nanos() + interval - 1) / interval;
        ticks.min(u64::MAX as u128) as u64
    }

    pub fn is_status_tick(&self, tick: u64) -> bool {
        tick >= self.grace_ticks && self.status_every_ticks > 0 && tick % self.status_every_ticks == 0
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from_profile(&ProfileConfig::standard())
    }
}

impl RunConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            transport: TransportSpec::default(),
            discovery: DiscoverySpec::default(),
            connect_timeout_secs: 10,
            poll: PollPolicy::default(),
            color: true,
            keep_ssh_warnings: false,
            default_hosts: vec!["localhost".to_string()],
        }
    }

    /// Layers a config file and one of its profiles over the built-in defaults.
    pub fn from_file(
        command: impl Into<String>,
        file: &ConfigFile,
        profile: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let name = profile.unwrap_or(&file.profile);
        let profile = file
            .profile(name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))?;

        let mut config = Self::new(command);
        config.transport = file.transport.clone();
        config.discovery = file.discovery.clone();
        config.connect_timeout_secs = file.connect_timeout_secs;
        config.poll = PollPolicy::from_profile(&profile);
        config.color = file.color;
        config.keep_ssh_warnings = file.keep_ssh_warnings;
        if !file.default_hosts.is_empty() {
            config.default_hosts = file.default_hosts.clone();
        }
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.poll.timeout = timeout;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.poll.tick_interval = interval;
        self
    }

    pub fn with_slow_after(mut self, ticks: u64) -> Self {
        self.poll.slow_after_ticks = ticks;
        self
    }

    pub fn with_status_every(mut self, ticks: u64) -> Self {
        self.poll.status_every_ticks = ticks;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_keep_ssh_warnings(mut self, keep: bool) -> Self {
        self.keep_ssh_warnings = keep;
        self
    }

    pub fn with_transport(mut self, transport: TransportSpec) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_discovery(mut self, discovery: DiscoverySpec) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn colorizer(&self) -> Colorizer {
        Colorizer::new(self.color)
    }

    pub fn sanitizer(&self) -> Sanitizer {
        Sanitizer::new(self.keep_ssh_warnings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command.trim().is_empty() {
            return Err(ConfigError::Validation("command must not be empty".to_string()));
        }
        if self.poll.tick_interval.is_zero() {
            return Err(ConfigError::Validation("tick interval must be greater than 0".to_string()));
        }
        if self.poll.timeout.is_zero() {
            return Err(ConfigError::Validation("timeout must be greater than 0".to_string()));
        }
        if self.poll.status_every_ticks == 0 {
            return Err(ConfigError::Validation("status cadence must be at least 1 tick".to_string()));
        }
        if self.transport.program.trim().is_empty() {
            return Err(ConfigError::Validation("transport program must be set".to_string()));
        }
        Ok(())
    }
}
