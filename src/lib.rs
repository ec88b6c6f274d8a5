// Tue Jan 15 2026 - Alex

pub mod config;
pub mod engine;
pub mod error;
pub mod hosts;
pub mod ui;
pub mod utils;

pub use config::{PollPolicy, RunConfig};
pub use engine::{run_hosts, HostOutcome, HostProcess, HostState, RunSummary, Scheduler, SshTransport, Transport};
pub use error::{PsshError, PsshResult};
pub use hosts::HostSource;
pub use ui::{Colorizer, Reporter, Sanitizer};
