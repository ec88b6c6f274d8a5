// Tue Jan 13 2026 - Alex

use crate::error::{PsshError, PsshResult};
use serde::{Deserialize, Serialize};
use std::process::{Command, Stdio};

/// External program that turns a free-form query into hostnames, one per
/// line on stdout. `args` are passed before the query words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySpec {
    pub program: String,
    pub args: Vec<String>,
}

impl DiscoverySpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl Default for DiscoverySpec {
    fn default() -> Self {
        Self::new("search-ec2-tags.py")
    }
}

/// Runs the discovery program and returns the hostnames it printed, in order.
/// Anything on its stderr fails the whole call; its exit status is not
/// consulted.
pub fn run_discovery(spec: &DiscoverySpec, query: &str) -> PsshResult<Vec<String>> {
    log::debug!("running discovery {} for {:?}", spec.program, query);

    let output = Command::new(&spec.program)
        .args(&spec.args)
        .args(query.split_whitespace())
        .stdin(Stdio::null())
        .output()
        .map_err(|e| PsshError::DiscoveryFailed(format!("could not run {}: {}", spec.program, e)))?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        return Err(PsshError::DiscoveryFailed(stderr.trim_end().to_string()));
    }

    if !output.status.success() {
        log::warn!("{} exited with {} but wrote no errors", spec.program, output.status);
    }

    let hosts: Vec<String> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if hosts.is_empty() {
        return Err(PsshError::NoHostsMatched(query.to_string()));
    }

    log::debug!("discovery matched {} hosts", hosts.len());
    Ok(hosts)
}
