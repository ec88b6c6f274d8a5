// Tue Jan 13 2026 - Alex

use serde::{Deserialize, Serialize};
use std::io;
use std::process::{Child, Command, Stdio};

/// How the remote-execution program is invoked. `args` go between the
/// program and the per-host options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl TransportSpec {
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

impl Default for TransportSpec {
    fn default() -> Self {
        Self::new("ssh")
    }
}

/// Starts one remote command for one host.
pub trait Transport {
    fn spawn(&self, host: &str, command: &str) -> io::Result<Child>;
}

#[derive(Debug, Clone)]
pub struct SshTransport {
    spec: TransportSpec,
    connect_timeout_secs: u64,
}

impl SshTransport {
    pub fn new(spec: TransportSpec, connect_timeout_secs: u64) -> Self {
        Self {
            spec,
            connect_timeout_secs,
        }
    }

    /// The command string stays a single argument; ssh hands it to the
    /// remote shell, so no local shell ever sees it.
    pub fn command_for(&self, host: &str, command: &str) -> Command {
        let mut cmd = Command::new(&self.spec.program);
        cmd.args(&self.spec.args)
            .arg("-oStrictHostKeyChecking=no")
            .arg(format!("-oConnectTimeout={}", self.connect_timeout_secs))
            .arg(host)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl Transport for SshTransport {
    fn spawn(&self, host: &str, command: &str) -> io::Result<Child> {
        log::debug!("spawning {} for {}", self.spec.program, host);
        self.command_for(host, command).spawn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_arguments() {
        let transport = SshTransport::new(TransportSpec::new("ssh").with_args(["-q"]), 7);
        let cmd = transport.command_for("web01", "uptime; df -h");

        assert_eq!(cmd.get_program(), "ssh");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().to_string()).collect();
        assert_eq!(
            args,
            vec!["-q", "-oStrictHostKeyChecking=no", "-oConnectTimeout=7", "web01", "uptime; df -h"]
        );
    }

    #[test]
    fn test_spawn_captures_output() {
        let spec = TransportSpec::new("sh").with_args(["-c", "echo \"$3 says $4\"", "fake-ssh"]);
        let transport = SshTransport::new(spec, 10);

        let child = transport.spawn("h1", "hi").unwrap();
        let output = child.wait_with_output().unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout), "h1 says hi\n");
    }

    #[test]
    fn test_missing_program_fails_to_spawn() {
        let transport = SshTransport::new(TransportSpec::new("/nonexistent/ssh"), 10);
        assert!(transport.spawn("h1", "true").is_err());
    }
}
