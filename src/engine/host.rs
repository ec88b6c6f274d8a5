// Tue Jan 13 2026 - Alex

use super::stream::PipeReader;
use super::transport::Transport;
use crate::error::{PsshError, PsshResult};
use crate::utils::process::ProcessUtils;
use std::io;
use std::process::{Child, ChildStderr, ChildStdout};
use std::thread;
use std::time::{Duration, Instant};

pub const TERMINATE_GRACE: Duration = Duration::from_millis(200);
const TERMINATE_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Pending,
    StreamingSlow,
    Done,
    Abandoned,
}

impl HostState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, HostState::Done | HostState::Abandoned)
    }
}

/// Output read from a host, decoded lossily.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }
}

/// One transport child bound to one host. Owns the child and both of its
/// pipes until it reaches `Done` or `Abandoned`.
pub struct HostProcess {
    host: String,
    state: HostState,
    child: Option<Child>,
    stdout: PipeReader<ChildStdout>,
    stderr: PipeReader<ChildStderr>,
    buffered_out: Vec<u8>,
    buffered_err: Vec<u8>,
    exit_code: Option<i32>,
    started_tick: u64,
}

impl HostProcess {
    pub fn spawn(host: &str, command: &str, transport: &dyn Transport, tick: u64) -> PsshResult<Self> {
        let spawn_failed = |source: io::Error| PsshError::SpawnFailed {
            host: host.to_string(),
            source,
        };

        let mut child = transport.spawn(host, command).map_err(spawn_failed)?;

        let pipes = match (child.stdout.take(), child.stderr.take()) {
            (Some(out), Some(err)) => PipeReader::new(out).and_then(|out| Ok((out, PipeReader::new(err)?))),
            _ => Err(io::Error::new(io::ErrorKind::Other, "transport did not expose stdout/stderr pipes")),
        };

        let (stdout, stderr) = match pipes {
            Ok(pipes) => pipes,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(spawn_failed(e));
            }
        };

        Ok(Self {
            host: host.to_string(),
            state: HostState::Pending,
            child: Some(child),
            stdout,
            stderr,
            buffered_out: Vec::new(),
            buffered_err: Vec::new(),
            exit_code: None,
            started_tick: tick,
        })
    }

    pub fn state(&self) -> HostState {
        self.state
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn age(&self, tick: u64) -> u64 {
        tick.saturating_sub(self.started_tick)
    }

    /// Moves whatever the pipes hold right now into the buffers.
    pub fn poll_output(&mut self) {
        if let Err(e) = self.stdout.read_available(&mut self.buffered_out) {
            log::warn!("[{}] stdout read failed: {}", self.host, e);
        }
        if let Err(e) = self.stderr.read_available(&mut self.buffered_err) {
            log::warn!("[{}] stderr read failed: {}", self.host, e);
        }
    }

    /// Non-blocking exit check. A failed status query counts as exited.
    pub fn poll_exit(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return true;
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                self.exit_code = status.code();
                self.child = None;
                true
            }
            Ok(None) => false,
            Err(e) => {
                log::warn!("[{}] could not query exit status: {}", self.host, e);
                let _ = child.kill();
                let _ = child.wait();
                self.child = None;
                true
            }
        }
    }

    pub fn take_output(&mut self) -> CapturedOutput {
        CapturedOutput {
            stdout: decode(std::mem::take(&mut self.buffered_out)),
            stderr: decode(std::mem::take(&mut self.buffered_err)),
        }
    }

    /// Like `take_output`, but an unterminated last line stays buffered
    /// until its newline arrives or the child exits.
    pub fn take_complete_lines(&mut self) -> CapturedOutput {
        CapturedOutput {
            stdout: decode(split_complete_lines(&mut self.buffered_out)),
            stderr: decode(split_complete_lines(&mut self.buffered_err)),
        }
    }

    pub fn escalate(&mut self) {
        if self.state == HostState::Pending {
            log::info!("[{}] escalating to live output", self.host);
            self.state = HostState::StreamingSlow;
        }
    }

    /// Reads what the exited child left in its pipes, then releases them.
    /// Returns everything not yet handed out.
    pub fn finish(&mut self) -> CapturedOutput {
        self.poll_output();
        self.stdout.close();
        self.stderr.close();
        self.state = HostState::Done;
        log::debug!("[{}] done, exit code {:?}", self.host, self.exit_code);
        self.take_output()
    }

    /// Sends SIGTERM and discards buffered output. The child is left for
    /// `reap_abandoned`, so many hosts can share one grace period.
    pub fn abandon(&mut self) {
        if let Some(child) = self.child.as_ref() {
            if let Err(e) = ProcessUtils::terminate(child.id()) {
                log::debug!("[{}] SIGTERM failed: {}", self.host, e);
            }
        }

        self.stdout.close();
        self.stderr.close();
        self.buffered_out.clear();
        self.buffered_err.clear();
        self.state = HostState::Abandoned;
        log::warn!("[{}] abandoned", self.host);
    }

    /// Non-blocking; true once the child is gone.
    fn try_reap(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return true;
        };

        match child.try_wait() {
            Ok(Some(_)) | Err(_) => {
                self.child = None;
                true
            }
            Ok(None) => false,
        }
    }

    fn kill(&mut self) {
        if let Some(mut child) = self.child.take() {
            log::debug!("[{}] ignored SIGTERM, killing", self.host);
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Waits at most `grace` for every abandoned child together, then SIGKILLs
/// and reaps the rest. Leaves `processes` empty.
pub fn reap_abandoned(processes: &mut Vec<HostProcess>, grace: Duration) {
    let deadline = Instant::now() + grace;

    loop {
        processes.retain_mut(|p| !p.try_reap());
        if processes.is_empty() || Instant::now() >= deadline {
            break;
        }
        thread::sleep(TERMINATE_POLL);
    }

    for process in processes.iter_mut() {
        process.kill();
    }
    processes.clear();
}

fn split_complete_lines(buf: &mut Vec<u8>) -> Vec<u8> {
    match buf.iter().rposition(|&b| b == b'\n') {
        Some(pos) => {
            let rest = buf.split_off(pos + 1);
            std::mem::replace(buf, rest)
        }
        None => Vec::new(),
    }
}

fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

impl Drop for HostProcess {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
