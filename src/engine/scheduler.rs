// Tue Jan 13 2026 - Alex

use super::host::{reap_abandoned, HostProcess, HostState, TERMINATE_GRACE};
use super::result::{HostOutcome, RunSummary};
use super::transport::Transport;
use crate::config::RunConfig;
use crate::error::PsshError;
use crate::ui::reporter::Reporter;
use crate::utils::logging::ScopedTimer;
use indexmap::IndexMap;
use std::io::{self, Write};
use std::thread;

/// What a single visit did to a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Waiting,
    Escalated,
    Completed,
    Abandoned,
    Gone,
}

/// Round-robin poll loop over every dispatched host, run on the calling
/// thread. Hosts leave the active set exactly once, on `Done` or `Abandoned`.
pub struct Scheduler<'a, W: Write> {
    config: &'a RunConfig,
    transport: &'a dyn Transport,
    reporter: &'a mut Reporter<W>,
    active: IndexMap<String, HostProcess>,
    stopping: Vec<HostProcess>,
    tick: u64,
    summary: RunSummary,
}

impl<'a, W: Write> Scheduler<'a, W> {
    pub fn new(config: &'a RunConfig, transport: &'a dyn Transport, reporter: &'a mut Reporter<W>) -> Self {
        Self {
            config,
            transport,
            reporter,
            active: IndexMap::new(),
            stopping: Vec::new(),
            tick: 0,
            summary: RunSummary::new(),
        }
    }

    /// Spawns one transport child per host. A host whose child cannot be
    /// started is reported right away and never enters the active set.
    pub fn dispatch(&mut self, hosts: &[String]) -> io::Result<()> {
        for host in hosts {
            if self.active.contains_key(host) || self.summary.get(host).is_some() {
                log::debug!("skipping duplicate host {}", host);
                continue;
            }

            match HostProcess::spawn(host, &self.config.command, self.transport, self.tick) {
                Ok(process) => {
                    self.active.insert(host.clone(), process);
                }
                Err(e) => {
                    log::warn!("{}", e);
                    let detail = match &e {
                        PsshError::SpawnFailed { source, .. } => source.to_string(),
                        other => other.to_string(),
                    };
                    self.reporter.spawn_failed(host, &detail)?;
                    self.summary.record(host, HostOutcome::SpawnFailed(detail), self.tick);
                }
            }
        }

        log::debug!("dispatched {} of {} hosts", self.active.len(), hosts.len());
        Ok(())
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn active_hosts(&self) -> Vec<String> {
        self.active.keys().cloned().collect()
    }

    pub fn is_finished(&self) -> bool {
        self.active.is_empty()
    }

    pub fn run(mut self) -> io::Result<RunSummary> {
        let _timer = ScopedTimer::new("poll loop");

        while !self.is_finished() {
            self.step()?;
        }

        self.summary.ticks = self.tick;
        Ok(self.summary)
    }

    /// One tick: sleep for the cadence, then visit every active host once.
    /// Hosts abandoned during the sweep share a single termination grace.
    pub fn step(&mut self) -> io::Result<()> {
        thread::sleep(self.config.poll.tick_interval);
        self.tick += 1;

        let mut gave_up = Vec::new();
        for host in self.active_hosts() {
            if self.visit(&host)? == Visit::Abandoned {
                gave_up.push(host);
            }
        }

        if !self.stopping.is_empty() {
            reap_abandoned(&mut self.stopping, TERMINATE_GRACE);
        }

        if !gave_up.is_empty() {
            self.reporter.gave_up(&gave_up)?;
        } else if !self.active.is_empty() && self.config.poll.is_status_tick(self.tick) {
            let waiting = self.active_hosts();
            self.reporter.still_waiting(&waiting)?;
        }

        Ok(())
    }

    fn visit(&mut self, host: &str) -> io::Result<Visit> {
        let tick = self.tick;
        let deadline = self.config.poll.deadline_ticks();
        let slow_after = self.config.poll.slow_after_ticks;

        let Some(process) = self.active.get_mut(host) else {
            return Ok(Visit::Gone);
        };

        if process.age(tick) > deadline {
            process.abandon();
            if let Some(process) = self.active.shift_remove(host) {
                self.stopping.push(process);
            }
            self.summary.record(host, HostOutcome::Abandoned, tick);
            return Ok(Visit::Abandoned);
        }

        process.poll_output();

        match process.state() {
            HostState::StreamingSlow => {
                let exited = process.poll_exit();
                let chunk = if exited { process.finish() } else { process.take_complete_lines() };
                if !chunk.is_empty() {
                    self.reporter.streamed(host, &chunk)?;
                }

                if exited {
                    let exit_code = process.exit_code();
                    self.reporter.stream_finished(host, exit_code)?;
                    self.active.shift_remove(host);
                    self.summary.record(host, HostOutcome::Completed { exit_code, streamed: true }, tick);
                    return Ok(Visit::Completed);
                }
            }
            HostState::Pending => {
                if process.poll_exit() {
                    let output = process.finish();
                    let exit_code = process.exit_code();
                    self.reporter.host_completed(host, exit_code, &output)?;
                    self.active.shift_remove(host);
                    self.summary.record(host, HostOutcome::Completed { exit_code, streamed: false }, tick);
                    return Ok(Visit::Completed);
                }

                if process.age(tick) > slow_after {
                    process.escalate();
                    let backlog = process.take_complete_lines();
                    self.reporter.escalated(host, &backlog)?;
                    return Ok(Visit::Escalated);
                }
            }
            HostState::Done | HostState::Abandoned => {
                log::debug!("[{}] already terminal, dropping from active set", host);
                self.active.shift_remove(host);
                return Ok(Visit::Gone);
            }
        }

        Ok(Visit::Waiting)
    }
}

/// Dispatches `hosts` and polls them all to a terminal state.
pub fn run_hosts<W: Write>(
    config: &RunConfig,
    transport: &dyn Transport,
    reporter: &mut Reporter<W>,
    hosts: &[String],
) -> io::Result<RunSummary> {
    let mut scheduler = Scheduler::new(config, transport, reporter);
    scheduler.dispatch(hosts)?;
    scheduler.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::transport::{SshTransport, TransportSpec};
    use crate::ui::color::Colorizer;
    use crate::ui::sanitizer::Sanitizer;
    use std::process::Child;
    use std::time::{Duration, Instant};

    const FAKE_SSH: &str = r#"
        case "$3" in
            slow) echo first; sleep 0.4; echo second ;;
            partial) printf 'abc'; sleep 0.2; printf 'def\n' ;;
            lagging) sleep 0.3; echo late ;;
            hang) exec sleep 30 ;;
            noisy)
                printf '@@@@@@@@\n@ WARNING: POSSIBLE DNS SPOOFING DETECTED! @\n3\n4\n5\n6\n7\n8\n' >&2
                echo 'real problem' >&2
                ;;
            *) echo ok ;;
        esac
    "#;

    struct FlakyTransport {
        inner: SshTransport,
    }

    impl Transport for FlakyTransport {
        fn spawn(&self, host: &str, command: &str) -> io::Result<Child> {
            if host == "broken" {
                return Err(io::Error::new(io::ErrorKind::NotFound, "transport binary missing"));
            }
            self.inner.spawn(host, command)
        }
    }

    fn transport() -> FlakyTransport {
        FlakyTransport {
            inner: SshTransport::new(TransportSpec::new("sh").with_args(["-c", FAKE_SSH, "fake-ssh"]), 10),
        }
    }

    fn config() -> RunConfig {
        RunConfig::new("echo ok")
            .with_tick_interval(Duration::from_millis(10))
            .with_timeout(Duration::from_secs(10))
            .with_slow_after(1_000)
            .with_status_every(1_000)
    }

    fn hosts(names: &[&str]) -> Vec<String> {
        names.iter().map(|h| h.to_string()).collect()
    }

    fn run(config: &RunConfig, names: &[&str]) -> (RunSummary, String) {
        let transport = transport();
        let mut reporter = Reporter::new(Vec::new(), Colorizer::disabled(), Sanitizer::default());
        let summary = run_hosts(config, &transport, &mut reporter, &hosts(names)).unwrap();
        (summary, String::from_utf8(reporter.into_inner()).unwrap())
    }

    #[test]
    fn test_fast_hosts_complete() {
        let (summary, text) = run(&config(), &["h1", "h2"]);

        let mut completed = summary.completed();
        completed.sort();
        assert_eq!(completed, vec!["h1", "h2"]);
        assert!(text.contains("[h1]\nSTDOUT:\nok\n"));
        assert!(text.contains("[h2]\nSTDOUT:\nok\n"));
        assert!(!text.contains("STDERR:"));
        assert!(!text.contains("gave up"));
    }

    #[test]
    fn test_hung_host_is_abandoned() {
        let config = config().with_timeout(Duration::from_millis(20));
        assert_eq!(config.poll.deadline_ticks(), 2);

        let started = Instant::now();
        let (summary, text) = run(&config, &["hang"]);

        assert_eq!(summary.abandoned(), vec!["hang"]);
        assert_eq!(summary.get("hang").map(|r| r.tick), Some(3));
        assert!(text.contains("and I gave up: hang"));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_spawn_failure_does_not_block_others() {
        let (summary, text) = run(&config(), &["broken", "good"]);

        assert_eq!(summary.spawn_failed(), vec!["broken"]);
        assert_eq!(summary.completed(), vec!["good"]);
        assert!(text.contains("[broken]\nSPAWN FAILED: transport binary missing\n"));
        assert!(text.contains("[good]\nSTDOUT:\nok\n"));
    }

    #[test]
    fn test_slow_host_escalates_to_streaming() {
        let config = config().with_slow_after(3);
        let (summary, text) = run(&config, &["slow"]);

        assert_eq!(
            summary.get("slow").map(|r| r.outcome.clone()),
            Some(HostOutcome::Completed { exit_code: Some(0), streamed: true })
        );
        assert!(text.contains("[slow] is responding slowly"));
        assert!(text.contains("[slow] STDOUT: first\n"));
        assert!(text.contains("[slow] STDOUT: second\n"));
        assert!(text.ends_with("[slow] finished\n"));
        assert!(!text.contains("STDOUT:\n"));
    }

    #[test]
    fn test_streamed_lines_are_never_split() {
        let config = config().with_slow_after(1);
        let (summary, text) = run(&config, &["partial"]);

        assert_eq!(
            summary.get("partial").map(|r| r.outcome.clone()),
            Some(HostOutcome::Completed { exit_code: Some(0), streamed: true })
        );
        assert!(text.contains("[partial] STDOUT: abcdef\n"));
        assert!(!text.contains("STDOUT: abc\n"));
        assert!(!text.contains("STDOUT: def\n"));
    }

    #[test]
    fn test_stubborn_hosts_are_cut_off_together() {
        let config = config().with_timeout(Duration::from_millis(100));
        let names: Vec<String> = (0..10).map(|i| format!("stubborn-{}", i)).collect();
        let transport = FlakyTransport {
            inner: SshTransport::new(
                TransportSpec::new("sh").with_args(["-c", "trap '' TERM; exec sleep 30", "fake-ssh"]),
                10,
            ),
        };
        let mut reporter = Reporter::new(Vec::new(), Colorizer::disabled(), Sanitizer::default());

        let started = Instant::now();
        let summary = run_hosts(&config, &transport, &mut reporter, &names).unwrap();
        let elapsed = started.elapsed();

        assert_eq!(summary.abandoned().len(), 10);
        assert!(elapsed < Duration::from_secs(1), "took {:?}", elapsed);

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(text.matches("and I gave up").count(), 1);
    }

    #[test]
    fn test_status_line_lists_waiting_hosts() {
        let config = config().with_status_every(2);
        let (summary, text) = run(&config, &["lagging"]);

        assert_eq!(summary.completed(), vec!["lagging"]);
        assert!(text.contains("waiting on these hosts, still: lagging\n"));
        assert!(text.contains("[lagging]\nSTDOUT:\nlate\n"));
    }

    #[test]
    fn test_transport_warning_is_filtered() {
        let (_, text) = run(&config(), &["noisy"]);

        assert!(text.contains("STDERR:\nreal problem\n"));
        assert!(!text.contains("SPOOFING"));
    }

    #[test]
    fn test_every_host_accounted_once() {
        let config = config()
            .with_slow_after(3)
            .with_timeout(Duration::from_millis(600));
        let names = ["h1", "broken", "slow", "hang", "noisy", "h1"];
        let (summary, text) = run(&config, &names);

        assert_eq!(summary.total(), 5);
        let mut seen = summary.hosts();
        seen.sort();
        assert_eq!(seen, vec!["broken", "h1", "hang", "noisy", "slow"]);
        assert_eq!(summary.abandoned(), vec!["hang"]);
        assert_eq!(summary.spawn_failed(), vec!["broken"]);
        assert_eq!(text.matches("and I gave up").count(), 1);
    }

    #[test]
    fn test_empty_host_list_finishes_immediately() {
        let (summary, text) = run(&config(), &[]);
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.ticks, 0);
        assert!(text.is_empty());
    }
}
