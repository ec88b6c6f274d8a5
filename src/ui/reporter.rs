// Wed Jan 15 2026 - Alex

use crate::engine::host::CapturedOutput;
use crate::ui::color::Colorizer;
use crate::ui::sanitizer::Sanitizer;
use std::collections::HashSet;
use std::io::{self, Stdout, Write};

/// Renders host results and run-level status lines to the console.
pub struct Reporter<W: Write> {
    out: W,
    colorizer: Colorizer,
    sanitizer: Sanitizer,
    stderr_started: HashSet<String>,
}

impl Reporter<Stdout> {
    pub fn stdout(colorizer: Colorizer, sanitizer: Sanitizer) -> Self {
        Self::new(io::stdout(), colorizer, sanitizer)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, colorizer: Colorizer, sanitizer: Sanitizer) -> Self {
        Self {
            out,
            colorizer,
            sanitizer,
            stderr_started: HashSet::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Full block for a host that finished before escalation.
    pub fn host_completed(&mut self, host: &str, exit_code: Option<i32>, output: &CapturedOutput) -> io::Result<()> {
        self.header(host, exit_code)?;

        if !output.stdout.is_empty() {
            writeln!(self.out, "STDOUT:")?;
            writeln!(self.out, "{}", self.colorizer.success(trim_newline(&output.stdout)))?;
        }

        if let Some(stderr) = self.sanitizer.clean(&output.stderr) {
            writeln!(self.out, "STDERR:")?;
            writeln!(self.out, "{}", self.colorizer.failure(trim_newline(&stderr)))?;
        }

        self.out.flush()
    }

    pub fn spawn_failed(&mut self, host: &str, error: &str) -> io::Result<()> {
        writeln!(self.out, "[{}]", self.colorizer.bold(host))?;
        writeln!(self.out, "{}", self.colorizer.failure(&format!("SPAWN FAILED: {}", error)))?;
        self.out.flush()
    }

    /// Announces escalation and flushes whatever was captured so far.
    pub fn escalated(&mut self, host: &str, backlog: &CapturedOutput) -> io::Result<()> {
        writeln!(
            self.out,
            "[{}] {}",
            self.colorizer.bold(host),
            self.colorizer.plain("is responding slowly, streaming its output as it arrives")
        )?;

        let stderr = self.leading_stderr(host, &backlog.stderr);
        self.write_stream(host, &backlog.stdout, &stderr)
    }

    /// Live output of an escalated host, written as soon as it is read.
    pub fn streamed(&mut self, host: &str, chunk: &CapturedOutput) -> io::Result<()> {
        let stderr = self.leading_stderr(host, &chunk.stderr);
        self.write_stream(host, &chunk.stdout, &stderr)
    }

    pub fn stream_finished(&mut self, host: &str, exit_code: Option<i32>) -> io::Result<()> {
        writeln!(
            self.out,
            "[{}]{} {}",
            self.colorizer.bold(host),
            exit_suffix(exit_code),
            self.colorizer.plain("finished")
        )?;
        self.out.flush()
    }

    pub fn still_waiting(&mut self, hosts: &[String]) -> io::Result<()> {
        writeln!(self.out, "{}", self.colorizer.plain(&format!("waiting on these hosts, still: {}", hosts.join(", "))))?;
        self.out.flush()
    }

    pub fn gave_up(&mut self, hosts: &[String]) -> io::Result<()> {
        let line = format!("Sorry, the following hosts took too long, and I gave up: {}", hosts.join(", "));
        writeln!(self.out)?;
        writeln!(self.out, "{}", self.colorizer.plain(&line))?;
        self.out.flush()
    }

    pub fn matched_hosts(&mut self, hosts: &[String]) -> io::Result<()> {
        writeln!(self.out, "matched the following hosts: {}", hosts.join(", "))?;
        self.out.flush()
    }

    pub fn discovery_failed(&mut self, detail: &str) -> io::Result<()> {
        let line = format!("Sorry, host discovery returned an error:\n {}", detail);
        writeln!(self.out, "{}", self.colorizer.failure(&line))?;
        self.out.flush()
    }

    fn header(&mut self, host: &str, exit_code: Option<i32>) -> io::Result<()> {
        writeln!(self.out, "[{}]{}", self.colorizer.bold(host), exit_suffix(exit_code))
    }

    /// The ssh banner can only open a host's stderr, so only the first
    /// non-empty stderr text of a streamed host goes through the sanitizer.
    fn leading_stderr(&mut self, host: &str, stderr: &str) -> String {
        if stderr.is_empty() {
            return String::new();
        }
        if self.stderr_started.insert(host.to_string()) {
            self.sanitizer.clean(stderr).unwrap_or_default()
        } else {
            stderr.to_string()
        }
    }

    fn write_stream(&mut self, host: &str, stdout: &str, stderr: &str) -> io::Result<()> {
        for line in stdout.lines() {
            writeln!(self.out, "[{}] STDOUT: {}", host, self.colorizer.success(line))?;
        }
        for line in stderr.lines() {
            writeln!(self.out, "[{}] STDERR: {}", host, self.colorizer.failure(line))?;
        }
        self.out.flush()
    }
}

fn exit_suffix(exit_code: Option<i32>) -> String {
    match exit_code {
        Some(0) => String::new(),
        Some(code) => format!(" exit {}", code),
        None => " terminated by signal".to_string(),
    }
}

fn trim_newline(text: &str) -> &str {
    text.trim_end_matches(['\r', '\n'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reporter() -> Reporter<Vec<u8>> {
        Reporter::new(Vec::new(), Colorizer::disabled(), Sanitizer::default())
    }

    fn rendered(reporter: Reporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    fn output(stdout: &str, stderr: &str) -> CapturedOutput {
        CapturedOutput {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_completed_block_without_stderr() {
        let mut reporter = reporter();
        reporter.host_completed("h1", Some(0), &output("ok\n", "")).unwrap();

        assert_eq!(rendered(reporter), "[h1]\nSTDOUT:\nok\n");
    }

    #[test]
    fn test_completed_block_with_exit_code_and_stderr() {
        let mut reporter = reporter();
        reporter.host_completed("h2", Some(255), &output("", "Connection refused\n")).unwrap();

        let text = rendered(reporter);
        assert_eq!(text, "[h2] exit 255\nSTDERR:\nConnection refused\n");
        assert!(!text.contains("STDOUT:"));
    }

    #[test]
    fn test_banner_only_stderr_is_hidden() {
        let mut banner: Vec<String> = vec!["@@@@".to_string(), "@ WARNING: REMOTE HOST IDENTIFICATION HAS CHANGED! @".to_string()];
        banner.extend((0..11).map(|i| format!("line {}", i)));

        let mut reporter = reporter();
        reporter.host_completed("h1", Some(0), &output("up\n", &banner.join("\n"))).unwrap();

        assert!(!rendered(reporter).contains("STDERR:"));
    }

    #[test]
    fn test_streamed_lines_are_prefixed() {
        let mut reporter = reporter();
        reporter.escalated("slow", &output("a\nb\n", "")).unwrap();
        reporter.streamed("slow", &output("c\n", "oops\n")).unwrap();
        reporter.stream_finished("slow", Some(0)).unwrap();

        let text = rendered(reporter);
        assert!(text.starts_with("[slow] is responding slowly"));
        assert!(text.contains("[slow] STDOUT: a\n[slow] STDOUT: b\n"));
        assert!(text.contains("[slow] STDOUT: c\n"));
        assert!(text.contains("[slow] STDERR: oops\n"));
        assert!(text.ends_with("[slow] finished\n"));
    }

    #[test]
    fn test_banner_arriving_after_escalation_is_filtered() {
        let mut banner: Vec<String> = vec!["@@@@".to_string(), "@ WARNING: POSSIBLE DNS SPOOFING DETECTED! @".to_string()];
        banner.extend((0..6).map(|i| format!("line {}", i)));
        let stderr = banner.join("\n") + "\nPermission denied\n";

        let mut reporter = reporter();
        reporter.escalated("slow", &output("", "")).unwrap();
        reporter.streamed("slow", &output("", &stderr)).unwrap();
        reporter.streamed("slow", &output("", "@ later text\n")).unwrap();

        let text = rendered(reporter);
        assert!(!text.contains("SPOOFING"));
        assert!(text.contains("[slow] STDERR: Permission denied\n"));
        assert!(text.contains("[slow] STDERR: @ later text\n"));

        let mut keeping = Reporter::new(Vec::new(), Colorizer::disabled(), Sanitizer::new(true));
        keeping.escalated("slow", &output("", "")).unwrap();
        keeping.streamed("slow", &output("", &stderr)).unwrap();
        assert!(rendered(keeping).contains("[slow] STDERR: @ WARNING: POSSIBLE DNS SPOOFING DETECTED! @\n"));
    }

    #[test]
    fn test_summaries() {
        let mut reporter = reporter();
        let hosts = vec!["h1".to_string(), "h2".to_string()];
        reporter.still_waiting(&hosts).unwrap();
        reporter.gave_up(&hosts).unwrap();
        reporter.spawn_failed("h3", "No such file or directory").unwrap();

        let text = rendered(reporter);
        assert!(text.contains("waiting on these hosts, still: h1, h2\n"));
        assert!(text.contains("and I gave up: h1, h2\n"));
        assert!(text.contains("[h3]\nSPAWN FAILED: No such file or directory\n"));
    }
}
