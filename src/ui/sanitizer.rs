// Wed Jan 15 2026 - Alex

//! Removal of the banner ssh prints ahead of the remote command's own stderr.

const WARNING_SENTINEL: char = '@';

const SPOOFING_SIGNATURE: &str = "POSSIBLE DNS SPOOFING";
const SPOOFING_BLOCK_LINES: usize = 8;

const HOST_KEY_CHANGED_SIGNATURE: &str = "REMOTE HOST IDENTIFICATION";
const HOST_KEY_CHANGED_BLOCK_LINES: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sanitizer {
    keep_warnings: bool,
}

impl Sanitizer {
    pub fn new(keep_warnings: bool) -> Self {
        Self { keep_warnings }
    }

    /// Returns `None` when nothing worth showing is left.
    pub fn clean(&self, stderr: &str) -> Option<String> {
        if stderr.trim().is_empty() {
            return None;
        }

        if self.keep_warnings {
            return Some(stderr.to_string());
        }

        let lines: Vec<&str> = stderr.lines().collect();
        if lines.len() < 2 {
            return lines.first().map(|line| line.to_string());
        }

        let skip = Self::warning_block_len(&lines);
        join_remaining(&lines[skip.min(lines.len())..])
    }

    fn warning_block_len(lines: &[&str]) -> usize {
        if !lines[0].starts_with(WARNING_SENTINEL) {
            return 0;
        }

        if lines[1].contains(SPOOFING_SIGNATURE) {
            SPOOFING_BLOCK_LINES
        } else if lines[1].contains(HOST_KEY_CHANGED_SIGNATURE) {
            HOST_KEY_CHANGED_BLOCK_LINES
        } else {
            0
        }
    }
}

fn join_remaining(lines: &[&str]) -> Option<String> {
    let joined = match lines {
        [] => return None,
        [line] => line.to_string(),
        _ => lines.join("\n"),
    };

    if joined.trim().is_empty() {
        None
    } else {
        Some(joined)
    }
}
