// Wed Jan 15 2026 - Alex

use colored::Colorize;

/// Semantic color of a piece of console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Success,
    Failure,
}

/// Styling switch for console output. `colored` on its own turns styling
/// off for non-tty stdout and for `NO_COLOR`/`CLICOLOR`; `apply` overrides
/// that so only `--no-color` decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colorizer {
    enabled: bool,
}

impl Colorizer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Makes this choice global for the `colored` crate.
    pub fn apply(&self) {
        colored::control::set_override(self.enabled);
    }

    pub fn paint(&self, text: &str, tone: Tone, bold: bool) -> String {
        if !self.enabled {
            return text.to_string();
        }

        let styled = match tone {
            Tone::Plain => text.white(),
            Tone::Success => text.green(),
            Tone::Failure => text.on_red(),
        };

        if bold {
            styled.bold().to_string()
        } else {
            styled.to_string()
        }
    }

    pub fn plain(&self, text: &str) -> String {
        self.paint(text, Tone::Plain, false)
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(text, Tone::Success, false)
    }

    pub fn failure(&self, text: &str) -> String {
        self.paint(text, Tone::Failure, false)
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint(text, Tone::Plain, true)
    }
}

impl Default for Colorizer {
    fn default() -> Self {
        Self::new(true)
    }
}
