// Wed Jan 15 2026 - Alex

pub mod cli;
pub mod color;
pub mod reporter;
pub mod sanitizer;

pub use cli::{Args, CommandHandler};
pub use color::{Colorizer, Tone};
pub use reporter::Reporter;
pub use sanitizer::Sanitizer;
