// Tue Jan 13 2026 - Alex

use colored::Colorize;
use pssh::ui::cli::{self, exit_codes};

fn main() {
    match cli::run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "[!]".red(), e);
            std::process::exit(exit_codes::USAGE);
        }
    }
}
