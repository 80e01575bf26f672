use crate::domain::ports::Prompter;
use std::io::{self, BufRead, Write};

/// 以終端機的 stdin/stderr 取代 `confirm()` 與 `alert()`
#[derive(Debug, Clone, Default)]
pub struct TerminalPrompter {
    assume_yes: bool,
}

impl TerminalPrompter {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    pub fn assume_yes(&self) -> bool {
        self.assume_yes
    }
}

/// 只接受 y / yes，其餘視為否
pub fn parse_answer(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

impl Prompter for TerminalPrompter {
    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            eprintln!("❓ {} [auto-confirmed]", message);
            return true;
        }

        eprint!("❓ {} [y/N] ", message);
        if io::stderr().flush().is_err() {
            return false;
        }

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => false,
            Ok(_) => parse_answer(&line),
        }
    }

    fn alert(&self, message: &str) {
        println!("📢 {}", message);
    }
}
