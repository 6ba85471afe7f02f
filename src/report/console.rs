use colored::*;

/// Progress and diagnostic lines on stderr, keeping stdout for the report.
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    pub quiet: bool,
    pub verbose: bool,
}

impl Console {
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Console { quiet, verbose }
    }

    pub fn step(&self, message: &str) {
        if !self.quiet {
            eprintln!("  {} {}", "→".cyan(), message);
        }
    }

    pub fn ok(&self, message: &str) {
        if !self.quiet {
            eprintln!("  {} {}", "✓".green(), message);
        }
    }

    pub fn warn(&self, message: &str) {
        if !self.quiet {
            eprintln!("  {} {}", "⚠".yellow(), message);
        }
    }

    /// Only with `--verbose`.
    pub fn detail(&self, message: &str) {
        if self.verbose && !self.quiet {
            eprintln!("    {}", message.dimmed());
        }
    }

    pub fn shows_tables(&self) -> bool {
        !self.quiet
    }
}
