//! Colored terminal output for conversions
//!
//! Results go to stdout, failures to stderr; `--quiet` silences everything
//! except failures.

use std::io::Write;
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    bufwtr: BufferWriter,
    verbose: bool,
    quiet: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self::new(self.verbose, self.quiet)
    }
}

fn marker(buffer: &mut Buffer, symbol: &str, color: Color) {
    let _ = buffer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = write!(buffer, "{symbol}");
    let _ = buffer.reset();
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            bufwtr: BufferWriter::stdout(ColorChoice::Auto),
            verbose,
            quiet,
        }
    }

    fn print_marked(&self, symbol: &str, color: Color, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        marker(&mut buffer, symbol, color);
        let _ = writeln!(&mut buffer, " {message}");
        self.bufwtr.print(&buffer)
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.print_marked("✓", Color::Green, message)
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.print_marked("⚠", Color::Yellow, message)
    }

    /// Print a message only in verbose mode
    pub fn verbose(&self, message: &str) -> std::io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        self.print_marked("→", Color::Blue, message)
    }

    /// Print an error message to stderr (always shown)
    pub fn error(&self, message: &str) {
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();
        marker(&mut buffer, "✗", Color::Red);
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
        let _ = writeln!(&mut buffer, " {message}");
        let _ = buffer.reset();

        if bufwtr.print(&buffer).is_err() {
            eprintln!("✗ {message}");
        }
    }

    /// Print indented text to stderr, below an error (always shown)
    pub fn error_detail(&self, message: &str) {
        eprintln!("    {message}");
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer, "    {message}");
        self.bufwtr.print(&buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_suppresses_normal_output() {
        let output = OutputManager::new(true, true);
        assert!(output.success("done").is_ok());
        assert!(output.verbose("detail").is_ok());
        assert!(output.indent("item").is_ok());
    }

    #[test]
    fn clone_keeps_flags() {
        let output = OutputManager::new(true, false).clone();
        assert!(output.verbose);
        assert!(!output.quiet);
    }
}
