//! Headless mode for the tracker.
//!
//! Reads one command per line from stdin and prints the result, for
//! scripting and automated testing without a terminal UI.

use initiative_core::{Headless, Outcome, SessionConfig};
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Run the tracker in headless mode on stdin/stdout.
pub fn run_headless(config: SessionConfig) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run(Headless::new(config), stdin.lock(), stdout.lock())
}

/// Line-oriented protocol:
/// - results are printed as-is
/// - failures are prefixed with `[ERROR]`
/// - `quit` or end of input stops the loop
pub fn run<R: BufRead, W: Write>(mut tracker: Headless, input: R, mut output: W) -> io::Result<()> {
    writeln!(output, "=== Initiative Tracker (headless) ===")?;
    writeln!(output, "Type `help` for commands.")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        debug!(command = line, "headless command");
        match tracker.execute(line) {
            Ok(Outcome::Text(text)) => {
                if !text.is_empty() {
                    writeln!(output, "{text}")?;
                }
            }
            Ok(Outcome::Quit) => {
                writeln!(output, "Goodbye!")?;
                break;
            }
            Err(e) => writeln!(output, "[ERROR] {e}")?,
        }
        output.flush()?;
    }

    Ok(())
}
