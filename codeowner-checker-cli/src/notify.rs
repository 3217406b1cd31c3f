use std::io::{self, Write};

use codeowner_checker::Resolution;

/// Receives one notification per resolution.
pub trait NotificationSink {
    fn notify(&mut self, target: &str, resolution: &Resolution) -> io::Result<()>;
}

/// Prints each notice on its own line, next to the path it concerns.
pub struct TerminalSink<W> {
    out: W,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> NotificationSink for TerminalSink<W> {
    fn notify(&mut self, target: &str, resolution: &Resolution) -> io::Result<()> {
        writeln!(self.out, "{:<70}  {}", target, resolution.notice())?;
        self.out.flush()
    }
}
