use std::{io::BufRead, path::Path};

use anyhow::Result;
use codeowner_checker::{resolve, Resolution, ResolutionQuery};
use tracing::debug;

use crate::{config::Config, notify::NotificationSink, workspace::Workspace};

/// Handles trigger events: explicit checks and "active file changed" events
/// read from a stream, plus configuration updates in between.
pub struct Session<'w, S> {
    workspace: &'w Workspace,
    config: Config,
    sink: S,
}

impl<'w, S: NotificationSink> Session<'w, S> {
    pub fn new(workspace: &'w Workspace, config: Config, sink: S) -> Self {
        Self {
            workspace,
            config,
            sink,
        }
    }

    /// Resolve ownership of `path` with the current configuration and notify
    /// the sink. Ownership files are discovered afresh on every call.
    pub fn check(&mut self, path: impl AsRef<Path>) -> Result<Resolution> {
        let target = self.workspace.relative_path(path);
        let files = if self.config.has_user() {
            self.workspace.load_ownership_files()
        } else {
            Vec::new()
        };
        debug!(path = %target, files = files.len(), "resolving ownership");

        let resolution = resolve(&ResolutionQuery::new(&target, self.config.user()), &files);
        self.sink.notify(&target, &resolution)?;
        Ok(resolution)
    }

    /// Process one input line. `:user NAME` sets the user, a bare `:user`
    /// clears it, and anything else is a path to check.
    pub fn handle_line(&mut self, line: &str) -> Result<Option<Resolution>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let user_command = line
            .strip_prefix(":user")
            .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace));
        if let Some(rest) = user_command {
            let user = rest.trim();
            self.config
                .set_user((!user.is_empty()).then(|| user.to_owned()));
            return Ok(None);
        }

        self.check(line).map(Some)
    }

    pub fn run(&mut self, input: impl BufRead) -> Result<()> {
        for line in input.lines() {
            self.handle_line(&line?)?;
        }
        Ok(())
    }
}

#[cfg(test)]
impl<S> Session<'_, S> {
    fn into_sink(self) -> S {
        self.sink
    }
}
