use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
}

/// A user-facing message describing a resolution outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: &'static str,
}

impl Notice {
    pub(crate) fn new(severity: Severity, message: &'static str) -> Self {
        Self { severity, message }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Info => write!(f, "{}", self.message),
            Severity::Warning => write!(f, "warning: {}", self.message),
        }
    }
}
