use tracing::info;

/// Settings threaded into every resolution. The session owns the value and
/// applies updates as they arrive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    user: Option<String>,
}

impl Config {
    pub fn new(user: Option<String>) -> Self {
        Self { user }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn has_user(&self) -> bool {
        self.user().is_some_and(|user| !user.is_empty())
    }

    /// Replace the configured user. Returns whether the value changed.
    pub fn set_user(&mut self, user: Option<String>) -> bool {
        if self.user == user {
            return false;
        }
        info!(user = user.as_deref().unwrap_or(""), "code owner user changed");
        self.user = user;
        true
    }
}
