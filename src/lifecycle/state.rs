use serde::Serialize;
use std::fmt;

/// Lifecycle states, traversed strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Uninitialized,
    ConfigValidated,
    Initialized,
    Running,
    ShutDown,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            State::Uninitialized => "uninitialized",
            State::ConfigValidated => "config_validated",
            State::Initialized => "initialized",
            State::Running => "running",
            State::ShutDown => "shut_down",
        };
        f.write_str(s)
    }
}

/// How strictly configuration issues gate startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Any issue blocks (offline dry run).
    ValidateAll,
    /// Only error-class issues block; warnings are logged.
    ValidateErrorsOnly,
}
