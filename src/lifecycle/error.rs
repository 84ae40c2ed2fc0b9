// Error definitions for the lifecycle controller

use super::state::State;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("cannot {action} while {state}")]
    InvalidTransition { action: &'static str, state: State },

    #[error("initialize called before configuration was validated (state: {0})")]
    NotValidated(State),

    #[error("initialization failed: {0:#}")]
    Initialization(anyhow::Error),

    #[error("start failed: {0:#}")]
    Start(anyhow::Error),

    #[error("shutdown finished with {} failure(s): {}", .0.len(), .0.join("; "))]
    ShutdownFailed(Vec<String>),
}
