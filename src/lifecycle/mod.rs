//! Process lifecycle and the collaborators it drives.

pub mod api;
pub mod controller;
pub mod error;
pub mod state;


pub use api::{CollaboratorFactory, Ledger, Router};
pub use controller::LifecycleController;
pub use error::LifecycleError;
pub use state::{State, ValidationMode};
