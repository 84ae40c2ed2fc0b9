// Shared test support code for unit and integration tests.

pub mod common;
pub mod doubles;
pub mod harness;

pub use common::*;
pub use doubles::*;
pub use harness::*;
