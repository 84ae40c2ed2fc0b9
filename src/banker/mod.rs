//! In-process ledger collaborator.

pub mod banker;

pub use banker::LocalBanker;
