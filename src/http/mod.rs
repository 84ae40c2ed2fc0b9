// HTTP module: admin server and the controller interface.

#[path = "server/server.rs"]
pub mod server;

pub use server::HttpServer;

// Common controller interface
pub use crate::controller::controller::Controller;
