// Application wiring: collaborator factory, admin server, lifecycle.

pub mod app;
pub mod factory;
pub mod server;

pub use app::App;
pub use factory::DefaultFactory;
pub use server::AdminServer;
