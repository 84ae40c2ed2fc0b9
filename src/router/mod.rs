//! Event routing: intake transport, exchange connectors, load monitoring.

pub mod exchange;
pub mod intake;
pub mod load;
pub mod router;

pub use exchange::{Activation, ExchangeConnector};
pub use intake::{parse_line, Event, EventKind, IntakeError};
pub use load::LoadMonitor;
pub use router::{Decision, EventRouter};
