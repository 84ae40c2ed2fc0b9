//! Exchange connector registry entries.

use parking_lot::RwLock;
use serde::Serialize;

use crate::config::Exchange;

/// Whether a connector accepts traffic. Connectors are enabled for the
/// lifetime of the router; there is no timed activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Disabled,
    Indefinitely,
}

/// One activated exchange connector.
#[derive(Debug)]
pub struct ExchangeConnector {
    descriptor: Exchange,
    activation: RwLock<Activation>,
}

impl ExchangeConnector {
    pub fn new(descriptor: Exchange) -> Self {
        Self {
            descriptor,
            activation: RwLock::new(Activation::Disabled),
        }
    }

    pub fn name(&self) -> &str {
        self.descriptor.display_name()
    }

    pub fn enable(&self, activation: Activation) {
        *self.activation.write() = activation;
    }

    pub fn disable(&self) {
        self.enable(Activation::Disabled);
    }

    pub fn activation(&self) -> Activation {
        *self.activation.read()
    }

    pub fn is_enabled(&self) -> bool {
        self.activation() == Activation::Indefinitely
    }
}
