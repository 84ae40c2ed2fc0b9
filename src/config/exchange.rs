// Exchange descriptors.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One exchange connector descriptor. Everything besides the type and the
/// optional name is opaque to the lifecycle and handed to the router as is.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Exchange {
    #[serde(rename = "exchangeType")]
    pub exchange_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl Exchange {
    pub fn new(exchange_type: impl Into<String>) -> Self {
        Self {
            exchange_type: exchange_type.into(),
            name: None,
            params: serde_json::Map::new(),
        }
    }

    /// Connector name, the exchange type when no name is configured.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.exchange_type)
    }
}

/// Loads an ordered exchange list from a JSON file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Exchange>> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("read exchange configuration {:?}", path))?;
    serde_json::from_str(&data).with_context(|| format!("unmarshal exchange json from {:?}", path))
}
